//! Export command: write tags from the database back to audio files.

use colored::Colorize;

use super::{print_count, print_failed};
use crate::cli::Cli;
use crate::error::{Error, Result};
use crate::storage::MetadataStore;
use crate::sync::{ExportStats, Exporter};
use crate::tags::AudioCodec;

/// Execute the export action.
///
/// The database is opened read-only. Fails with [`Error::DatabaseNotFound`]
/// rather than creating an empty database.
pub fn execute(cli: &Cli, json: bool) -> Result<()> {
    if !cli.db_path.exists() {
        return Err(Error::DatabaseNotFound {
            path: cli.db_path.clone(),
        });
    }

    let storage = MetadataStore::open_read_only(&cli.db_path)?;
    let codec = AudioCodec;
    let stats = Exporter::new(&storage, &codec)
        .dry_run(cli.dry_run)
        .export(&cli.music_dir)?;

    if json {
        let output = serde_json::json!({
            "success": true,
            "action": "export",
            "dry_run": cli.dry_run,
            "database": cli.db_path.display().to_string(),
            "music_dir": cli.music_dir.display().to_string(),
            "stats": stats,
        });
        println!("{}", serde_json::to_string(&output)?);
    } else if !cli.quiet {
        print_summary(cli, &stats);
    }
    Ok(())
}

fn print_summary(cli: &Cli, stats: &ExportStats) {
    let in_scope = stats
        .rows_seen
        .saturating_sub(stats.out_of_scope + stats.missing_path);
    if in_scope == 0 {
        println!("No stored files below: {}", cli.music_dir.display());
        return;
    }

    let title = if cli.dry_run {
        "Dry run for:".yellow().bold()
    } else {
        "Export complete for:".green().bold()
    };
    println!("{title} {}", cli.music_dir.display());
    println!();
    if cli.dry_run {
        print_count("Would update", stats.would_update, true);
    } else {
        print_count("Updated", stats.updated, true);
        print_count("Fields set", stats.fields_set, false);
        print_count("Fields removed", stats.fields_removed, false);
    }
    print_count("Unchanged", stats.unchanged, true);
    print_failed(stats.failed);
}
