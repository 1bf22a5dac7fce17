//! Import command: read tags from audio files into the database.

use colored::Colorize;

use super::{print_count, print_failed};
use crate::cli::Cli;
use crate::error::Result;
use crate::storage::MetadataStore;
use crate::sync::{FailurePolicy, ImportStats, Importer};
use crate::tags::AudioCodec;

/// Execute the import action.
///
/// The database is created if it does not exist yet.
pub fn execute(cli: &Cli, json: bool) -> Result<()> {
    let mut storage = MetadataStore::open(&cli.db_path)?;
    let policy = if cli.fail_fast {
        FailurePolicy::Abort
    } else {
        FailurePolicy::Isolate
    };

    let codec = AudioCodec;
    let stats = Importer::new(&mut storage, &codec, policy)?.import_path(&cli.music_dir)?;

    if json {
        let output = serde_json::json!({
            "success": true,
            "action": "import",
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

fn print_summary(cli: &Cli, stats: &ImportStats) {
    if stats.files_seen == 0 {
        println!("No files found in: {}", cli.music_dir.display());
        return;
    }

    println!(
        "{} {}",
        "Import complete for:".green().bold(),
        cli.music_dir.display()
    );
    println!();
    print_count("Files", stats.files_seen, true);
    print_count("Imported", stats.imported, true);
    print_count("No tags", stats.no_tags, false);
    print_count("Fields skipped", stats.fields_skipped, false);
    print_count("Columns added", stats.columns_added, false);
    print_failed(stats.failed);
    println!();
    println!("  Database: {}", cli.db_path.display());
}
