//! Command implementations.

pub mod export;
pub mod import;

use colored::Colorize;

/// Print one summary line, skipping zero counts unless `always` is set.
fn print_count(label: &str, count: usize, always: bool) {
    if count > 0 || always {
        println!("  {:<16}{}", format!("{label}:"), count.to_string().bold());
    }
}

/// Print a failure count, highlighted when non-zero.
fn print_failed(count: usize) {
    if count > 0 {
        println!("  {:<16}{}", "Failed:", count.to_string().red().bold());
    }
}
