//! Terminal output helpers

use ff_core::WatchTarget;
use owo_colors::OwoColorize;

const FRAME: &str = "****************************************";

/// Print `body` between two frame lines
pub fn print_framed(body: &str) {
    println!("{}", FRAME.dimmed());
    if body.is_empty() {
        println!("{}", "(no entries)".dimmed());
    } else {
        print!("{}", framed_body(body));
    }
    println!("{}", FRAME.dimmed());
}

/// Startup banner naming both directories
pub fn print_banner(target: &WatchTarget) {
    println!(
        "{} {}",
        "Monitoring files in:".bold(),
        target.hot_dir().display().cyan()
    );
    println!(
        "{} {}",
        "Saving backup to:".bold(),
        target.backup_dir().display().cyan()
    );
    println!("Type {} for commands.", "help".yellow());
}

/// Report a recoverable problem without leaving the prompt
pub fn print_error(message: impl std::fmt::Display) {
    eprintln!("{} {}", "Error:".red().bold(), message);
}

fn framed_body(body: &str) -> String {
    if body.ends_with('\n') {
        body.to_string()
    } else {
        format!("{body}\n")
    }
}
