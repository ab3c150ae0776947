//! Shared CLI helpers — path expansion, startup banner.

use std::path::PathBuf;

use colored::Colorize;

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_next::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs_next::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Print the banner shown when the gateway starts.
pub fn print_banner(address: &str) {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}  v{}", "Omnigate".cyan().bold(), version.dimmed());
    println!(
        "{}",
        format!("Listening on http://{address} (Ctrl-C to stop)").dimmed()
    );
    println!();
}
