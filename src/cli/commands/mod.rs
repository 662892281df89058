//! CLI command handlers for `wizscholar`.
//!
//! Each command is implemented in its own submodule. Handlers print their
//! result and exit with status 1 on failure.

pub mod config;
pub mod pdf;
pub mod report;
pub mod semester;
pub mod serve;
pub mod target;

use std::io::{self, Write};

/// Print `message` to stderr and exit with status 1
pub fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("✗ {message}");
    std::process::exit(1);
}

/// Ask a yes/no question on stdin; anything but `y`/`yes` is a no
pub fn confirm(prompt: &str) -> bool {
    print!("{prompt} (y/n): ");
    io::stdout().flush().ok();

    let mut response = String::new();
    io::stdin().read_line(&mut response).ok();
    let response = response.trim();
    response.eq_ignore_ascii_case("y") || response.eq_ignore_ascii_case("yes")
}
