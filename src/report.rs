//! User-facing progress output.
//!
//! The reporter is the line-oriented channel the user reads; `tracing` stays
//! the diagnostic channel. Lines must be emitted in the order they are
//! produced, so verification reasons come out in check order.

use std::path::Path;

/// Line-oriented progress sink.
pub trait Reporter {
    fn info(&self, message: &str);
    fn error(&self, message: &str);
    /// Detail lines under an info or error line
    fn comment(&self, message: &str);
}

/// Prints to the terminal: info and comments on stdout, errors on stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn info(&self, message: &str) {
        println!("{}", message);
    }

    fn error(&self, message: &str) {
        eprintln!("✗ {}", message);
    }

    fn comment(&self, message: &str) {
        println!("  {}", message);
    }
}

/// Directory label for messages; the root shows as `/`.
pub fn display_dir(dir: &Path) -> String {
    if dir.as_os_str().is_empty() {
        "/".to_string()
    } else {
        dir.display().to_string()
    }
}
