use colored::*;
use std::env;

/// Check if colored output should be used
pub fn use_colored_output() -> bool {
    // NO_COLOR is the standard opt-out.
    if env::var("NO_COLOR").is_ok() {
        return false;
    }

    if let Ok(term) = env::var("TERM") {
        if term == "dumb" || term == "unknown" {
            return false;
        }
    }

    if env::var("CI").is_ok() || env::var("CONTINUOUS_INTEGRATION").is_ok() {
        return false;
    }

    true
}

/// Print an error message with appropriate formatting
pub fn print_error(tag: &str, message: &str) {
    if use_colored_output() {
        println!("[{}] {message}", tag.bright_red().bold());
    } else {
        println!("[{tag}] {message}");
    }
}

/// Print a success message with appropriate formatting
pub fn print_success(tag: &str, message: &str) {
    if use_colored_output() {
        println!("[{}] {message}", tag.bright_green().bold());
    } else {
        println!("[{tag}] {message}");
    }
}

/// Print an info message with appropriate formatting
pub fn print_info(tag: &str, message: &str) {
    if use_colored_output() {
        println!("[{}] {message}", tag.bright_yellow());
    } else {
        println!("[{tag}] {message}");
    }
}
