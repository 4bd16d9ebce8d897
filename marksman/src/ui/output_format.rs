// marksman/src/ui/output_format.rs
//! Status messages written to stderr, coloured when the stream is a terminal.

use std::io::{self, Write};

use is_terminal::IsTerminal;
use owo_colors::OwoColorize;

pub fn print_info_message<W: Write>(writer: &mut W, message: &str, supports_color: bool) -> io::Result<()> {
    if supports_color {
        writeln!(writer, "{}", message.cyan())
    } else {
        writeln!(writer, "{}", message)
    }
}

pub fn print_warn_message<W: Write>(writer: &mut W, message: &str, supports_color: bool) -> io::Result<()> {
    if supports_color {
        writeln!(writer, "{} {}", "Warning:".yellow().bold(), message)
    } else {
        writeln!(writer, "Warning: {}", message)
    }
}

pub fn print_error_message<W: Write>(writer: &mut W, message: &str, supports_color: bool) -> io::Result<()> {
    if supports_color {
        writeln!(writer, "{} {}", "Error:".red().bold(), message)
    } else {
        writeln!(writer, "Error: {}", message)
    }
}

/// Helper for printing info messages to stderr.
pub fn info_msg(msg: impl AsRef<str>) {
    let stderr_supports_color = io::stderr().is_terminal();
    let _ = print_info_message(&mut io::stderr(), msg.as_ref(), stderr_supports_color);
}

/// Helper for printing warning messages to stderr.
pub fn warn_msg(msg: impl AsRef<str>) {
    let stderr_supports_color = io::stderr().is_terminal();
    let _ = print_warn_message(&mut io::stderr(), msg.as_ref(), stderr_supports_color);
}

/// Helper for printing error messages to stderr.
pub fn error_msg(msg: impl AsRef<str>) {
    let stderr_supports_color = io::stderr().is_terminal();
    let _ = print_error_message(&mut io::stderr(), msg.as_ref(), stderr_supports_color);
}
