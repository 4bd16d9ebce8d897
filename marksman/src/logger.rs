// marksman/src/logger.rs
//! Logger setup for the marksman CLI.
//!
//! Logs go to stderr so that machine-readable output on stdout stays clean.
//! `RUST_LOG` is respected unless a level is forced by a command-line flag.

use env_logger::{Builder, Env, Target};
use log::LevelFilter;

/// Picks the level forced by `--quiet`, `--debug` and `--disable-debug`, if any.
///
/// `--quiet` wins over everything, `--disable-debug` caps the level at `Info`.
pub fn level_from_flags(quiet: bool, debug: bool, disable_debug: bool) -> Option<LevelFilter> {
    if quiet {
        Some(LevelFilter::Off)
    } else if disable_debug {
        Some(LevelFilter::Info)
    } else if debug {
        Some(LevelFilter::Debug)
    } else {
        None
    }
}

/// Initializes `env_logger`. Safe to call more than once; later calls are ignored.
pub fn init_logger(level_override: Option<LevelFilter>) {
    let mut builder = Builder::from_env(Env::default().default_filter_or("warn"));
    if let Some(level) = level_override {
        builder.filter_level(level);
    }
    builder.format_timestamp(None).target(Target::Stderr);
    let _ = builder.try_init();
}
