// marksman/src/cli.rs
//! This file defines the command-line interface (CLI) for the marksman application,
//! including all available commands and their arguments.
//! License: MIT OR Apache-2.0

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "marksman",
    version = env!("CARGO_PKG_VERSION"),
    about = "Grade free-text answers against a reference answer",
    long_about = "marksman grades a student's free-text answer against a reference answer by combining entity overlap, sentence structure, sentiment and salience-weighted keyword matching into a single mark, and reports which keywords were matched or missed.",
    arg_required_else_help = true,
)]
pub struct Cli {
    /// Disable informational messages
    #[arg(long, short = 'q', global = true, help = "Suppress all log messages.")]
    pub quiet: bool,

    /// Enable debug logging (overrides RUST_LOG)
    #[arg(long, short = 'd', global = true, help = "Enable debug logging.")]
    pub debug: bool,

    /// Explicitly disable debug logging, even if RUST_LOG is set to DEBUG
    #[arg(long = "disable-debug", global = true, help = "Disable debug logging, overriding RUST_LOG.")]
    pub disable_debug: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// All available commands for the `marksman` CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Grades a single answer.
    #[command(about = "Grades a single student answer against a reference answer.")]
    Grade(GradeCommand),

    /// Grades a JSON array of requests.
    #[command(about = "Grades a JSON array of grading requests concurrently.")]
    Batch(BatchCommand),

    /// Tools for managing grading profiles.
    #[command(subcommand, about = "Provides tools for managing grading profiles.")]
    Profiles(ProfilesCommand),
}

/// Where the grading policy and the language analysis come from.
#[derive(Args, Debug, Clone, Default)]
pub struct PolicySource {
    /// Path to a custom grading configuration file (YAML).
    #[arg(long = "config", value_name = "FILE", help = "Path to a custom grading configuration file (YAML).")]
    pub config: Option<PathBuf>,

    /// Named profile or path to a profile file.
    #[arg(long = "profile", value_name = "NAME", help = "Applies a grading profile by name or path (e.g. 'legacy').")]
    pub profile: Option<String>,

    /// Use pre-computed analyses instead of the remote analysis service.
    #[arg(long = "fixture", value_name = "FILE", help = "Read language analyses from a JSON or YAML fixture file instead of calling the analysis service.")]
    pub fixture: Option<PathBuf>,
}

/// Arguments for the `grade` command.
#[derive(Parser, Debug)]
pub struct GradeCommand {
    #[arg(long, short = 'r', value_name = "TEXT", conflicts_with = "reference_file", required_unless_present = "reference_file", help = "The reference (model) answer.")]
    pub reference: Option<String>,

    #[arg(long = "reference-file", value_name = "FILE", help = "Read the reference answer from a file.")]
    pub reference_file: Option<PathBuf>,

    /// The student answer (reads from stdin if neither this nor --answer-file is given).
    #[arg(long, short = 'a', value_name = "TEXT", conflicts_with = "answer_file", help = "The student answer. Read from stdin when omitted.")]
    pub answer: Option<String>,

    #[arg(long = "answer-file", value_name = "FILE", help = "Read the student answer from a file.")]
    pub answer_file: Option<PathBuf>,

    #[arg(long, short = 'm', value_name = "N", default_value_t = 10.0, allow_negative_numbers = true, help = "Maximum marks for the question.")]
    pub marks: f64,

    #[arg(long = "question-id", value_name = "ID", help = "Identifier echoed in the report.")]
    pub question_id: Option<String>,

    #[command(flatten)]
    pub source: PolicySource,

    #[arg(long, help = "Print the full grading report as JSON.")]
    pub json: bool,

    #[arg(long, conflicts_with = "json", help = "Show a breakdown of sub-scores and keyword feedback.")]
    pub details: bool,
}

/// Arguments for the `batch` command.
#[derive(Parser, Debug)]
pub struct BatchCommand {
    /// JSON file holding an array of grading requests.
    #[arg(long, short = 'i', value_name = "FILE", help = "JSON file holding an array of grading requests.")]
    pub input: PathBuf,

    #[arg(long, short = 'o', value_name = "FILE", help = "Write the JSON results to a file instead of stdout.")]
    pub output: Option<PathBuf>,

    #[arg(long, value_name = "N", help = "Maximum number of requests graded at once (defaults to the configured value).")]
    pub concurrency: Option<usize>,

    #[command(flatten)]
    pub source: PolicySource,
}

/// Subcommands for the `profiles` command.
#[derive(Subcommand, Debug)]
pub enum ProfilesCommand {
    #[command(about = "Lists all available profiles.")]
    List,
}
