// marksman/src/commands/grade.rs
//! Implements the `grade` subcommand: grade one answer and print the report.
//! License: MIT OR Apache-2.0

use std::io::{self, Read, Write};

use anyhow::{bail, Context, Result};
use is_terminal::IsTerminal;
use log::debug;

use marksman_core::{GradingEngine, GradingRequest};

use super::{build_analyzer, read_text, resolve_config};
use crate::cli::GradeCommand;
use crate::ui::report_view;

pub async fn run_grade_command(cmd: GradeCommand) -> Result<()> {
    let config = resolve_config(&cmd.source)?;

    let reference = read_text(cmd.reference.as_deref(), cmd.reference_file.as_deref(), "reference answer")?
        .context("A reference answer is required (--reference or --reference-file)")?;
    let answer = match read_text(cmd.answer.as_deref(), cmd.answer_file.as_deref(), "student answer")? {
        Some(text) => text,
        None => read_answer_from_stdin()?,
    };

    let analyzer = build_analyzer(&config, cmd.source.fixture.as_deref())?;
    let engine = GradingEngine::from_config(&config, analyzer)?;
    debug!("Grading with analyzer '{}'.", engine.analyzer_name());

    let mut request = GradingRequest::new(answer, reference, cmd.marks);
    request.question_id = cmd.question_id;

    let report = engine.grade(&request).await?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if cmd.json {
        serde_json::to_writer_pretty(&mut out, &report).context("Failed to serialize grading report")?;
        writeln!(out)?;
    } else {
        let supports_color = io::stdout().is_terminal();
        report_view::print_summary(&mut out, &report.result, supports_color)?;
        if cmd.details {
            report_view::print_details(&mut out, &report.result)?;
        }
    }
    Ok(())
}

fn read_answer_from_stdin() -> Result<String> {
    if io::stdin().is_terminal() {
        bail!("No student answer given. Use --answer, --answer-file or pipe the answer on stdin.");
    }
    debug!("Reading student answer from stdin.");
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read student answer from stdin")?;
    Ok(buffer)
}
