// marksman/src/ui/report_view.rs
//! Human-readable rendering of a grading result.

use std::io::{self, Write};

use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use owo_colors::OwoColorize;

use marksman_core::{GradingResult, GradingStatus};

/// Prints the mark, status and keyword feedback.
///
/// The mark is green from 70%, yellow from 40% and red below that.
pub fn print_summary<W: Write>(writer: &mut W, result: &GradingResult, supports_color: bool) -> io::Result<()> {
    let score = format!(
        "{:.2} / {} ({:.2}%)",
        result.final_score, result.max_marks, result.percentage
    );
    if supports_color {
        let painted = if result.percentage >= 70.0 {
            score.green().bold().to_string()
        } else if result.percentage >= 40.0 {
            score.yellow().bold().to_string()
        } else {
            score.red().bold().to_string()
        };
        writeln!(writer, "Score: {}", painted)?;
    } else {
        writeln!(writer, "Score: {}", score)?;
    }

    writeln!(writer, "Status: {}", result.status)?;
    if result.status == GradingStatus::EmptyAnswer {
        return Ok(());
    }
    writeln!(writer, "Relevance: {:.2}", result.relevance_score)?;
    writeln!(writer, "Matched keywords: {}", join_or_none(&result.matched_keywords))?;
    writeln!(writer, "Missing keywords: {}", join_or_none(&result.missing_keywords))?;
    Ok(())
}

/// Prints a table of the sub-scores followed by the keyword lists.
pub fn print_details<W: Write>(writer: &mut W, result: &GradingResult) -> io::Result<()> {
    writeln!(writer, "{}", details_table(result))
}

pub fn details_table(result: &GradingResult) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Signal", "Value"]);

    let mut rows = vec![
        ("Semantic".to_string(), format!("{:.2}", result.semantic_score)),
        ("  Entity similarity".to_string(), format!("{:.2}", result.entity_similarity)),
        ("  Syntax similarity".to_string(), format!("{:.2}", result.syntax_similarity)),
        ("Keyword".to_string(), format!("{:.2}", result.keyword_score)),
    ];
    for kw in &result.keyword_weights {
        let mark = if kw.weight > 0.0 { '✓' } else { '✗' };
        rows.push((format!("  {} {}", mark, kw.keyword), format!("{:.2}", kw.weight)));
    }
    rows.extend([
        ("Structure".to_string(), format!("{:.2}", result.structure_score)),
        ("  Sentence structure".to_string(), format!("{:.2}", result.syntax_similarity)),
        ("  Writing style match".to_string(), format!("{:.2}", result.sentiment_similarity)),
        ("Relevance".to_string(), format!("{:.2}", result.relevance_score)),
        ("Partial matches".to_string(), join_or_none(&result.partial_matches)),
        ("Extracted keywords".to_string(), join_or_none(&result.extracted_keywords)),
    ]);
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    table
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marksman_core::KeywordWeight;

    fn result() -> GradingResult {
        GradingResult {
            final_score: 4.15,
            max_marks: 10.0,
            percentage: 41.5,
            semantic_score: 50.0,
            keyword_score: 120.0,
            structure_score: 36.4,
            relevance_score: 60.0,
            is_relevant: true,
            entity_similarity: 50.0,
            syntax_similarity: 27.27,
            sentiment_similarity: 100.0,
            keyword_weights: vec![
                KeywordWeight { keyword: "stack".into(), weight: 0.33 },
                KeywordWeight { keyword: "queue".into(), weight: 0.0 },
            ],
            matched_keywords: vec!["stack".into()],
            missing_keywords: vec!["queue".into()],
            partial_matches: vec![],
            extracted_keywords: vec!["stack".into()],
            status: GradingStatus::Graded,
        }
    }

    #[test]
    fn test_summary_lists_keywords() {
        let mut buf = Vec::new();
        print_summary(&mut buf, &result(), false).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Score: 4.15 / 10 (41.50%)"));
        assert!(text.contains("Status: graded"));
        assert!(text.contains("Matched keywords: stack"));
        assert!(text.contains("Missing keywords: queue"));
    }

    #[test]
    fn test_details_table_has_every_signal() {
        let rendered = details_table(&result()).to_string();
        for label in [
            "Semantic",
            "Entity similarity",
            "Syntax similarity",
            "Keyword",
            "Structure",
            "Writing style match",
            "Relevance",
            "Partial matches",
        ] {
            assert!(rendered.contains(label), "missing row {}", label);
        }
        assert!(rendered.contains("120.00"));
        assert!(rendered.contains("(none)"));
    }

    #[test]
    fn test_details_table_breaks_down_keyword_weights() {
        let rendered = details_table(&result()).to_string();
        assert!(rendered.contains("✓ stack"));
        assert!(rendered.contains("0.33"));
        assert!(rendered.contains("✗ queue"));
        assert!(rendered.contains("27.27"));
    }
}
