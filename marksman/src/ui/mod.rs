// marksman/src/ui/mod.rs
//! Terminal output for the marksman CLI.

pub mod output_format;
pub mod report_view;
