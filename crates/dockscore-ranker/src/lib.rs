//! dockscore-ranker — Ranking and reporting of aggregated docking scores.

pub mod ranking;
pub mod report;

pub use ranking::{compare_desc_missing_last, rank};
pub use report::{completion_line, read_csv, write_csv, write_failure_report, DEFAULT_OUTPUT};
