//! Response-sheet rows: the raw export of every submitted attempt.
//!
//! Each row is one attempt by one student, keyed by e-mail. Students may
//! submit more than once; all of their rows are kept in file order so the
//! selection policy downstream can see the full history.

use std::path::Path;

use anyhow::{Context, Result};
use gabarito_core::grade::Submission;
use serde::Deserialize;

use crate::marks::parse_row;

/// One exported response row, exactly as submitted.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionRow {
    pub email: String,
    /// One cell per question, in the student's presentation order.
    pub answers: Vec<String>,
}

/// Load all response rows from a JSON file, preserving file order.
pub fn load_rows(path: &Path) -> Result<Vec<SubmissionRow>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading responses {}", path.display()))?;
    let rows: Vec<SubmissionRow> = serde_json::from_str(&text)
        .with_context(|| format!("parsing responses {}", path.display()))?;
    tracing::debug!(rows = rows.len(), path = %path.display(), "loaded responses");
    Ok(rows)
}

/// All of one student's attempts, in submission order.
///
/// E-mails compare case-insensitively; the export tool is not consistent
/// about casing.
pub fn attempts_for(
    rows: &[SubmissionRow],
    email: &str,
    num_choices: usize,
) -> Result<Vec<Submission>> {
    rows.iter()
        .filter(|row| row.email.eq_ignore_ascii_case(email))
        .enumerate()
        .map(|(i, row)| {
            parse_row(&row.answers, num_choices)
                .with_context(|| format!("attempt {} of {email}", i + 1))
        })
        .collect()
}
