//! Class roster loading and reconciliation against a decoded document.
//!
//! The roster is the instructor's source of truth for who took the exam
//! and under which e-mail the response sheet arrives. Each entry must
//! reconcile with exactly one named test in the Gab document, including
//! its auxiliary fields, so a student can never be graded against a test
//! printed for someone else.

use std::path::Path;

use anyhow::{bail, Context, Result};
use gabarito_core::model::{Gab, McTest};
use serde::Deserialize;

/// One enrolled student.
#[derive(Debug, Clone, Deserialize)]
pub struct RosterEntry {
    /// Name exactly as embedded in the Gab document.
    pub name: String,
    /// E-mail the response sheet rows are keyed by.
    #[serde(default)]
    pub email: String,
    /// Auxiliary fields (class, enrollment id, ...), roster order.
    #[serde(default)]
    pub fields: Vec<String>,
}

/// The whole class.
#[derive(Debug, Clone, Deserialize)]
pub struct Roster {
    pub entries: Vec<RosterEntry>,
}

impl Roster {
    /// Load a roster from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading roster {}", path.display()))?;
        let roster: Roster = serde_json::from_str(&text)
            .with_context(|| format!("parsing roster {}", path.display()))?;
        tracing::debug!(
            entries = roster.entries.len(),
            path = %path.display(),
            "loaded roster"
        );
        Ok(roster)
    }
}

/// Auxiliary fields go through punctuation normalization before they are
/// compared, so cosmetic edits between the enrollment export and the exam
/// print run do not break reconciliation.
pub fn normalize_field(field: &str) -> String {
    field
        .trim()
        .replace(['_', ',', ':'], "-")
}

/// Find the named test printed for this roster entry.
///
/// The name must match exactly one test, and every auxiliary field must
/// agree after normalization.
pub fn matched_test<'a>(gab: &'a Gab, entry: &RosterEntry) -> Result<&'a McTest> {
    let test = gab
        .test_by_student_name(&entry.name)
        .with_context(|| format!("matching roster entry {:?}", entry.name))?;
    let Some(student) = test.student.as_ref() else {
        bail!("test matched for {:?} carries no student data", entry.name);
    };

    if student.fields.len() != entry.fields.len() {
        bail!(
            "roster entry {:?} has {} field(s) but the printed test has {}",
            entry.name,
            entry.fields.len(),
            student.fields.len()
        );
    }
    for (roster_field, test_field) in entry.fields.iter().zip(&student.fields) {
        if normalize_field(roster_field) != normalize_field(test_field) {
            bail!(
                "roster entry {:?}: field {:?} does not match the printed test's {:?}",
                entry.name,
                roster_field,
                test_field
            );
        }
    }
    Ok(test)
}
