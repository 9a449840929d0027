//! Grade sheet types with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use gabarito_core::grade::{GradePolicy, GradeStatus};
use gabarito_core::model::Gab;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A complete grading run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeSheet {
    /// Unique sheet identifier.
    pub id: Uuid,
    /// When the run happened.
    pub created_at: DateTime<Utc>,
    /// Summary of the graded document.
    pub document: DocumentSummary,
    /// Policy the scores were computed under.
    pub policy: GradePolicy,
    /// One row per roster entry, roster order.
    pub rows: Vec<GradeRow>,
}

/// Shape of the graded Gab document, without the tests themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub num_tests: usize,
    pub num_items: usize,
    pub max_num_answers: usize,
    pub dont_know_included: bool,
    pub named_tests: usize,
    pub unnamed_tests: usize,
}

impl From<&Gab> for DocumentSummary {
    fn from(gab: &Gab) -> Self {
        Self {
            num_tests: gab.header.num_tests,
            num_items: gab.header.num_items,
            max_num_answers: gab.header.max_num_answers,
            dont_know_included: gab.header.dont_know_included,
            named_tests: gab.named_tests.len(),
            unnamed_tests: gab.unnamed_tests.len(),
        }
    }
}

/// One student's outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeRow {
    pub name: String,
    pub email: String,
    /// How the graded submission was selected.
    pub status: GradeStatus,
    /// 0-10 score. `None` when the run could not produce one (unresolved).
    pub score: Option<f64>,
    /// Dash-separated question order of the student's test, for audit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_order: Option<String>,
    /// Dash-separated marks of the graded submission.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answers: Option<String>,
    /// Dash-separated accepted letters, in the student's answer frame.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_letters: Option<String>,
}

impl GradeSheet {
    pub fn new(document: DocumentSummary, policy: GradePolicy, rows: Vec<GradeRow>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            document,
            policy,
            rows,
        }
    }

    /// Save the sheet as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize grade sheet")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write grade sheet to {}", path.display()))?;
        Ok(())
    }

    /// Load a sheet from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read grade sheet from {}", path.display()))?;
        let sheet: GradeSheet =
            serde_json::from_str(&content).context("failed to parse grade sheet JSON")?;
        Ok(sheet)
    }

    /// Rows per status, in policy evaluation order, zero counts skipped.
    pub fn status_counts(&self) -> Vec<(GradeStatus, usize)> {
        GradeStatus::ALL
            .iter()
            .map(|&status| {
                (
                    status,
                    self.rows.iter().filter(|r| r.status == status).count(),
                )
            })
            .filter(|&(_, count)| count > 0)
            .collect()
    }
}
