//! The `gabarito grade` command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use gabarito_core::grade::{select_submission, GradePolicy, GradeStatus, Selection};
use gabarito_core::model::Gab;
use gabarito_ingest::roster::{matched_test, Roster};
use gabarito_ingest::submissions::{attempts_for, load_rows};
use gabarito_report::sheet::{DocumentSummary, GradeRow, GradeSheet};

#[allow(clippy::too_many_arguments)]
pub fn execute(
    gab_path: PathBuf,
    roster_path: PathBuf,
    responses_path: PathBuf,
    addenda: Vec<PathBuf>,
    penalty: Option<i32>,
    output: Option<PathBuf>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = crate::config::load_config_from(config_path.as_deref())?;

    let mut gab = Gab::from_file(&gab_path)
        .with_context(|| format!("decoding {}", gab_path.display()))?;
    for addendum in &addenda {
        gab.apply_addendum_file(addendum)
            .with_context(|| format!("applying {}", addendum.display()))?;
    }

    let roster = Roster::load_json(&roster_path)?;
    let rows = load_rows(&responses_path)?;

    let policy = GradePolicy {
        penalty_divisor: penalty.unwrap_or(config.penalty_divisor),
    };

    let mut sheet_rows = Vec::with_capacity(roster.entries.len());
    for entry in &roster.entries {
        let test = matched_test(&gab, entry)?;
        let attempts = attempts_for(&rows, &entry.email, gab.header.num_choices())?;
        let selection = select_submission(&attempts);

        let status = selection.status();
        if config.announce.iter().any(|s| s == status.as_str()) {
            tracing::info!(student = %entry.name, %status, "flagged by selection policy");
        }

        let row = match selection {
            // No submissions means no grade at all, as opposed to a
            // submitted blank that legitimately scores zero.
            Selection::NoShow => GradeRow {
                name: entry.name.clone(),
                email: entry.email.clone(),
                status,
                score: None,
                question_order: None,
                answers: None,
                key_letters: None,
            },
            Selection::Zero { submission, .. } => GradeRow {
                name: entry.name.clone(),
                email: entry.email.clone(),
                status,
                score: Some(0.0),
                question_order: Some(test.perm.to_string()),
                answers: Some(submission.to_dash_string()),
                key_letters: None,
            },
            Selection::Grade { submission, .. } => {
                let outcome = gab
                    .grade(test, submission, &policy)
                    .with_context(|| format!("grading {}", entry.name))?;
                GradeRow {
                    name: entry.name.clone(),
                    email: entry.email.clone(),
                    status,
                    score: Some(outcome.score),
                    question_order: Some(test.perm.to_string()),
                    answers: Some(submission.to_dash_string()),
                    key_letters: Some(outcome.key_letters),
                }
            }
            Selection::Unresolved { candidates } => {
                tracing::warn!(
                    student = %entry.name,
                    attempts = candidates.len(),
                    "could not pick a submission; grade by hand"
                );
                GradeRow {
                    name: entry.name.clone(),
                    email: entry.email.clone(),
                    status,
                    score: None,
                    question_order: Some(test.perm.to_string()),
                    answers: None,
                    key_letters: None,
                }
            }
        };
        sheet_rows.push(row);
    }

    let sheet = GradeSheet::new(DocumentSummary::from(&gab), policy, sheet_rows);

    let output_dir = output.unwrap_or(config.output_dir);
    let json_path = output_dir.join(format!("grades-{}.json", sheet.id));
    sheet.save_json(&json_path)?;
    println!("Grade sheet: {}", json_path.display());

    if matches!(format.as_str(), "markdown" | "md" | "all") {
        let md_path = json_path.with_extension("md");
        std::fs::write(&md_path, gabarito_report::render_markdown(&sheet))
            .with_context(|| format!("writing {}", md_path.display()))?;
        println!("Markdown:    {}", md_path.display());
    }

    print_summary(&sheet);
    Ok(())
}

fn print_summary(sheet: &GradeSheet) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Name", "Score", "Status"]);
    for row in &sheet.rows {
        table.add_row(vec![
            Cell::new(&row.name),
            Cell::new(
                row.score
                    .map(|s| format!("{s:.1}"))
                    .unwrap_or_else(|| "?".to_string()),
            ),
            Cell::new(row.status),
        ]);
    }
    println!("\n{table}");

    for (status, count) in sheet.status_counts() {
        println!("{status}: {count}");
    }
    let unresolved = sheet
        .rows
        .iter()
        .filter(|r| r.status == GradeStatus::Unresolved)
        .count();
    if unresolved > 0 {
        println!("\n{unresolved} student(s) need manual review.");
    }
}
