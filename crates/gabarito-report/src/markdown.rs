//! Markdown rendering of a grade sheet.

use std::fmt::Write as _;

use crate::sheet::GradeSheet;

/// Render the sheet as a Markdown document: a header, the per-student
/// table, and a status tally.
pub fn render_markdown(sheet: &GradeSheet) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "# Grade sheet {}", sheet.id);
    let _ = writeln!(out);
    let _ = writeln!(out, "Generated: {}", sheet.created_at.to_rfc3339());
    let _ = writeln!(
        out,
        "Document: {} test(s), {} question(s), {} answer slot(s){}",
        sheet.document.num_tests,
        sheet.document.num_items,
        sheet.document.max_num_answers,
        if sheet.document.dont_know_included {
            " (with a don't-know option)"
        } else {
            ""
        }
    );
    let _ = writeln!(
        out,
        "Penalty divisor: {}",
        if sheet.policy.penalty_divisor > 0 {
            sheet.policy.penalty_divisor.to_string()
        } else {
            "disabled".to_string()
        }
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "| Name | Score | Status | Answers |");
    let _ = writeln!(out, "|---|---|---|---|");
    for row in &sheet.rows {
        let score = row
            .score
            .map(|s| format!("{s:.1}"))
            .unwrap_or_else(|| "?".to_string());
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} |",
            row.name,
            score,
            row.status,
            row.answers.as_deref().unwrap_or("")
        );
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "## Status tally");
    let _ = writeln!(out);
    for (status, count) in sheet.status_counts() {
        let _ = writeln!(out, "- {status}: {count}");
    }

    out
}
