//! Grade sheets: the persistent record of one grading run.
//!
//! A sheet holds one row per roster entry plus a summary of the graded
//! document and the policy in force, with JSON persistence and a
//! Markdown rendering for handing out.

pub mod markdown;
pub mod sheet;

pub use markdown::render_markdown;
pub use sheet::{DocumentSummary, GradeRow, GradeSheet};
