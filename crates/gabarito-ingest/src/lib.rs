//! Ingestion for grading runs: the class roster, the exported response
//! sheets, and the mark tokens inside them.
//!
//! Everything in this crate sits between external exports and the
//! [`gabarito_core`] types. Rosters and responses arrive as JSON files;
//! mark cells arrive as the `(a)`-style tokens the form tool emits.

pub mod marks;
pub mod roster;
pub mod submissions;

pub use marks::{parse_mark, parse_row};
pub use roster::{matched_test, Roster, RosterEntry};
pub use submissions::{attempts_for, load_rows, SubmissionRow};
