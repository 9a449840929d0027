//! Decoded Gab document model.
//!
//! These types mirror what the exam-generation tool writes: per-student
//! randomized tests (question order plus per-item answer order), the
//! student roster data embedded in each test, and one mutable answer key
//! per original question.

use crate::error::{GabError, Result};
use crate::key::AnswerKey;
use crate::perm::Permutation;

/// Magic of the older `Gab_old` format. Recognized and refused.
pub const MAGIC_LEGACY: u32 = 0xB3A2_9CD1;
/// Magic of the current format.
pub const MAGIC_CURRENT: u32 = 0xB3A2_9CD2;
/// The only recognized format tag.
pub const FORMAT_NAME: &str = "Formato 1";
/// Field separator of the legacy student encoding. Its presence anywhere
/// in a student string marks an unsupported document.
pub(crate) const LEGACY_SEPARATOR: &str = "###";

/// Roster identity carried through from the original enrollment list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    pub name: String,
    /// Auxiliary roster fields, in roster order (class, enrollment id, ...).
    pub fields: Vec<String>,
}

/// One multiple-choice question instance, as shuffled on one student's test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McItem {
    /// Index, in the shuffled answer order, the student must choose.
    pub right: usize,
    /// Total answer slots, including the don't-know slot when enabled.
    pub num_answers: usize,
    /// Answer-order permutation; its length excludes the don't-know slot.
    pub perm: Permutation,
    /// Original (un-shuffled) question number.
    pub num_orig: usize,
    /// Original correct-answer index. Always 0: the generator places the
    /// correct answer first before shuffling.
    pub right_orig: usize,
}

impl McItem {
    /// Number of real answer choices, excluding the don't-know slot.
    pub fn num_choices(&self) -> usize {
        self.perm.len()
    }
}

/// One student's full randomized exam.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McTest {
    /// Question-order permutation: position -> original question number.
    pub perm: Permutation,
    /// `None` for anonymous copies printed for students outside the roster.
    pub student: Option<Student>,
    /// One item per entry of `perm`, in `perm` order.
    pub items: Vec<McItem>,
}

impl McTest {
    pub fn student_name(&self) -> Option<&str> {
        self.student.as_ref().map(|s| s.name.as_str())
    }
}

/// Header counts of a Gab document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GabHeader {
    pub num_tests: usize,
    pub num_items: usize,
    /// Answer slots per item, including the don't-know slot when enabled.
    pub max_num_answers: usize,
    pub dont_know_included: bool,
}

impl GabHeader {
    /// Real answer choices per item, excluding the don't-know slot.
    pub fn num_choices(&self) -> usize {
        self.max_num_answers - usize::from(self.dont_know_included)
    }
}

/// A fully decoded Gab document.
///
/// Owns every decoded test and key. Keys start out accepting exactly the
/// canonical answer and are only ever mutated by addendum application,
/// never by grading.
#[derive(Debug, Clone, PartialEq)]
pub struct Gab {
    pub header: GabHeader,
    /// Tests with roster data. Always precede the unnamed ones in the file.
    pub named_tests: Vec<McTest>,
    /// Anonymous tests for students outside the roster.
    pub unnamed_tests: Vec<McTest>,
    /// One key per original item index, shared across every student's
    /// grading pass for that item.
    pub keys: Vec<AnswerKey>,
}

impl Gab {
    /// Find the named test for a student, failing distinctly when the name
    /// is missing or appears more than once.
    pub fn test_by_student_name(&self, name: &str) -> Result<&McTest> {
        let mut matches = self
            .named_tests
            .iter()
            .filter(|t| t.student_name() == Some(name));
        match (matches.next(), matches.next()) {
            (Some(test), None) => Ok(test),
            (None, _) => Err(GabError::StudentNotFound(name.to_string())),
            (Some(_), Some(_)) => Err(GabError::AmbiguousStudent(name.to_string())),
        }
    }

    /// All tests, named first, in file order.
    pub fn tests(&self) -> impl Iterator<Item = &McTest> {
        self.named_tests.iter().chain(self.unnamed_tests.iter())
    }
}
