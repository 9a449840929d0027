//! Grading engine: marks, penalty scoring, and submission selection.
//!
//! Grading inverts each item's answer permutation to land in the original
//! answer frame, looks the position up in that question's key, and applies
//! the penalty-for-guessing formula. Which of a student's submissions gets
//! graded is a separate, explicitly partial policy: the unresolvable cases
//! surface as [`Selection::Unresolved`] for a human to sort out.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GabError, Result};
use crate::key::AnswerKey;
use crate::model::{Gab, McTest};

/// One raw mark on one question, in the student's shuffled presentation
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    /// The answer choice at this shuffled position (don't-know excluded).
    Choice(usize),
    /// The explicit don't-know option.
    DontKnow,
    /// No mark at all.
    Blank,
}

/// One submitted attempt: one mark per question, in presentation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    marks: Vec<Mark>,
}

impl Submission {
    pub fn new(marks: Vec<Mark>) -> Self {
        Self { marks }
    }

    pub fn marks(&self) -> &[Mark] {
        &self.marks
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// A blank sheet: not a single mark, don't-know included.
    pub fn is_blank(&self) -> bool {
        self.marks.iter().all(|m| matches!(m, Mark::Blank))
    }

    /// A positive attempt carries at least one real answer choice.
    pub fn is_positive(&self) -> bool {
        self.marks.iter().any(|m| matches!(m, Mark::Choice(_)))
    }

    /// How many questions carry a real answer choice.
    pub fn answered(&self) -> usize {
        self.marks
            .iter()
            .filter(|m| matches!(m, Mark::Choice(_)))
            .count()
    }

    /// Dash-separated rendering for reports: chosen letters uppercase,
    /// blank and don't-know both as `N`.
    pub fn to_dash_string(&self) -> String {
        let rendered: Vec<String> = self
            .marks
            .iter()
            .map(|m| match m {
                Mark::Choice(i) => char::from(b'A' + (*i as u8 % 26)).to_string(),
                Mark::DontKnow | Mark::Blank => "N".to_string(),
            })
            .collect();
        rendered.join("-")
    }
}

/// Grading knobs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GradePolicy {
    /// How many wrong answers cancel one right answer. Zero or negative
    /// disables the penalty.
    pub penalty_divisor: i32,
}

impl Default for GradePolicy {
    fn default() -> Self {
        Self { penalty_divisor: 4 }
    }
}

/// The result of grading one submission against one test.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeOutcome {
    /// 0-10 scale, rounded up to one decimal place.
    pub score: f64,
    pub correct: usize,
    pub wrong: usize,
    /// Dash-separated accepted letters per question, in the student's
    /// shuffled frame, for audit.
    pub key_letters: String,
}

/// Grade one submission. Pure: same inputs, same outcome, and the keys are
/// never mutated here.
///
/// `keys` is the document's full per-original-item key sequence;
/// `dont_know` whether the exam has the don't-know slot.
pub fn grade(
    submission: &Submission,
    test: &McTest,
    keys: &[AnswerKey],
    dont_know: bool,
    policy: &GradePolicy,
) -> Result<GradeOutcome> {
    let num_questions = test.items.len();
    if num_questions == 0 {
        return Err(GabError::ResourceMisuse(
            "cannot grade a test with no questions".to_string(),
        ));
    }
    if submission.len() != num_questions {
        return Err(GabError::ResourceMisuse(format!(
            "submission has {} mark(s) for a test with {num_questions} question(s)",
            submission.len()
        )));
    }
    if keys.len() != num_questions {
        return Err(GabError::ResourceMisuse(format!(
            "{} key(s) for a test with {num_questions} question(s)",
            keys.len()
        )));
    }

    let mut correct = 0usize;
    let mut wrong = 0usize;
    let mut letters = Vec::with_capacity(num_questions);

    for (mark, item) in submission.marks().iter().zip(&test.items) {
        let num_choices = item.num_choices();
        // The decoder guarantees item.num_orig equals the test's
        // question-order entry for this position.
        let key = &keys[item.num_orig];

        let orig_pos = match *mark {
            Mark::Choice(m) if m < num_choices => item.perm[m],
            Mark::Choice(m) => {
                return Err(GabError::ResourceMisuse(format!(
                    "mark {m} is out of range for an item with {num_choices} choice(s)"
                )));
            }
            // Blank and don't-know both land on the don't-know slot.
            Mark::DontKnow | Mark::Blank => num_choices,
        };

        let point = key.get(orig_pos);
        if point {
            correct += 1;
        }
        if matches!(mark, Mark::Choice(_)) && !point {
            wrong += 1;
        }
        letters.push(key.perm_letters(&item.perm, dont_know));
    }

    let mut corrected = correct as i64;
    if policy.penalty_divisor > 0 {
        corrected -= wrong as i64 / i64::from(policy.penalty_divisor);
    }
    if corrected < 0 {
        corrected = 0;
    }

    // ceil(100 * corrected / n) / 10, kept in integers until the end.
    let points = 100 * corrected;
    let n = num_questions as i64;
    let tenths = points / n + i64::from(points % n != 0);

    Ok(GradeOutcome {
        score: tenths as f64 / 10.0,
        correct,
        wrong,
        key_letters: letters.join("-"),
    })
}

impl Gab {
    /// Grade a submission against one of this document's tests using the
    /// document's keys.
    pub fn grade(
        &self,
        test: &McTest,
        submission: &Submission,
        policy: &GradePolicy,
    ) -> Result<GradeOutcome> {
        grade(
            submission,
            test,
            &self.keys,
            self.header.dont_know_included,
            policy,
        )
    }
}

/// Why a particular submission was (or was not) chosen for grading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GradeStatus {
    NoShow,
    SingleAttempt,
    AllEmpty,
    NonePositive,
    SinglePositive,
    LastPositiveAccepted,
    Unresolved,
}

impl GradeStatus {
    /// Every status, in policy evaluation order.
    pub const ALL: [GradeStatus; 7] = [
        GradeStatus::NoShow,
        GradeStatus::SingleAttempt,
        GradeStatus::AllEmpty,
        GradeStatus::NonePositive,
        GradeStatus::SinglePositive,
        GradeStatus::LastPositiveAccepted,
        GradeStatus::Unresolved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GradeStatus::NoShow => "no-show",
            GradeStatus::SingleAttempt => "single-attempt",
            GradeStatus::AllEmpty => "all-empty",
            GradeStatus::NonePositive => "none-positive",
            GradeStatus::SinglePositive => "single-positive",
            GradeStatus::LastPositiveAccepted => "last-positive-accepted",
            GradeStatus::Unresolved => "unresolved",
        }
    }
}

impl fmt::Display for GradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the submission-selection policy.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection<'a> {
    /// No submissions at all; nothing to grade.
    NoShow,
    /// Grade this submission normally.
    Grade {
        submission: &'a Submission,
        status: GradeStatus,
    },
    /// Record this submission but score zero without grading.
    Zero {
        submission: &'a Submission,
        status: GradeStatus,
    },
    /// The policy cannot pick a submission; a human has to.
    Unresolved { candidates: &'a [Submission] },
}

impl Selection<'_> {
    pub fn status(&self) -> GradeStatus {
        match self {
            Selection::NoShow => GradeStatus::NoShow,
            Selection::Grade { status, .. } | Selection::Zero { status, .. } => *status,
            Selection::Unresolved { .. } => GradeStatus::Unresolved,
        }
    }
}

/// Pick which of a student's submissions to grade.
///
/// Evaluated in order: no submissions; exactly one; all blank; none
/// positive; exactly one positive; the last positive answered all but at
/// most two questions. Anything past that is ambiguous and comes back as
/// [`Selection::Unresolved`] instead of a silent guess.
pub fn select_submission(submissions: &[Submission]) -> Selection<'_> {
    match submissions {
        [] => return Selection::NoShow,
        [only] => {
            return Selection::Grade {
                submission: only,
                status: GradeStatus::SingleAttempt,
            }
        }
        _ => {}
    }

    let Some(last_nonblank) = submissions.iter().rposition(|s| !s.is_blank()) else {
        return Selection::Zero {
            submission: &submissions[submissions.len() - 1],
            status: GradeStatus::AllEmpty,
        };
    };

    let positives: Vec<usize> = submissions
        .iter()
        .enumerate()
        .filter(|(_, s)| s.is_positive())
        .map(|(i, _)| i)
        .collect();

    match positives.as_slice() {
        [] => Selection::Zero {
            submission: &submissions[last_nonblank],
            status: GradeStatus::NonePositive,
        },
        [only] => Selection::Grade {
            submission: &submissions[*only],
            status: GradeStatus::SinglePositive,
        },
        [.., last] => {
            let last_positive = &submissions[*last];
            if last_positive.answered() + 2 >= last_positive.len() {
                Selection::Grade {
                    submission: last_positive,
                    status: GradeStatus::LastPositiveAccepted,
                }
            } else {
                Selection::Unresolved {
                    candidates: submissions,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GabHeader, McItem};
    use crate::perm::Permutation;

    fn item(answer_perm: Vec<usize>, num_orig: usize, dont_know: bool) -> McItem {
        let perm = Permutation::new(answer_perm).unwrap();
        let right = perm.iter().position(|&v| v == 0).unwrap();
        McItem {
            right,
            num_answers: perm.len() + usize::from(dont_know),
            perm,
            num_orig,
            right_orig: 0,
        }
    }

    fn test_with(items: Vec<McItem>) -> McTest {
        let order: Vec<usize> = items.iter().map(|it| it.num_orig).collect();
        McTest {
            perm: Permutation::new(order).unwrap(),
            student: None,
            items,
        }
    }

    fn canonical_keys(n: usize, len: usize) -> Vec<AnswerKey> {
        (0..n).map(|_| AnswerKey::canonical(len)).collect()
    }

    fn sub(marks: Vec<Mark>) -> Submission {
        Submission::new(marks)
    }

    #[test]
    fn single_question_right_choice_scores_ten() {
        let test = test_with(vec![item(vec![0, 1], 0, false)]);
        let keys = canonical_keys(1, 2);
        let outcome = grade(
            &sub(vec![Mark::Choice(0)]),
            &test,
            &keys,
            false,
            &GradePolicy::default(),
        )
        .unwrap();
        assert_eq!(outcome.correct, 1);
        assert_eq!(outcome.wrong, 0);
        assert!((outcome.score - 10.0).abs() < f64::EPSILON);
        assert_eq!(outcome.key_letters, "A");
    }

    #[test]
    fn single_question_wrong_choice_scores_zero() {
        let test = test_with(vec![item(vec![0, 1], 0, false)]);
        let keys = canonical_keys(1, 2);
        let outcome = grade(
            &sub(vec![Mark::Choice(1)]),
            &test,
            &keys,
            false,
            &GradePolicy { penalty_divisor: 4 },
        )
        .unwrap();
        assert_eq!(outcome.correct, 0);
        assert_eq!(outcome.wrong, 1);
        assert!((outcome.score - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn permutation_inversion_picks_the_shuffled_right_answer() {
        // Shuffled order [1, 0]: original answer 0 sits at position 1.
        let test = test_with(vec![item(vec![1, 0], 0, false)]);
        let keys = canonical_keys(1, 2);
        let policy = GradePolicy::default();
        let right = grade(&sub(vec![Mark::Choice(1)]), &test, &keys, false, &policy).unwrap();
        assert_eq!(right.correct, 1);
        assert_eq!(right.key_letters, "B");
        let wrong = grade(&sub(vec![Mark::Choice(0)]), &test, &keys, false, &policy).unwrap();
        assert_eq!(wrong.correct, 0);
    }

    #[test]
    fn penalty_cancels_one_right_per_divisor() {
        // 10 questions: 6 right, 4 wrong, penalty 4 -> 5 count for score.
        let items: Vec<McItem> = (0..10).map(|q| item(vec![0, 1, 2, 3], q, false)).collect();
        let test = test_with(items);
        let keys = canonical_keys(10, 4);
        let marks: Vec<Mark> = (0..10)
            .map(|q| if q < 6 { Mark::Choice(0) } else { Mark::Choice(1) })
            .collect();
        let outcome = grade(
            &sub(marks),
            &test,
            &keys,
            false,
            &GradePolicy { penalty_divisor: 4 },
        )
        .unwrap();
        assert_eq!(outcome.correct, 6);
        assert_eq!(outcome.wrong, 4);
        // ceil(100 * 5 / 10) / 10 = 5.0
        assert!((outcome.score - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn disabled_penalty_keeps_raw_correct_count() {
        let items: Vec<McItem> = (0..4).map(|q| item(vec![0, 1], q, false)).collect();
        let test = test_with(items);
        let keys = canonical_keys(4, 2);
        let marks = vec![
            Mark::Choice(0),
            Mark::Choice(1),
            Mark::Choice(1),
            Mark::Choice(1),
        ];
        let outcome = grade(
            &sub(marks),
            &test,
            &keys,
            false,
            &GradePolicy {
                penalty_divisor: -1,
            },
        )
        .unwrap();
        assert_eq!(outcome.correct, 1);
        assert_eq!(outcome.wrong, 3);
        // ceil(100 * 1 / 4) / 10 = 2.5
        assert!((outcome.score - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn corrected_count_never_goes_negative() {
        let items: Vec<McItem> = (0..3).map(|q| item(vec![0, 1], q, false)).collect();
        let test = test_with(items);
        let keys = canonical_keys(3, 2);
        let marks = vec![Mark::Choice(1); 3];
        let outcome = grade(
            &sub(marks),
            &test,
            &keys,
            false,
            &GradePolicy { penalty_divisor: 1 },
        )
        .unwrap();
        assert_eq!(outcome.wrong, 3);
        assert!((outcome.score - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn dont_know_is_neither_right_nor_penalized_by_default() {
        // max_num_answers = 3 with don't-know: 2 real choices.
        let test = test_with(vec![item(vec![0, 1], 0, true)]);
        let keys = canonical_keys(1, 3);
        let outcome = grade(
            &sub(vec![Mark::DontKnow]),
            &test,
            &keys,
            true,
            &GradePolicy::default(),
        )
        .unwrap();
        assert_eq!(outcome.correct, 0);
        assert_eq!(outcome.wrong, 0);
    }

    #[test]
    fn dont_know_counts_when_the_key_accepts_it() {
        let test = test_with(vec![item(vec![0, 1], 0, true)]);
        let key = AnswerKey::from_letters("N", 3, true).unwrap();
        let outcome = grade(
            &sub(vec![Mark::DontKnow]),
            &test,
            &[key],
            true,
            &GradePolicy::default(),
        )
        .unwrap();
        assert_eq!(outcome.correct, 1);
        assert_eq!(outcome.key_letters, "N");
    }

    #[test]
    fn voided_question_grades_wrong_for_everyone() {
        let test = test_with(vec![item(vec![0, 1], 0, false)]);
        let keys = vec![AnswerKey::void(2)];
        let policy = GradePolicy::default();
        for mark in [Mark::Choice(0), Mark::Choice(1), Mark::Blank] {
            let outcome = grade(&sub(vec![mark]), &test, &keys, false, &policy).unwrap();
            assert_eq!(outcome.correct, 0, "mark {mark:?}");
        }
    }

    #[test]
    fn grading_is_deterministic() {
        let test = test_with(vec![item(vec![2, 0, 1], 0, false)]);
        let keys = canonical_keys(1, 3);
        let submission = sub(vec![Mark::Choice(1)]);
        let policy = GradePolicy::default();
        let first = grade(&submission, &test, &keys, false, &policy).unwrap();
        let second = grade(&submission, &test, &keys, false, &policy).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_test_is_a_contract_error_not_a_panic() {
        let test = McTest {
            perm: Permutation::new(vec![0]).unwrap(),
            student: None,
            items: vec![],
        };
        let err = grade(&sub(vec![]), &test, &[], false, &GradePolicy::default()).unwrap_err();
        assert!(matches!(err, GabError::ResourceMisuse(_)), "got {err}");
    }

    #[test]
    fn length_mismatches_are_contract_errors() {
        let test = test_with(vec![item(vec![0, 1], 0, false)]);
        let keys = canonical_keys(1, 2);
        let policy = GradePolicy::default();
        let err = grade(&sub(vec![]), &test, &keys, false, &policy).unwrap_err();
        assert!(matches!(err, GabError::ResourceMisuse(_)), "got {err}");
        let err = grade(&sub(vec![Mark::Choice(0)]), &test, &[], false, &policy).unwrap_err();
        assert!(matches!(err, GabError::ResourceMisuse(_)), "got {err}");
        let err = grade(&sub(vec![Mark::Choice(7)]), &test, &keys, false, &policy).unwrap_err();
        assert!(matches!(err, GabError::ResourceMisuse(_)), "got {err}");
    }

    fn blank(n: usize) -> Submission {
        sub(vec![Mark::Blank; n])
    }

    fn dk_only(n: usize) -> Submission {
        sub(vec![Mark::DontKnow; n])
    }

    fn answered(n: usize, choices: usize) -> Submission {
        let marks = (0..n)
            .map(|i| {
                if i < choices {
                    Mark::Choice(0)
                } else {
                    Mark::Blank
                }
            })
            .collect();
        sub(marks)
    }

    #[test]
    fn selection_no_submissions() {
        assert_eq!(select_submission(&[]), Selection::NoShow);
        assert_eq!(select_submission(&[]).status(), GradeStatus::NoShow);
    }

    #[test]
    fn selection_single_attempt_is_graded_even_if_blank() {
        let subs = [blank(3)];
        let Selection::Grade { status, .. } = select_submission(&subs) else {
            panic!("expected Grade");
        };
        assert_eq!(status, GradeStatus::SingleAttempt);
    }

    #[test]
    fn selection_all_blank_scores_zero_on_the_last() {
        let subs = [blank(3), blank(3)];
        let Selection::Zero { submission, status } = select_submission(&subs) else {
            panic!("expected Zero");
        };
        assert_eq!(status, GradeStatus::AllEmpty);
        assert!(std::ptr::eq(submission, &subs[1]));
    }

    #[test]
    fn selection_none_positive_takes_last_nonblank() {
        // Don't-know-only sheets are non-blank but not positive.
        let subs = [dk_only(3), blank(3)];
        let Selection::Zero { submission, status } = select_submission(&subs) else {
            panic!("expected Zero");
        };
        assert_eq!(status, GradeStatus::NonePositive);
        assert!(std::ptr::eq(submission, &subs[0]));
    }

    #[test]
    fn selection_exactly_one_positive() {
        let subs = [blank(4), answered(4, 1), dk_only(4)];
        let Selection::Grade { submission, status } = select_submission(&subs) else {
            panic!("expected Grade");
        };
        assert_eq!(status, GradeStatus::SinglePositive);
        assert!(std::ptr::eq(submission, &subs[1]));
    }

    #[test]
    fn selection_last_positive_with_at_most_two_gaps() {
        let subs = [answered(5, 5), answered(5, 3)];
        let Selection::Grade { submission, status } = select_submission(&subs) else {
            panic!("expected Grade");
        };
        assert_eq!(status, GradeStatus::LastPositiveAccepted);
        assert!(std::ptr::eq(submission, &subs[1]));
    }

    #[test]
    fn selection_ambiguous_surfaces_all_candidates() {
        // Two positives, the last one mostly unanswered: no safe pick.
        let subs = [answered(6, 6), answered(6, 1)];
        let Selection::Unresolved { candidates } = select_submission(&subs) else {
            panic!("expected Unresolved");
        };
        assert_eq!(candidates.len(), 2);
        assert_eq!(select_submission(&subs).status(), GradeStatus::Unresolved);
    }

    #[test]
    fn status_serializes_as_kebab_case() {
        let json = serde_json::to_string(&GradeStatus::LastPositiveAccepted).unwrap();
        assert_eq!(json, "\"last-positive-accepted\"");
        assert_eq!(GradeStatus::NoShow.to_string(), "no-show");
    }

    #[test]
    fn submission_dash_string_renders_blank_and_dont_know_as_n() {
        let s = sub(vec![Mark::Choice(0), Mark::DontKnow, Mark::Blank, Mark::Choice(3)]);
        assert_eq!(s.to_dash_string(), "A-N-N-D");
    }
}
