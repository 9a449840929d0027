//! Answer keys and addendum application.
//!
//! One [`AnswerKey`] exists per original question: a fixed-size boolean set
//! indexed by answer letter, marking which letters are accepted as correct.
//! Right after decode every key accepts exactly the canonical answer
//! (original index 0, where the generator always places the correct
//! answer). Addendum files override individual keys wholesale: a letter
//! set replaces the accepted set, `-` voids the question entirely.

use std::path::Path;

use crate::error::{GabError, Result};
use crate::model::Gab;
use crate::perm::Permutation;

/// Marker for the don't-know slot in letter strings.
pub const DONT_KNOW_LETTER: char = 'N';

/// The set of accepted correct answer letters for one original question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerKey {
    accepted: Vec<bool>,
}

impl AnswerKey {
    /// Key accepting only the canonical answer (original index 0). Every
    /// key starts in this state when the document is decoded.
    pub fn canonical(len: usize) -> Self {
        let mut accepted = vec![false; len];
        if let Some(first) = accepted.first_mut() {
            *first = true;
        }
        Self { accepted }
    }

    /// Key accepting nothing: the question is voided, nobody gets credit.
    pub fn void(len: usize) -> Self {
        Self {
            accepted: vec![false; len],
        }
    }

    /// Parse a case-insensitive letter set into a key of length `len`.
    ///
    /// `N` always denotes the don't-know slot and requires `dont_know`;
    /// any other letter maps to its alphabet index. Non-letters reject
    /// the whole set.
    pub fn from_letters(
        letters: &str,
        len: usize,
        dont_know: bool,
    ) -> std::result::Result<Self, String> {
        let mut key = Self::void(len);
        for ch in letters.chars() {
            let upper = ch.to_ascii_uppercase();
            let idx = if upper == DONT_KNOW_LETTER {
                if !dont_know {
                    return Err("this answer key does not accept 'don't know'".to_string());
                }
                len - 1
            } else if upper.is_ascii_uppercase() {
                let idx = (upper as usize) - ('A' as usize);
                if idx >= len {
                    return Err(format!("invalid answer \"{ch}\""));
                }
                idx
            } else {
                return Err(format!("unexpected character {ch:?} in answer letters"));
            };
            key.accepted[idx] = true;
        }
        Ok(key)
    }

    pub fn len(&self) -> usize {
        self.accepted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }

    /// Whether the letter at `idx` is accepted. Out-of-range indices are
    /// simply not accepted; a blank mark on a no-don't-know exam lands here.
    pub fn get(&self, idx: usize) -> bool {
        self.accepted.get(idx).copied().unwrap_or(false)
    }

    /// Whether any letter at all is accepted (false for voided questions).
    pub fn accepts_any(&self) -> bool {
        self.accepted.iter().any(|&b| b)
    }

    /// Accepted letters in original answer order, with the last slot
    /// rendered as `N` when the exam has a don't-know option.
    pub fn to_letters(&self, dont_know: bool) -> String {
        let mut letters = String::new();
        for (i, &accepted) in self.accepted.iter().enumerate() {
            if !accepted {
                continue;
            }
            if dont_know && i == self.accepted.len() - 1 {
                letters.push(DONT_KNOW_LETTER);
            } else {
                letters.push(letter_at(i));
            }
        }
        letters
    }

    /// Accepted letters rendered against a shuffled answer order: the
    /// letters a student holding this particular test should mark.
    pub fn perm_letters(&self, perm: &Permutation, dont_know: bool) -> String {
        let mut letters = String::new();
        let real = self.accepted.len() - usize::from(dont_know);
        for pos in 0..real.min(perm.len()) {
            if self.get(perm[pos]) {
                letters.push(letter_at(pos));
            }
        }
        if dont_know && self.get(self.accepted.len() - 1) {
            letters.push(DONT_KNOW_LETTER);
        }
        letters
    }
}

fn letter_at(idx: usize) -> char {
    // Keys never exceed a handful of slots; the cast is safe by header
    // validation (max_num_answers fits an i32).
    char::from(b'A' + (idx as u8 % 26))
}

impl Gab {
    /// Apply one addendum file on top of the current keys.
    pub fn apply_addendum_file(&mut self, path: &Path) -> Result<()> {
        let text = std::fs::read_to_string(path).map_err(|source| GabError::Io {
            path: path.display().to_string(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "applying addendum");
        self.apply_addendum_str(&text)
    }

    /// Apply addendum directives, one per line. Blank lines and `*`
    /// comments are skipped. Each directive fully replaces the key for its
    /// item, so later directives (and later files) win.
    pub fn apply_addendum_str(&mut self, text: &str) -> Result<()> {
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('*') {
                continue;
            }
            self.apply_addendum_line(line, idx + 1)?;
        }
        Ok(())
    }

    fn apply_addendum_line(&mut self, line: &str, line_no: usize) -> Result<()> {
        let bad = |reason: String| GabError::InvalidAddendum {
            line_no,
            line: line.to_string(),
            reason,
        };

        let digits_end = line
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(line.len());
        if digits_end == 0 {
            return Err(bad(
                "line should start with the item number".to_string(),
            ));
        }
        let item: usize = line[..digits_end]
            .parse()
            .map_err(|e| bad(format!("bad item number: {e}")))?;
        if item == 0 || item > self.header.num_items {
            return Err(bad(format!("item {item} does not exist")));
        }

        let rest = line[digits_end..].trim_start();
        let Some(rest) = rest.strip_prefix(':') else {
            return Err(bad("missing ':'".to_string()));
        };
        let rest = rest.trim();

        let len = self.header.max_num_answers;
        let key = if rest == "-" {
            AnswerKey::void(len)
        } else if rest.is_empty() || !rest.chars().next().is_some_and(char::is_alphabetic) {
            return Err(bad(format!("expected the right answers for item {item}")));
        } else {
            AnswerKey::from_letters(rest, len, self.header.dont_know_included).map_err(bad)?
        };

        tracing::debug!(
            item,
            key = %key.to_letters(self.header.dont_know_included),
            "addendum key override"
        );
        self.keys[item - 1] = key;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GabHeader;

    fn gab(num_items: usize, max_num_answers: usize, dont_know: bool) -> Gab {
        Gab {
            header: GabHeader {
                num_tests: 1,
                num_items,
                max_num_answers,
                dont_know_included: dont_know,
            },
            named_tests: vec![],
            unnamed_tests: vec![],
            keys: (0..num_items)
                .map(|_| AnswerKey::canonical(max_num_answers))
                .collect(),
        }
    }

    #[test]
    fn canonical_accepts_only_first() {
        let key = AnswerKey::canonical(4);
        assert!(key.get(0));
        assert!(!key.get(1) && !key.get(2) && !key.get(3));
        assert!(!key.get(4), "out of range is never accepted");
        assert!(key.accepts_any());
    }

    #[test]
    fn void_accepts_nothing() {
        let key = AnswerKey::void(3);
        assert!(!key.accepts_any());
        assert_eq!(key.to_letters(false), "");
    }

    #[test]
    fn from_letters_parses_case_insensitively() {
        let key = AnswerKey::from_letters("aC", 4, false).unwrap();
        assert!(key.get(0) && key.get(2));
        assert!(!key.get(1) && !key.get(3));
        assert_eq!(key.to_letters(false), "AC");
    }

    #[test]
    fn from_letters_dont_know_slot() {
        let key = AnswerKey::from_letters("n", 5, true).unwrap();
        assert!(key.get(4));
        assert_eq!(key.to_letters(true), "N");

        let err = AnswerKey::from_letters("n", 5, false).unwrap_err();
        assert!(err.contains("don't know"), "got {err}");
    }

    #[test]
    fn from_letters_rejects_out_of_range_and_garbage() {
        assert!(AnswerKey::from_letters("E", 4, false).is_err());
        assert!(AnswerKey::from_letters("A1", 4, false).is_err());
    }

    #[test]
    fn perm_letters_maps_back_to_shuffled_positions() {
        // Original answer 0 is accepted; on a test whose shuffled order is
        // [1, 0], the student should mark the second letter.
        let key = AnswerKey::canonical(2);
        let perm = Permutation::new(vec![1, 0]).unwrap();
        assert_eq!(key.perm_letters(&perm, false), "B");
    }

    #[test]
    fn addendum_replaces_key_wholesale() {
        let mut g = gab(3, 4, false);
        g.apply_addendum_str("2: BD\n").unwrap();
        assert_eq!(g.keys[1].to_letters(false), "BD");
        // Replacement, not merge: the canonical A is gone.
        assert!(!g.keys[1].get(0));
        // Untouched items keep the canonical key.
        assert_eq!(g.keys[0].to_letters(false), "A");
    }

    #[test]
    fn addendum_voids_with_dash() {
        let mut g = gab(3, 4, false);
        g.apply_addendum_str("3: -").unwrap();
        assert!(!g.keys[2].accepts_any());
    }

    #[test]
    fn addendum_skips_blanks_and_comments() {
        let mut g = gab(2, 4, false);
        g.apply_addendum_str("* voided after the appeal\n\n1: C\n").unwrap();
        assert_eq!(g.keys[0].to_letters(false), "C");
    }

    #[test]
    fn addendum_is_idempotent_and_last_write_wins() {
        let mut g = gab(2, 4, false);
        g.apply_addendum_str("1: B").unwrap();
        let after_once = g.keys.clone();
        g.apply_addendum_str("1: B").unwrap();
        assert_eq!(g.keys, after_once);

        g.apply_addendum_str("1: C\n1: D").unwrap();
        assert_eq!(g.keys[0].to_letters(false), "D");
    }

    #[test]
    fn addendum_rejects_malformed_lines() {
        let mut g = gab(2, 4, false);
        for line in [": A", "x: A", "1 A", "1:", "1: !", "3: A", "0: A"] {
            let err = g.apply_addendum_str(line).unwrap_err();
            assert!(
                matches!(err, GabError::InvalidAddendum { .. }),
                "{line:?} gave {err}"
            );
        }
    }

    #[test]
    fn addendum_tolerates_spacing_around_colon() {
        let mut g = gab(2, 4, false);
        g.apply_addendum_str("1  :  ab").unwrap();
        assert_eq!(g.keys[0].to_letters(false), "AB");
    }
}
