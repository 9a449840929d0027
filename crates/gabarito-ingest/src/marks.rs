//! Parsing of the answer tokens found in exported response sheets.
//!
//! The form tool renders each chosen answer as its full text prefixed
//! with a lowercase letter tag, `(a) some answer text`. Only the tag
//! matters for grading. The don't-know option is exported as a phrase
//! rather than a tag, with a few spellings in the wild (broken accents,
//! trailing non-breaking spaces), all of which must be recognized.

use anyhow::{bail, Context, Result};
use gabarito_core::grade::{Mark, Submission};

/// Spellings of the don't-know phrase seen in real exports, lowercased.
const DONT_KNOW_TOKENS: [&str; 4] = ["não sei.", "nâo sei.", "não sei", "não sei\u{a0}"];

/// Parse one response cell into a [`Mark`].
///
/// An empty cell or a bare `-` is a blank; any spelling of the don't-know
/// phrase is [`Mark::DontKnow`]; everything else must start with an
/// `(a)`-style tag whose letter falls inside `num_choices`.
pub fn parse_mark(token: &str, num_choices: usize) -> Result<Mark> {
    let token = token.trim();
    if token.is_empty() || token == "-" {
        return Ok(Mark::Blank);
    }
    if DONT_KNOW_TOKENS.contains(&token.to_lowercase().as_str()) {
        return Ok(Mark::DontKnow);
    }

    let mut chars = token.chars();
    let tag = (chars.next(), chars.next(), chars.next());
    let (Some('('), Some(letter), Some(')')) = tag else {
        bail!("unrecognized answer token {token:?}");
    };
    let letter = letter.to_ascii_lowercase();
    if !letter.is_ascii_lowercase() {
        bail!("unrecognized answer tag in {token:?}");
    }
    let choice = (letter as usize) - ('a' as usize);
    if choice >= num_choices {
        bail!("answer ({letter}) is out of range for {num_choices} choice(s)");
    }
    Ok(Mark::Choice(choice))
}

/// Parse one full response row into a [`Submission`], one cell per
/// question in presentation order.
pub fn parse_row(cells: &[String], num_choices: usize) -> Result<Submission> {
    let marks = cells
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            parse_mark(cell, num_choices).with_context(|| format!("question {}", i + 1))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Submission::new(marks))
}
