//! gabarito-core — Gab answer-key decoding, key store, and grading engine.
//!
//! This crate decodes the big-endian `.gab` binary documents produced by the
//! exam-generation tool (per-student question/answer permutations plus the
//! canonical key), applies addendum corrections to the answer keys, and
//! grades raw student marks with a penalty-for-guessing formula.

pub mod decoder;
pub mod error;
pub mod grade;
pub mod key;
pub mod model;
pub mod perm;
pub mod reader;
