//! Self-describing permutation codec.
//!
//! Gab stores a permutation as 1+N integers: first the count N, then the
//! values of `0..N` in the shuffled order. The same encoding carries both
//! the per-test question order and the per-item answer order.

use std::fmt;
use std::io::Read;
use std::ops::Index;

use crate::error::Result;
use crate::reader::GabReader;

/// An ordered sequence of N integers that is a bijection on `[0, N)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation(Vec<usize>);

impl Permutation {
    /// Validate that `values` is a bijection on `[0, len)`.
    pub fn new(values: Vec<usize>) -> std::result::Result<Self, String> {
        let n = values.len();
        if n == 0 {
            return Err("a permutation cannot be empty".to_string());
        }
        let mut seen = vec![false; n];
        for (i, &v) in values.iter().enumerate() {
            if v >= n {
                return Err(format!(
                    "element {i} of a permutation of {n} element(s) cannot be {v}"
                ));
            }
            if seen[v] {
                return Err(format!("{} is not a permutation", Permutation(values.clone())));
            }
            seen[v] = true;
        }
        Ok(Self(values))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, usize> {
        self.0.iter()
    }
}

impl Index<usize> for Permutation {
    type Output = usize;

    fn index(&self, index: usize) -> &usize {
        &self.0[index]
    }
}

impl fmt::Display for Permutation {
    /// Dash-separated values, the form used in reports and error messages.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for v in &self.0 {
            if !first {
                write!(f, "-")?;
            }
            write!(f, "{v}")?;
            first = false;
        }
        Ok(())
    }
}

/// Read one length-prefixed permutation from the stream.
///
/// The count must be a positive integer, every element must lie in
/// `[0, N)`, and each value must occur exactly once; anything else rejects
/// the document.
pub fn read_permutation<R: Read>(reader: &mut GabReader<R>) -> Result<Permutation> {
    let n = reader.read_i32()?;
    if n <= 0 {
        return Err(reader.invalid(format!(
            "`{n}' is not a valid size for a permutation"
        )));
    }
    let n = n as usize;
    let mut values = Vec::with_capacity(n);
    for i in 0..n {
        let el = reader.read_i32()?;
        if el < 0 || el as usize >= n {
            return Err(reader.invalid(format!(
                "element {i} of a permutation of {n} element(s) cannot be {el}"
            )));
        }
        values.push(el as usize);
    }
    Permutation::new(values).map_err(|reason| reader.invalid(reason))
}
