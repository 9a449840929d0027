//! Streaming Gab document decoder.
//!
//! Strictly sequential state machine over the byte stream: magic, format
//! tag, header, `num_tests` tests, then a hard end-of-file check. Every
//! structural violation rejects the whole document; there is no recovery
//! and no backtracking.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{GabError, Result};
use crate::key::AnswerKey;
use crate::model::{
    Gab, GabHeader, McItem, McTest, Student, FORMAT_NAME, LEGACY_SEPARATOR, MAGIC_CURRENT,
    MAGIC_LEGACY,
};
use crate::perm::read_permutation;
use crate::reader::GabReader;

impl Gab {
    /// Decode a whole `.gab` file.
    pub fn from_file(path: &Path) -> Result<Self> {
        GabDecoder::open(path)?.decode()
    }
}

/// Step-wise decoder. [`decode`] drives the whole state machine; the
/// individual steps are public so callers (and tests) can stop midway.
///
/// [`decode`]: GabDecoder::decode
pub struct GabDecoder<R> {
    reader: GabReader<R>,
    header: Option<GabHeader>,
}

impl GabDecoder<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(GabReader::open(path)?))
    }
}

impl<R: Read> GabDecoder<R> {
    pub fn new(reader: GabReader<R>) -> Self {
        Self {
            reader,
            header: None,
        }
    }

    /// Run the full decode: magic, format tag, header, tests, strict EOF.
    pub fn decode(mut self) -> Result<Gab> {
        self.read_magic()?;
        let format = self.read_format()?;
        let header = self.read_header()?;
        tracing::debug!(
            format,
            num_tests = header.num_tests,
            num_items = header.num_items,
            max_num_answers = header.max_num_answers,
            dont_know_included = header.dont_know_included,
            path = self.reader.path(),
            "decoding Gab document"
        );

        // Classification happens as the tests stream by: named tests must
        // all come first and carry the same number of roster fields.
        let mut named_tests: Vec<McTest> = Vec::new();
        let mut unnamed_tests: Vec<McTest> = Vec::new();
        let mut named_field_count: Option<usize> = None;
        for _ in 0..header.num_tests {
            let test = self.read_test()?;
            match &test.student {
                Some(student) => {
                    if !unnamed_tests.is_empty() {
                        return Err(self.reader.invalid(format!(
                            "named test after unnamed test: {:?}",
                            student.name
                        )));
                    }
                    match named_field_count {
                        None => named_field_count = Some(student.fields.len()),
                        Some(n) if student.fields.len() != n => {
                            return Err(self.reader.invalid(format!(
                                "test for {:?} carries {} roster field(s), expected {n}",
                                student.name,
                                student.fields.len()
                            )));
                        }
                        Some(_) => {}
                    }
                    named_tests.push(test);
                }
                None => unnamed_tests.push(test),
            }
        }

        self.reader.expect_eof()?;
        self.reader.close();

        let keys = (0..header.num_items)
            .map(|_| AnswerKey::canonical(header.max_num_answers))
            .collect();

        tracing::info!(
            named = named_tests.len(),
            unnamed = unnamed_tests.len(),
            "decoded Gab document"
        );

        Ok(Gab {
            header,
            named_tests,
            unnamed_tests,
            keys,
        })
    }

    /// Check the 4-byte magic. The legacy value fails fast as unsupported;
    /// anything unrecognized is not a Gab file at all.
    pub fn read_magic(&mut self) -> Result<()> {
        match self.reader.read_u32()? {
            MAGIC_LEGACY => Err(self
                .reader
                .unsupported("legacy 'Gab_old' format is not supported")),
            MAGIC_CURRENT => Ok(()),
            _ => Err(self.reader.invalid("not a Gab answer-key file")),
        }
    }

    /// Read the format tag, which must equal the single recognized literal.
    pub fn read_format(&mut self) -> Result<String> {
        let format = self.reader.read_mutf8()?;
        if format != FORMAT_NAME {
            return Err(self
                .reader
                .unsupported(format!("format not recognized: '{format}'")));
        }
        Ok(format)
    }

    /// Read the header counts. May be called exactly once per document; a
    /// second call is a contract violation.
    pub fn read_header(&mut self) -> Result<GabHeader> {
        if self.header.is_some() {
            return Err(GabError::ResourceMisuse(
                "header has already been read".to_string(),
            ));
        }
        let num_tests = self.read_positive("num_tests")?;
        let num_items = self.read_positive("num_items")?;
        let max_num_answers = self.read_positive("max_num_answers")?;
        let dont_know_included = self.reader.read_bool32()?;
        let header = GabHeader {
            num_tests,
            num_items,
            max_num_answers,
            dont_know_included,
        };
        self.header = Some(header);
        Ok(header)
    }

    fn read_positive(&mut self, what: &str) -> Result<usize> {
        let value = self.reader.read_i32()?;
        if value <= 0 {
            return Err(self
                .reader
                .invalid(format!("{what} = {value} should be positive")));
        }
        Ok(value as usize)
    }

    fn header(&self) -> Result<GabHeader> {
        self.header.ok_or_else(|| {
            GabError::ResourceMisuse("header has not been read yet".to_string())
        })
    }

    /// Decode one test: question order, student block, then one item per
    /// question-order entry, in that order.
    pub fn read_test(&mut self) -> Result<McTest> {
        let header = self.header()?;
        let perm = read_permutation(&mut self.reader)?;
        let student = self.read_student()?;
        let mut items = Vec::with_capacity(perm.len());
        for &orig in perm.iter() {
            let item = self.read_item(&header)?;
            if item.num_orig != orig {
                return Err(self.reader.invalid(format!(
                    "question order {perm} disagrees with num_orig = {} of the item for \
                     original question {orig}",
                    item.num_orig
                )));
            }
            items.push(item);
        }
        Ok(McTest {
            perm,
            student,
            items,
        })
    }

    fn read_student(&mut self) -> Result<Option<Student>> {
        let raw = self.reader.read_mutf8()?;
        if raw.contains(LEGACY_SEPARATOR) {
            return Err(self
                .reader
                .unsupported("legacy student-data separator is not supported"));
        }
        if raw.is_empty() {
            return Err(self.reader.invalid("student data is an empty string"));
        }
        let fields: Vec<&str> = raw.split(',').collect();
        if fields[0].trim().is_empty() {
            // Anonymous copy for students outside the roster. Nothing else
            // may be filled in.
            if fields.iter().skip(1).any(|f| !f.trim().is_empty()) {
                return Err(self
                    .reader
                    .invalid(format!("invalid field for an unnamed test: {raw:?}")));
            }
            return Ok(None);
        }
        let mut fields: Vec<String> = fields.iter().map(|f| f.trim().to_string()).collect();
        if fields.iter().any(String::is_empty) {
            return Err(self
                .reader
                .invalid(format!("blank roster field in student data: {raw:?}")));
        }
        let name = fields.remove(0);
        Ok(Some(Student { name, fields }))
    }

    /// Decode one item and enforce its cross-checks: the answer permutation
    /// length, the field ranges, `right_orig == 0`, `perm[right] ==
    /// right_orig`, and the XOR checksum.
    fn read_item(&mut self, header: &GabHeader) -> Result<McItem> {
        let perm = read_permutation(&mut self.reader)?;
        if perm.len() != header.num_choices() {
            return Err(self.reader.invalid(format!(
                "answer permutation {perm} should have {} - {} entries",
                header.max_num_answers,
                u8::from(header.dont_know_included)
            )));
        }

        let right = self.reader.read_i32()?;
        if right < 0 || right as usize >= perm.len() {
            return Err(self.reader.invalid(format!(
                "right answer {right} is not in 0..{}",
                perm.len()
            )));
        }

        let num_answers = self.reader.read_i32()?;
        if num_answers < 0 || num_answers as usize != header.max_num_answers {
            return Err(self.reader.invalid(format!(
                "number of answers {num_answers} should be {}",
                header.max_num_answers
            )));
        }

        let num_orig = self.reader.read_i32()?;
        if num_orig < 0 || num_orig as usize >= header.num_items {
            return Err(self.reader.invalid(format!(
                "original item number {num_orig} is not in 0..{}",
                header.num_items
            )));
        }

        let right_orig = self.reader.read_i32()?;
        if right_orig < 0 || right_orig as usize >= perm.len() {
            return Err(self.reader.invalid(format!(
                "original right answer {right_orig} is not in 0..{}",
                perm.len()
            )));
        }
        if right_orig != 0 {
            return Err(self
                .reader
                .invalid("the original right answer should come first"));
        }
        if perm[right as usize] != right_orig as usize {
            return Err(self.reader.invalid(format!(
                "right answer perm[{right}] = {} should be {right_orig}",
                perm[right as usize]
            )));
        }

        let checksum = self.reader.read_i32()?;
        if checksum != right ^ num_answers ^ num_orig ^ right_orig {
            return Err(self.reader.invalid(format!(
                "item failed its checksum: {right},{num_answers},{num_orig},{right_orig},{checksum}"
            )));
        }

        Ok(McItem {
            right: right as usize,
            num_answers: num_answers as usize,
            perm,
            num_orig: num_orig as usize,
            right_orig: right_orig as usize,
        })
    }
}
