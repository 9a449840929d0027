//! Binary field reader for Gab files.
//!
//! The producing tool writes with Java's `DataOutput` conventions: all
//! integers big-endian, strings length-prefixed in modified UTF-8. This
//! reader decodes those primitives from any byte source while tracking the
//! current offset, so every failure can name the exact position.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{GabError, Result};

/// Modified UTF-8 encodes U+0000 as this two-byte sequence. It must never
/// occur in a Gab string.
const MUTF8_NULL: [u8; 2] = [0xC0, 0x80];

/// Offset-tracking reader over a finite byte source.
///
/// The source is acquired on construction and released by [`close`] or on
/// drop. Any read after `close` is a contract violation reported as
/// [`GabError::ResourceMisuse`], never a panic.
///
/// [`close`]: GabReader::close
pub struct GabReader<R> {
    path: String,
    source: Option<R>,
    offset: u64,
}

impl GabReader<BufReader<File>> {
    /// Open a Gab file for reading.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| GabError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::from_source(
            BufReader::new(file),
            path.display().to_string(),
        ))
    }
}

impl<R: Read> GabReader<R> {
    /// Wrap an arbitrary byte source. `label` stands in for the file path
    /// in error messages.
    pub fn from_source(source: R, label: impl Into<String>) -> Self {
        Self {
            path: label.into(),
            source: Some(source),
            offset: 0,
        }
    }

    /// The path (or label) this reader reports in errors.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Current byte offset from the start of the source.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn is_open(&self) -> bool {
        self.source.is_some()
    }

    /// Release the underlying source. Reads after this fail with
    /// `ResourceMisuse`.
    pub fn close(&mut self) {
        self.source = None;
    }

    pub(crate) fn invalid(&self, reason: impl Into<String>) -> GabError {
        GabError::InvalidDocument {
            path: self.path.clone(),
            offset: self.offset,
            reason: reason.into(),
        }
    }

    pub(crate) fn unsupported(&self, reason: impl Into<String>) -> GabError {
        GabError::UnsupportedFormat {
            path: self.path.clone(),
            offset: self.offset,
            reason: reason.into(),
        }
    }

    fn fill(&mut self, buf: &mut [u8]) -> Result<()> {
        let Some(source) = self.source.as_mut() else {
            return Err(GabError::ResourceMisuse(format!(
                "'{}' is not open",
                self.path
            )));
        };
        let result = source.read_exact(buf);
        match result {
            Ok(()) => {
                self.offset += buf.len() as u64;
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                Err(self.invalid("unexpected end of file"))
            }
            Err(source) => Err(GabError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Read a big-endian `u16`.
    pub fn read_u16(&mut self) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.fill(&mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    /// Read a big-endian two's-complement `i32`.
    pub fn read_i32(&mut self) -> Result<i32> {
        let mut buf = [0u8; 4];
        self.fill(&mut buf)?;
        Ok(i32::from_be_bytes(buf))
    }

    /// Read a big-endian `u32`.
    pub fn read_u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.fill(&mut buf)?;
        Ok(u32::from_be_bytes(buf))
    }

    /// Read a 4-byte boolean that must be exactly 0 or 1.
    ///
    /// The producing system accepts any nonzero value as true; this reader
    /// is stricter on purpose and rejects everything else as an invalid
    /// document.
    pub fn read_bool32(&mut self) -> Result<bool> {
        match self.read_u32()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(self.invalid(format!("value '{other}' should be a bool (0 or 1)"))),
        }
    }

    /// Read a length-prefixed modified-UTF-8 string.
    ///
    /// Simplified decoding: ordinary text is identical in modified UTF-8
    /// and UTF-8, so the bytes are decoded as UTF-8. The two-byte encoding
    /// of U+0000 is rejected explicitly, and anything that is not valid
    /// UTF-8 (such as surrogate pairs for code points outside the BMP)
    /// fails rather than being approximated.
    pub fn read_mutf8(&mut self) -> Result<String> {
        let len = usize::from(self.read_u16()?);
        let mut buf = vec![0u8; len];
        self.fill(&mut buf)?;
        if buf.windows(2).any(|w| w == MUTF8_NULL) {
            return Err(self.invalid("unicode decode error: encoded U+0000 found"));
        }
        String::from_utf8(buf).map_err(|e| self.invalid(format!("unicode decode error: {e}")))
    }

    /// Strict end-of-stream check: any remaining byte is an error.
    pub fn expect_eof(&mut self) -> Result<()> {
        let Some(source) = self.source.as_mut() else {
            return Err(GabError::ResourceMisuse(format!(
                "'{}' is not open",
                self.path
            )));
        };
        let mut byte = [0u8; 1];
        let read = source.read(&mut byte).map_err(|source| GabError::Io {
            path: self.path.clone(),
            source,
        })?;
        if read > 0 {
            return Err(self.invalid("unknown trailing data at end of file"));
        }
        Ok(())
    }
}
