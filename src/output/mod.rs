//! Readers for the engine's double-precision binary output.
//!
//! Both files are sequences of records with a small header followed by a
//! payload, all in native byte order without record markers.

use bytemuck::Pod;
use thiserror::Error;

pub mod budget;
pub mod heads;

pub use budget::{BudgetData, BudgetEntry, BudgetFile, BudgetRecord};
pub use heads::{HeadFile, HeadRecord};

pub(crate) const TEXT_LEN: usize = 16;

#[derive(Error, Debug)]
pub enum ReadError {
    #[error("input error")]
    Io(#[from] std::io::Error),
    #[error("record truncated at byte {offset}: {needed} more byte(s) expected")]
    Truncated { offset: usize, needed: usize },
    #[error("invalid record header at byte {offset}: {reason}")]
    InvalidHeader { offset: usize, reason: String },
    #[error("unsupported budget storage method {imeth} in record `{text}`")]
    UnsupportedMethod { imeth: i32, text: String },
    #[error("no `{text}` record for time step {kstp}, stress period {kper}")]
    MissingRecord {
        text: String,
        kstp: usize,
        kper: usize,
    },
    #[error("no record at time {0}")]
    MissingTime(f64),
    #[error("record `{text}` has no auxiliary column `{column}`")]
    MissingColumn { text: String, column: String },
    #[error(transparent)]
    Shape(#[from] crate::grid::ShapeError),
}

/// Forward-only cursor over a byte buffer.
pub(crate) struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], ReadError> {
        let available = self.bytes.len() - self.pos;
        if n > available {
            return Err(ReadError::Truncated {
                offset: self.pos,
                needed: n - available,
            });
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read<T: Pod>(&mut self) -> Result<T, ReadError> {
        let bytes = self.take(std::mem::size_of::<T>())?;
        Ok(bytemuck::pod_read_unaligned(bytes))
    }

    pub(crate) fn i32(&mut self) -> Result<i32, ReadError> {
        self.read()
    }

    pub(crate) fn f64(&mut self) -> Result<f64, ReadError> {
        self.read()
    }

    /// Non-negative integer field, checked against `what`.
    pub(crate) fn count(&mut self, what: &str) -> Result<usize, ReadError> {
        let offset = self.pos;
        let value = self.i32()?;
        usize::try_from(value).map_err(|_| ReadError::InvalidHeader {
            offset,
            reason: format!("negative {what} ({value})"),
        })
    }

    pub(crate) fn text(&mut self) -> Result<String, ReadError> {
        let bytes = self.take(TEXT_LEN)?;
        Ok(String::from_utf8_lossy(bytes).trim().to_string())
    }

    pub(crate) fn f64s(&mut self, n: usize) -> Result<Vec<f64>, ReadError> {
        let offset = self.pos;
        let len = n.checked_mul(8).ok_or_else(|| ReadError::InvalidHeader {
            offset,
            reason: format!("array of {n} values is too large"),
        })?;
        let bytes = self.take(len)?;
        Ok(bytes
            .chunks_exact(8)
            .map(bytemuck::pod_read_unaligned::<f64>)
            .collect())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Byte-level builders for synthetic output files.

    use bytemuck::bytes_of;

    #[derive(Default)]
    pub struct Bytes(pub Vec<u8>);

    impl Bytes {
        pub fn i32(&mut self, v: i32) -> &mut Self {
            self.0.extend_from_slice(bytes_of(&v));
            self
        }

        pub fn f64(&mut self, v: f64) -> &mut Self {
            self.0.extend_from_slice(bytes_of(&v));
            self
        }

        pub fn f64s(&mut self, values: &[f64]) -> &mut Self {
            self.0.extend_from_slice(bytemuck::cast_slice(values));
            self
        }

        pub fn text(&mut self, s: &str) -> &mut Self {
            self.0.extend_from_slice(format!("{s:>16}").as_bytes());
            self
        }
    }
}
