use std::{fs, path::Path};

use faer_core::Mat;
use tracing::info;

use crate::array::LayeredArray;

use super::{Cursor, ReadError};

/// One layer of simulated heads at one time step.
#[derive(Debug, Clone)]
pub struct HeadRecord {
    /// One-based time step and stress period, as stored.
    pub kstp: usize,
    pub kper: usize,
    pub pertim: f64,
    pub totim: f64,
    pub text: String,
    pub ilay: usize,
    pub data: Mat<f64>,
}

impl HeadRecord {
    fn read(cursor: &mut Cursor) -> Result<Self, ReadError> {
        let kstp = cursor.count("time step")?;
        let kper = cursor.count("stress period")?;
        let pertim = cursor.f64()?;
        let totim = cursor.f64()?;
        let text = cursor.text()?;
        let offset = cursor.position();
        let ncol = cursor.count("column count")?;
        let nrow = cursor.count("row count")?;
        let ilay = cursor.count("layer")?;
        let size = nrow
            .checked_mul(ncol)
            .ok_or_else(|| ReadError::InvalidHeader {
                offset,
                reason: format!("{nrow} × {ncol} layer overflows"),
            })?;
        let values = cursor.f64s(size)?;

        Ok(Self {
            kstp,
            kper,
            pertim,
            totim,
            text,
            ilay,
            data: Mat::from_fn(nrow, ncol, |i, j| values[i * ncol + j]),
        })
    }

    /// Zero-based `(time step, stress period)`.
    pub fn kstpkper(&self) -> (usize, usize) {
        (self.kstp.saturating_sub(1), self.kper.saturating_sub(1))
    }
}

/// Simulated head output, loaded whole.
#[derive(Debug, Clone)]
pub struct HeadFile {
    records: Vec<HeadRecord>,
}

impl HeadFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ReadError> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let file = Self::from_bytes(&bytes)?;
        info!(
            "read {} head record(s) from {}",
            file.records.len(),
            path.display()
        );
        Ok(file)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ReadError> {
        let mut cursor = Cursor::new(bytes);
        let mut records = Vec::new();
        while !cursor.is_empty() {
            records.push(HeadRecord::read(&mut cursor)?);
        }
        Ok(Self { records })
    }

    pub fn records(&self) -> &[HeadRecord] {
        &self.records
    }

    /// Distinct zero-based `(time step, stress period)` pairs in file order.
    pub fn kstpkper(&self) -> Vec<(usize, usize)> {
        let mut out: Vec<(usize, usize)> = Vec::new();
        for r in &self.records {
            if !out.contains(&r.kstpkper()) {
                out.push(r.kstpkper());
            }
        }
        out
    }

    pub fn times(&self) -> Vec<f64> {
        let mut out: Vec<f64> = Vec::new();
        for r in &self.records {
            if !out.contains(&r.totim) {
                out.push(r.totim);
            }
        }
        out
    }

    /// Heads of every layer at a zero-based `(time step, stress period)`.
    pub fn get_data(&self, kstpkper: (usize, usize)) -> Result<LayeredArray, ReadError> {
        self.collect(|r| r.kstpkper() == kstpkper)
            .ok_or(ReadError::MissingRecord {
                text: "HEAD".to_string(),
                kstp: kstpkper.0,
                kper: kstpkper.1,
            })?
    }

    pub fn get_data_at_time(&self, totim: f64) -> Result<LayeredArray, ReadError> {
        self.collect(|r| r.totim == totim)
            .ok_or(ReadError::MissingTime(totim))?
    }

    // heads of the last saved time
    pub fn last(&self) -> Result<LayeredArray, ReadError> {
        let kstpkper = self
            .records
            .last()
            .map(HeadRecord::kstpkper)
            .ok_or(ReadError::MissingRecord {
                text: "HEAD".to_string(),
                kstp: 0,
                kper: 0,
            })?;
        self.get_data(kstpkper)
    }

    fn collect(
        &self,
        select: impl Fn(&HeadRecord) -> bool,
    ) -> Option<Result<LayeredArray, ReadError>> {
        let mut selected: Vec<&HeadRecord> =
            self.records.iter().filter(|&r| select(r)).collect();
        if selected.is_empty() {
            return None;
        }
        selected.sort_by_key(|r| r.ilay);
        Some(
            LayeredArray::from_layers(selected.into_iter().map(|r| r.data.clone()).collect())
                .map_err(ReadError::from),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{grid::CellId, output::testing::Bytes};

    fn layer(b: &mut Bytes, kstp: i32, totim: f64, ilay: i32, values: &[f64]) {
        b.i32(kstp)
            .i32(1)
            .f64(totim)
            .f64(totim)
            .text("HEAD")
            .i32(3)
            .i32(2)
            .i32(ilay)
            .f64s(values);
    }

    fn two_steps() -> Vec<u8> {
        let mut b = Bytes::default();
        layer(&mut b, 1, 0.5, 1, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        layer(&mut b, 1, 0.5, 2, &[7.0; 6]);
        layer(&mut b, 2, 1.0, 1, &[10.0; 6]);
        layer(&mut b, 2, 1.0, 2, &[20.0; 6]);
        b.0
    }

    #[test]
    fn layers_are_assembled_per_time_step() {
        let hds = HeadFile::from_bytes(&two_steps()).unwrap();

        assert_eq!(hds.records().len(), 4);
        assert_eq!(hds.records()[0].text, "HEAD");
        assert_eq!(hds.kstpkper(), [(0, 0), (1, 0)]);
        assert_eq!(hds.times(), [0.5, 1.0]);

        let h = hds.get_data((0, 0)).unwrap();
        assert_eq!(h.shape(), (2, 2, 3));
        assert_eq!(h.get(CellId::new(0, 1, 0)), 4.0);
        assert_eq!(h.layer_constant(1), Some(7.0));

        let last = hds.last().unwrap();
        assert_eq!(last, hds.get_data_at_time(1.0).unwrap());
        assert_eq!(last.layer_constant(1), Some(20.0));
    }

    #[test]
    fn open_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demo.hds");
        std::fs::write(&path, two_steps()).unwrap();

        let hds = HeadFile::open(&path).unwrap();
        assert_eq!(hds.times(), [0.5, 1.0]);
        assert!(matches!(
            HeadFile::open(dir.path().join("missing.hds")),
            Err(ReadError::Io(_))
        ));
    }

    #[test]
    fn unknown_steps_and_truncation_are_errors() {
        let bytes = two_steps();
        let hds = HeadFile::from_bytes(&bytes).unwrap();
        assert!(matches!(
            hds.get_data((0, 3)),
            Err(ReadError::MissingRecord { kper: 3, .. })
        ));
        assert!(matches!(
            hds.get_data_at_time(2.0),
            Err(ReadError::MissingTime(_))
        ));

        assert!(matches!(
            HeadFile::from_bytes(&bytes[..bytes.len() - 4]),
            Err(ReadError::Truncated { needed: 4, .. })
        ));
    }
}
