use std::{fs, path::Path};

use tracing::{info, warn};

use crate::{array::LayeredArray, grid::Discretization};

use super::{Cursor, ReadError};

pub const SPECIFIC_DISCHARGE: &str = "DATA-SPDIS";

/// Flow between `node` and `node2` (one-based) with auxiliary values.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetEntry {
    pub node: usize,
    pub node2: usize,
    pub q: f64,
    pub aux: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BudgetData {
    /// One value per cell or connection.
    Array(Vec<f64>),
    List {
        aux_names: Vec<String>,
        entries: Vec<BudgetEntry>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct BudgetRecord {
    pub kstp: usize,
    pub kper: usize,
    pub text: String,
    pub dims: (usize, usize, usize),
    pub imeth: i32,
    pub delt: f64,
    pub pertim: f64,
    pub totim: f64,
    /// Model and package names identifying both sides of list records.
    pub ids: Vec<String>,
    pub data: BudgetData,
}

impl BudgetRecord {
    fn read(cursor: &mut Cursor) -> Result<Self, ReadError> {
        let kstp = cursor.count("time step")?;
        let kper = cursor.count("stress period")?;
        let text = cursor.text()?;
        let offset = cursor.position();
        let ndim1 = cursor.count("first dimension")?;
        let ndim2 = cursor.count("second dimension")?;
        let ndim3 = cursor.i32()?;
        let dims = (ndim1, ndim2, ndim3.unsigned_abs() as usize);
        let size = dims
            .0
            .checked_mul(dims.1)
            .and_then(|s| s.checked_mul(dims.2))
            .ok_or_else(|| ReadError::InvalidHeader {
                offset,
                reason: format!("dimensions {dims:?} overflow"),
            })?;

        // full layout: no method header, the array follows
        if ndim3 > 0 {
            return Ok(Self {
                kstp,
                kper,
                text,
                dims,
                imeth: 0,
                delt: 0.0,
                pertim: 0.0,
                totim: 0.0,
                ids: Vec::new(),
                data: BudgetData::Array(cursor.f64s(size)?),
            });
        }

        let imeth = cursor.i32()?;
        let delt = cursor.f64()?;
        let pertim = cursor.f64()?;
        let totim = cursor.f64()?;

        let (ids, data) = match imeth {
            0 | 1 => (Vec::new(), BudgetData::Array(cursor.f64s(size)?)),
            6 => {
                let ids = (0..4).map(|_| cursor.text()).collect::<Result<Vec<_>, _>>()?;
                let ndat = cursor.count("data column count")?;
                let aux_names = (1..ndat)
                    .map(|_| cursor.text())
                    .collect::<Result<Vec<_>, _>>()?;
                let nlist = cursor.count("list length")?;
                // nlist is untrusted; entries grow only as bytes are read
                let mut entries = Vec::new();
                for _ in 0..nlist {
                    let node = cursor.count("node")?;
                    let node2 = cursor.count("node")?;
                    let q = cursor.f64()?;
                    let aux = cursor.f64s(aux_names.len())?;
                    entries.push(BudgetEntry {
                        node,
                        node2,
                        q,
                        aux,
                    });
                }
                (ids, BudgetData::List { aux_names, entries })
            }
            imeth => return Err(ReadError::UnsupportedMethod { imeth, text }),
        };

        Ok(Self {
            kstp,
            kper,
            text,
            dims,
            imeth,
            delt,
            pertim,
            totim,
            ids,
            data,
        })
    }

    pub fn kstpkper(&self) -> (usize, usize) {
        (self.kstp.saturating_sub(1), self.kper.saturating_sub(1))
    }

    pub fn is(&self, text: &str) -> bool {
        self.text.eq_ignore_ascii_case(text.trim())
    }
}

/// Cell-by-cell budget output, loaded whole.
#[derive(Debug, Clone)]
pub struct BudgetFile {
    records: Vec<BudgetRecord>,
}

impl BudgetFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ReadError> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let file = Self::from_bytes(&bytes)?;
        info!(
            "read {} budget record(s) from {}",
            file.records.len(),
            path.display()
        );
        Ok(file)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ReadError> {
        let mut cursor = Cursor::new(bytes);
        let mut records = Vec::new();
        while !cursor.is_empty() {
            let offset = cursor.position();
            let record = BudgetRecord::read(&mut cursor).map_err(|e| {
                warn!("budget record at byte {offset} could not be read");
                e
            })?;
            records.push(record);
        }
        Ok(Self { records })
    }

    pub fn records(&self) -> &[BudgetRecord] {
        &self.records
    }

    /// Distinct record names in file order.
    pub fn record_names(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for r in &self.records {
            if !out.contains(&r.text.as_str()) {
                out.push(&r.text);
            }
        }
        out
    }

    pub fn kstpkper(&self) -> Vec<(usize, usize)> {
        let mut out: Vec<(usize, usize)> = Vec::new();
        for r in &self.records {
            if !out.contains(&r.kstpkper()) {
                out.push(r.kstpkper());
            }
        }
        out
    }

    /// Every record named `text` at a zero-based `(time step, stress period)`.
    pub fn get_data(
        &self,
        text: &str,
        kstpkper: (usize, usize),
    ) -> Result<Vec<&BudgetRecord>, ReadError> {
        let found: Vec<_> = self
            .records
            .iter()
            .filter(|r| r.is(text) && r.kstpkper() == kstpkper)
            .collect();
        if found.is_empty() {
            return Err(ReadError::MissingRecord {
                text: text.to_string(),
                kstp: kstpkper.0,
                kper: kstpkper.1,
            });
        }
        Ok(found)
    }

    /// Cell-centred specific discharge `(qx, qy, qz)` on `grid`. Cells without
    /// an entry hold NaN.
    pub fn specific_discharge(
        &self,
        grid: &Discretization,
        kstpkper: (usize, usize),
    ) -> Result<(LayeredArray, LayeredArray, LayeredArray), ReadError> {
        let record = self.get_data(SPECIFIC_DISCHARGE, kstpkper)?[0];
        let (aux_names, entries) = match &record.data {
            BudgetData::List { aux_names, entries } => (aux_names, entries),
            BudgetData::Array(_) => {
                return Err(ReadError::UnsupportedMethod {
                    imeth: record.imeth,
                    text: record.text.clone(),
                })
            }
        };

        let column = |name: &str| {
            aux_names
                .iter()
                .position(|a| a.eq_ignore_ascii_case(name))
                .ok_or_else(|| ReadError::MissingColumn {
                    text: record.text.clone(),
                    column: name.to_string(),
                })
        };
        let (ix, iy, iz) = (column("qx")?, column("qy")?, column("qz")?);

        let (nlay, nrow, ncol) = grid.shape();
        let mut qx = LayeredArray::constant(nlay, nrow, ncol, f64::NAN);
        let mut qy = qx.clone();
        let mut qz = qx.clone();
        for e in entries {
            let Some(cell) = grid.cell(e.node) else {
                return Err(crate::grid::ShapeError::OutOfGrid {
                    cell: crate::grid::CellId::new(e.node, 0, 0),
                    shape: grid.shape(),
                }
                .into());
            };
            qx.set(cell, e.aux[ix]);
            qy.set(cell, e.aux[iy]);
            qz.set(cell, e.aux[iz]);
        }
        Ok((qx, qy, qz))
    }
}
