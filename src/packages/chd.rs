use std::io::{self, Write};

use crate::{
    deck::{real, DeckWriter},
    grid::{CellId, Discretization, ShapeError},
};

use super::Package;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantHeadRecord {
    pub cell: CellId,
    pub head: f64,
}

impl ConstantHeadRecord {
    pub fn new(cell: CellId, head: f64) -> Self {
        Self { cell, head }
    }
}

/// Constant-head boundary package holding a single stress period of records.
#[derive(Debug, Clone, PartialEq)]
pub struct Chd {
    name: String,
    records: Vec<ConstantHeadRecord>,
    maxbound: Option<usize>,
    pub save_flows: bool,
}

impl Chd {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: name.as_ref().to_string(),
            records: Vec::new(),
            maxbound: None,
            save_flows: false,
        }
    }

    pub fn with_record(mut self, cell: CellId, head: f64) -> Self {
        self.push(cell, head);
        self
    }

    pub fn with_maxbound(mut self, maxbound: usize) -> Self {
        self.maxbound = Some(maxbound);
        self
    }

    pub fn save_flows(mut self, enabled: bool) -> Self {
        self.save_flows = enabled;
        self
    }

    pub fn push(&mut self, cell: CellId, head: f64) {
        self.records.push(ConstantHeadRecord::new(cell, head));
    }

    /// Appends one record per cell on the four lateral faces of every layer.
    /// Index `i` contributes the first and last column of row `i` and, when
    /// `i` is an inner column, the first and last row of column `i`, so
    /// corners appear once.
    pub fn push_lateral_faces(&mut self, grid: &Discretization, head: f64) {
        let (nlay, nrow, ncol) = grid.shape();
        for layer in 0..nlay {
            for i in 0..nrow.max(ncol) {
                if i < nrow {
                    self.push(CellId::new(layer, i, 0), head);
                    if ncol > 1 {
                        self.push(CellId::new(layer, i, ncol - 1), head);
                    }
                }
                if i != 0 && i + 1 < ncol {
                    self.push(CellId::new(layer, 0, i), head);
                    if nrow > 1 {
                        self.push(CellId::new(layer, nrow - 1, i), head);
                    }
                }
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn records(&self) -> &[ConstantHeadRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn maxbound(&self) -> usize {
        self.maxbound.unwrap_or(self.records.len())
    }

    pub fn cells(&self) -> impl Iterator<Item = CellId> + '_ {
        self.records.iter().map(|r| r.cell)
    }

    pub fn check(&self, grid: &Discretization) -> Result<(), ShapeError> {
        self.cells().try_for_each(|cell| grid.check(cell))
    }
}

impl Package for Chd {
    fn ftype(&self) -> &'static str {
        "CHD6"
    }

    fn extension(&self) -> &'static str {
        "chd"
    }

    fn package_name(&self) -> &str {
        &self.name
    }

    fn write_to(&self, output: &mut dyn Write) -> io::Result<()> {
        let mut deck = DeckWriter::new(output);
        deck.block("options", |d| d.flag("SAVE_FLOWS", self.save_flows))?;
        deck.block("dimensions", |d| d.entry("MAXBOUND", self.maxbound()))?;
        deck.numbered_block("period", 1, |d| {
            for r in &self.records {
                d.line(&[&r.cell, &real(r.head)])?;
            }
            Ok(())
        })?;
        deck.flush()
    }
}
