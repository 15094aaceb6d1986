use std::fmt;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShapeError {
    #[error("expected shape {expected:?}, got {found:?}")]
    Mismatch {
        expected: (usize, usize, usize),
        found: (usize, usize, usize),
    },
    #[error("cell {cell} lies outside a {shape:?} grid")]
    OutOfGrid {
        cell: CellId,
        shape: (usize, usize, usize),
    },
    #[error("expected {expected} layer bottoms, got {found}")]
    Bottoms { expected: usize, found: usize },
    #[error("layer planes do not share the same size")]
    Ragged,
    #[error("grid must have at least one cell in every direction")]
    Empty,
}

/// Zero-based `(layer, row, column)` index of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId {
    pub layer: usize,
    pub row: usize,
    pub col: usize,
}

impl CellId {
    pub const fn new(layer: usize, row: usize, col: usize) -> Self {
        Self { layer, row, col }
    }
}

// displayed one-based, as the engine reads it
impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.layer + 1, self.row + 1, self.col + 1)
    }
}

// `n` evenly spaced values from `a` to `b`, both included
pub fn linspace(a: f64, b: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![a],
        _ => {
            let h = (b - a) / (n - 1) as f64;
            (0..n).map(|i| a + h * i as f64).collect()
        }
    }
}

/// Structured grid: `nlay` layers of `nrow × ncol` cells with uniform spacing.
#[derive(Debug, Clone, PartialEq)]
pub struct Discretization {
    nlay: usize,
    nrow: usize,
    ncol: usize,
    delr: f64,
    delc: f64,
    top: f64,
    botm: Vec<f64>,
}

impl Discretization {
    pub fn new(
        nlay: usize,
        nrow: usize,
        ncol: usize,
        delr: f64,
        delc: f64,
        top: f64,
        botm: Vec<f64>,
    ) -> Result<Self, ShapeError> {
        if nlay == 0 || nrow == 0 || ncol == 0 {
            return Err(ShapeError::Empty);
        }
        if botm.len() != nlay {
            return Err(ShapeError::Bottoms {
                expected: nlay,
                found: botm.len(),
            });
        }
        Ok(Self {
            nlay,
            nrow,
            ncol,
            delr,
            delc,
            top,
            botm,
        })
    }

    /// Square grid of `n × n` nodes spanning `length`, split into `nlay`
    /// layers of equal thickness below a zero-elevation top.
    pub fn uniform_layers(
        nlay: usize,
        n: usize,
        length: f64,
        thickness: f64,
    ) -> Result<Self, ShapeError> {
        if n < 2 {
            return Err(ShapeError::Empty);
        }
        let spacing = length / (n - 1) as f64;
        let botm = linspace(-thickness / nlay as f64, -thickness, nlay);
        Self::new(nlay, n, n, spacing, spacing, 0.0, botm)
    }

    pub fn nlay(&self) -> usize {
        self.nlay
    }

    pub fn nrow(&self) -> usize {
        self.nrow
    }

    pub fn ncol(&self) -> usize {
        self.ncol
    }

    pub fn delr(&self) -> f64 {
        self.delr
    }

    pub fn delc(&self) -> f64 {
        self.delc
    }

    pub fn top(&self) -> f64 {
        self.top
    }

    pub fn botm(&self) -> &[f64] {
        &self.botm
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        (self.nlay, self.nrow, self.ncol)
    }

    pub fn cell_count(&self) -> usize {
        self.nlay * self.nrow * self.ncol
    }

    pub fn contains(&self, cell: CellId) -> bool {
        cell.layer < self.nlay && cell.row < self.nrow && cell.col < self.ncol
    }

    pub fn check(&self, cell: CellId) -> Result<(), ShapeError> {
        if self.contains(cell) {
            Ok(())
        } else {
            Err(ShapeError::OutOfGrid {
                cell,
                shape: self.shape(),
            })
        }
    }

    /// One-based node number used by the engine's list output.
    pub fn node(&self, cell: CellId) -> usize {
        (cell.layer * self.nrow + cell.row) * self.ncol + cell.col + 1
    }

    pub fn cell(&self, node: usize) -> Option<CellId> {
        if node == 0 || node > self.cell_count() {
            return None;
        }
        let n = node - 1;
        let per_layer = self.nrow * self.ncol;
        Some(CellId::new(
            n / per_layer,
            (n % per_layer) / self.ncol,
            n % self.ncol,
        ))
    }

    // cell centres along a row, west to east
    pub fn x_centers(&self) -> Vec<f64> {
        (0..self.ncol)
            .map(|j| (j as f64 + 0.5) * self.delr)
            .collect()
    }

    // cell centres along a column, north to south
    pub fn y_centers(&self) -> Vec<f64> {
        let extent = self.nrow as f64 * self.delc;
        (0..self.nrow)
            .map(|i| extent - (i as f64 + 0.5) * self.delc)
            .collect()
    }

    pub fn layer_midpoints(&self) -> Vec<f64> {
        let mut upper = self.top;
        self.botm
            .iter()
            .map(|&bottom| {
                let mid = 0.5 * (upper + bottom);
                upper = bottom;
                mid
            })
            .collect()
    }
}

impl fmt::Display for Discretization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} layers × {} rows × {} columns, Δr={:e}, Δc={:e}, top={:e}",
            self.nlay, self.nrow, self.ncol, self.delr, self.delc, self.top
        )
    }
}
