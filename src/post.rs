//! Post-processing of simulated heads: the arrays the tutorial maps and
//! sections, exported as CSV for external plotting.

use std::io::{self, Write};

use faer_core::Mat;

use crate::{
    array::{plane_values, LayeredArray},
    grid::{linspace, CellId, Discretization},
    packages::Chd,
};

/// Active-cell map: `1` for cells solved by the engine, `-1` for
/// constant-head cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IBound {
    shape: (usize, usize, usize),
    values: Vec<i32>,
}

impl IBound {
    pub fn from_chd<'a>(grid: &Discretization, chd: impl IntoIterator<Item = &'a Chd>) -> Self {
        let mut ibound = Self {
            shape: grid.shape(),
            values: vec![1; grid.cell_count()],
        };
        for cell in chd.into_iter().flat_map(Chd::cells) {
            if grid.contains(cell) {
                let index = ibound.index(cell);
                ibound.values[index] = -1;
            }
        }
        ibound
    }

    fn index(&self, cell: CellId) -> usize {
        let (_, nrow, ncol) = self.shape;
        (cell.layer * nrow + cell.row) * ncol + cell.col
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        self.shape
    }

    pub fn get(&self, cell: CellId) -> i32 {
        self.values[self.index(cell)]
    }

    pub fn count(&self, value: i32) -> usize {
        self.values.iter().filter(|&&v| v == value).count()
    }
}

/// Node coordinates of a plan view: `x` west to east, `y` north to south.
pub fn coordinates(grid: &Discretization) -> (Vec<f64>, Vec<f64>) {
    let x = linspace(0.0, (grid.ncol() - 1) as f64 * grid.delr(), grid.ncol());
    let mut y = linspace(0.0, (grid.nrow() - 1) as f64 * grid.delc(), grid.nrow());
    y.reverse();
    (x, y)
}

/// Values from `lo` in steps of `step`, stopping before `hi`.
pub fn contour_levels(lo: f64, hi: f64, step: f64) -> Vec<f64> {
    if step <= 0.0 || hi <= lo {
        return Vec::new();
    }
    let n = ((hi - lo) / step).ceil() as usize;
    (0..n).map(|i| lo + step * i as f64).collect()
}

pub fn layer(array: &LayeredArray, k: usize) -> Mat<f64> {
    array.layer(k).clone()
}

/// Vertical section along `row`: one line per layer, one column per grid
/// column.
pub fn cross_section(array: &LayeredArray, row: usize) -> Mat<f64> {
    let (nlay, _, ncol) = array.shape();
    Mat::from_fn(nlay, ncol, |k, j| array.get(CellId::new(k, row, j)))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerSummary {
    pub layer: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

pub fn summarize(array: &LayeredArray) -> Vec<LayerSummary> {
    array
        .layers()
        .enumerate()
        .map(|(layer, plane)| {
            let (mut min, mut max, mut sum, mut n) = (f64::INFINITY, f64::NEG_INFINITY, 0.0, 0);
            for v in plane_values(plane) {
                min = min.min(v);
                max = max.max(v);
                sum += v;
                n += 1;
            }
            LayerSummary {
                layer,
                min,
                max,
                mean: if n > 0 { sum / n as f64 } else { f64::NAN },
            }
        })
        .collect()
}

/// Writes a plane as a CSV table: a header of `x` values, then one line per
/// row starting with its `y` value.
pub fn write_plane_csv(
    plane: &Mat<f64>,
    x: &[f64],
    y: &[f64],
    output: &mut impl Write,
) -> io::Result<()> {
    if x.len() != plane.ncols() || y.len() != plane.nrows() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "coordinates do not match the plane",
        ));
    }
    writeln!(output, "y\\x,{}", join(x.iter().copied()))?;
    for (i, yi) in y.iter().enumerate() {
        writeln!(
            output,
            "{},{}",
            yi,
            join((0..plane.ncols()).map(|j| plane[(i, j)]))
        )?;
    }
    Ok(())
}

/// Writes `x,y,qx,qy` lines for a discharge vector plot.
pub fn write_vectors_csv(
    qx: &Mat<f64>,
    qy: &Mat<f64>,
    x: &[f64],
    y: &[f64],
    output: &mut impl Write,
) -> io::Result<()> {
    if qx.nrows() != qy.nrows() || qx.ncols() != qy.ncols() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "discharge components differ in shape",
        ));
    }
    writeln!(output, "x,y,qx,qy")?;
    for (i, yi) in y.iter().enumerate().take(qx.nrows()) {
        for (j, xj) in x.iter().enumerate().take(qx.ncols()) {
            writeln!(output, "{},{},{},{}", xj, yi, qx[(i, j)], qy[(i, j)])?;
        }
    }
    Ok(())
}

fn join(values: impl Iterator<Item = f64>) -> String {
    values.map(|v| v.to_string()).collect::<Vec<_>>().join(",")
}
