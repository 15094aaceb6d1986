use std::io::{self, Write};

use faer_core::Mat;

use crate::{
    deck::DeckWriter,
    grid::{CellId, ShapeError},
};

/// Three dimensional cell array stored as one `nrow × ncol` plane per layer.
#[derive(Clone, Debug)]
pub struct LayeredArray {
    layers: Vec<Mat<f64>>,
}

impl LayeredArray {
    pub fn constant(nlay: usize, nrow: usize, ncol: usize, value: f64) -> Self {
        Self {
            layers: (0..nlay)
                .map(|_| Mat::from_fn(nrow, ncol, |_, _| value))
                .collect(),
        }
    }

    pub fn from_layers(layers: Vec<Mat<f64>>) -> Result<Self, ShapeError> {
        if let Some(first) = layers.first() {
            let (nrow, ncol) = (first.nrows(), first.ncols());
            if layers
                .iter()
                .any(|m| m.nrows() != nrow || m.ncols() != ncol)
            {
                return Err(ShapeError::Ragged);
            }
        }
        Ok(Self { layers })
    }

    // `values` laid out layer by layer, row-major within a layer
    pub fn from_flat(
        (nlay, nrow, ncol): (usize, usize, usize),
        values: &[f64],
    ) -> Result<Self, ShapeError> {
        if values.len() != nlay * nrow * ncol {
            return Err(ShapeError::Mismatch {
                expected: (nlay, nrow, ncol),
                found: (values.len(), 1, 1),
            });
        }
        let per_layer = nrow * ncol;
        Ok(Self {
            layers: values
                .chunks(per_layer.max(1))
                .take(nlay)
                .map(|plane| Mat::from_fn(nrow, ncol, |i, j| plane[i * ncol + j]))
                .collect(),
        })
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        match self.layers.first() {
            Some(first) => (self.layers.len(), first.nrows(), first.ncols()),
            None => (0, 0, 0),
        }
    }

    pub fn check_shape(&self, expected: (usize, usize, usize)) -> Result<(), ShapeError> {
        let found = self.shape();
        if found == expected {
            Ok(())
        } else {
            Err(ShapeError::Mismatch { expected, found })
        }
    }

    pub fn nlay(&self) -> usize {
        self.layers.len()
    }

    pub fn layer(&self, k: usize) -> &Mat<f64> {
        &self.layers[k]
    }

    pub fn layers(&self) -> impl Iterator<Item = &Mat<f64>> {
        self.layers.iter()
    }

    pub fn get(&self, cell: CellId) -> f64 {
        self.layers[cell.layer][(cell.row, cell.col)]
    }

    pub fn set(&mut self, cell: CellId, value: f64) {
        self.layers[cell.layer][(cell.row, cell.col)] = value;
    }

    /// Overwrites every cell of layer `k` with `value`.
    pub fn set_layer(&mut self, k: usize, value: f64) -> Result<(), ShapeError> {
        let (nlay, nrow, ncol) = self.shape();
        if k >= nlay {
            return Err(ShapeError::OutOfGrid {
                cell: CellId::new(k, 0, 0),
                shape: (nlay, nrow, ncol),
            });
        }
        self.layers[k] = Mat::from_fn(nrow, ncol, |_, _| value);
        Ok(())
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.layers.iter().flat_map(plane_values)
    }

    /// `Some(v)` when every cell of layer `k` holds `v`.
    pub fn layer_constant(&self, k: usize) -> Option<f64> {
        let mut values = plane_values(&self.layers[k]);
        let first = values.next()?;
        values.all(|v| v == first).then_some(first)
    }

    pub fn is_uniform(&self) -> bool {
        let mut values = self.values();
        match values.next() {
            Some(first) => values.all(|v| v == first),
            None => true,
        }
    }

    pub fn min(&self) -> f64 {
        self.values().fold(f64::INFINITY, f64::min)
    }

    pub fn max(&self) -> f64 {
        self.values().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Writes `name LAYERED` followed by one control record per layer:
    /// `CONSTANT` for uniform layers, `INTERNAL` rows otherwise.
    pub fn write_to<W: Write>(&self, name: &str, deck: &mut DeckWriter<W>) -> io::Result<()> {
        deck.entry(name, "LAYERED")?;
        for (k, plane) in self.layers.iter().enumerate() {
            match self.layer_constant(k) {
                Some(v) => deck.entry("  CONSTANT", crate::deck::real(v))?,
                None => {
                    deck.entry("  INTERNAL", "FACTOR  1.0")?;
                    for i in 0..plane.nrows() {
                        deck.reals((0..plane.ncols()).map(|j| plane[(i, j)]))?;
                    }
                }
            }
        }
        Ok(())
    }
}

impl PartialEq for LayeredArray {
    fn eq(&self, other: &Self) -> bool {
        self.shape() == other.shape() && self.values().eq(other.values())
    }
}

// row-major walk over a plane
pub fn plane_values(plane: &Mat<f64>) -> impl Iterator<Item = f64> + '_ {
    (0..plane.nrows()).flat_map(move |i| (0..plane.ncols()).map(move |j| plane[(i, j)]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_with_overridden_layer() {
        let mut k = LayeredArray::constant(3, 4, 5, 1.0);
        k.set_layer(1, 0.5).unwrap();

        assert_eq!(k.shape(), (3, 4, 5));
        assert_eq!(k.layer_constant(0), Some(1.0));
        assert_eq!(k.layer_constant(1), Some(0.5));
        assert!(!k.is_uniform());
        assert_eq!(k.min(), 0.5);
        assert_eq!(k.max(), 1.0);
        assert!(k.set_layer(3, 2.0).is_err());
    }

    #[test]
    fn flat_layout_is_layer_then_row() {
        let values: Vec<f64> = (0..12).map(|v| v as f64).collect();
        let a = LayeredArray::from_flat((2, 2, 3), &values).unwrap();
        assert_eq!(a.get(CellId::new(0, 1, 0)), 3.0);
        assert_eq!(a.get(CellId::new(1, 0, 2)), 8.0);
        assert!(LayeredArray::from_flat((2, 2, 2), &values).is_err());
    }

    #[test]
    fn ragged_layers_are_rejected() {
        let layers = vec![Mat::<f64>::zeros(2, 2), Mat::<f64>::zeros(2, 3)];
        assert_eq!(
            LayeredArray::from_layers(layers).unwrap_err(),
            ShapeError::Ragged
        );
    }

    #[test]
    fn writes_constant_and_internal_layers() {
        let mut a = LayeredArray::constant(2, 1, 2, 1.0);
        a.set(CellId::new(1, 0, 1), 2.0);

        let mut deck = DeckWriter::new(Vec::new());
        a.write_to("k", &mut deck).unwrap();
        let text = String::from_utf8(deck.into_inner()).unwrap();

        let lines: Vec<_> = text.lines().map(str::trim).collect();
        assert_eq!(
            lines,
            [
                "k  LAYERED",
                "CONSTANT  1e0",
                "INTERNAL  FACTOR  1.0",
                "1e0 2e0",
            ]
        );
    }
}
