use std::io::{self, Write};

use crate::{
    deck::{real, DeckWriter},
    grid::Discretization,
};

use super::Package;

/// Structured-grid discretization package.
#[derive(Debug, Clone, PartialEq)]
pub struct Dis {
    grid: Discretization,
}

impl Dis {
    pub fn new(grid: Discretization) -> Self {
        Self { grid }
    }

    pub fn grid(&self) -> &Discretization {
        &self.grid
    }
}

impl Package for Dis {
    fn ftype(&self) -> &'static str {
        "DIS6"
    }

    fn extension(&self) -> &'static str {
        "dis"
    }

    fn package_name(&self) -> &str {
        "dis"
    }

    fn write_to(&self, output: &mut dyn Write) -> io::Result<()> {
        let g = &self.grid;
        let mut deck = DeckWriter::new(output);
        deck.block("options", |_| Ok(()))?;
        deck.block("dimensions", |d| {
            d.entry("NLAY", g.nlay())?;
            d.entry("NROW", g.nrow())?;
            d.entry("NCOL", g.ncol())
        })?;
        deck.block("griddata", |d| {
            d.keyword("delr")?;
            d.entry("  CONSTANT", real(g.delr()))?;
            d.keyword("delc")?;
            d.entry("  CONSTANT", real(g.delc()))?;
            d.keyword("top")?;
            d.entry("  CONSTANT", real(g.top()))?;
            d.entry("botm", "LAYERED")?;
            for &bottom in g.botm() {
                d.entry("  CONSTANT", real(bottom))?;
            }
            Ok(())
        })?;
        deck.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_and_layer_bottoms() {
        let grid = Discretization::uniform_layers(2, 5, 8.0, 10.0).unwrap();
        let text = Dis::new(grid).to_deck_string().unwrap();

        assert!(text.contains("NLAY  2\n"));
        assert!(text.contains("NROW  5\n"));
        assert!(text.contains("NCOL  5\n"));
        assert!(text.contains("CONSTANT  2e0"));
        assert!(text.contains("CONSTANT  -5e0"));
        assert!(text.contains("CONSTANT  -1e1"));
    }
}
