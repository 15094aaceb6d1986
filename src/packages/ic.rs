use std::io::{self, Write};

use crate::{array::LayeredArray, deck::DeckWriter};

use super::Package;

/// Starting heads.
#[derive(Debug, Clone, PartialEq)]
pub struct Ic {
    pub strt: LayeredArray,
}

impl Ic {
    pub fn new(strt: LayeredArray) -> Self {
        Self { strt }
    }
}

impl Package for Ic {
    fn ftype(&self) -> &'static str {
        "IC6"
    }

    fn extension(&self) -> &'static str {
        "ic"
    }

    fn package_name(&self) -> &str {
        "ic"
    }

    fn write_to(&self, output: &mut dyn Write) -> io::Result<()> {
        let mut deck = DeckWriter::new(output);
        deck.block("options", |_| Ok(()))?;
        deck.block("griddata", |d| self.strt.write_to("strt", d))?;
        deck.flush()
    }
}
