use std::io::{self, Write};

use crate::{array::LayeredArray, deck::DeckWriter};

use super::Package;

/// Node property flow: cell type and hydraulic conductivity.
#[derive(Debug, Clone, PartialEq)]
pub struct Npf {
    /// `0` confined, `1` convertible (saturated thickness varies with head).
    pub icelltype: i32,
    pub k: LayeredArray,
    pub save_flows: bool,
    pub save_specific_discharge: bool,
}

impl Npf {
    pub fn new(icelltype: i32, k: LayeredArray) -> Self {
        Self {
            icelltype,
            k,
            save_flows: false,
            save_specific_discharge: false,
        }
    }

    pub fn save_flows(mut self, enabled: bool) -> Self {
        self.save_flows = enabled;
        self
    }

    pub fn save_specific_discharge(mut self, enabled: bool) -> Self {
        self.save_specific_discharge = enabled;
        self
    }
}

impl Package for Npf {
    fn ftype(&self) -> &'static str {
        "NPF6"
    }

    fn extension(&self) -> &'static str {
        "npf"
    }

    fn package_name(&self) -> &str {
        "npf"
    }

    fn write_to(&self, output: &mut dyn Write) -> io::Result<()> {
        let mut deck = DeckWriter::new(output);
        deck.block("options", |d| {
            d.flag("SAVE_FLOWS", self.save_flows)?;
            d.flag("SAVE_SPECIFIC_DISCHARGE", self.save_specific_discharge)
        })?;
        deck.block("griddata", |d| {
            d.keyword("icelltype")?;
            d.entry("  CONSTANT", self.icelltype)?;
            self.k.write_to("k", d)
        })?;
        deck.flush()
    }
}
