use std::{
    fmt,
    io::{self, Write},
};

use serde::{Deserialize, Serialize};

use crate::deck::{real, DeckWriter};

use super::Package;

/// Preset of the engine's iterative solver settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    #[default]
    Simple,
    Moderate,
    Complex,
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Complexity::Simple => "simple",
            Complexity::Moderate => "moderate",
            Complexity::Complex => "complex",
        })
    }
}

/// Iterative model solution settings. Unset fields keep the preset's value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Ims {
    pub complexity: Complexity,
    pub outer_maximum: Option<usize>,
    pub outer_dvclose: Option<f64>,
    pub inner_maximum: Option<usize>,
    pub inner_dvclose: Option<f64>,
}

impl Ims {
    pub fn new(complexity: Complexity) -> Self {
        Self {
            complexity,
            ..Default::default()
        }
    }

    pub fn with_outer(mut self, maximum: usize, dvclose: f64) -> Self {
        self.outer_maximum = Some(maximum);
        self.outer_dvclose = Some(dvclose);
        self
    }

    pub fn with_inner(mut self, maximum: usize, dvclose: f64) -> Self {
        self.inner_maximum = Some(maximum);
        self.inner_dvclose = Some(dvclose);
        self
    }
}

impl Package for Ims {
    fn ftype(&self) -> &'static str {
        "IMS6"
    }

    fn extension(&self) -> &'static str {
        "ims"
    }

    fn package_name(&self) -> &str {
        "ims"
    }

    fn write_to(&self, output: &mut dyn Write) -> io::Result<()> {
        let mut deck = DeckWriter::new(output);
        deck.block("options", |d| d.entry("COMPLEXITY", self.complexity))?;

        if self.outer_maximum.is_some() || self.outer_dvclose.is_some() {
            deck.block("nonlinear", |d| {
                if let Some(v) = self.outer_dvclose {
                    d.entry("OUTER_DVCLOSE", real(v))?;
                }
                if let Some(v) = self.outer_maximum {
                    d.entry("OUTER_MAXIMUM", v)?;
                }
                Ok(())
            })?;
        }

        if self.inner_maximum.is_some() || self.inner_dvclose.is_some() {
            deck.block("linear", |d| {
                if let Some(v) = self.inner_maximum {
                    d.entry("INNER_MAXIMUM", v)?;
                }
                if let Some(v) = self.inner_dvclose {
                    d.entry("INNER_DVCLOSE", real(v))?;
                }
                Ok(())
            })?;
        }

        deck.flush()
    }
}
