use std::{
    fmt,
    io::{self, Write},
};

use serde::{Deserialize, Serialize};

use crate::deck::{real, DeckWriter};

use super::Package;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnits {
    Unknown,
    Seconds,
    Minutes,
    Hours,
    #[default]
    Days,
    Years,
}

impl fmt::Display for TimeUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TimeUnits::Unknown => "unknown",
            TimeUnits::Seconds => "seconds",
            TimeUnits::Minutes => "minutes",
            TimeUnits::Hours => "hours",
            TimeUnits::Days => "days",
            TimeUnits::Years => "years",
        })
    }
}

/// Length, number of time steps and step multiplier of one stress period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StressPeriod {
    pub perlen: f64,
    pub nstp: usize,
    pub tsmult: f64,
}

impl StressPeriod {
    pub fn new(perlen: f64, nstp: usize, tsmult: f64) -> Self {
        Self {
            perlen,
            nstp,
            tsmult,
        }
    }
}

impl Default for StressPeriod {
    fn default() -> Self {
        Self::new(1.0, 1, 1.0)
    }
}

/// Time discretization of the whole simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct Tdis {
    pub time_units: TimeUnits,
    pub periods: Vec<StressPeriod>,
}

impl Tdis {
    pub fn new(time_units: TimeUnits, periods: Vec<StressPeriod>) -> Self {
        Self {
            time_units,
            periods,
        }
    }

    pub fn nper(&self) -> usize {
        self.periods.len()
    }

    pub fn total_time(&self) -> f64 {
        self.periods.iter().map(|p| p.perlen).sum()
    }
}

impl Default for Tdis {
    fn default() -> Self {
        Self::new(TimeUnits::Days, vec![StressPeriod::default()])
    }
}

impl Package for Tdis {
    fn ftype(&self) -> &'static str {
        "TDIS6"
    }

    fn extension(&self) -> &'static str {
        "tdis"
    }

    fn package_name(&self) -> &str {
        "tdis"
    }

    fn write_to(&self, output: &mut dyn Write) -> io::Result<()> {
        let mut deck = DeckWriter::new(output);
        deck.block("options", |d| d.entry("TIME_UNITS", self.time_units))?;
        deck.block("dimensions", |d| d.entry("NPER", self.nper()))?;
        deck.block("perioddata", |d| {
            for p in &self.periods {
                d.line(&[&real(p.perlen), &p.nstp, &real(p.tsmult)])?;
            }
            Ok(())
        })?;
        deck.flush()
    }
}
