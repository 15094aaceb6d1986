use std::{
    fmt,
    io::{self, Write},
};

use crate::deck::DeckWriter;

use super::Package;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Head,
    Budget,
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputKind::Head => "HEAD",
            OutputKind::Budget => "BUDGET",
        })
    }
}

/// Time steps of a stress period at which output is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frequency {
    All,
    First,
    Last,
    /// Every n-th step.
    Frequency(usize),
    /// Explicit one-based step numbers.
    Steps(Vec<usize>),
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::All => f.write_str("ALL"),
            Frequency::First => f.write_str("FIRST"),
            Frequency::Last => f.write_str("LAST"),
            Frequency::Frequency(n) => write!(f, "FREQUENCY {n}"),
            Frequency::Steps(steps) => {
                f.write_str("STEPS")?;
                for s in steps {
                    write!(f, " {s}")?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRecord {
    pub kind: OutputKind,
    pub frequency: Frequency,
}

impl OutputRecord {
    pub fn new(kind: OutputKind, frequency: Frequency) -> Self {
        Self { kind, frequency }
    }
}

/// Output control: which fields are saved to binary files or printed to the
/// listing file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Oc {
    pub head_file: Option<String>,
    pub budget_file: Option<String>,
    pub save: Vec<OutputRecord>,
    pub print: Vec<OutputRecord>,
}

impl Oc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_head_file(mut self, file: impl AsRef<str>) -> Self {
        self.head_file = Some(file.as_ref().to_string());
        self
    }

    pub fn with_budget_file(mut self, file: impl AsRef<str>) -> Self {
        self.budget_file = Some(file.as_ref().to_string());
        self
    }

    pub fn save(mut self, kind: OutputKind, frequency: Frequency) -> Self {
        self.save.push(OutputRecord::new(kind, frequency));
        self
    }

    pub fn print(mut self, kind: OutputKind, frequency: Frequency) -> Self {
        self.print.push(OutputRecord::new(kind, frequency));
        self
    }
}

impl Package for Oc {
    fn ftype(&self) -> &'static str {
        "OC6"
    }

    fn extension(&self) -> &'static str {
        "oc"
    }

    fn package_name(&self) -> &str {
        "oc"
    }

    fn write_to(&self, output: &mut dyn Write) -> io::Result<()> {
        let mut deck = DeckWriter::new(output);
        deck.block("options", |d| {
            if let Some(file) = &self.budget_file {
                d.entry("BUDGET  FILEOUT", file)?;
            }
            if let Some(file) = &self.head_file {
                d.entry("HEAD  FILEOUT", file)?;
            }
            Ok(())
        })?;
        if !self.save.is_empty() || !self.print.is_empty() {
            deck.numbered_block("period", 1, |d| {
                for r in &self.save {
                    d.line(&[&"SAVE", &r.kind, &r.frequency])?;
                }
                for r in &self.print {
                    d.line(&[&"PRINT", &r.kind, &r.frequency])?;
                }
                Ok(())
            })?;
        }
        deck.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tutorial_output_control() {
        let oc = Oc::new()
            .with_head_file("model.hds")
            .with_budget_file("model.cbb")
            .save(OutputKind::Head, Frequency::All)
            .save(OutputKind::Budget, Frequency::All)
            .print(OutputKind::Head, Frequency::Last);
        let text = oc.to_deck_string().unwrap();

        assert!(text.contains("  HEAD  FILEOUT  model.hds\n"));
        assert!(text.contains("  BUDGET  FILEOUT  model.cbb\n"));
        assert!(text.contains("  SAVE HEAD ALL\n"));
        assert!(text.contains("  SAVE BUDGET ALL\n"));
        assert!(text.contains("  PRINT HEAD LAST\n"));
    }

    #[test]
    fn frequency_keywords() {
        assert_eq!(Frequency::Frequency(3).to_string(), "FREQUENCY 3");
        assert_eq!(Frequency::Steps(vec![1, 4]).to_string(), "STEPS 1 4");
    }
}
