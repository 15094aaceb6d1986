use std::{
    fmt::Display,
    io::{self, Write},
};

/// Formats a real number the way the engine's free-format reader expects it.
pub fn real(value: f64) -> String {
    format!("{value:e}")
}

/// Thin wrapper emitting `BEGIN <block>` / `END <block>` sections.
pub struct DeckWriter<W> {
    output: W,
}

impl<W: Write> DeckWriter<W> {
    pub fn new(output: W) -> Self {
        Self { output }
    }

    pub fn block(
        &mut self,
        name: &str,
        body: impl FnOnce(&mut Self) -> io::Result<()>,
    ) -> io::Result<()> {
        writeln!(self.output, "BEGIN {name}")?;
        body(self)?;
        writeln!(self.output, "END {name}")?;
        writeln!(self.output)
    }

    /// Numbered block, e.g. `BEGIN period 1`.
    pub fn numbered_block(
        &mut self,
        name: &str,
        number: usize,
        body: impl FnOnce(&mut Self) -> io::Result<()>,
    ) -> io::Result<()> {
        writeln!(self.output, "BEGIN {name}  {number}")?;
        body(self)?;
        writeln!(self.output, "END {name}  {number}")?;
        writeln!(self.output)
    }

    pub fn keyword(&mut self, keyword: &str) -> io::Result<()> {
        writeln!(self.output, "  {keyword}")
    }

    pub fn flag(&mut self, keyword: &str, enabled: bool) -> io::Result<()> {
        if enabled {
            self.keyword(keyword)?;
        }
        Ok(())
    }

    pub fn entry(&mut self, keyword: &str, value: impl Display) -> io::Result<()> {
        writeln!(self.output, "  {keyword}  {value}")
    }

    pub fn line(&mut self, fields: &[&dyn Display]) -> io::Result<()> {
        write!(self.output, " ")?;
        for field in fields {
            write!(self.output, " {field}")?;
        }
        writeln!(self.output)
    }

    /// Row of reals on its own line, indented under an array keyword.
    pub fn reals(&mut self, values: impl IntoIterator<Item = f64>) -> io::Result<()> {
        write!(self.output, "     ")?;
        for v in values {
            write!(self.output, " {}", real(v))?;
        }
        writeln!(self.output)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.output.flush()
    }

    pub fn into_inner(self) -> W {
        self.output
    }
}
