use std::{
    fmt,
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use tracing::{debug, info};

use crate::{
    deck::DeckWriter,
    model::GwfModel,
    packages::{Ims, Package, Tdis},
};

pub const SIMULATION_NAMEFILE: &str = "mfsim.nam";

/// Everything the engine needs to run: timing, solver, one flow model, and
/// where to put the deck.
#[derive(Debug, Clone, PartialEq)]
pub struct Simulation {
    pub(crate) name: String,
    pub(crate) workspace: PathBuf,
    pub(crate) exe: PathBuf,
    pub(crate) version: String,
    pub(crate) tdis: Tdis,
    pub(crate) ims: Ims,
    pub(crate) model: GwfModel,
}

impl Simulation {
    pub fn new(name: impl AsRef<str>, model: GwfModel) -> Self {
        Self {
            name: name.as_ref().to_string(),
            workspace: PathBuf::from("."),
            exe: PathBuf::from("mf6"),
            version: "mf6".to_string(),
            tdis: Tdis::default(),
            ims: Ims::default(),
            model,
        }
    }

    pub fn with_workspace(mut self, workspace: impl AsRef<Path>) -> Self {
        self.workspace = workspace.as_ref().to_path_buf();
        self
    }

    pub fn with_exe(mut self, exe: impl AsRef<Path>) -> Self {
        self.exe = exe.as_ref().to_path_buf();
        self
    }

    pub fn with_tdis(mut self, tdis: Tdis) -> Self {
        self.tdis = tdis;
        self
    }

    pub fn with_ims(mut self, ims: Ims) -> Self {
        self.ims = ims;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    pub fn exe(&self) -> &Path {
        &self.exe
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn tdis(&self) -> &Tdis {
        &self.tdis
    }

    pub fn ims(&self) -> &Ims {
        &self.ims
    }

    pub fn model(&self) -> &GwfModel {
        &self.model
    }

    pub fn tdis_file(&self) -> String {
        format!("{}.{}", self.name, self.tdis.extension())
    }

    pub fn ims_file(&self) -> String {
        format!("{}.{}", self.name, self.ims.extension())
    }

    /// Path of a file inside the workspace.
    pub fn path(&self, file: impl AsRef<Path>) -> PathBuf {
        self.workspace.join(file)
    }

    pub fn head_file(&self) -> Option<PathBuf> {
        let oc = self.model.oc()?;
        oc.head_file.as_ref().map(|f| self.path(f))
    }

    pub fn budget_file(&self) -> Option<PathBuf> {
        let oc = self.model.oc()?;
        oc.budget_file.as_ref().map(|f| self.path(f))
    }

    pub fn write_namefile(&self, output: &mut dyn Write) -> io::Result<()> {
        let model = &self.model;
        let mut deck = DeckWriter::new(output);
        deck.block("options", |_| Ok(()))?;
        deck.block("timing", |d| d.entry(self.tdis.ftype(), self.tdis_file()))?;
        deck.block("models", |d| {
            d.line(&[&"gwf6", &model.namefile(), &model.name()])
        })?;
        deck.block("exchanges", |_| Ok(()))?;
        deck.numbered_block("solutiongroup", 1, |d| {
            d.line(&[&self.ims.ftype(), &self.ims_file(), &model.name()])
        })?;
        deck.flush()
    }

    /// Writes the whole input deck into the workspace, creating it when
    /// missing, and returns the written paths.
    pub fn write(&self) -> io::Result<Vec<PathBuf>> {
        info!(
            "writing simulation `{}` to {}",
            self.name,
            self.workspace.display()
        );
        fs::create_dir_all(&self.workspace)?;

        let mut written = Vec::new();
        self.emit(&mut written, SIMULATION_NAMEFILE, |o| self.write_namefile(o))?;
        self.emit(&mut written, &self.tdis_file(), |o| self.tdis.write_to(o))?;
        self.emit(&mut written, &self.ims_file(), |o| self.ims.write_to(o))?;
        self.emit(&mut written, &self.model.namefile(), |o| {
            self.model.write_namefile(o)
        })?;
        for (file, package) in self.model.packages() {
            self.emit(&mut written, &file, |o| package.write_to(o))?;
        }

        info!("wrote {} input files", written.len());
        Ok(written)
    }
}

impl Simulation {
    fn emit(
        &self,
        written: &mut Vec<PathBuf>,
        file: &str,
        write: impl FnOnce(&mut dyn Write) -> io::Result<()>,
    ) -> io::Result<()> {
        let path = self.path(file);
        let mut output = BufWriter::new(File::create(&path)?);
        write(&mut output)?;
        output.flush()?;
        debug!("wrote {}", path.display());
        written.push(path);
        Ok(())
    }
}

impl fmt::Display for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let chd_cells: usize = self.model.chd().iter().map(|c| c.len()).sum();
        write!(
            f,
            "simulation `{}`:\n\t- grid: {}\n\t- {} stress period(s), {} {}\n\t- solver: {}\n\t- {} constant-head cell(s)",
            self.name,
            self.model.grid(),
            self.tdis.nper(),
            self.tdis.total_time(),
            self.tdis.time_units,
            self.ims.complexity,
            chd_cells,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Discretization;

    #[test]
    fn namefile_lists_timing_model_and_solution() {
        let grid = Discretization::uniform_layers(1, 3, 2.0, 1.0).unwrap();
        let sim = Simulation::new("demo", GwfModel::new("demo", grid));

        let mut buffer = Vec::new();
        sim.write_namefile(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert!(text.contains("  TDIS6  demo.tdis\n"));
        assert!(text.contains("  gwf6 demo.nam demo\n"));
        assert!(text.contains("BEGIN solutiongroup  1\n  IMS6 demo.ims demo\n"));
    }
}
