use std::{fs, path::PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    array::LayeredArray,
    grid::{CellId, Discretization, ShapeError},
    model::GwfModel,
    packages::{
        Chd, Complexity, Frequency, Ic, Ims, Npf, Oc, OutputKind, StressPeriod, Tdis, TimeUnits,
    },
    sim::Simulation,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file `{path}`")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse TOML config")]
    Parse(#[from] toml::de::Error),
    #[error("invalid parameter: {0}")]
    Invalid(String),
    #[error(transparent)]
    Shape(#[from] ShapeError),
}

/// Hydraulic conductivity of one layer replacing the default value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerOverride {
    pub layer: usize,
    pub value: f64,
}

/// Parameters of the tutorial model: a square multi-layer aquifer held at
/// `h1` on its lateral faces and drawn down to `h2` in two interior cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TutorialParams {
    pub name: String,
    pub exe: PathBuf,
    pub workspace: PathBuf,
    /// Head on the lateral faces, also the starting head.
    pub h1: f64,
    /// Head of the first interior cell; the second sits 5 below it.
    pub h2: f64,
    pub nlay: usize,
    /// Nodes per side.
    pub n: usize,
    /// Side length of the domain.
    pub length: f64,
    /// Aquifer thickness below the zero-elevation top.
    pub thickness: f64,
    pub k: f64,
    pub k_override: Option<LayerOverride>,
    pub time_units: TimeUnits,
    pub complexity: Complexity,
}

impl Default for TutorialParams {
    fn default() -> Self {
        Self {
            name: "ejercicio1".to_string(),
            exe: PathBuf::from("mf6"),
            workspace: PathBuf::from("Workspace"),
            h1: 100.0,
            h2: 90.0,
            nlay: 10,
            n: 101,
            length: 400.0,
            thickness: 50.0,
            k: 1.0,
            k_override: Some(LayerOverride {
                layer: 1,
                value: 0.5,
            }),
            time_units: TimeUnits::Days,
            complexity: Complexity::Simple,
        }
    }
}

impl TutorialParams {
    /// Loads parameters from a TOML file; missing keys keep their defaults.
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let params: Self = toml::from_str(content)?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Invalid("name must not be empty".into()));
        }
        // the second interior cell sits in layer 1
        if self.nlay < 2 {
            return Err(ConfigError::Invalid(format!(
                "nlay must be at least 2, got {}",
                self.nlay
            )));
        }
        // below 5 an interior cell lands on a lateral face
        if self.n < 5 {
            return Err(ConfigError::Invalid(format!(
                "n must be at least 5, got {}",
                self.n
            )));
        }
        if self.length <= 0.0 || self.thickness <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "length and thickness must be positive (length={}, thickness={})",
                self.length, self.thickness
            )));
        }
        if self.k <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "k must be positive, got {}",
                self.k
            )));
        }
        if let Some(o) = self.k_override {
            if o.layer >= self.nlay || o.value <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "k override must target one of {} layers with a positive value, got layer {} = {}",
                    self.nlay, o.layer, o.value
                )));
            }
        }
        Ok(())
    }

    pub fn head_file(&self) -> String {
        format!("{}.hds", self.name)
    }

    pub fn budget_file(&self) -> String {
        format!("{}.cbb", self.name)
    }

    pub fn grid(&self) -> Result<Discretization, ShapeError> {
        Discretization::uniform_layers(self.nlay, self.n, self.length, self.thickness)
    }

    pub fn starting_heads(&self) -> LayeredArray {
        LayeredArray::constant(self.nlay, self.n, self.n, self.h1)
    }

    pub fn conductivity(&self) -> Result<LayeredArray, ShapeError> {
        let mut k = LayeredArray::constant(self.nlay, self.n, self.n, self.k);
        if let Some(o) = self.k_override {
            k.set_layer(o.layer, o.value)?;
        }
        Ok(k)
    }

    /// Two interior cells, then every lateral-face cell of every layer.
    pub fn constant_heads(&self, grid: &Discretization) -> Chd {
        let n = self.n;
        let mut chd = Chd::new("chd_0")
            .with_record(CellId::new(0, n / 4, n / 4), self.h2)
            .with_record(CellId::new(1, 3 * n / 4, 3 * n / 4), self.h2 - 5.0)
            .save_flows(true);
        chd.push_lateral_faces(grid, self.h1);
        chd
    }

    pub fn output_control(&self) -> Oc {
        Oc::new()
            .with_head_file(self.head_file())
            .with_budget_file(self.budget_file())
            .save(OutputKind::Head, Frequency::All)
            .save(OutputKind::Budget, Frequency::All)
            .print(OutputKind::Head, Frequency::Last)
    }

    /// Assembles the whole simulation from the parameters.
    pub fn build_simulation(&self) -> Result<Simulation, ConfigError> {
        self.validate()?;
        let grid = self.grid()?;

        let npf = Npf::new(1, self.conductivity()?)
            .save_flows(true)
            .save_specific_discharge(true);
        let chd = self.constant_heads(&grid);

        let model = GwfModel::new(&self.name, grid)
            .with_ic(Ic::new(self.starting_heads()))?
            .with_npf(npf)?
            .with_chd(chd)?
            .with_oc(self.output_control());

        Ok(Simulation::new(&self.name, model)
            .with_exe(&self.exe)
            .with_workspace(&self.workspace)
            .with_tdis(Tdis::new(self.time_units, vec![StressPeriod::new(1.0, 1, 1.0)]))
            .with_ims(Ims::new(self.complexity)))
    }
}
