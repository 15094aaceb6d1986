pub mod array;
pub mod config;
pub mod deck;
pub mod driver;
pub mod grid;
pub mod model;
pub mod output;
pub mod packages;
pub mod post;
pub mod sim;

pub use array::LayeredArray;
pub use config::{ConfigError, LayerOverride, TutorialParams};
pub use driver::{Driver, Echo, Logger, ObsCtx, Observer, RunError, RunReport};
pub use grid::{CellId, Discretization, ShapeError};
pub use model::GwfModel;
pub use output::{BudgetFile, HeadFile, ReadError};
pub use sim::Simulation;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error")]
    Config(#[from] ConfigError),
    #[error("output error")]
    Io(#[from] std::io::Error),
    #[error("run error")]
    Run(#[from] RunError),
    #[error("result error")]
    Read(#[from] ReadError),
}
