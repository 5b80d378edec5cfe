#![doc = "MCH policy profiles: latent profile analysis of U.S. state maternal and child health policies"]
mod common;
pub mod config;
mod error;
pub mod map;
pub mod outcome;
pub mod pipeline;
pub mod profile;
pub mod report;
pub mod table;

#[doc(inline)]
pub use error::PipelineError;

#[doc(inline)]
pub use config::{AnalysisConfig, ConditionedSummary, MapConfig, ProfileConfig, ReportConfig, ShadeRange};

#[doc(inline)]
pub use table::PolicyTable;

#[doc(inline)]
pub use map::{Relocation, StatePolygons, relocate};

#[doc(inline)]
pub use profile::{Covariance, FittedMixture, GaussianMixture, MixtureModel, ProfileFit, estimate_profiles};

#[doc(inline)]
pub use pipeline::{RunSummary, run};
