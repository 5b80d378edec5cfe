mod estimate;
mod gaussian;
mod mixture;
mod svg;

pub use estimate::{ProfileFit, estimate_profiles, indicator_matrix};
pub use gaussian::GaussianMixture;
pub use mixture::{Covariance, FittedMixture, MixtureModel};
