//! Concrete nonlinear factors.

mod appearance;
mod between;

pub use appearance::{PatchSource, PpcaTrackingFactor, LATENT_DIM, POSE_DIM};
pub use between::BetweenFactor;
