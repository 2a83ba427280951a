mod factor;
mod linearized;
mod operator;
mod values;

pub(crate) use factor::check_values;
pub use factor::{FactorError, FactorResult, NonlinearFactor, PriorFactor};
pub use linearized::LinearizedFactor;
pub use operator::{GaussianFactor, Matrix3Factor};
pub use values::{Assignment, Values, VariableId};
