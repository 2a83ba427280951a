mod cgls;

pub use cgls::{Cgls, CglsConfig, CglsState, CglsSummary};
