#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use fusion_algebra as algebra;

#[doc(inline)]
pub use fusion_optim as optim;
