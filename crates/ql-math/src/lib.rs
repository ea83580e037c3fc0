//! Stable scalar math for the hierarchical bandit learning model.

pub mod math;

pub use math::bernoulli::*;
pub use math::cauchy::*;
pub use math::normal::*;
pub use math::stable::*;
