//! Core math modules.

pub mod bernoulli;
pub mod cauchy;
pub mod normal;
pub mod stable;
