//! Noise kernels written once against [`coherent_core::Lanes`]

pub mod hash;
pub mod simplex;

pub use simplex::{simplex, simplex_smooth};
