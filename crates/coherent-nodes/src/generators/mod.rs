//! Built-in node types
//!
//! Each node type is a zero-sized family marker implementing
//! [`NodeFamily`](coherent_core::NodeFamily) plus an instance struct generic
//! over the feature-set [`Level`](coherent_core::Level).

mod domain_warp_fractal;
mod domain_warp_simplex;
mod fractal;
mod fractal_fbm;
mod simplex;

pub use domain_warp_fractal::{DomainWarpFractalProgressive, DomainWarpFractalProgressiveNode};
pub use domain_warp_simplex::{DomainWarpSimplex, DomainWarpSimplexNode, VectorizationScheme};
pub use fractal::FractalParams;
pub use fractal_fbm::{FractalFBm, FractalFBmNode};
pub use simplex::{Simplex, SimplexNode, SimplexSmooth, SimplexSmoothNode};

use coherent_core::{Error, Lanes, MemberValue, MemberVariable, Result};

/// Name of the frequency member of scalable generators
pub const FREQUENCY: &str = "Frequency";

/// Default frequency of scalable generators
pub const DEFAULT_FREQUENCY: f32 = 0.01;

pub(crate) fn frequency_member() -> MemberVariable {
    MemberVariable::float(FREQUENCY, DEFAULT_FREQUENCY, f32::MIN, f32::MAX)
        .describe("Multiplier applied to input coordinates")
}

#[inline(always)]
pub(crate) fn scaled<S: Lanes, const N: usize>(pos: [S; N], frequency: f32) -> [S; N] {
    let f = S::splat(frequency);
    pos.map(|p| p * f)
}

pub(crate) fn expect_float(node: &'static str, member: &str, value: MemberValue) -> Result<f32> {
    value
        .as_float()
        .ok_or_else(|| Error::invalid_parameter(node, member, format!("expected a float, got {value:?}")))
}

pub(crate) fn expect_int(node: &'static str, member: &str, value: MemberValue) -> Result<i32> {
    value
        .as_int()
        .ok_or_else(|| Error::invalid_parameter(node, member, format!("expected an integer, got {value:?}")))
}
