//! Vector-width abstraction shared by every noise kernel
//!
//! A kernel is written once against [`Lanes`] and instantiated for each
//! feature set's lane type:
//!
//! | Lanes         | Width | Feature sets   |
//! |---------------|-------|----------------|
//! | `f32`         | 1     | Scalar         |
//! | `wide::f32x4` | 4     | SSE2, NEON     |
//! | [`F32x4`]     | 4     | SSE4.1         |
//! | [`F32x8`]     | 8     | AVX2           |
//! | [`F32x16`]    | 16    | AVX-512        |
//!
//! `wide::f32x4` picks its instructions from the crate-wide target, which is
//! exactly the SSE2 / NEON baseline. The array-backed [`F32Lanes`] carry no
//! instruction choice of their own: every operation is an `#[inline(always)]`
//! per-lane loop, vectorized by the compiler for whatever `#[target_feature]`
//! frame it is inlined into (see [`Level::run`](crate::Level::run)).
//!
//! All lane operations are plain IEEE single-precision arithmetic with no
//! fused multiply-add, so every width produces bit-identical results for the
//! same coordinate.

use std::ops::{Add, Div, Mul, Sub};
use wide::{f32x4, CmpGe, CmpGt};

/// Widest lane count of any feature set
pub const MAX_LANES: usize = 16;

/// A batch of `WIDTH` f32 values processed together
pub trait Lanes:
    Copy
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
{
    /// Number of f32 values in one batch
    const WIDTH: usize;

    /// Broadcast a value to every lane
    fn splat(value: f32) -> Self;

    /// Load the first `WIDTH` values of `src`
    fn load(src: &[f32]) -> Self;

    /// Store every lane into the first `WIDTH` slots of `dst`
    fn store(self, dst: &mut [f32]);

    /// Value of lane 0
    fn first(self) -> f32;

    fn floor(self) -> Self;

    fn abs(self) -> Self;

    fn min(self, rhs: Self) -> Self;

    fn max(self, rhs: Self) -> Self;

    /// 1.0 where `self > rhs`, 0.0 elsewhere
    fn gt_step(self, rhs: Self) -> Self;

    /// 1.0 where `self >= rhs`, 0.0 elsewhere
    fn ge_step(self, rhs: Self) -> Self;

    /// Clamp every lane into `[lo, hi]`
    #[inline(always)]
    fn clamp(self, lo: f32, hi: f32) -> Self {
        self.max(Self::splat(lo)).min(Self::splat(hi))
    }
}

#[inline(always)]
fn step(condition: bool) -> f32 {
    if condition {
        1.0
    } else {
        0.0
    }
}

impl Lanes for f32 {
    const WIDTH: usize = 1;

    #[inline(always)]
    fn splat(value: f32) -> Self {
        value
    }

    #[inline(always)]
    fn load(src: &[f32]) -> Self {
        src[0]
    }

    #[inline(always)]
    fn store(self, dst: &mut [f32]) {
        dst[0] = self;
    }

    #[inline(always)]
    fn first(self) -> f32 {
        self
    }

    #[inline(always)]
    fn floor(self) -> Self {
        f32::floor(self)
    }

    #[inline(always)]
    fn abs(self) -> Self {
        f32::abs(self)
    }

    #[inline(always)]
    fn min(self, rhs: Self) -> Self {
        f32::min(self, rhs)
    }

    #[inline(always)]
    fn max(self, rhs: Self) -> Self {
        f32::max(self, rhs)
    }

    #[inline(always)]
    fn gt_step(self, rhs: Self) -> Self {
        step(self > rhs)
    }

    #[inline(always)]
    fn ge_step(self, rhs: Self) -> Self {
        step(self >= rhs)
    }
}

impl Lanes for f32x4 {
    const WIDTH: usize = 4;

    #[inline(always)]
    fn splat(value: f32) -> Self {
        f32x4::splat(value)
    }

    #[inline(always)]
    fn load(src: &[f32]) -> Self {
        let mut lanes = [0.0f32; 4];
        lanes.copy_from_slice(&src[..4]);
        f32x4::new(lanes)
    }

    #[inline(always)]
    fn store(self, dst: &mut [f32]) {
        dst[..4].copy_from_slice(&self.to_array());
    }

    #[inline(always)]
    fn first(self) -> f32 {
        self.to_array()[0]
    }

    #[inline(always)]
    fn floor(self) -> Self {
        f32x4::floor(self)
    }

    #[inline(always)]
    fn abs(self) -> Self {
        f32x4::abs(self)
    }

    #[inline(always)]
    fn min(self, rhs: Self) -> Self {
        f32x4::min(self, rhs)
    }

    #[inline(always)]
    fn max(self, rhs: Self) -> Self {
        f32x4::max(self, rhs)
    }

    #[inline(always)]
    fn gt_step(self, rhs: Self) -> Self {
        self.cmp_gt(rhs).blend(f32x4::ONE, f32x4::ZERO)
    }

    #[inline(always)]
    fn ge_step(self, rhs: Self) -> Self {
        self.cmp_ge(rhs).blend(f32x4::ONE, f32x4::ZERO)
    }
}

/// `W` lanes held in a plain array
#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(transparent)]
pub struct F32Lanes<const W: usize>(pub [f32; W]);

pub type F32x4 = F32Lanes<4>;
pub type F32x8 = F32Lanes<8>;
pub type F32x16 = F32Lanes<16>;

impl<const W: usize> F32Lanes<W> {
    #[inline(always)]
    fn map(self, f: impl Fn(f32) -> f32) -> Self {
        let mut out = self.0;
        for lane in out.iter_mut() {
            *lane = f(*lane);
        }
        Self(out)
    }

    #[inline(always)]
    fn zip(self, rhs: Self, f: impl Fn(f32, f32) -> f32) -> Self {
        let mut out = self.0;
        for (lane, r) in out.iter_mut().zip(rhs.0) {
            *lane = f(*lane, r);
        }
        Self(out)
    }
}

macro_rules! impl_array_binop {
    ($trait:ident, $method:ident, $op:tt) => {
        impl<const W: usize> $trait for F32Lanes<W> {
            type Output = Self;

            #[inline(always)]
            fn $method(self, rhs: Self) -> Self {
                self.zip(rhs, |a, b| a $op b)
            }
        }
    };
}

impl_array_binop!(Add, add, +);
impl_array_binop!(Sub, sub, -);
impl_array_binop!(Mul, mul, *);
impl_array_binop!(Div, div, /);

impl<const W: usize> Lanes for F32Lanes<W> {
    const WIDTH: usize = W;

    #[inline(always)]
    fn splat(value: f32) -> Self {
        Self([value; W])
    }

    #[inline(always)]
    fn load(src: &[f32]) -> Self {
        let mut lanes = [0.0f32; W];
        lanes.copy_from_slice(&src[..W]);
        Self(lanes)
    }

    #[inline(always)]
    fn store(self, dst: &mut [f32]) {
        dst[..W].copy_from_slice(&self.0);
    }

    #[inline(always)]
    fn first(self) -> f32 {
        self.0[0]
    }

    #[inline(always)]
    fn floor(self) -> Self {
        self.map(f32::floor)
    }

    #[inline(always)]
    fn abs(self) -> Self {
        self.map(f32::abs)
    }

    #[inline(always)]
    fn min(self, rhs: Self) -> Self {
        self.zip(rhs, f32::min)
    }

    #[inline(always)]
    fn max(self, rhs: Self) -> Self {
        self.zip(rhs, f32::max)
    }

    #[inline(always)]
    fn gt_step(self, rhs: Self) -> Self {
        self.zip(rhs, |a, b| step(a > b))
    }

    #[inline(always)]
    fn ge_step(self, rhs: Self) -> Self {
        self.zip(rhs, |a, b| step(a >= b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip<S: Lanes>(values: &[f32]) -> Vec<f32> {
        let mut out = vec![0.0; S::WIDTH];
        S::load(values).store(&mut out);
        out
    }

    fn sample() -> Vec<f32> {
        (0..MAX_LANES).map(|i| i as f32 * 1.5 - 7.25).collect()
    }

    #[test]
    fn test_load_store_preserves_lanes() {
        let values = sample();
        assert_eq!(roundtrip::<f32>(&values), values[..1]);
        assert_eq!(roundtrip::<f32x4>(&values), values[..4]);
        assert_eq!(roundtrip::<F32x4>(&values), values[..4]);
        assert_eq!(roundtrip::<F32x8>(&values), values[..8]);
        assert_eq!(roundtrip::<F32x16>(&values), values[..16]);
    }

    fn floor_matches_scalar<S: Lanes>() {
        let values = sample();
        let mut out = vec![0.0; S::WIDTH];
        S::load(&values).floor().store(&mut out);
        for (lane, v) in out.iter().enumerate() {
            assert_eq!(*v, values[lane].floor(), "lane {lane}");
        }
    }

    #[test]
    fn test_floor_matches_scalar_for_every_width() {
        floor_matches_scalar::<f32>();
        floor_matches_scalar::<f32x4>();
        floor_matches_scalar::<F32x4>();
        floor_matches_scalar::<F32x8>();
        floor_matches_scalar::<F32x16>();
    }

    fn steps<S: Lanes>() {
        let a = S::splat(1.0);
        let b = S::splat(1.0);
        let c = S::splat(2.0);
        assert_eq!(a.gt_step(b).first(), 0.0);
        assert_eq!(a.ge_step(b).first(), 1.0);
        assert_eq!(c.gt_step(a).first(), 1.0);
        assert_eq!(a.gt_step(c).first(), 0.0);
    }

    #[test]
    fn test_step_masks() {
        steps::<f32>();
        steps::<f32x4>();
        steps::<F32x4>();
        steps::<F32x8>();
        steps::<F32x16>();
    }

    #[test]
    fn test_wide_step_masks_per_lane() {
        let a = f32x4::from([0.0, 1.0, 2.0, 3.0]);
        let b = f32x4::splat(1.0);
        assert_eq!(a.gt_step(b).to_array(), [0.0, 0.0, 1.0, 1.0]);
        assert_eq!(a.ge_step(b).to_array(), [0.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_array_lanes_are_independent() {
        let a = F32x8::load(&sample());
        let b = F32x8::splat(-0.5);
        let sum = a + b;
        let clamped = a.clamp(-1.0, 1.0);
        for lane in 0..8 {
            assert_eq!(sum.0[lane], a.0[lane] - 0.5);
            assert_eq!(clamped.0[lane], a.0[lane].clamp(-1.0, 1.0));
        }
        assert_eq!((a * b / b).0, a.0);
    }

    #[test]
    fn test_clamp() {
        let v = <f32x4 as Lanes>::load(&[-3.0, -0.5, 0.5, 3.0]);
        let mut out = [0.0; 4];
        v.clamp(-1.0, 1.0).store(&mut out);
        assert_eq!(out, [-1.0, -0.5, 0.5, 1.0]);
    }
}
