//! Compile-time feature-set levels
//!
//! Each level ties a [`FeatureSet`] to its lane type and to a trampoline
//! compiled with the matching `#[target_feature]`. Node instances are generic
//! over a level and hold a value of it. Every node enters [`Level::run`]
//! around its own arithmetic, so the kernels it calls are inlined into, and
//! compiled for, that level's frame.
//!
//! A level value is proof that the running processor supports it: apart from
//! the always-available [`ScalarLevel`], values are only handed out by
//! [`Level::detect`] or by a constructor that panics on unsupported hardware.

use crate::feature_set::FeatureSet;
use crate::lanes::Lanes;

/// A feature-set level known at compile time
pub trait Level: Copy + Send + Sync + 'static {
    /// Lane type every node at this level evaluates with
    type Lanes: Lanes;

    /// Runtime identity of the level
    const FEATURE_SET: FeatureSet;

    /// This level, if the running processor can execute it
    fn detect() -> Option<Self>;

    /// Run `f` inside a frame compiled for this level
    fn run<R, F: FnOnce() -> R>(self, f: F) -> R;
}

/// Portable one-lane fallback
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScalarLevel;

impl Level for ScalarLevel {
    type Lanes = f32;
    const FEATURE_SET: FeatureSet = FeatureSet::Scalar;

    fn detect() -> Option<Self> {
        Some(ScalarLevel)
    }

    #[inline(always)]
    fn run<R, F: FnOnce() -> R>(self, f: F) -> R {
        f()
    }
}

/// A level struct that can only be obtained on supporting hardware
macro_rules! detected_level {
    ($(#[$doc:meta])* $name:ident, $feature_set:expr, $lanes:ty, $trampoline:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq)]
        pub struct $name {
            _detected: (),
        }

        impl $name {
            /// # Panics
            /// If the running processor cannot execute this level
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                match Self::detect() {
                    Some(level) => level,
                    None => panic!(
                        "{} level requested but the processor does not support it",
                        $feature_set
                    ),
                }
            }
        }

        impl Level for $name {
            type Lanes = $lanes;
            const FEATURE_SET: FeatureSet = $feature_set;

            fn detect() -> Option<Self> {
                Self::FEATURE_SET
                    .is_available()
                    .then_some(Self { _detected: () })
            }

            #[inline(always)]
            fn run<R, F: FnOnce() -> R>(self, f: F) -> R {
                // Safety: values of this type only come from detect()
                unsafe { $trampoline(f) }
            }
        }
    };
}

#[cfg(target_arch = "x86_64")]
mod x86 {
    use super::*;
    #[cfg(feature = "avx512")]
    use crate::lanes::F32x16;
    use crate::lanes::{F32x4, F32x8};
    use wide::f32x4;

    #[target_feature(enable = "sse2")]
    unsafe fn run_sse2<R, F: FnOnce() -> R>(f: F) -> R {
        f()
    }

    #[target_feature(enable = "sse2,sse4.1")]
    unsafe fn run_sse41<R, F: FnOnce() -> R>(f: F) -> R {
        f()
    }

    #[target_feature(enable = "avx2,fma")]
    unsafe fn run_avx2<R, F: FnOnce() -> R>(f: F) -> R {
        f()
    }

    #[cfg(feature = "avx512")]
    #[target_feature(enable = "avx512f")]
    unsafe fn run_avx512<R, F: FnOnce() -> R>(f: F) -> R {
        f()
    }

    detected_level!(
        /// x86-64 baseline, four lanes
        Sse2Level,
        FeatureSet::Sse2,
        f32x4,
        run_sse2
    );

    detected_level!(
        /// SSE4.1, four lanes
        Sse41Level,
        FeatureSet::Sse41,
        F32x4,
        run_sse41
    );

    detected_level!(
        /// AVX2 with FMA, eight lanes
        Avx2Level,
        FeatureSet::Avx2,
        F32x8,
        run_avx2
    );

    #[cfg(feature = "avx512")]
    detected_level!(
        /// AVX-512F, sixteen lanes
        Avx512Level,
        FeatureSet::Avx512,
        F32x16,
        run_avx512
    );
}

#[cfg(target_arch = "x86_64")]
pub use x86::{Avx2Level, Sse2Level, Sse41Level};

#[cfg(all(target_arch = "x86_64", feature = "avx512"))]
pub use x86::Avx512Level;

#[cfg(target_arch = "aarch64")]
mod arm {
    use super::*;
    use wide::f32x4;

    #[target_feature(enable = "neon")]
    unsafe fn run_neon<R, F: FnOnce() -> R>(f: F) -> R {
        f()
    }

    detected_level!(
        /// ARM Advanced SIMD, four lanes
        NeonLevel,
        FeatureSet::Neon,
        f32x4,
        run_neon
    );
}

#[cfg(target_arch = "aarch64")]
pub use arm::NeonLevel;
