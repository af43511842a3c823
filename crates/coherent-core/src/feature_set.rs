//! SIMD feature-set levels and processor capability detection
//!
//! Levels are totally ordered: a higher level is assumed to support
//! everything a lower level supports. Which levels exist in a build depends on
//! the target architecture (and the `avx512` cargo feature); which of those
//! the running processor can execute is detected once and cached for the life of
//! the process.

use bitflags::bitflags;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

bitflags! {
    /// Processor instruction-set extensions relevant to dispatch
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CpuFeatures: u32 {
        const SSE2    = 1 << 0;
        const SSE41   = 1 << 1;
        const AVX2    = 1 << 2;
        const FMA     = 1 << 3;
        const AVX512F = 1 << 4;
        const NEON    = 1 << 5;
    }
}

impl CpuFeatures {
    /// Probe the running processor
    pub fn detect() -> Self {
        #[allow(unused_mut)]
        let mut flags = CpuFeatures::empty();

        #[cfg(target_arch = "x86_64")]
        {
            if is_x86_feature_detected!("sse2") {
                flags |= CpuFeatures::SSE2;
            }
            if is_x86_feature_detected!("sse4.1") {
                flags |= CpuFeatures::SSE41;
            }
            if is_x86_feature_detected!("avx2") {
                flags |= CpuFeatures::AVX2;
            }
            if is_x86_feature_detected!("fma") {
                flags |= CpuFeatures::FMA;
            }
            if is_x86_feature_detected!("avx512f") {
                flags |= CpuFeatures::AVX512F;
            }
        }

        #[cfg(target_arch = "aarch64")]
        {
            if std::arch::is_aarch64_feature_detected!("neon") {
                flags |= CpuFeatures::NEON;
            }
        }

        flags
    }
}

/// Vector instruction capability level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FeatureSet {
    /// Portable fallback, one lane
    Scalar,
    /// x86-64 baseline, 4 lanes
    Sse2,
    /// SSE4.1, 4 lanes
    Sse41,
    /// AVX2 + FMA, 8 lanes
    Avx2,
    /// AVX-512F, 16 lanes
    Avx512,
    /// ARM Advanced SIMD, 4 lanes
    Neon,
}

lazy_static! {
    static ref DETECTED: CpuFeatures = CpuFeatures::detect();
    static ref BEST_AVAILABLE: FeatureSet = {
        let best = FeatureSet::ALL
            .iter()
            .rev()
            .copied()
            .find(|level| level.is_compiled() && DETECTED.contains(level.required_flags()))
            .unwrap_or(FeatureSet::Scalar);
        log::info!(
            "Resolved SIMD feature set: {} ({} lanes, detected {:?})",
            best,
            best.lane_width(),
            *DETECTED
        );
        best
    };
}

impl FeatureSet {
    /// Every level in capability order
    pub const ALL: [FeatureSet; 6] = [
        FeatureSet::Scalar,
        FeatureSet::Sse2,
        FeatureSet::Sse41,
        FeatureSet::Avx2,
        FeatureSet::Avx512,
        FeatureSet::Neon,
    ];

    /// Processor flags a level needs
    pub fn required_flags(self) -> CpuFeatures {
        match self {
            FeatureSet::Scalar => CpuFeatures::empty(),
            FeatureSet::Sse2 => CpuFeatures::SSE2,
            FeatureSet::Sse41 => CpuFeatures::SSE2 | CpuFeatures::SSE41,
            FeatureSet::Avx2 => {
                CpuFeatures::SSE2 | CpuFeatures::SSE41 | CpuFeatures::AVX2 | CpuFeatures::FMA
            }
            FeatureSet::Avx512 => {
                CpuFeatures::SSE2
                    | CpuFeatures::SSE41
                    | CpuFeatures::AVX2
                    | CpuFeatures::FMA
                    | CpuFeatures::AVX512F
            }
            FeatureSet::Neon => CpuFeatures::NEON,
        }
    }

    /// Number of f32 lanes processed per batch
    pub fn lane_width(self) -> usize {
        match self {
            FeatureSet::Scalar => 1,
            FeatureSet::Sse2 | FeatureSet::Sse41 | FeatureSet::Neon => 4,
            FeatureSet::Avx2 => 8,
            FeatureSet::Avx512 => 16,
        }
    }

    /// Whether this build contains an implementation of the level
    pub fn is_compiled(self) -> bool {
        match self {
            FeatureSet::Scalar => true,
            FeatureSet::Sse2 | FeatureSet::Sse41 | FeatureSet::Avx2 => {
                cfg!(target_arch = "x86_64")
            }
            FeatureSet::Avx512 => cfg!(all(target_arch = "x86_64", feature = "avx512")),
            FeatureSet::Neon => cfg!(target_arch = "aarch64"),
        }
    }

    /// Levels compiled into this build, in capability order
    pub fn compiled() -> Vec<FeatureSet> {
        Self::ALL.iter().copied().filter(|l| l.is_compiled()).collect()
    }

    /// Whether the running processor can execute this level
    pub fn is_available(self) -> bool {
        self.is_compiled() && DETECTED.contains(self.required_flags())
    }

    /// Best level the running processor supports
    ///
    /// Probed on first call and cached for the life of the process.
    pub fn best_available() -> FeatureSet {
        *BEST_AVAILABLE
    }

    /// Levels the running processor can execute, in capability order
    pub fn available() -> Vec<FeatureSet> {
        Self::ALL.iter().copied().filter(|l| l.is_available()).collect()
    }

    /// Short display name
    pub fn name(self) -> &'static str {
        match self {
            FeatureSet::Scalar => "Scalar",
            FeatureSet::Sse2 => "SSE2",
            FeatureSet::Sse41 => "SSE4.1",
            FeatureSet::Avx2 => "AVX2",
            FeatureSet::Avx512 => "AVX512",
            FeatureSet::Neon => "NEON",
        }
    }
}

impl fmt::Display for FeatureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown feature-set name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown feature set '{0}'")]
pub struct ParseFeatureSetError(pub String);

impl FromStr for FeatureSet {
    type Err = ParseFeatureSetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "scalar" => Ok(FeatureSet::Scalar),
            "sse2" => Ok(FeatureSet::Sse2),
            "sse41" => Ok(FeatureSet::Sse41),
            "avx2" => Ok(FeatureSet::Avx2),
            "avx512" | "avx512f" => Ok(FeatureSet::Avx512),
            "neon" => Ok(FeatureSet::Neon),
            _ => Err(ParseFeatureSetError(s.to_string())),
        }
    }
}
