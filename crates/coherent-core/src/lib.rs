//! Core traits and types for coherent noise graphs
//!
//! This crate provides the machinery every node type plugs into; the node
//! types themselves live in `coherent-nodes`.
//!
//! # Architecture Overview
//!
//! The crate is organized into four layers, leaves first:
//!
//! 1. **Capabilities** - [`Generator`], [`ScalableGenerator`],
//!    [`RangedGenerator`] and [`DomainWarp`] as independent traits over a
//!    vector width ([`Lanes`]), gathered behind the object-safe [`Node`]
//! 2. **Metadata** - [`Metadata`] descriptors with member schema, source
//!    slots and a factory, collected in an append-only [`Registry`]
//! 3. **Dispatch** - [`FeatureSet`] detection and one compile-time
//!    [`Level`] marker per feature set; [`create_for`] picks the
//!    implementation once, at construction
//! 4. **Graphs** - type-erased [`NodeHandle`]s composed into a validated
//!    [`NodeGraph`] and evaluated in native-width batches
//!
//! # Example
//!
//! ```rust
//! use coherent_core::{DispatchConfig, FeatureSet};
//!
//! let best = FeatureSet::best_available();
//! assert!(best.is_available());
//!
//! // Force the portable fallback
//! let level = DispatchConfig::new()
//!     .with_max_feature_set(FeatureSet::Scalar)
//!     .resolve();
//! assert_eq!(level, FeatureSet::Scalar);
//! ```

pub mod batch;
pub mod capability;
pub mod config;
pub mod error;
pub mod feature_set;
pub mod graph;
pub mod handle;
pub mod lanes;
pub mod level;
pub mod metadata;
pub mod registry;

// Re-export core types
pub use error::{Error, Result};

pub use batch::{Coords, OutputMinMax};
pub use capability::{
    gen_or_zero_2d, gen_or_zero_3d, gen_or_zero_4d, Capabilities, DomainWarp, Generator, Node,
    RangedGenerator, ScalableGenerator,
};
pub use config::{resolved_feature_set, DispatchConfig, MAX_FEATURE_SET_ENV};
pub use feature_set::{CpuFeatures, FeatureSet, ParseFeatureSetError};
pub use graph::NodeGraph;
pub use handle::{create_for, NodeFamily, NodeHandle};
pub use lanes::{F32Lanes, F32x16, F32x4, F32x8, Lanes, MAX_LANES};
pub use level::{Level, ScalarLevel};
pub use metadata::{
    MemberKind, MemberValue, MemberVariable, Metadata, MetadataBuilder, NodeFactory, SourceSlot,
};
pub use registry::{normalize_name, Registry};

#[cfg(target_arch = "x86_64")]
pub use level::{Avx2Level, Sse2Level, Sse41Level};

#[cfg(all(target_arch = "x86_64", feature = "avx512"))]
pub use level::Avx512Level;

#[cfg(target_arch = "aarch64")]
pub use level::NeonLevel;
