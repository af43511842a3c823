//! Built-in node types for coherent noise graphs
//!
//! This crate provides the noise kernels and the node types built on them,
//! plus the process-wide catalog that registers every built-in.
//!
//! # Node types
//!
//! - **Simplex** / **SimplexSmooth**: gradient noise on an N dimensional
//!   simplex grid, the smooth variant with a wider kernel
//! - **DomainWarpSimplex**: displaces coordinates by simplex noise before
//!   sampling its source
//! - **DomainWarpFractalProgressive**: repeats a domain warp over octaves,
//!   each octave warping the previous octave's output
//! - **FractalFBm**: normalized octave sum of any generator
//!
//! # Example
//!
//! ```rust
//! use coherent_core::{FeatureSet, NodeGraph};
//! use coherent_nodes::create_node;
//!
//! let mut warp = create_node("DomainWarpSimplex", FeatureSet::Scalar).unwrap();
//! let mut source = create_node("Simplex", FeatureSet::Scalar).unwrap();
//! source.set_float("Frequency", 0.05).unwrap();
//! warp.set_float("Warp Amplitude", 1.0).unwrap();
//! warp.set_source("Source", source).unwrap();
//!
//! let graph = NodeGraph::new(warp).unwrap();
//! let value = graph.gen_single_2d(0.0, 0.0, 1337);
//! assert!((-1.0..=1.0).contains(&value));
//! ```
//!
//! Node instances can also be composed statically, which rules out
//! feature-set mismatches at compile time. Every node holds a [`Level`]
//! value, and outside [`ScalarLevel`] such a value is only obtainable on a
//! processor that supports it:
//!
//! ```rust
//! use coherent_core::{Generator, Level, ScalarLevel};
//! use coherent_nodes::{DomainWarpSimplexNode, SimplexNode};
//!
//! fn warped<L: Level>(level: L) -> DomainWarpSimplexNode<L> {
//!     DomainWarpSimplexNode::new(level)
//!         .with_source(SimplexNode::new(level).with_frequency(0.05))
//! }
//!
//! let value = warped(ScalarLevel).gen_2d(1337, 0.0, 0.0);
//! assert!(value.is_finite());
//! ```
//!
//! [`Level`]: coherent_core::Level
//! [`ScalarLevel`]: coherent_core::ScalarLevel

pub mod catalog;
pub mod generators;
pub mod kernels;

pub use catalog::{catalog, create_node, create_node_auto, register_builtin};
pub use generators::{
    DomainWarpFractalProgressive, DomainWarpFractalProgressiveNode, DomainWarpSimplex,
    DomainWarpSimplexNode, FractalFBm, FractalFBmNode, FractalParams, Simplex, SimplexNode,
    SimplexSmooth, SimplexSmoothNode, VectorizationScheme, DEFAULT_FREQUENCY, FREQUENCY,
};
