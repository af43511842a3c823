//! Composable coherent noise graphs
//!
//! Facade over the workspace crates:
//!
//! - [`core`]: capability traits, feature-set dispatch, metadata registry,
//!   type-erased node handles and graphs
//! - [`nodes`]: simplex and domain-warp node types and the built-in catalog
//!
//! # Example
//!
//! ```rust
//! use coherent_noise::prelude::*;
//!
//! let mut fbm = create_node_auto("FractalFBm").unwrap();
//! let simplex = create_node("Simplex", fbm.feature_set()).unwrap();
//! fbm.set_int("Octaves", 4).unwrap();
//! fbm.set_source("Source", simplex).unwrap();
//!
//! let graph = NodeGraph::new(fbm).unwrap();
//! let mut out = vec![0.0f32; 64 * 64];
//! let bounds = graph.gen_uniform_grid_2d(&mut out, [0, 0], [64, 64], 0.02, 1337);
//! assert!(bounds.min <= bounds.max);
//! ```

pub use coherent_core as core;
pub use coherent_nodes as nodes;

pub use coherent_core::{Error, Result};

/// Prelude for convenient imports
pub mod prelude {
    pub use coherent_core::{
        Capabilities, DispatchConfig, DomainWarp, Error, FeatureSet, Generator, Level, MemberValue,
        Metadata, Node, NodeFamily, NodeGraph, NodeHandle, OutputMinMax, RangedGenerator,
        Registry, Result, ScalableGenerator, ScalarLevel,
    };
    pub use coherent_nodes::{
        catalog, create_node, create_node_auto, DomainWarpFractalProgressiveNode,
        DomainWarpSimplexNode, FractalFBmNode, FractalParams, SimplexNode, SimplexSmoothNode,
        VectorizationScheme,
    };
}
