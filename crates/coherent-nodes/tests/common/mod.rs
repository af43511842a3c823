//! Shared utilities for integration tests

#![allow(dead_code)]

use coherent_core::{Capabilities, FeatureSet, NodeHandle, Result};
use coherent_nodes::create_node;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub use approx::abs_diff_eq;

/// Cross feature-set agreement tolerance
pub const LEVEL_TOLERANCE: f32 = 1e-5;

/// Lengths around every native vector width
pub fn edge_case_lengths() -> Vec<usize> {
    vec![0, 1, 3, 4, 5, 7, 8, 9, 15, 16, 17, 31, 33, 100]
}

/// Install a test subscriber once; later calls are no-ops
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Build `name` with every source slot filled, recursively, at `feature_set`
///
/// Generator slots get a Simplex at frequency 0.05; domain-warp slots get a
/// DomainWarpSimplex over such a Simplex.
pub fn build_tree(name: &str, feature_set: FeatureSet) -> Result<NodeHandle> {
    let mut node = create_node(name, feature_set)?;
    let metadata = node.metadata();
    for slot in &metadata.sources {
        let child = if slot.requires.contains(Capabilities::DOMAIN_WARP) {
            build_tree("DomainWarpSimplex", feature_set)?
        } else {
            let mut simplex = create_node("Simplex", feature_set)?;
            simplex.set_float("Frequency", 0.05)?;
            simplex
        };
        node.set_source(slot.name, child)?;
    }
    Ok(node)
}

/// Coordinates drawn uniformly from `[-extent, extent)` on `axes` axes
pub fn random_coords(seed: u64, axes: usize, count: usize, extent: f32) -> Vec<Vec<f32>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..axes)
        .map(|_| (0..count).map(|_| rng.gen_range(-extent..extent)).collect())
        .collect()
}
