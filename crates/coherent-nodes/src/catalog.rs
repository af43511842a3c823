//! Process-wide catalog of the built-in node types
//!
//! The catalog is built on first use by explicit registration calls. A
//! duplicate name among the built-ins is a startup failure and panics.

use crate::generators::{
    DomainWarpFractalProgressive, DomainWarpSimplex, FractalFBm, Simplex, SimplexSmooth,
};
use coherent_core::{FeatureSet, NodeFamily, NodeHandle, Registry, Result};
use lazy_static::lazy_static;

lazy_static! {
    static ref CATALOG: Registry = {
        let mut registry = Registry::new();
        if let Err(err) = register_builtin(&mut registry) {
            panic!("built-in node catalog is inconsistent: {err}");
        }
        tracing::info!(node_types = registry.len(), "built-in node catalog ready");
        registry
    };
}

/// Register every built-in node type, in catalog order
pub fn register_builtin(registry: &mut Registry) -> Result<()> {
    let builtins = [
        Simplex::metadata(),
        SimplexSmooth::metadata(),
        DomainWarpSimplex::metadata(),
        DomainWarpFractalProgressive::metadata(),
        FractalFBm::metadata(),
    ];
    for metadata in builtins {
        tracing::debug!(
            node = metadata.name,
            groups = ?metadata.groups,
            "registering built-in node type"
        );
        registry.register(metadata)?;
    }
    Ok(())
}

/// The shared built-in catalog
pub fn catalog() -> &'static Registry {
    &CATALOG
}

/// Create a built-in node by name at an explicit feature set
pub fn create_node(name: &str, feature_set: FeatureSet) -> Result<NodeHandle> {
    CATALOG.create_node(name, feature_set)
}

/// Create a built-in node by name at the process-wide resolved feature set
pub fn create_node_auto(name: &str) -> Result<NodeHandle> {
    CATALOG.create_node_auto(name)
}
