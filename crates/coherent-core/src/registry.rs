//! Append-only catalog of node types
//!
//! Lookup accepts the registered name exactly, or any spelling that matches
//! after lowercasing and dropping whitespace ("domain warp simplex" finds
//! `DomainWarpSimplex`). Registration order is preserved for enumeration.

use crate::error::{Error, Result};
use crate::feature_set::FeatureSet;
use crate::handle::NodeHandle;
use crate::metadata::Metadata;
use std::collections::HashMap;

/// Lookup key for a node name
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

#[derive(Debug, Default)]
pub struct Registry {
    entries: Vec<&'static Metadata>,
    index: HashMap<String, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node type; names must be unique after normalization
    pub fn register(&mut self, metadata: &'static Metadata) -> Result<()> {
        let key = normalize_name(metadata.name);
        if self.index.contains_key(&key) {
            return Err(Error::DuplicateNode {
                name: metadata.name.to_string(),
            });
        }
        self.index.insert(key, self.entries.len());
        self.entries.push(metadata);
        log::debug!(
            "Registered node type '{}' ({:?})",
            metadata.name,
            metadata.capabilities
        );
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Result<&'static Metadata> {
        self.index
            .get(&normalize_name(name))
            .map(|&i| self.entries[i])
            .ok_or_else(|| Error::NotFound {
                name: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&normalize_name(name))
    }

    /// Every descriptor in registration order
    pub fn iter(&self) -> impl Iterator<Item = &'static Metadata> + '_ {
        self.entries.iter().copied()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.iter().map(|m| m.name).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a node type and instantiate it for `feature_set`
    pub fn create_node(&self, name: &str, feature_set: FeatureSet) -> Result<NodeHandle> {
        self.lookup(name)?.create_node(feature_set)
    }

    /// Look up a node type and instantiate it at the resolved feature set
    pub fn create_node_auto(&self, name: &str) -> Result<NodeHandle> {
        self.lookup(name)?.create_node_auto()
    }

    /// Catalog as pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.entries)?)
    }
}
