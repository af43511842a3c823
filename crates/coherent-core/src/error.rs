//! Error types for coherent noise graphs
//!
//! Provides a unified error type for catalog lookup, node construction and
//! graph composition. Evaluation itself never fails.

use crate::capability::Capabilities;
use crate::feature_set::FeatureSet;
use thiserror::Error;

/// Core error type for node catalog and graph operations
#[derive(Error, Debug)]
pub enum Error {
    /// A node type with the same name is already registered
    #[error("Duplicate node type: '{name}' is already registered")]
    DuplicateNode { name: String },

    /// No node type with the given name is registered
    #[error("Node type not found: '{name}'")]
    NotFound { name: String },

    /// The node type has no implementation compiled for the requested level
    #[error("Unsupported feature set: '{node}' has no implementation for {requested}")]
    UnsupportedFeatureSet {
        node: &'static str,
        requested: FeatureSet,
    },

    /// The running processor cannot execute the requested level
    #[error("Feature set unavailable: '{node}' requested {requested}, which this processor cannot execute (best available: {best})")]
    FeatureSetUnavailable {
        node: &'static str,
        requested: FeatureSet,
        best: FeatureSet,
    },

    /// Parent and child were created for different feature sets
    #[error("Feature set mismatch: cannot attach '{child}' ({child_level}) to '{parent}' ({parent_level})")]
    FeatureSetMismatch {
        parent: &'static str,
        parent_level: FeatureSet,
        child: &'static str,
        child_level: FeatureSet,
    },

    /// The child does not implement a capability the slot requires
    #[error("Capability mismatch: slot '{slot}' of '{node}' requires {required:?}, '{child}' provides {provided:?}")]
    CapabilityMismatch {
        node: &'static str,
        slot: String,
        child: &'static str,
        required: Capabilities,
        provided: Capabilities,
    },

    /// The node type declares no member with this name
    #[error("Unknown member: '{node}' has no member named '{member}'")]
    UnknownMember { node: &'static str, member: String },

    /// The node type declares no source slot with this name
    #[error("Unknown source: '{node}' has no source slot named '{slot}'")]
    UnknownSource { node: &'static str, slot: String },

    /// A member value has the wrong kind or lies outside its declared range
    #[error("Invalid parameter: '{member}' of '{node}': {reason}")]
    InvalidParameter {
        node: &'static str,
        member: String,
        reason: String,
    },

    /// A source slot in the graph was never filled
    #[error("Missing source: slot '{slot}' of '{node}' has no node attached")]
    MissingSource { node: &'static str, slot: String },

    /// Catalog export failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an error for a member value that violates the schema
    pub fn invalid_parameter(node: &'static str, member: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            node,
            member: member.to_string(),
            reason: reason.into(),
        }
    }

    /// Create an error for an unknown member name
    pub fn unknown_member(node: &'static str, member: &str) -> Self {
        Self::UnknownMember {
            node,
            member: member.to_string(),
        }
    }

    /// Create an error for an unknown source slot
    pub fn unknown_source(node: &'static str, slot: &str) -> Self {
        Self::UnknownSource {
            node,
            slot: slot.to_string(),
        }
    }

    /// Whether retrying at a lower feature set could succeed
    pub fn is_feature_set_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedFeatureSet { .. } | Self::FeatureSetUnavailable { .. }
        )
    }
}
