//! Reflection records describing node types
//!
//! A [`Metadata`] descriptor carries everything a caller needs to build and
//! introspect a node without compile-time knowledge of its type: display
//! name, groups, description, member schema, source slots, declared
//! capabilities and a factory producing an instance for a requested
//! [`FeatureSet`].

use crate::capability::Capabilities;
use crate::error::{Error, Result};
use crate::feature_set::FeatureSet;
use crate::handle::NodeHandle;
use serde::Serialize;
use std::fmt;

/// Factory producing a node instance for one feature set
pub type NodeFactory = fn(FeatureSet) -> Result<NodeHandle>;

/// Kind, default and constraints of a member variable
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MemberKind {
    Int { default: i32, min: i32, max: i32 },
    Float { default: f32, min: f32, max: f32 },
    Enum {
        default: usize,
        choices: &'static [&'static str],
    },
}

/// A value stored in a member variable
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum MemberValue {
    Int(i32),
    Float(f32),
    /// Index into the member's choices
    Enum(usize),
}

impl MemberValue {
    pub fn as_int(self) -> Option<i32> {
        match self {
            MemberValue::Int(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_float(self) -> Option<f32> {
        match self {
            MemberValue::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_enum(self) -> Option<usize> {
        match self {
            MemberValue::Enum(v) => Some(v),
            _ => None,
        }
    }
}

/// A declared parameter of a node type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberVariable {
    pub name: &'static str,
    #[serde(flatten)]
    pub kind: MemberKind,
    pub description: &'static str,
}

impl MemberVariable {
    pub fn int(name: &'static str, default: i32, min: i32, max: i32) -> Self {
        Self {
            name,
            kind: MemberKind::Int { default, min, max },
            description: "",
        }
    }

    pub fn float(name: &'static str, default: f32, min: f32, max: f32) -> Self {
        Self {
            name,
            kind: MemberKind::Float { default, min, max },
            description: "",
        }
    }

    pub fn enumeration(name: &'static str, default: usize, choices: &'static [&'static str]) -> Self {
        Self {
            name,
            kind: MemberKind::Enum { default, choices },
            description: "",
        }
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    pub fn default_value(&self) -> MemberValue {
        match self.kind {
            MemberKind::Int { default, .. } => MemberValue::Int(default),
            MemberKind::Float { default, .. } => MemberValue::Float(default),
            MemberKind::Enum { default, .. } => MemberValue::Enum(default),
        }
    }

    /// Check a value against this member's kind and constraints
    pub fn validate(&self, node: &'static str, value: MemberValue) -> Result<()> {
        match (&self.kind, value) {
            (MemberKind::Int { min, max, .. }, MemberValue::Int(v)) => {
                if v < *min || v > *max {
                    return Err(Error::invalid_parameter(
                        node,
                        self.name,
                        format!("{v} is outside [{min}, {max}]"),
                    ));
                }
                Ok(())
            }
            (MemberKind::Float { min, max, .. }, MemberValue::Float(v)) => {
                if !v.is_finite() {
                    return Err(Error::invalid_parameter(node, self.name, "must be finite"));
                }
                if v < *min || v > *max {
                    return Err(Error::invalid_parameter(
                        node,
                        self.name,
                        format!("{v} is outside [{min}, {max}]"),
                    ));
                }
                Ok(())
            }
            (MemberKind::Enum { choices, .. }, MemberValue::Enum(v)) => {
                if v >= choices.len() {
                    return Err(Error::invalid_parameter(
                        node,
                        self.name,
                        format!("choice {v} out of {} options", choices.len()),
                    ));
                }
                Ok(())
            }
            (kind, value) => Err(Error::invalid_parameter(
                node,
                self.name,
                format!("expected {} value, got {value:?}", kind_name(kind)),
            )),
        }
    }
}

fn kind_name(kind: &MemberKind) -> &'static str {
    match kind {
        MemberKind::Int { .. } => "an integer",
        MemberKind::Float { .. } => "a float",
        MemberKind::Enum { .. } => "an enum",
    }
}

/// A node-reference parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceSlot {
    pub name: &'static str,
    /// Capabilities a child must expose to be attached here
    pub requires: Capabilities,
}

/// Descriptor for one node type
#[derive(Serialize)]
pub struct Metadata {
    pub name: &'static str,
    pub groups: Vec<&'static str>,
    pub description: &'static str,
    pub capabilities: Capabilities,
    pub members: Vec<MemberVariable>,
    pub sources: Vec<SourceSlot>,
    /// Levels this node type has implementations for
    pub feature_sets: Vec<FeatureSet>,
    #[serde(skip)]
    factory: NodeFactory,
}

impl fmt::Debug for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Metadata")
            .field("name", &self.name)
            .field("groups", &self.groups)
            .field("capabilities", &self.capabilities)
            .field("members", &self.members)
            .field("sources", &self.sources)
            .field("feature_sets", &self.feature_sets)
            .finish_non_exhaustive()
    }
}

impl Metadata {
    pub fn builder(name: &'static str, factory: NodeFactory) -> MetadataBuilder {
        MetadataBuilder {
            metadata: Metadata {
                name,
                groups: Vec::new(),
                description: "",
                capabilities: Capabilities::GENERATOR,
                members: Vec::new(),
                sources: Vec::new(),
                feature_sets: FeatureSet::compiled(),
                factory,
            },
        }
    }

    pub fn member(&self, name: &str) -> Option<&MemberVariable> {
        self.members.iter().find(|m| m.name == name)
    }

    pub fn source(&self, name: &str) -> Option<&SourceSlot> {
        self.sources.iter().find(|s| s.name == name)
    }

    pub fn supports(&self, feature_set: FeatureSet) -> bool {
        self.feature_sets.contains(&feature_set)
    }

    /// Instantiate this node type for a feature set
    ///
    /// Fails with [`Error::UnsupportedFeatureSet`] when the type has no
    /// implementation at that level and [`Error::FeatureSetUnavailable`] when
    /// the running processor cannot execute it. Never downgrades.
    pub fn create_node(&self, feature_set: FeatureSet) -> Result<NodeHandle> {
        if !self.supports(feature_set) {
            return Err(Error::UnsupportedFeatureSet {
                node: self.name,
                requested: feature_set,
            });
        }
        let handle = (self.factory)(feature_set)?;
        log::debug!("Created '{}' node at {}", self.name, feature_set);
        Ok(handle)
    }

    /// Instantiate at the process-wide resolved feature set
    pub fn create_node_auto(&self) -> Result<NodeHandle> {
        self.create_node(crate::config::resolved_feature_set())
    }
}

/// Fluent construction of a [`Metadata`] descriptor
pub struct MetadataBuilder {
    metadata: Metadata,
}

impl MetadataBuilder {
    pub fn group(mut self, group: &'static str) -> Self {
        self.metadata.groups.push(group);
        self
    }

    pub fn description(mut self, description: &'static str) -> Self {
        self.metadata.description = description;
        self
    }

    pub fn capabilities(mut self, capabilities: Capabilities) -> Self {
        self.metadata.capabilities = capabilities;
        self
    }

    pub fn member(mut self, member: MemberVariable) -> Self {
        self.metadata.members.push(member);
        self
    }

    pub fn source(mut self, name: &'static str, requires: Capabilities) -> Self {
        self.metadata.sources.push(SourceSlot { name, requires });
        self
    }

    /// Restrict the levels this node type is implemented for
    pub fn feature_sets(mut self, feature_sets: &[FeatureSet]) -> Self {
        self.metadata.feature_sets = feature_sets
            .iter()
            .copied()
            .filter(|l| l.is_compiled())
            .collect();
        self
    }

    pub fn build(self) -> Metadata {
        self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_factory(feature_set: FeatureSet) -> Result<NodeHandle> {
        Err(Error::UnsupportedFeatureSet {
            node: "Test",
            requested: feature_set,
        })
    }

    #[test]
    fn test_int_validation() {
        let octaves = MemberVariable::int("Octaves", 3, 1, 16);
        assert!(octaves.validate("Fractal", MemberValue::Int(1)).is_ok());
        assert!(octaves.validate("Fractal", MemberValue::Int(16)).is_ok());
        assert!(matches!(
            octaves.validate("Fractal", MemberValue::Int(17)),
            Err(Error::InvalidParameter { .. })
        ));
        assert!(matches!(
            octaves.validate("Fractal", MemberValue::Float(3.0)),
            Err(Error::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_float_validation_rejects_non_finite() {
        let freq = MemberVariable::float("Frequency", 0.01, f32::MIN, f32::MAX);
        assert!(freq.validate("Simplex", MemberValue::Float(0.05)).is_ok());
        assert!(freq.validate("Simplex", MemberValue::Float(f32::NAN)).is_err());
        assert!(freq
            .validate("Simplex", MemberValue::Float(f32::INFINITY))
            .is_err());
    }

    #[test]
    fn test_enum_validation() {
        let scheme = MemberVariable::enumeration("Scheme", 0, &["A", "B"]);
        assert!(scheme.validate("Warp", MemberValue::Enum(1)).is_ok());
        assert!(scheme.validate("Warp", MemberValue::Enum(2)).is_err());
        assert_eq!(scheme.default_value(), MemberValue::Enum(0));
    }

    #[test]
    fn test_builder_records_schema() {
        let meta = Metadata::builder("Test", no_factory)
            .group("Testing")
            .description("A test node")
            .capabilities(Capabilities::GENERATOR | Capabilities::RANGED)
            .member(MemberVariable::float("Gain", 0.5, 0.0, 1.0).describe("Octave gain"))
            .source("Source", Capabilities::GENERATOR)
            .build();

        assert_eq!(meta.groups, vec!["Testing"]);
        assert_eq!(meta.member("Gain").map(|m| m.description), Some("Octave gain"));
        assert!(meta.member("Lacunarity").is_none());
        assert_eq!(
            meta.source("Source").map(|s| s.requires),
            Some(Capabilities::GENERATOR)
        );
        assert!(meta.supports(FeatureSet::Scalar));
    }

    #[test]
    fn test_create_node_rejects_unimplemented_levels() {
        let meta = Metadata::builder("ScalarOnly", no_factory)
            .feature_sets(&[FeatureSet::Scalar])
            .build();
        assert!(!meta.supports(FeatureSet::Avx2));
        match meta.create_node(FeatureSet::Avx2) {
            Err(Error::UnsupportedFeatureSet { node, requested }) => {
                assert_eq!(node, "ScalarOnly");
                assert_eq!(requested, FeatureSet::Avx2);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_metadata_serializes_without_factory() {
        let meta = Metadata::builder("Test", no_factory)
            .member(MemberVariable::int("Octaves", 3, 1, 16))
            .build();
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["name"], "Test");
        assert_eq!(json["members"][0]["kind"], "int");
        assert_eq!(json["members"][0]["default"], 3);
        assert!(json.get("factory").is_none());
    }
}
