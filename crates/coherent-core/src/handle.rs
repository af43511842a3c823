//! Type-erased node instances
//!
//! [`NodeHandle`] hides the concrete node type and its feature-set level
//! behind one uniform value. Capability queries go through the wrapped
//! instance's interface casts, and composition re-checks at runtime what
//! static composition checks at compile time: same feature set, required
//! capabilities present.
//!
//! A [`NodeFamily`] supplies the one generic constructor per node type;
//! [`create_for`] is the single place that branches on [`FeatureSet`].

use crate::batch::{self, Coords, OutputMinMax};
use crate::capability::{Capabilities, Node};
use crate::error::{Error, Result};
use crate::feature_set::FeatureSet;
use crate::level::{Level, ScalarLevel};
use crate::metadata::{MemberKind, MemberValue, Metadata};
use std::any::Any;
use std::fmt;

/// A node type with one implementation per feature-set level
pub trait NodeFamily: 'static {
    fn metadata() -> &'static Metadata;

    /// Construct an instance with default member values
    fn build<L: Level>(level: L) -> Box<dyn Node<L>>;
}

/// Build `F` at level `L` if the running processor supports it
fn instantiate<F: NodeFamily, L: Level>() -> Result<NodeHandle> {
    let level = L::detect().ok_or_else(|| Error::FeatureSetUnavailable {
        node: F::metadata().name,
        requested: L::FEATURE_SET,
        best: FeatureSet::best_available(),
    })?;
    Ok(NodeHandle::from_node(level, F::build(level)))
}

/// Instantiate `F` for a feature set
///
/// Fails with [`Error::FeatureSetUnavailable`] if the running processor
/// cannot execute the level and [`Error::UnsupportedFeatureSet`] if the level
/// is not compiled into this build.
pub fn create_for<F: NodeFamily>(feature_set: FeatureSet) -> Result<NodeHandle> {
    match feature_set {
        FeatureSet::Scalar => instantiate::<F, ScalarLevel>(),
        #[cfg(target_arch = "x86_64")]
        FeatureSet::Sse2 => instantiate::<F, crate::level::Sse2Level>(),
        #[cfg(target_arch = "x86_64")]
        FeatureSet::Sse41 => instantiate::<F, crate::level::Sse41Level>(),
        #[cfg(target_arch = "x86_64")]
        FeatureSet::Avx2 => instantiate::<F, crate::level::Avx2Level>(),
        #[cfg(all(target_arch = "x86_64", feature = "avx512"))]
        FeatureSet::Avx512 => instantiate::<F, crate::level::Avx512Level>(),
        #[cfg(target_arch = "aarch64")]
        FeatureSet::Neon => instantiate::<F, crate::level::NeonLevel>(),
        #[allow(unreachable_patterns)]
        _ => Err(Error::UnsupportedFeatureSet {
            node: F::metadata().name,
            requested: feature_set,
        }),
    }
}

/// Object-safe view of an [`Instance`] at any level
trait ErasedNode: Send + Sync {
    fn feature_set(&self) -> FeatureSet;

    fn metadata(&self) -> &'static Metadata;

    fn capabilities(&self) -> Capabilities;

    fn output_range(&self) -> Option<(f32, f32)>;

    fn member(&self, name: &str) -> Option<MemberValue>;

    fn set_member(&mut self, name: &str, value: MemberValue) -> Result<()>;

    fn has_source(&self, slot: &str) -> bool;

    fn attach(&mut self, slot: &str, child: Box<dyn ErasedNode>) -> Result<()>;

    fn first_missing_source(&self) -> Option<(&'static str, &'static str)>;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    fn fill_2d(&self, seed: i32, out: &mut [f32], coords: Coords<'_, 2>) -> OutputMinMax;

    fn fill_3d(&self, seed: i32, out: &mut [f32], coords: Coords<'_, 3>) -> OutputMinMax;

    fn fill_4d(&self, seed: i32, out: &mut [f32], coords: Coords<'_, 4>) -> OutputMinMax;
}

/// A node tree root specialized for level `L`
struct Instance<L: Level> {
    level: L,
    node: Box<dyn Node<L>>,
}

fn first_missing<L: Level>(node: &dyn Node<L>) -> Option<(&'static str, &'static str)> {
    let metadata = node.metadata();
    for slot in &metadata.sources {
        match node.source(slot.name) {
            Some(child) => {
                if let Some(missing) = first_missing(child) {
                    return Some(missing);
                }
            }
            None => return Some((metadata.name, slot.name)),
        }
    }
    None
}

impl<L: Level> ErasedNode for Instance<L> {
    fn feature_set(&self) -> FeatureSet {
        L::FEATURE_SET
    }

    fn metadata(&self) -> &'static Metadata {
        self.node.metadata()
    }

    fn capabilities(&self) -> Capabilities {
        self.node.capabilities()
    }

    fn output_range(&self) -> Option<(f32, f32)> {
        self.node.as_ranged().map(|ranged| ranged.output_range())
    }

    fn member(&self, name: &str) -> Option<MemberValue> {
        self.node.member(name)
    }

    fn set_member(&mut self, name: &str, value: MemberValue) -> Result<()> {
        self.node.set_member(name, value)
    }

    fn has_source(&self, slot: &str) -> bool {
        self.node.source(slot).is_some()
    }

    fn attach(&mut self, slot: &str, child: Box<dyn ErasedNode>) -> Result<()> {
        let child_name = child.metadata().name;
        let child_level = child.feature_set();
        match child.into_any().downcast::<Instance<L>>() {
            Ok(child) => self.node.set_source(slot, child.node),
            Err(_) => Err(Error::FeatureSetMismatch {
                parent: self.node.metadata().name,
                parent_level: L::FEATURE_SET,
                child: child_name,
                child_level,
            }),
        }
    }

    fn first_missing_source(&self) -> Option<(&'static str, &'static str)> {
        first_missing(self.node.as_ref())
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn fill_2d(&self, seed: i32, out: &mut [f32], coords: Coords<'_, 2>) -> OutputMinMax {
        let generator = self.node.as_generator();
        self.level.run(|| {
            batch::fill_coords::<L::Lanes, 2>(out, coords, |[x, y]| generator.gen_2d(seed, x, y))
        })
    }

    fn fill_3d(&self, seed: i32, out: &mut [f32], coords: Coords<'_, 3>) -> OutputMinMax {
        let generator = self.node.as_generator();
        self.level.run(|| {
            batch::fill_coords::<L::Lanes, 3>(out, coords, |[x, y, z]| {
                generator.gen_3d(seed, x, y, z)
            })
        })
    }

    fn fill_4d(&self, seed: i32, out: &mut [f32], coords: Coords<'_, 4>) -> OutputMinMax {
        let generator = self.node.as_generator();
        self.level.run(|| {
            batch::fill_coords::<L::Lanes, 4>(out, coords, |[x, y, z, w]| {
                generator.gen_4d(seed, x, y, z, w)
            })
        })
    }
}

/// A node instance of unknown type, specialized for one feature set
pub struct NodeHandle {
    inner: Box<dyn ErasedNode>,
}

impl fmt::Debug for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeHandle")
            .field("node", &self.name())
            .field("feature_set", &self.feature_set())
            .finish()
    }
}

impl NodeHandle {
    fn from_node<L: Level>(level: L, node: Box<dyn Node<L>>) -> Self {
        Self {
            inner: Box::new(Instance { level, node }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.inner.metadata().name
    }

    pub fn metadata(&self) -> &'static Metadata {
        self.inner.metadata()
    }

    /// Level chosen at creation; never changes
    pub fn feature_set(&self) -> FeatureSet {
        self.inner.feature_set()
    }

    pub fn capabilities(&self) -> Capabilities {
        self.inner.capabilities()
    }

    /// Declared output bound, `None` for nodes that are not range-bounded
    pub fn output_range(&self) -> Option<(f32, f32)> {
        self.inner.output_range()
    }

    pub fn member(&self, name: &str) -> Option<MemberValue> {
        self.inner.member(name)
    }

    /// Set a member after validating it against the node's schema
    pub fn set_member(&mut self, name: &str, value: MemberValue) -> Result<()> {
        let metadata = self.metadata();
        let member = metadata
            .member(name)
            .ok_or_else(|| Error::unknown_member(metadata.name, name))?;
        member.validate(metadata.name, value)?;
        self.inner.set_member(name, value)?;
        log::trace!("Set '{}'.'{}' = {:?}", metadata.name, name, value);
        Ok(())
    }

    pub fn set_float(&mut self, name: &str, value: f32) -> Result<()> {
        self.set_member(name, MemberValue::Float(value))
    }

    pub fn set_int(&mut self, name: &str, value: i32) -> Result<()> {
        self.set_member(name, MemberValue::Int(value))
    }

    /// Set an enum member by choice name, compared case-insensitively
    pub fn set_enum(&mut self, name: &str, choice: &str) -> Result<()> {
        let metadata = self.metadata();
        let member = metadata
            .member(name)
            .ok_or_else(|| Error::unknown_member(metadata.name, name))?;
        let MemberKind::Enum { choices, .. } = &member.kind else {
            return Err(Error::invalid_parameter(
                metadata.name,
                name,
                "not an enum member",
            ));
        };
        let index = choices
            .iter()
            .position(|c| c.eq_ignore_ascii_case(choice))
            .ok_or_else(|| {
                Error::invalid_parameter(
                    metadata.name,
                    name,
                    format!("unknown choice '{choice}', expected one of {choices:?}"),
                )
            })?;
        self.set_member(name, MemberValue::Enum(index))
    }

    pub fn has_source(&self, slot: &str) -> bool {
        self.inner.has_source(slot)
    }

    /// Attach `child` to a source slot, replacing any previous child
    ///
    /// The child is consumed even when attaching fails.
    pub fn set_source(&mut self, slot: &str, child: NodeHandle) -> Result<()> {
        let metadata = self.metadata();
        let required = metadata
            .source(slot)
            .ok_or_else(|| Error::unknown_source(metadata.name, slot))?
            .requires;

        if child.feature_set() != self.feature_set() {
            return Err(Error::FeatureSetMismatch {
                parent: metadata.name,
                parent_level: self.feature_set(),
                child: child.name(),
                child_level: child.feature_set(),
            });
        }

        let provided = child.capabilities();
        if !provided.contains(required) {
            return Err(Error::CapabilityMismatch {
                node: metadata.name,
                slot: slot.to_string(),
                child: child.name(),
                required,
                provided,
            });
        }

        log::debug!(
            "Attached '{}' to '{}'.'{}' at {}",
            child.name(),
            metadata.name,
            slot,
            self.feature_set()
        );
        self.inner.attach(slot, child.inner)
    }

    /// First unfilled source slot in this tree, as `(node, slot)`
    pub fn first_missing_source(&self) -> Option<(&'static str, &'static str)> {
        self.inner.first_missing_source()
    }

    pub fn gen_single_2d(&self, x: f32, y: f32, seed: i32) -> f32 {
        let mut out = [0.0f32];
        self.inner.fill_2d(seed, &mut out, Coords::Single([x, y]));
        out[0]
    }

    pub fn gen_single_3d(&self, x: f32, y: f32, z: f32, seed: i32) -> f32 {
        let mut out = [0.0f32];
        self.inner.fill_3d(seed, &mut out, Coords::Single([x, y, z]));
        out[0]
    }

    pub fn gen_single_4d(&self, x: f32, y: f32, z: f32, w: f32, seed: i32) -> f32 {
        let mut out = [0.0f32];
        self.inner.fill_4d(seed, &mut out, Coords::Single([x, y, z, w]));
        out[0]
    }

    /// Evaluate at `(xs[i] + offset[0], ys[i] + offset[1])` for every `i`
    ///
    /// # Panics
    /// If the coordinate slices and `out` differ in length.
    pub fn gen_position_array_2d(
        &self,
        out: &mut [f32],
        xs: &[f32],
        ys: &[f32],
        offset: [f32; 2],
        seed: i32,
    ) -> OutputMinMax {
        assert_eq!(xs.len(), out.len(), "x coordinate count must match output");
        assert_eq!(ys.len(), out.len(), "y coordinate count must match output");
        let axes = [xs, ys];
        self.inner.fill_2d(seed, out, Coords::Positions { axes, offset })
    }

    /// # Panics
    /// If the coordinate slices and `out` differ in length.
    pub fn gen_position_array_3d(
        &self,
        out: &mut [f32],
        xs: &[f32],
        ys: &[f32],
        zs: &[f32],
        offset: [f32; 3],
        seed: i32,
    ) -> OutputMinMax {
        assert_eq!(xs.len(), out.len(), "x coordinate count must match output");
        assert_eq!(ys.len(), out.len(), "y coordinate count must match output");
        assert_eq!(zs.len(), out.len(), "z coordinate count must match output");
        let axes = [xs, ys, zs];
        self.inner.fill_3d(seed, out, Coords::Positions { axes, offset })
    }

    /// # Panics
    /// If the coordinate slices and `out` differ in length.
    #[allow(clippy::too_many_arguments)]
    pub fn gen_position_array_4d(
        &self,
        out: &mut [f32],
        xs: &[f32],
        ys: &[f32],
        zs: &[f32],
        ws: &[f32],
        offset: [f32; 4],
        seed: i32,
    ) -> OutputMinMax {
        assert_eq!(xs.len(), out.len(), "x coordinate count must match output");
        assert_eq!(ys.len(), out.len(), "y coordinate count must match output");
        assert_eq!(zs.len(), out.len(), "z coordinate count must match output");
        assert_eq!(ws.len(), out.len(), "w coordinate count must match output");
        let axes = [xs, ys, zs, ws];
        self.inner.fill_4d(seed, out, Coords::Positions { axes, offset })
    }

    /// Evaluate a row-major grid of integer cells scaled by `frequency`
    ///
    /// # Panics
    /// If `out` does not hold exactly `size[0] * size[1]` samples.
    pub fn gen_uniform_grid_2d(
        &self,
        out: &mut [f32],
        start: [i32; 2],
        size: [usize; 2],
        frequency: f32,
        seed: i32,
    ) -> OutputMinMax {
        assert_eq!(out.len(), size[0] * size[1], "output must hold the full grid");
        let cells = Coords::Grid {
            start,
            size,
            frequency,
        };
        self.inner.fill_2d(seed, out, cells)
    }

    /// # Panics
    /// If `out` does not hold exactly `size[0] * size[1] * size[2]` samples.
    pub fn gen_uniform_grid_3d(
        &self,
        out: &mut [f32],
        start: [i32; 3],
        size: [usize; 3],
        frequency: f32,
        seed: i32,
    ) -> OutputMinMax {
        assert_eq!(
            out.len(),
            size[0] * size[1] * size[2],
            "output must hold the full grid"
        );
        let cells = Coords::Grid {
            start,
            size,
            frequency,
        };
        self.inner.fill_3d(seed, out, cells)
    }

    /// Row-parallel [`gen_uniform_grid_2d`](Self::gen_uniform_grid_2d)
    #[cfg(feature = "parallel")]
    pub fn gen_uniform_grid_2d_par(
        &self,
        out: &mut [f32],
        start: [i32; 2],
        size: [usize; 2],
        frequency: f32,
        seed: i32,
    ) -> OutputMinMax {
        use rayon::prelude::*;

        assert_eq!(out.len(), size[0] * size[1], "output must hold the full grid");
        if size[0] == 0 {
            return OutputMinMax::default();
        }
        out.par_chunks_mut(size[0])
            .enumerate()
            .map(|(row, chunk)| {
                let row_start = [start[0], start[1].wrapping_add(row as i32)];
                self.gen_uniform_grid_2d(chunk, row_start, [size[0], 1], frequency, seed)
            })
            .reduce(OutputMinMax::default, OutputMinMax::merge)
    }
}
