//! Capability interfaces a node type may implement
//!
//! Capabilities are independent traits rather than one base hierarchy. A node
//! type implements any subset and exposes them through the interface casts
//! on [`Node`]; a cast for a capability the type lacks returns `None`.
//!
//! All evaluation methods take and return [`Lanes`], so one implementation
//! serves every vector width.

use crate::error::Result;
use crate::level::Level;
use crate::lanes::Lanes;
use crate::metadata::{Metadata, MemberValue};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Capability set declared by a node type
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Capabilities: u8 {
        /// Produces a scalar field
        const GENERATOR   = 1 << 0;
        /// Accepts a frequency scale
        const SCALABLE    = 1 << 1;
        /// Declares a bounded output range
        const RANGED      = 1 << 2;
        /// Transforms input coordinates
        const DOMAIN_WARP = 1 << 3;
    }
}

/// Produces a scalar field over 2 to 4 dimensions
pub trait Generator<S: Lanes>: Send + Sync {
    fn gen_2d(&self, seed: i32, x: S, y: S) -> S;

    fn gen_3d(&self, seed: i32, x: S, y: S, z: S) -> S;

    fn gen_4d(&self, seed: i32, x: S, y: S, z: S, w: S) -> S;
}

/// A generator whose input coordinates are scaled by a frequency
pub trait ScalableGenerator<S: Lanes>: Generator<S> {
    fn frequency(&self) -> f32;

    fn set_frequency(&mut self, frequency: f32);
}

/// A generator with a conservative output bound
pub trait RangedGenerator<S: Lanes>: Generator<S> {
    /// Inclusive `(min, max)` holding for every finite input
    fn output_range(&self) -> (f32, f32);
}

/// Perturbs coordinates before they reach a wrapped generator
///
/// `warp_*` returns the displaced coordinate and never a final sample.
/// `gen_source_*` evaluates the wrapped generator at a coordinate that has
/// already been warped, which lets warp chains apply several displacements
/// before a single source lookup.
pub trait DomainWarp<S: Lanes>: Generator<S> {
    /// Strength this node applies when evaluated as a generator
    fn warp_amplitude(&self) -> f32;

    fn warp_2d(&self, seed: i32, strength: [S; 2], pos: [S; 2]) -> [S; 2];

    fn warp_3d(&self, seed: i32, strength: [S; 3], pos: [S; 3]) -> [S; 3];

    fn warp_4d(&self, seed: i32, strength: [S; 4], pos: [S; 4]) -> [S; 4];

    fn gen_source_2d(&self, seed: i32, pos: [S; 2]) -> S;

    fn gen_source_3d(&self, seed: i32, pos: [S; 3]) -> S;

    fn gen_source_4d(&self, seed: i32, pos: [S; 4]) -> S;
}

/// A node instance specialized for one feature-set level
///
/// Children are held as `Box<dyn Node<L>>`, so every node in a tree shares
/// the same `L` and therefore the same vector width.
pub trait Node<L: Level>: Send + Sync + 'static {
    fn metadata(&self) -> &'static Metadata;

    fn as_generator(&self) -> &dyn Generator<L::Lanes>;

    fn as_scalable(&self) -> Option<&dyn ScalableGenerator<L::Lanes>> {
        None
    }

    fn as_ranged(&self) -> Option<&dyn RangedGenerator<L::Lanes>> {
        None
    }

    fn as_domain_warp(&self) -> Option<&dyn DomainWarp<L::Lanes>> {
        None
    }

    /// Current value of a declared member
    fn member(&self, name: &str) -> Option<MemberValue>;

    /// Store an already validated member value
    fn set_member(&mut self, name: &str, value: MemberValue) -> Result<()>;

    /// Node attached to a source slot, if any
    fn source(&self, _slot: &str) -> Option<&dyn Node<L>> {
        None
    }

    /// Attach a node to a source slot, replacing any previous one
    fn set_source(&mut self, slot: &str, _child: Box<dyn Node<L>>) -> Result<()> {
        Err(crate::Error::unknown_source(self.metadata().name, slot))
    }

    /// Capabilities this instance actually exposes
    fn capabilities(&self) -> Capabilities {
        let mut caps = Capabilities::GENERATOR;
        if self.as_scalable().is_some() {
            caps |= Capabilities::SCALABLE;
        }
        if self.as_ranged().is_some() {
            caps |= Capabilities::RANGED;
        }
        if self.as_domain_warp().is_some() {
            caps |= Capabilities::DOMAIN_WARP;
        }
        caps
    }
}

/// Evaluate an optional child as a generator, yielding zero when unset
#[inline(always)]
pub fn gen_or_zero_2d<L: Level>(node: Option<&dyn Node<L>>, seed: i32, pos: [L::Lanes; 2]) -> L::Lanes {
    match node {
        Some(node) => node.as_generator().gen_2d(seed, pos[0], pos[1]),
        None => L::Lanes::splat(0.0),
    }
}

#[inline(always)]
pub fn gen_or_zero_3d<L: Level>(node: Option<&dyn Node<L>>, seed: i32, pos: [L::Lanes; 3]) -> L::Lanes {
    match node {
        Some(node) => node.as_generator().gen_3d(seed, pos[0], pos[1], pos[2]),
        None => L::Lanes::splat(0.0),
    }
}

#[inline(always)]
pub fn gen_or_zero_4d<L: Level>(node: Option<&dyn Node<L>>, seed: i32, pos: [L::Lanes; 4]) -> L::Lanes {
    match node {
        Some(node) => node
            .as_generator()
            .gen_4d(seed, pos[0], pos[1], pos[2], pos[3]),
        None => L::Lanes::splat(0.0),
    }
}
