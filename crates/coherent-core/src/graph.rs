//! Validated node trees
//!
//! A [`NodeHandle`] may be evaluated while source slots are still empty
//! (they read as zero). A [`NodeGraph`] is the finished form: every slot in
//! the tree is filled, and composition already guaranteed a single feature
//! set and matching capabilities.

use crate::batch::OutputMinMax;
use crate::error::{Error, Result};
use crate::feature_set::FeatureSet;
use crate::handle::NodeHandle;

#[derive(Debug)]
pub struct NodeGraph {
    root: NodeHandle,
}

impl NodeGraph {
    /// Wrap a fully connected tree
    pub fn new(root: NodeHandle) -> Result<Self> {
        if let Some((node, slot)) = root.first_missing_source() {
            return Err(Error::MissingSource {
                node,
                slot: slot.to_string(),
            });
        }
        log::debug!("Built graph rooted at '{}' ({})", root.name(), root.feature_set());
        Ok(Self { root })
    }

    pub fn root(&self) -> &NodeHandle {
        &self.root
    }

    pub fn into_root(self) -> NodeHandle {
        self.root
    }

    pub fn feature_set(&self) -> FeatureSet {
        self.root.feature_set()
    }

    pub fn output_range(&self) -> Option<(f32, f32)> {
        self.root.output_range()
    }

    pub fn gen_single_2d(&self, x: f32, y: f32, seed: i32) -> f32 {
        self.root.gen_single_2d(x, y, seed)
    }

    pub fn gen_single_3d(&self, x: f32, y: f32, z: f32, seed: i32) -> f32 {
        self.root.gen_single_3d(x, y, z, seed)
    }

    pub fn gen_single_4d(&self, x: f32, y: f32, z: f32, w: f32, seed: i32) -> f32 {
        self.root.gen_single_4d(x, y, z, w, seed)
    }

    pub fn gen_position_array_2d(
        &self,
        out: &mut [f32],
        xs: &[f32],
        ys: &[f32],
        offset: [f32; 2],
        seed: i32,
    ) -> OutputMinMax {
        self.root.gen_position_array_2d(out, xs, ys, offset, seed)
    }

    pub fn gen_position_array_3d(
        &self,
        out: &mut [f32],
        xs: &[f32],
        ys: &[f32],
        zs: &[f32],
        offset: [f32; 3],
        seed: i32,
    ) -> OutputMinMax {
        self.root.gen_position_array_3d(out, xs, ys, zs, offset, seed)
    }

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
        self.root
            .gen_position_array_4d(out, xs, ys, zs, ws, offset, seed)
    }

    pub fn gen_uniform_grid_2d(
        &self,
        out: &mut [f32],
        start: [i32; 2],
        size: [usize; 2],
        frequency: f32,
        seed: i32,
    ) -> OutputMinMax {
        self.root.gen_uniform_grid_2d(out, start, size, frequency, seed)
    }

    pub fn gen_uniform_grid_3d(
        &self,
        out: &mut [f32],
        start: [i32; 3],
        size: [usize; 3],
        frequency: f32,
        seed: i32,
    ) -> OutputMinMax {
        self.root.gen_uniform_grid_3d(out, start, size, frequency, seed)
    }

    #[cfg(feature = "parallel")]
    pub fn gen_uniform_grid_2d_par(
        &self,
        out: &mut [f32],
        start: [i32; 2],
        size: [usize; 2],
        frequency: f32,
        seed: i32,
    ) -> OutputMinMax {
        self.root
            .gen_uniform_grid_2d_par(out, start, size, frequency, seed)
    }
}

impl TryFrom<NodeHandle> for NodeGraph {
    type Error = Error;

    fn try_from(root: NodeHandle) -> Result<Self> {
        Self::new(root)
    }
}
