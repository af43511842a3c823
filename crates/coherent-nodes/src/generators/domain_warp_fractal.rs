//! Progressive fractal domain warp
//!
//! Each octave warps the coordinate produced by the previous octave, at a
//! higher frequency and lower strength. The octave chain therefore composes
//! outermost first, and the final coordinate is handed to the wrapped warp's
//! own source.

use super::fractal::FractalParams;
use coherent_core::{
    create_for, Capabilities, DomainWarp, Error, Generator, Lanes, Level, Metadata, MemberValue,
    Node, NodeFamily, Result,
};
use lazy_static::lazy_static;

const NAME: &str = "DomainWarpFractalProgressive";
const WARP_SOURCE: &str = "Domain Warp Source";

lazy_static! {
    static ref METADATA: Metadata = {
        let [octaves, gain, lacunarity] = FractalParams::members();
        Metadata::builder(NAME, create_for::<DomainWarpFractalProgressive>)
            .group("Domain Warp")
            .group("Fractal")
            .description("Repeats a domain warp over octaves, each warping the previous result")
            .capabilities(Capabilities::GENERATOR | Capabilities::DOMAIN_WARP)
            .member(octaves)
            .member(gain)
            .member(lacunarity)
            .source(WARP_SOURCE, Capabilities::DOMAIN_WARP)
            .build()
    };
}

/// Progressive fractal domain warp node type
pub struct DomainWarpFractalProgressive;

impl NodeFamily for DomainWarpFractalProgressive {
    fn metadata() -> &'static Metadata {
        &METADATA
    }

    fn build<L: Level>(level: L) -> Box<dyn Node<L>> {
        Box::new(DomainWarpFractalProgressiveNode::new(level))
    }
}

pub struct DomainWarpFractalProgressiveNode<L: Level> {
    level: L,
    source: Option<Box<dyn Node<L>>>,
    fractal: FractalParams,
}

impl<L: Level> DomainWarpFractalProgressiveNode<L> {
    pub fn new(level: L) -> Self {
        Self {
            level,
            source: None,
            fractal: FractalParams::default(),
        }
    }

    /// Attach the warp repeated at every octave
    pub fn with_source<W>(mut self, source: W) -> Self
    where
        W: Node<L> + DomainWarp<L::Lanes>,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn with_fractal(mut self, fractal: FractalParams) -> Self {
        self.fractal = fractal;
        self
    }

    fn warp_source(&self) -> Option<&dyn DomainWarp<L::Lanes>> {
        self.source.as_deref().and_then(|source| source.as_domain_warp())
    }

    #[inline(always)]
    fn progressive<const N: usize>(
        &self,
        seed: i32,
        strength: [L::Lanes; N],
        pos: [L::Lanes; N],
        warp: impl Fn(i32, [L::Lanes; N], [L::Lanes; N]) -> [L::Lanes; N],
    ) -> [L::Lanes; N] {
        let mut pos = pos;
        let mut octave_seed = seed;
        for (amplitude, frequency) in self.fractal.octaves() {
            // the offset is mapped back through 1 / frequency
            if !frequency.is_normal() {
                break;
            }
            let f = L::Lanes::splat(frequency);
            let a = L::Lanes::splat(amplitude);
            let sample = pos.map(|p| p * f);
            let warped = warp(octave_seed, strength.map(|s| s * a), sample);
            for axis in 0..N {
                pos[axis] = pos[axis] + (warped[axis] - sample[axis]) / f;
            }
            octave_seed = octave_seed.wrapping_add(1);
        }
        pos
    }

    fn amplitude<const N: usize>(&self) -> [L::Lanes; N] {
        let amplitude = self.warp_amplitude();
        [L::Lanes::splat(amplitude); N]
    }
}

impl<L: Level> Generator<L::Lanes> for DomainWarpFractalProgressiveNode<L> {
    fn gen_2d(&self, seed: i32, x: L::Lanes, y: L::Lanes) -> L::Lanes {
        let pos = self.warp_2d(seed, self.amplitude(), [x, y]);
        self.gen_source_2d(seed, pos)
    }

    fn gen_3d(&self, seed: i32, x: L::Lanes, y: L::Lanes, z: L::Lanes) -> L::Lanes {
        let pos = self.warp_3d(seed, self.amplitude(), [x, y, z]);
        self.gen_source_3d(seed, pos)
    }

    fn gen_4d(&self, seed: i32, x: L::Lanes, y: L::Lanes, z: L::Lanes, w: L::Lanes) -> L::Lanes {
        let pos = self.warp_4d(seed, self.amplitude(), [x, y, z, w]);
        self.gen_source_4d(seed, pos)
    }
}

impl<L: Level> DomainWarp<L::Lanes> for DomainWarpFractalProgressiveNode<L> {
    fn warp_amplitude(&self) -> f32 {
        self.warp_source().map_or(0.0, |warp| warp.warp_amplitude())
    }

    fn warp_2d(&self, seed: i32, strength: [L::Lanes; 2], pos: [L::Lanes; 2]) -> [L::Lanes; 2] {
        match self.warp_source() {
            Some(warp) => self
                .level
                .run(|| self.progressive(seed, strength, pos, |s, a, p| warp.warp_2d(s, a, p))),
            None => pos,
        }
    }

    fn warp_3d(&self, seed: i32, strength: [L::Lanes; 3], pos: [L::Lanes; 3]) -> [L::Lanes; 3] {
        match self.warp_source() {
            Some(warp) => self
                .level
                .run(|| self.progressive(seed, strength, pos, |s, a, p| warp.warp_3d(s, a, p))),
            None => pos,
        }
    }

    fn warp_4d(&self, seed: i32, strength: [L::Lanes; 4], pos: [L::Lanes; 4]) -> [L::Lanes; 4] {
        match self.warp_source() {
            Some(warp) => self
                .level
                .run(|| self.progressive(seed, strength, pos, |s, a, p| warp.warp_4d(s, a, p))),
            None => pos,
        }
    }

    fn gen_source_2d(&self, seed: i32, pos: [L::Lanes; 2]) -> L::Lanes {
        self.warp_source()
            .map_or(L::Lanes::splat(0.0), |warp| warp.gen_source_2d(seed, pos))
    }

    fn gen_source_3d(&self, seed: i32, pos: [L::Lanes; 3]) -> L::Lanes {
        self.warp_source()
            .map_or(L::Lanes::splat(0.0), |warp| warp.gen_source_3d(seed, pos))
    }

    fn gen_source_4d(&self, seed: i32, pos: [L::Lanes; 4]) -> L::Lanes {
        self.warp_source()
            .map_or(L::Lanes::splat(0.0), |warp| warp.gen_source_4d(seed, pos))
    }
}

impl<L: Level> Node<L> for DomainWarpFractalProgressiveNode<L> {
    fn metadata(&self) -> &'static Metadata {
        &METADATA
    }

    fn as_generator(&self) -> &dyn Generator<L::Lanes> {
        self
    }

    fn as_domain_warp(&self) -> Option<&dyn DomainWarp<L::Lanes>> {
        Some(self)
    }

    fn member(&self, name: &str) -> Option<MemberValue> {
        self.fractal.get(name)
    }

    fn set_member(&mut self, name: &str, value: MemberValue) -> Result<()> {
        self.fractal.set(NAME, name, value)
    }

    fn source(&self, slot: &str) -> Option<&dyn Node<L>> {
        match slot {
            WARP_SOURCE => self.source.as_deref(),
            _ => None,
        }
    }

    fn set_source(&mut self, slot: &str, child: Box<dyn Node<L>>) -> Result<()> {
        if slot != WARP_SOURCE {
            return Err(Error::unknown_source(NAME, slot));
        }
        if child.as_domain_warp().is_none() {
            return Err(Error::CapabilityMismatch {
                node: NAME,
                slot: slot.to_string(),
                child: child.metadata().name,
                required: Capabilities::DOMAIN_WARP,
                provided: child.capabilities(),
            });
        }
        tracing::trace!(child = child.metadata().name, "attaching progressive warp source");
        self.source = Some(child);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::{DomainWarpSimplexNode, SimplexNode, SimplexSmoothNode};
    use approx::assert_abs_diff_eq;
    use coherent_core::ScalarLevel;

    fn inner() -> DomainWarpSimplexNode<ScalarLevel> {
        DomainWarpSimplexNode::new(ScalarLevel)
            .with_warp_amplitude(4.0)
            .with_source(SimplexNode::new(ScalarLevel).with_frequency(0.05))
    }

    #[test]
    fn test_single_octave_matches_inner_warp() {
        let single = FractalParams {
            octaves: 1,
            ..FractalParams::default()
        };
        let fractal = DomainWarpFractalProgressiveNode::new(ScalarLevel)
            .with_fractal(single)
            .with_source(inner());
        let p = [3.5, -8.25];
        let a = fractal.warp_2d(2, [4.0, 4.0], p);
        let b = inner().warp_2d(2, [4.0, 4.0], p);
        assert_abs_diff_eq!(a[0], b[0], epsilon = 1e-5);
        assert_abs_diff_eq!(a[1], b[1], epsilon = 1e-5);
        assert_abs_diff_eq!(
            fractal.gen_2d(2, p[0], p[1]),
            inner().gen_2d(2, p[0], p[1]),
            epsilon = 1e-4
        );
    }

    #[test]
    fn test_octaves_chain_from_previous_output() {
        let two = FractalParams {
            octaves: 2,
            gain: 0.5,
            lacunarity: 2.0,
        };
        let fractal = DomainWarpFractalProgressiveNode::new(ScalarLevel)
            .with_fractal(two)
            .with_source(inner());

        let warp = inner();
        let p = [1.25, 6.5];
        let first = warp.warp_2d(7, [4.0, 4.0], p);
        let pos = [p[0] + (first[0] - p[0]), p[1] + (first[1] - p[1])];
        let sample = [pos[0] * 2.0, pos[1] * 2.0];
        let second = warp.warp_2d(8, [2.0, 2.0], sample);
        let expected = [
            pos[0] + (second[0] - sample[0]) / 2.0,
            pos[1] + (second[1] - sample[1]) / 2.0,
        ];
        assert_eq!(fractal.warp_2d(7, [4.0, 4.0], p), expected);
    }

    #[test]
    fn test_zero_lacunarity_stays_finite() {
        let smooth_warp = || {
            DomainWarpSimplexNode::new(ScalarLevel)
                .with_warp_amplitude(4.0)
                .with_source(SimplexSmoothNode::new(ScalarLevel).with_frequency(0.05))
        };
        let flat = DomainWarpFractalProgressiveNode::new(ScalarLevel)
            .with_fractal(FractalParams {
                octaves: 3,
                gain: 0.5,
                lacunarity: 0.0,
            })
            .with_source(smooth_warp());
        let single = DomainWarpFractalProgressiveNode::new(ScalarLevel)
            .with_fractal(FractalParams {
                octaves: 1,
                ..FractalParams::default()
            })
            .with_source(smooth_warp());

        for i in 0..64 {
            let p = [i as f32 * 0.83 - 20.0, i as f32 * 1.31, i as f32 * -0.4];
            let warped = flat.warp_3d(11, [4.0; 3], p);
            assert!(warped.iter().all(|v| v.is_finite()), "{warped:?} at {p:?}");
            assert_eq!(warped, single.warp_3d(11, [4.0; 3], p));
            assert!(flat.gen_3d(11, p[0], p[1], p[2]).is_finite());
        }
    }

    #[test]
    fn test_zero_octaves_is_identity() {
        let none = DomainWarpFractalProgressiveNode::new(ScalarLevel)
            .with_fractal(FractalParams {
                octaves: 0,
                ..FractalParams::default()
            })
            .with_source(inner());
        assert_eq!(none.warp_2d(3, [4.0; 2], [7.5, -1.5]), [7.5, -1.5]);
        assert_eq!(none.gen_2d(3, 7.5, -1.5), inner().gen_source_2d(3, [7.5, -1.5]));
    }

    #[test]
    fn test_amplitude_and_source_delegate_to_inner() {
        let fractal = DomainWarpFractalProgressiveNode::new(ScalarLevel).with_source(inner());
        assert_eq!(fractal.warp_amplitude(), 4.0);
        assert_eq!(fractal.gen_source_2d(0, [2.0, 3.0]), inner().gen_source_2d(0, [2.0, 3.0]));
    }

    #[test]
    fn test_rejects_plain_generator_source() {
        let mut fractal = DomainWarpFractalProgressiveNode::new(ScalarLevel);
        let err = fractal
            .set_source(WARP_SOURCE, Box::new(SimplexNode::new(ScalarLevel)))
            .unwrap_err();
        assert!(matches!(err, Error::CapabilityMismatch { .. }));
        assert!(fractal.source(WARP_SOURCE).is_none());

        fractal.set_source(WARP_SOURCE, Box::new(inner())).unwrap();
        assert!(fractal.source(WARP_SOURCE).is_some());
    }

    #[test]
    fn test_without_source_is_identity() {
        let fractal = DomainWarpFractalProgressiveNode::new(ScalarLevel);
        assert_eq!(fractal.warp_3d(0, [1.0; 3], [1.0, 2.0, 3.0]), [1.0, 2.0, 3.0]);
        assert_eq!(fractal.gen_2d(0, 1.0, 2.0), 0.0);
        assert_eq!(fractal.warp_amplitude(), 0.0);
    }
}
