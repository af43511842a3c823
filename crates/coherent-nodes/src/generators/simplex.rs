//! Simplex and SimplexSmooth gradient noise

use super::{expect_float, frequency_member, scaled, FREQUENCY};
use crate::kernels::{simplex, simplex_smooth};
use coherent_core::{
    create_for, Capabilities, Error, Generator, Lanes, Level, Metadata, MemberValue, Node,
    NodeFamily, RangedGenerator, Result, ScalableGenerator,
};
use lazy_static::lazy_static;

const SIMPLEX_RANGE: (f32, f32) = (-1.0, 1.0);

lazy_static! {
    static ref SIMPLEX_METADATA: Metadata = Metadata::builder("Simplex", create_for::<Simplex>)
        .group("Coherent Noise")
        .description(
            "Smooth gradient noise from an N dimensional simplex grid\n\
             Developed by Ken Perlin in 2001",
        )
        .capabilities(Capabilities::GENERATOR | Capabilities::SCALABLE | Capabilities::RANGED)
        .member(frequency_member())
        .build();
    static ref SIMPLEX_SMOOTH_METADATA: Metadata =
        Metadata::builder("SimplexSmooth", create_for::<SimplexSmooth>)
            .group("Coherent Noise")
            .description(
                "Smoother gradient noise from an N dimensional simplex grid\n\
                 Developed by K.jpg in 2017",
            )
            .capabilities(Capabilities::GENERATOR | Capabilities::SCALABLE)
            .member(frequency_member())
            .build();
}

/// Simplex noise node type
pub struct Simplex;

impl NodeFamily for Simplex {
    fn metadata() -> &'static Metadata {
        &SIMPLEX_METADATA
    }

    fn build<L: Level>(level: L) -> Box<dyn Node<L>> {
        Box::new(SimplexNode::new(level))
    }
}

/// Simplex noise clamped to `[-1, 1]`
#[derive(Debug, Clone)]
pub struct SimplexNode<L: Level> {
    level: L,
    frequency: f32,
}

impl<L: Level> SimplexNode<L> {
    pub fn new(level: L) -> Self {
        Self {
            level,
            frequency: super::DEFAULT_FREQUENCY,
        }
    }

    pub fn with_frequency(mut self, frequency: f32) -> Self {
        self.frequency = frequency;
        self
    }

    #[inline(always)]
    fn clamped<const N: usize>(&self, seed: i32, pos: [L::Lanes; N]) -> L::Lanes {
        simplex(seed, scaled(pos, self.frequency)).clamp(SIMPLEX_RANGE.0, SIMPLEX_RANGE.1)
    }
}

impl<L: Level> Generator<L::Lanes> for SimplexNode<L> {
    fn gen_2d(&self, seed: i32, x: L::Lanes, y: L::Lanes) -> L::Lanes {
        self.level.run(|| self.clamped(seed, [x, y]))
    }

    fn gen_3d(&self, seed: i32, x: L::Lanes, y: L::Lanes, z: L::Lanes) -> L::Lanes {
        self.level.run(|| self.clamped(seed, [x, y, z]))
    }

    fn gen_4d(&self, seed: i32, x: L::Lanes, y: L::Lanes, z: L::Lanes, w: L::Lanes) -> L::Lanes {
        self.level.run(|| self.clamped(seed, [x, y, z, w]))
    }
}

impl<L: Level> ScalableGenerator<L::Lanes> for SimplexNode<L> {
    fn frequency(&self) -> f32 {
        self.frequency
    }

    fn set_frequency(&mut self, frequency: f32) {
        self.frequency = frequency;
    }
}

impl<L: Level> RangedGenerator<L::Lanes> for SimplexNode<L> {
    fn output_range(&self) -> (f32, f32) {
        SIMPLEX_RANGE
    }
}

impl<L: Level> Node<L> for SimplexNode<L> {
    fn metadata(&self) -> &'static Metadata {
        &SIMPLEX_METADATA
    }

    fn as_generator(&self) -> &dyn Generator<L::Lanes> {
        self
    }

    fn as_scalable(&self) -> Option<&dyn ScalableGenerator<L::Lanes>> {
        Some(self)
    }

    fn as_ranged(&self) -> Option<&dyn RangedGenerator<L::Lanes>> {
        Some(self)
    }

    fn member(&self, name: &str) -> Option<MemberValue> {
        (name == FREQUENCY).then_some(MemberValue::Float(self.frequency))
    }

    fn set_member(&mut self, name: &str, value: MemberValue) -> Result<()> {
        if name != FREQUENCY {
            return Err(Error::unknown_member("Simplex", name));
        }
        self.frequency = expect_float("Simplex", name, value)?;
        Ok(())
    }
}

/// Smooth simplex noise node type
pub struct SimplexSmooth;

impl NodeFamily for SimplexSmooth {
    fn metadata() -> &'static Metadata {
        &SIMPLEX_SMOOTH_METADATA
    }

    fn build<L: Level>(level: L) -> Box<dyn Node<L>> {
        Box::new(SimplexSmoothNode::new(level))
    }
}

/// Simplex noise with a wider, smoother kernel; not range-bounded
#[derive(Debug, Clone)]
pub struct SimplexSmoothNode<L: Level> {
    level: L,
    frequency: f32,
}

impl<L: Level> SimplexSmoothNode<L> {
    pub fn new(level: L) -> Self {
        Self {
            level,
            frequency: super::DEFAULT_FREQUENCY,
        }
    }

    pub fn with_frequency(mut self, frequency: f32) -> Self {
        self.frequency = frequency;
        self
    }
}

impl<L: Level> Generator<L::Lanes> for SimplexSmoothNode<L> {
    fn gen_2d(&self, seed: i32, x: L::Lanes, y: L::Lanes) -> L::Lanes {
        let pos = [x, y];
        self.level.run(|| simplex_smooth(seed, scaled(pos, self.frequency)))
    }

    fn gen_3d(&self, seed: i32, x: L::Lanes, y: L::Lanes, z: L::Lanes) -> L::Lanes {
        let pos = [x, y, z];
        self.level.run(|| simplex_smooth(seed, scaled(pos, self.frequency)))
    }

    fn gen_4d(&self, seed: i32, x: L::Lanes, y: L::Lanes, z: L::Lanes, w: L::Lanes) -> L::Lanes {
        let pos = [x, y, z, w];
        self.level.run(|| simplex_smooth(seed, scaled(pos, self.frequency)))
    }
}

impl<L: Level> ScalableGenerator<L::Lanes> for SimplexSmoothNode<L> {
    fn frequency(&self) -> f32 {
        self.frequency
    }

    fn set_frequency(&mut self, frequency: f32) {
        self.frequency = frequency;
    }
}

impl<L: Level> Node<L> for SimplexSmoothNode<L> {
    fn metadata(&self) -> &'static Metadata {
        &SIMPLEX_SMOOTH_METADATA
    }

    fn as_generator(&self) -> &dyn Generator<L::Lanes> {
        self
    }

    fn as_scalable(&self) -> Option<&dyn ScalableGenerator<L::Lanes>> {
        Some(self)
    }

    fn member(&self, name: &str) -> Option<MemberValue> {
        (name == FREQUENCY).then_some(MemberValue::Float(self.frequency))
    }

    fn set_member(&mut self, name: &str, value: MemberValue) -> Result<()> {
        if name != FREQUENCY {
            return Err(Error::unknown_member("SimplexSmooth", name));
        }
        self.frequency = expect_float("SimplexSmooth", name, value)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coherent_core::{FeatureSet, ScalarLevel};

    #[test]
    fn test_simplex_declares_its_capabilities() {
        let node = SimplexNode::new(ScalarLevel);
        assert_eq!(node.capabilities(), Simplex::metadata().capabilities);
        assert_eq!(node.as_ranged().map(|r| r.output_range()), Some((-1.0, 1.0)));
        assert!(node.as_domain_warp().is_none());
    }

    #[test]
    fn test_smooth_is_not_ranged() {
        let node = SimplexSmoothNode::new(ScalarLevel);
        assert!(node.as_ranged().is_none());
        assert_eq!(node.capabilities(), SimplexSmooth::metadata().capabilities);
    }

    #[test]
    fn test_frequency_scales_input() {
        let a = SimplexNode::new(ScalarLevel).with_frequency(0.5);
        let b = SimplexNode::new(ScalarLevel).with_frequency(1.0);
        assert_eq!(a.gen_2d(1, 10.0, 6.0), b.gen_2d(1, 5.0, 3.0));
    }

    #[test]
    fn test_frequency_member_roundtrip() {
        let mut node = SimplexSmoothNode::new(ScalarLevel);
        assert_eq!(node.member(FREQUENCY), Some(MemberValue::Float(0.01)));
        node.set_member(FREQUENCY, MemberValue::Float(0.2)).unwrap();
        assert_eq!(node.as_scalable().map(|s| s.frequency()), Some(0.2));
        assert!(node.set_member("Octaves", MemberValue::Int(2)).is_err());
        assert!(node.set_member(FREQUENCY, MemberValue::Int(2)).is_err());
    }

    #[test]
    fn test_every_available_level_matches_scalar() {
        let scalar = SimplexNode::new(ScalarLevel).with_frequency(0.3);
        let smooth = SimplexSmoothNode::new(ScalarLevel).with_frequency(0.3);
        let expected: Vec<(f32, f32)> = (0..8)
            .map(|i| {
                let (x, y) = (i as f32 * 1.7 - 4.0, i as f32 * -2.3);
                (scalar.gen_2d(5, x, y), smooth.gen_2d(5, x, y))
            })
            .collect();

        fn check<L: Level>(level: L, expected: &[(f32, f32)]) {
            let node = SimplexNode::new(level).with_frequency(0.3);
            let smooth = SimplexSmoothNode::new(level).with_frequency(0.3);
            let mut xs = [0.0f32; 16];
            let mut ys = [0.0f32; 16];
            for i in 0..16 {
                xs[i] = (i % 8) as f32 * 1.7 - 4.0;
                ys[i] = (i % 8) as f32 * -2.3;
            }
            let width = <L::Lanes as Lanes>::WIDTH;
            let (x, y) = (L::Lanes::load(&xs), L::Lanes::load(&ys));
            let mut out = [0.0f32; 16];
            node.gen_2d(5, x, y).store(&mut out);
            let mut smooth_out = [0.0f32; 16];
            smooth.gen_2d(5, x, y).store(&mut smooth_out);
            for lane in 0..width {
                assert_eq!(out[lane], expected[lane % 8].0, "{} lane {lane}", L::FEATURE_SET);
                assert_eq!(smooth_out[lane], expected[lane % 8].1, "{} lane {lane}", L::FEATURE_SET);
            }
        }

        check(ScalarLevel, &expected);
        #[cfg(target_arch = "x86_64")]
        {
            if let Some(level) = coherent_core::Sse2Level::detect() {
                check(level, &expected);
            }
            if let Some(level) = coherent_core::Sse41Level::detect() {
                check(level, &expected);
            }
            if let Some(level) = coherent_core::Avx2Level::detect() {
                check(level, &expected);
            }
        }
        #[cfg(target_arch = "aarch64")]
        if let Some(level) = coherent_core::NeonLevel::detect() {
            check(level, &expected);
        }
    }

    #[test]
    fn test_metadata_text() {
        let meta = Simplex::metadata();
        assert_eq!(meta.name, "Simplex");
        assert_eq!(meta.groups, vec!["Coherent Noise"]);
        assert!(meta.description.ends_with("Developed by Ken Perlin in 2001"));
        assert!(SimplexSmooth::metadata()
            .description
            .contains("Developed by K.jpg in 2017"));
        assert_eq!(meta.feature_sets, FeatureSet::compiled());
    }
}
