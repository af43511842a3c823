//! Fractional Brownian motion over an arbitrary source generator

use super::fractal::FractalParams;
use coherent_core::{
    create_for, gen_or_zero_2d, gen_or_zero_3d, gen_or_zero_4d, Capabilities, Error, Generator,
    Lanes, Level, Metadata, MemberValue, Node, NodeFamily, Result,
};
use lazy_static::lazy_static;

const NAME: &str = "FractalFBm";
const SOURCE: &str = "Source";

lazy_static! {
    static ref METADATA: Metadata = {
        let [octaves, gain, lacunarity] = FractalParams::members();
        Metadata::builder(NAME, create_for::<FractalFBm>)
            .group("Fractal")
            .description("Sums octaves of the source at rising frequency and falling amplitude")
            .capabilities(Capabilities::GENERATOR)
            .member(octaves)
            .member(gain)
            .member(lacunarity)
            .source(SOURCE, Capabilities::GENERATOR)
            .build()
    };
}

/// Fractal Brownian motion node type
pub struct FractalFBm;

impl NodeFamily for FractalFBm {
    fn metadata() -> &'static Metadata {
        &METADATA
    }

    fn build<L: Level>(level: L) -> Box<dyn Node<L>> {
        Box::new(FractalFBmNode::new(level))
    }
}

/// Octave sum normalized by the total octave amplitude
pub struct FractalFBmNode<L: Level> {
    level: L,
    source: Option<Box<dyn Node<L>>>,
    fractal: FractalParams,
}

impl<L: Level> FractalFBmNode<L> {
    pub fn new(level: L) -> Self {
        Self {
            level,
            source: None,
            fractal: FractalParams::default(),
        }
    }

    pub fn with_source<G: Node<L>>(mut self, source: G) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn with_fractal(mut self, fractal: FractalParams) -> Self {
        self.fractal = fractal;
        self
    }

    #[inline(always)]
    fn sum<const N: usize>(
        &self,
        seed: i32,
        pos: [L::Lanes; N],
        sample: impl Fn(i32, [L::Lanes; N]) -> L::Lanes,
    ) -> L::Lanes {
        let mut total = L::Lanes::splat(0.0);
        let mut octave_seed = seed;
        for (amplitude, frequency) in self.fractal.octaves() {
            let f = L::Lanes::splat(frequency);
            total = total + sample(octave_seed, pos.map(|p| p * f)) * L::Lanes::splat(amplitude);
            octave_seed = octave_seed.wrapping_add(1);
        }
        total * L::Lanes::splat(self.fractal.bounding())
    }
}

impl<L: Level> Generator<L::Lanes> for FractalFBmNode<L> {
    fn gen_2d(&self, seed: i32, x: L::Lanes, y: L::Lanes) -> L::Lanes {
        let source = self.source.as_deref();
        self.level
            .run(|| self.sum(seed, [x, y], |s, p| gen_or_zero_2d(source, s, p)))
    }

    fn gen_3d(&self, seed: i32, x: L::Lanes, y: L::Lanes, z: L::Lanes) -> L::Lanes {
        let source = self.source.as_deref();
        self.level
            .run(|| self.sum(seed, [x, y, z], |s, p| gen_or_zero_3d(source, s, p)))
    }

    fn gen_4d(&self, seed: i32, x: L::Lanes, y: L::Lanes, z: L::Lanes, w: L::Lanes) -> L::Lanes {
        let source = self.source.as_deref();
        self.level
            .run(|| self.sum(seed, [x, y, z, w], |s, p| gen_or_zero_4d(source, s, p)))
    }
}

impl<L: Level> Node<L> for FractalFBmNode<L> {
    fn metadata(&self) -> &'static Metadata {
        &METADATA
    }

    fn as_generator(&self) -> &dyn Generator<L::Lanes> {
        self
    }

    fn member(&self, name: &str) -> Option<MemberValue> {
        self.fractal.get(name)
    }

    fn set_member(&mut self, name: &str, value: MemberValue) -> Result<()> {
        self.fractal.set(NAME, name, value)
    }

    fn source(&self, slot: &str) -> Option<&dyn Node<L>> {
        match slot {
            SOURCE => self.source.as_deref(),
            _ => None,
        }
    }

    fn set_source(&mut self, slot: &str, child: Box<dyn Node<L>>) -> Result<()> {
        if slot != SOURCE {
            return Err(Error::unknown_source(NAME, slot));
        }
        tracing::trace!(child = child.metadata().name, "attaching fbm source");
        self.source = Some(child);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::SimplexNode;
    use approx::assert_relative_eq;
    use coherent_core::ScalarLevel;

    fn simplex() -> SimplexNode<ScalarLevel> {
        SimplexNode::new(ScalarLevel).with_frequency(0.1)
    }

    #[test]
    fn test_octave_sum_matches_manual() {
        let fbm = FractalFBmNode::new(ScalarLevel).with_source(simplex());
        let (x, y) = (12.5, -3.75);
        let source = simplex();
        let expected = (source.gen_2d(5, x, y)
            + source.gen_2d(6, x * 2.0, y * 2.0) * 0.5
            + source.gen_2d(7, x * 4.0, y * 4.0) * 0.25)
            / 1.75;
        assert_relative_eq!(fbm.gen_2d(5, x, y), expected, epsilon = 1e-6);
    }

    #[test]
    fn test_single_octave_is_source() {
        let fbm = FractalFBmNode::new(ScalarLevel)
            .with_fractal(FractalParams {
                octaves: 1,
                ..FractalParams::default()
            })
            .with_source(simplex());
        assert_eq!(fbm.gen_3d(9, 1.0, 2.0, 3.0), simplex().gen_3d(9, 1.0, 2.0, 3.0));
    }

    #[test]
    fn test_normalized_output_stays_in_source_range() {
        let fbm = FractalFBmNode::new(ScalarLevel).with_source(simplex());
        for i in 0..500 {
            let t = i as f32 * 0.731;
            let v = fbm.gen_2d(1, t, t * 1.37 - 20.0);
            assert!((-1.0..=1.0).contains(&v), "{v} out of range");
        }
    }

    #[test]
    fn test_zero_octaves_is_zero() {
        let fbm = FractalFBmNode::new(ScalarLevel)
            .with_fractal(FractalParams {
                octaves: 0,
                ..FractalParams::default()
            })
            .with_source(simplex());
        assert_eq!(fbm.gen_2d(3, 10.0, 20.0), 0.0);
    }

    #[test]
    fn test_zero_lacunarity_samples_origin() {
        let fbm = FractalFBmNode::new(ScalarLevel)
            .with_fractal(FractalParams {
                octaves: 2,
                gain: 0.5,
                lacunarity: 0.0,
            })
            .with_source(simplex());
        let (x, y) = (12.5, -3.75);
        let source = simplex();
        let expected = (source.gen_2d(5, x, y) + source.gen_2d(6, 0.0, 0.0) * 0.5) / 1.5;
        let value = fbm.gen_2d(5, x, y);
        assert!(value.is_finite());
        assert_relative_eq!(value, expected, epsilon = 1e-6);
    }

    #[test]
    fn test_without_source_is_zero() {
        let fbm = FractalFBmNode::new(ScalarLevel);
        assert_eq!(fbm.gen_4d(0, 1.0, 2.0, 3.0, 4.0), 0.0);
        assert!(fbm.source(SOURCE).is_none());
    }

    #[test]
    fn test_members_and_slots() {
        let mut fbm = FractalFBmNode::new(ScalarLevel);
        fbm.set_member("Octaves", MemberValue::Int(6)).unwrap();
        assert_eq!(fbm.member("Octaves"), Some(MemberValue::Int(6)));
        assert!(fbm.set_member("Frequency", MemberValue::Float(1.0)).is_err());
        assert!(matches!(
            fbm.set_source("Other", Box::new(simplex())),
            Err(Error::UnknownSource { .. })
        ));
        fbm.set_source(SOURCE, Box::new(simplex())).unwrap();
        assert!(fbm.source(SOURCE).is_some());
        assert_eq!(fbm.capabilities(), FractalFBm::metadata().capabilities);
    }
}
