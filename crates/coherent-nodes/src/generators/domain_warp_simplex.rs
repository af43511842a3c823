//! Coordinate perturbation by simplex offset fields

use super::expect_float;
use crate::kernels::simplex;
use coherent_core::{
    create_for, gen_or_zero_2d, gen_or_zero_3d, gen_or_zero_4d, Capabilities, DomainWarp, Error,
    Generator, Lanes, Level, Metadata, MemberValue, MemberVariable, Node, NodeFamily, Result,
};
use lazy_static::lazy_static;

const NAME: &str = "DomainWarpSimplex";
const SOURCE: &str = "Source";
const WARP_AMPLITUDE: &str = "Warp Amplitude";
const WARP_FREQUENCY: &str = "Warp Frequency";
const VECTORIZATION_SCHEME: &str = "Vectorization Scheme";

const SCHEME_CHOICES: &[&str] = &["Independent Axes", "Shared Field"];

// Sample offsets separating the axes of a shared field
const SHARED_FIELD_SHIFT: [f32; 4] = [0.0, 131.7, 263.3, 395.1];

lazy_static! {
    static ref METADATA: Metadata = Metadata::builder(NAME, create_for::<DomainWarpSimplex>)
        .group("Domain Warp")
        .description("Warps the input coordinates of its source by simplex noise offsets")
        .capabilities(Capabilities::GENERATOR | Capabilities::DOMAIN_WARP)
        .member(
            MemberVariable::float(WARP_AMPLITUDE, 1.0, f32::MIN, f32::MAX)
                .describe("Maximum distance a coordinate is displaced"),
        )
        .member(
            MemberVariable::float(WARP_FREQUENCY, 0.5, f32::MIN, f32::MAX)
                .describe("Frequency of the offset field"),
        )
        .member(
            MemberVariable::enumeration(VECTORIZATION_SCHEME, 0, SCHEME_CHOICES)
                .describe("How offset fields for each axis are produced"),
        )
        .source(SOURCE, Capabilities::GENERATOR)
        .build();
}

/// How the per-axis offsets are derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VectorizationScheme {
    /// One independently seeded field per axis
    #[default]
    IndependentAxes,
    /// One field sampled at shifted positions per axis
    SharedField,
}

impl VectorizationScheme {
    fn index(self) -> usize {
        match self {
            VectorizationScheme::IndependentAxes => 0,
            VectorizationScheme::SharedField => 1,
        }
    }

    fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(VectorizationScheme::IndependentAxes),
            1 => Some(VectorizationScheme::SharedField),
            _ => None,
        }
    }
}

/// Simplex domain warp node type
pub struct DomainWarpSimplex;

impl NodeFamily for DomainWarpSimplex {
    fn metadata() -> &'static Metadata {
        &METADATA
    }

    fn build<L: Level>(level: L) -> Box<dyn Node<L>> {
        Box::new(DomainWarpSimplexNode::new(level))
    }
}

/// Evaluates its source at coordinates displaced by a simplex offset field
pub struct DomainWarpSimplexNode<L: Level> {
    level: L,
    source: Option<Box<dyn Node<L>>>,
    warp_amplitude: f32,
    warp_frequency: f32,
    scheme: VectorizationScheme,
}

impl<L: Level> DomainWarpSimplexNode<L> {
    pub fn new(level: L) -> Self {
        Self {
            level,
            source: None,
            warp_amplitude: 1.0,
            warp_frequency: 0.5,
            scheme: VectorizationScheme::default(),
        }
    }

    /// Attach the generator whose coordinates are warped
    pub fn with_source<G: Node<L>>(mut self, source: G) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn with_warp_amplitude(mut self, amplitude: f32) -> Self {
        self.warp_amplitude = amplitude;
        self
    }

    pub fn with_warp_frequency(mut self, frequency: f32) -> Self {
        self.warp_frequency = frequency;
        self
    }

    pub fn with_scheme(mut self, scheme: VectorizationScheme) -> Self {
        self.scheme = scheme;
        self
    }

    fn warp<const N: usize>(&self, seed: i32, strength: [L::Lanes; N], pos: [L::Lanes; N]) -> [L::Lanes; N] {
        self.level.run(|| self.offset_field(seed, strength, pos))
    }

    #[inline(always)]
    fn offset_field<const N: usize>(
        &self,
        seed: i32,
        strength: [L::Lanes; N],
        pos: [L::Lanes; N],
    ) -> [L::Lanes; N] {
        let frequency = L::Lanes::splat(self.warp_frequency);
        let sample = pos.map(|p| p * frequency);

        std::array::from_fn(|axis| {
            let offset = match self.scheme {
                VectorizationScheme::IndependentAxes => {
                    simplex(seed.wrapping_add(axis as i32), sample)
                }
                VectorizationScheme::SharedField => {
                    let shift = L::Lanes::splat(SHARED_FIELD_SHIFT[axis % SHARED_FIELD_SHIFT.len()]);
                    simplex(seed, sample.map(|s| s + shift))
                }
            };
            // Strength is the maximum displacement
            pos[axis] + offset.clamp(-1.0, 1.0) * strength[axis]
        })
    }

    fn amplitude<const N: usize>(&self) -> [L::Lanes; N] {
        [L::Lanes::splat(self.warp_amplitude); N]
    }
}

impl<L: Level> Generator<L::Lanes> for DomainWarpSimplexNode<L> {
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

impl<L: Level> DomainWarp<L::Lanes> for DomainWarpSimplexNode<L> {
    fn warp_amplitude(&self) -> f32 {
        self.warp_amplitude
    }

    fn warp_2d(&self, seed: i32, strength: [L::Lanes; 2], pos: [L::Lanes; 2]) -> [L::Lanes; 2] {
        self.warp(seed, strength, pos)
    }

    fn warp_3d(&self, seed: i32, strength: [L::Lanes; 3], pos: [L::Lanes; 3]) -> [L::Lanes; 3] {
        self.warp(seed, strength, pos)
    }

    fn warp_4d(&self, seed: i32, strength: [L::Lanes; 4], pos: [L::Lanes; 4]) -> [L::Lanes; 4] {
        self.warp(seed, strength, pos)
    }

    fn gen_source_2d(&self, seed: i32, pos: [L::Lanes; 2]) -> L::Lanes {
        gen_or_zero_2d(self.source.as_deref(), seed, pos)
    }

    fn gen_source_3d(&self, seed: i32, pos: [L::Lanes; 3]) -> L::Lanes {
        gen_or_zero_3d(self.source.as_deref(), seed, pos)
    }

    fn gen_source_4d(&self, seed: i32, pos: [L::Lanes; 4]) -> L::Lanes {
        gen_or_zero_4d(self.source.as_deref(), seed, pos)
    }
}

impl<L: Level> Node<L> for DomainWarpSimplexNode<L> {
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
        match name {
            WARP_AMPLITUDE => Some(MemberValue::Float(self.warp_amplitude)),
            WARP_FREQUENCY => Some(MemberValue::Float(self.warp_frequency)),
            VECTORIZATION_SCHEME => Some(MemberValue::Enum(self.scheme.index())),
            _ => None,
        }
    }

    fn set_member(&mut self, name: &str, value: MemberValue) -> Result<()> {
        match name {
            WARP_AMPLITUDE => self.warp_amplitude = expect_float(NAME, name, value)?,
            WARP_FREQUENCY => self.warp_frequency = expect_float(NAME, name, value)?,
            VECTORIZATION_SCHEME => {
                self.scheme = value
                    .as_enum()
                    .and_then(VectorizationScheme::from_index)
                    .ok_or_else(|| {
                        Error::invalid_parameter(NAME, name, format!("invalid choice {value:?}"))
                    })?;
            }
            _ => return Err(Error::unknown_member(NAME, name)),
        }
        Ok(())
    }

    fn source(&self, slot: &str) -> Option<&dyn Node<L>> {
        match slot {
            SOURCE => self.source.as_deref(),
            _ => None,
        }
    }

    fn set_source(&mut self, slot: &str, child: Box<dyn Node<L>>) -> Result<()> {
        match slot {
            SOURCE => {
                tracing::trace!(child = child.metadata().name, "attaching warp source");
                self.source = Some(child);
                Ok(())
            }
            _ => Err(Error::unknown_source(NAME, slot)),
        }
    }
}
