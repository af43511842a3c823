//! Octave parameters shared by fractal node types

use super::{expect_float, expect_int};
use coherent_core::{Error, MemberValue, MemberVariable, Result};

pub const OCTAVES: &str = "Octaves";
pub const GAIN: &str = "Gain";
pub const LACUNARITY: &str = "Lacunarity";

/// Smallest accepted lacunarity; octave frequencies must stay positive
pub const MIN_LACUNARITY: f32 = 0.1;

/// Octave count, per-octave amplitude multiplier and frequency multiplier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FractalParams {
    pub octaves: i32,
    pub gain: f32,
    pub lacunarity: f32,
}

impl Default for FractalParams {
    fn default() -> Self {
        Self {
            octaves: 3,
            gain: 0.5,
            lacunarity: 2.0,
        }
    }
}

impl FractalParams {
    pub fn members() -> [MemberVariable; 3] {
        [
            MemberVariable::int(OCTAVES, 3, 1, 16).describe("Number of layered octaves"),
            MemberVariable::float(GAIN, 0.5, 0.0, 16.0)
                .describe("Amplitude multiplier applied per octave"),
            MemberVariable::float(LACUNARITY, 2.0, MIN_LACUNARITY, 16.0)
                .describe("Frequency multiplier applied per octave"),
        ]
    }

    pub fn get(&self, name: &str) -> Option<MemberValue> {
        match name {
            OCTAVES => Some(MemberValue::Int(self.octaves)),
            GAIN => Some(MemberValue::Float(self.gain)),
            LACUNARITY => Some(MemberValue::Float(self.lacunarity)),
            _ => None,
        }
    }

    pub fn set(&mut self, node: &'static str, name: &str, value: MemberValue) -> Result<()> {
        match name {
            OCTAVES => self.octaves = expect_int(node, name, value)?,
            GAIN => self.gain = expect_float(node, name, value)?,
            LACUNARITY => self.lacunarity = expect_float(node, name, value)?,
            _ => return Err(Error::unknown_member(node, name)),
        }
        Ok(())
    }

    /// `(amplitude, frequency)` for each octave
    pub fn octaves(&self) -> impl Iterator<Item = (f32, f32)> {
        let gain = self.gain;
        let lacunarity = self.lacunarity;
        (0..self.octaves).scan((1.0f32, 1.0f32), move |state, _| {
            let current = *state;
            state.0 *= gain;
            state.1 *= lacunarity;
            Some(current)
        })
    }

    /// Reciprocal of the summed octave amplitudes
    pub fn bounding(&self) -> f32 {
        let total: f32 = self.octaves().map(|(amp, _)| amp).sum();
        if total > 0.0 {
            1.0 / total
        } else {
            1.0
        }
    }
}
