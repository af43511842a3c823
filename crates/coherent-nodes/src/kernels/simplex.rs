//! Simplex-grid noise kernels
//!
//! Both kernels skew the input onto a hypercubic lattice, locate the
//! containing cell and sum radially attenuated gradient contributions from
//! nearby lattice points. [`simplex`] visits the `N + 1` corners of the
//! containing simplex; [`simplex_smooth`] sums every lattice point of the
//! surrounding `4^N` neighborhood with a wider falloff radius, trading speed
//! for a smoother field.

use super::hash::contribution;
use coherent_core::Lanes;

/// Per-dimension constants of the simplex lattice
#[derive(Debug, Clone, Copy)]
struct Lattice {
    skew: f32,
    unskew: f32,
    radius_sq: f32,
    scale: f32,
}

impl Lattice {
    #[inline(always)]
    fn simplex(dims: usize) -> Self {
        match dims {
            2 => Lattice {
                skew: 0.366_025_4,
                unskew: 0.211_324_87,
                radius_sq: 0.5,
                scale: 70.0,
            },
            3 => Lattice {
                skew: 1.0 / 3.0,
                unskew: 1.0 / 6.0,
                radius_sq: 0.6,
                scale: 32.0,
            },
            _ => Lattice {
                skew: 0.309_017,
                unskew: 0.138_196_6,
                radius_sq: 0.6,
                scale: 27.0,
            },
        }
    }

    #[inline(always)]
    fn smooth(dims: usize) -> Self {
        let base = Self::simplex(dims);
        let (radius_sq, scale) = match dims {
            2 => (2.0 / 3.0, 12.0),
            3 => (0.75, 8.5),
            _ => (0.8, 6.0),
        };
        Lattice {
            radius_sq,
            scale,
            ..base
        }
    }
}

/// Containing cell in skewed space and the offset from its origin
#[inline(always)]
fn locate<S: Lanes, const N: usize>(lattice: Lattice, pos: [S; N]) -> ([S; N], [S; N]) {
    let mut sum = S::splat(0.0);
    for p in pos {
        sum = sum + p;
    }
    let s = sum * S::splat(lattice.skew);
    let cell: [S; N] = std::array::from_fn(|axis| (pos[axis] + s).floor());

    let mut cell_sum = S::splat(0.0);
    for c in cell {
        cell_sum = cell_sum + c;
    }
    let t = cell_sum * S::splat(lattice.unskew);
    let d0: [S; N] = std::array::from_fn(|axis| pos[axis] - (cell[axis] - t));
    (cell, d0)
}

/// Simplex noise over `N` axes, roughly in `[-1, 1]`
#[inline(always)]
pub fn simplex<S: Lanes, const N: usize>(seed: i32, pos: [S; N]) -> S {
    let lattice = Lattice::simplex(N);
    let (cell, d0) = locate(lattice, pos);

    // Rank each axis by its offset; corner k steps along the k largest
    let one = S::splat(1.0);
    let mut rank = [S::splat(0.0); N];
    for a in 0..N {
        for b in (a + 1)..N {
            let step = d0[a].gt_step(d0[b]);
            rank[a] = rank[a] + step;
            rank[b] = rank[b] + (one - step);
        }
    }

    let mut value = S::splat(0.0);
    for k in 0..=N {
        let threshold = S::splat((N - k) as f32);
        let step: [S; N] = std::array::from_fn(|axis| rank[axis].ge_step(threshold));
        let shift = S::splat(k as f32 * lattice.unskew);
        let corner: [S; N] = std::array::from_fn(|axis| cell[axis] + step[axis]);
        let d: [S; N] = std::array::from_fn(|axis| d0[axis] - step[axis] + shift);
        value = value + contribution(seed, corner, d, lattice.radius_sq);
    }
    value * S::splat(lattice.scale)
}

/// Wide-kernel simplex noise over `N` axes, roughly in `[-1, 1]`
#[inline(always)]
pub fn simplex_smooth<S: Lanes, const N: usize>(seed: i32, pos: [S; N]) -> S {
    let lattice = Lattice::smooth(N);
    let (cell, d0) = locate(lattice, pos);

    let mut value = S::splat(0.0);
    for neighbor in 0..(1usize << (2 * N)) {
        let offset: [f32; N] = std::array::from_fn(|axis| ((neighbor >> (2 * axis)) & 3) as f32 - 1.0);
        let offset_sum: f32 = offset.iter().sum();
        let shift = S::splat(offset_sum * lattice.unskew);
        let corner: [S; N] = std::array::from_fn(|axis| cell[axis] + S::splat(offset[axis]));
        let d: [S; N] = std::array::from_fn(|axis| d0[axis] - S::splat(offset[axis]) + shift);
        value = value + contribution(seed, corner, d, lattice.radius_sq);
    }
    value * S::splat(lattice.scale)
}
