//! Lattice hashing and gradient selection
//!
//! Hashing is integer work with no portable vector form, so it runs per lane
//! through [`contribution`]. Everything else a kernel does stays in [`Lanes`].

use coherent_core::{Lanes, MAX_LANES};

/// Per-axis multipliers applied to integer lattice coordinates
pub const PRIMES: [u32; 4] = [501_125_321, 1_136_930_381, 1_720_413_743, 1_066_037_191];

const HASH_MULTIPLIER: u32 = 0x27d4_eb2d;

/// Hash a lattice point given as whole-number floats
#[inline(always)]
pub fn hash_cell(seed: i32, cell: &[f32]) -> u32 {
    let mut hash = seed as u32;
    for (coord, prime) in cell.iter().zip(PRIMES) {
        hash ^= (*coord as i32 as u32).wrapping_mul(prime);
    }
    hash = hash.wrapping_mul(HASH_MULTIPLIER);
    hash ^ (hash >> 15)
}

const GRAD_2D: [[f32; 2]; 8] = [
    [1.0, 1.0],
    [-1.0, 1.0],
    [1.0, -1.0],
    [-1.0, -1.0],
    [1.0, 0.0],
    [-1.0, 0.0],
    [0.0, 1.0],
    [0.0, -1.0],
];

// Cube edge midpoints, four repeated to fill 16 entries
const GRAD_3D: [[f32; 3]; 16] = [
    [1.0, 1.0, 0.0],
    [-1.0, 1.0, 0.0],
    [1.0, -1.0, 0.0],
    [-1.0, -1.0, 0.0],
    [1.0, 0.0, 1.0],
    [-1.0, 0.0, 1.0],
    [1.0, 0.0, -1.0],
    [-1.0, 0.0, -1.0],
    [0.0, 1.0, 1.0],
    [0.0, -1.0, 1.0],
    [0.0, 1.0, -1.0],
    [0.0, -1.0, -1.0],
    [1.0, 1.0, 0.0],
    [-1.0, 1.0, 0.0],
    [0.0, -1.0, 1.0],
    [0.0, -1.0, -1.0],
];

#[inline(always)]
fn signed(value: f32, negate: bool) -> f32 {
    if negate {
        -value
    } else {
        value
    }
}

/// Dot product of `d` with the gradient selected by `hash`
///
/// In 4D the gradient has one zero axis (`hash >> 3 & 3`) and unit
/// components on the other three, signed by the low three bits.
#[inline(always)]
pub fn grad_dot(hash: u32, d: &[f32]) -> f32 {
    match *d {
        [x, y] => {
            let g = GRAD_2D[(hash & 7) as usize];
            g[0] * x + g[1] * y
        }
        [x, y, z] => {
            let g = GRAD_3D[(hash & 15) as usize];
            g[0] * x + g[1] * y + g[2] * z
        }
        [x, y, z, w] => {
            let index = hash & 31;
            let (a, b, c) = match index >> 3 {
                0 => (y, z, w),
                1 => (x, z, w),
                2 => (x, y, w),
                _ => (x, y, z),
            };
            signed(a, index & 1 != 0) + signed(b, index & 2 != 0) + signed(c, index & 4 != 0)
        }
        _ => 0.0,
    }
}

/// Falloff-weighted gradient contribution of one lattice point
///
/// `cell` is the lattice point in skewed space and `d` the offset from it to
/// the sample in unskewed space. Lanes outside `radius_sq` contribute zero
/// and skip hashing.
#[inline(always)]
pub fn contribution<S: Lanes, const N: usize>(
    seed: i32,
    cell: [S; N],
    d: [S; N],
    radius_sq: f32,
) -> S {
    let mut dist_sq = S::splat(0.0);
    for axis in d {
        dist_sq = dist_sq + axis * axis;
    }
    let falloff = S::splat(radius_sq) - dist_sq;

    let mut falloffs = [0.0f32; MAX_LANES];
    let mut cells = [[0.0f32; MAX_LANES]; N];
    let mut offsets = [[0.0f32; MAX_LANES]; N];
    falloff.store(&mut falloffs);
    for axis in 0..N {
        cell[axis].store(&mut cells[axis]);
        d[axis].store(&mut offsets[axis]);
    }

    let mut out = [0.0f32; MAX_LANES];
    for lane in 0..S::WIDTH {
        let t = falloffs[lane];
        if t <= 0.0 {
            continue;
        }
        let lane_cell: [f32; N] = std::array::from_fn(|axis| cells[axis][lane]);
        let lane_d: [f32; N] = std::array::from_fn(|axis| offsets[axis][lane]);
        let t2 = t * t;
        out[lane] = t2 * t2 * grad_dot(hash_cell(seed, &lane_cell), &lane_d);
    }
    S::load(&out)
}
