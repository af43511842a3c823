//! Batch evaluation over caller-supplied coordinate streams
//!
//! Outputs are produced one native vector width at a time. A trailing
//! partial batch is padded by repeating its last coordinate; pad lanes are
//! evaluated and then discarded, so callers always get exactly one sample per
//! requested coordinate.

use crate::lanes::{Lanes, MAX_LANES};
use serde::{Deserialize, Serialize};

/// Observed output bounds of a batch call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutputMinMax {
    pub min: f32,
    pub max: f32,
}

impl Default for OutputMinMax {
    fn default() -> Self {
        Self {
            min: f32::INFINITY,
            max: f32::NEG_INFINITY,
        }
    }
}

impl OutputMinMax {
    #[inline]
    pub fn expand(&mut self, value: f32) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    /// Combine bounds from two disjoint batches
    pub fn merge(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Whether no sample has been recorded
    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }
}

/// Coordinates of one batch call
#[derive(Debug, Clone, Copy)]
pub enum Coords<'a, const N: usize> {
    /// The same point for every output
    Single([f32; N]),
    /// `axes[a][i] + offset[a]` on axis `a` for output `i`
    Positions {
        axes: [&'a [f32]; N],
        offset: [f32; N],
    },
    /// Row-major grid of integer cells scaled by `frequency`
    Grid {
        start: [i32; N],
        size: [usize; N],
        frequency: f32,
    },
}

/// [`fill`] over a coordinate source
///
/// The source is matched once per call, so each variant gets its own
/// monomorphized loop.
#[inline(always)]
pub fn fill_coords<S: Lanes, const N: usize>(
    out: &mut [f32],
    coords: Coords<'_, N>,
    eval: impl Fn([S; N]) -> S,
) -> OutputMinMax {
    match coords {
        Coords::Single(pos) => fill(out, |_| pos, eval),
        Coords::Positions { axes, offset } => fill(
            out,
            |i| std::array::from_fn(|axis| axes[axis][i] + offset[axis]),
            eval,
        ),
        Coords::Grid {
            start,
            size,
            frequency,
        } => fill(out, |i| grid_coord(i, start, size, frequency), eval),
    }
}

/// Fill `out` by evaluating `eval` at `coord(i)` for every index
///
/// `coord` is only called for in-range indices.
#[inline(always)]
pub fn fill<S: Lanes, const N: usize>(
    out: &mut [f32],
    coord: impl Fn(usize) -> [f32; N],
    eval: impl Fn([S; N]) -> S,
) -> OutputMinMax {
    let mut min_max = OutputMinMax::default();
    let mut axes = [[0.0f32; MAX_LANES]; N];
    let mut result = [0.0f32; MAX_LANES];

    for (chunk_index, chunk) in out.chunks_mut(S::WIDTH).enumerate() {
        let base = chunk_index * S::WIDTH;
        let mut pos = [0.0f32; N];
        for lane in 0..S::WIDTH {
            if lane < chunk.len() {
                pos = coord(base + lane);
            }
            for (axis, value) in axes.iter_mut().zip(pos) {
                axis[lane] = value;
            }
        }

        let lanes: [S; N] = std::array::from_fn(|axis| S::load(&axes[axis]));
        eval(lanes).store(&mut result);

        for (dst, value) in chunk.iter_mut().zip(result) {
            *dst = value;
            min_max.expand(value);
        }
    }

    min_max
}

/// Coordinate of grid cell `index` in a row-major grid of `sizes`
#[inline(always)]
pub fn grid_coord<const N: usize>(
    index: usize,
    start: [i32; N],
    sizes: [usize; N],
    frequency: f32,
) -> [f32; N] {
    let mut rest = index;
    let mut pos = [0.0f32; N];
    for axis in 0..N {
        let size = sizes[axis].max(1);
        let cell = (rest % size) as i32;
        rest /= size;
        pos[axis] = start[axis].wrapping_add(cell) as f32 * frequency;
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lanes::F32x8;
    use wide::f32x4;

    fn fill_sum<S: Lanes>(len: usize) -> (Vec<f32>, OutputMinMax) {
        let mut out = vec![f32::NAN; len];
        let min_max = fill::<S, 2>(
            &mut out,
            |i| [i as f32, 2.0 * i as f32],
            |[x, y]| x + y,
        );
        (out, min_max)
    }

    #[test]
    fn test_partial_batches_are_padded_not_dropped() {
        for len in [0, 1, 3, 4, 5, 7, 8, 9, 17] {
            for (out, min_max) in [
                fill_sum::<f32>(len),
                fill_sum::<f32x4>(len),
                fill_sum::<F32x8>(len),
            ] {
                assert_eq!(out.len(), len);
                for (i, v) in out.iter().enumerate() {
                    assert_eq!(*v, 3.0 * i as f32);
                }
                if len == 0 {
                    assert!(min_max.is_empty());
                } else {
                    assert_eq!(min_max.min, 0.0);
                    assert_eq!(min_max.max, 3.0 * (len - 1) as f32);
                }
            }
        }
    }

    #[test]
    fn test_coord_is_never_called_out_of_range() {
        let mut out = vec![0.0; 5];
        fill::<F32x8, 1>(
            &mut out,
            |i| {
                assert!(i < 5, "index {i} out of range");
                [i as f32]
            },
            |[x]| x,
        );
    }

    #[test]
    fn test_coordinate_sources() {
        let xs: Vec<f32> = (0..11).map(|i| i as f32).collect();
        let ys: Vec<f32> = (0..11).map(|i| -(i as f32)).collect();
        let mut out = vec![0.0; 11];
        let positions = Coords::Positions {
            axes: [&xs[..], &ys[..]],
            offset: [0.5, 0.25],
        };
        fill_coords::<F32x8, 2>(&mut out, positions, |[x, y]| x * F32x8::splat(10.0) + y);
        for (i, v) in out.iter().enumerate() {
            assert_eq!(*v, (i as f32 + 0.5) * 10.0 - i as f32 + 0.25);
        }

        let bounds = fill_coords::<f32x4, 2>(&mut out[..3], Coords::Single([2.0, 3.0]), |[x, y]| x * y);
        assert_eq!(&out[..3], &[6.0; 3]);
        assert_eq!(bounds, OutputMinMax { min: 6.0, max: 6.0 });

        let mut grid = vec![0.0; 6];
        let cells = Coords::Grid {
            start: [-1, 4],
            size: [3, 2],
            frequency: 0.5,
        };
        fill_coords::<f32, 2>(&mut grid, cells, |[x, y]| x + 100.0 * y);
        for (i, v) in grid.iter().enumerate() {
            let [x, y] = grid_coord(i, [-1, 4], [3, 2], 0.5);
            assert_eq!(*v, x + 100.0 * y);
        }
    }

    #[test]
    fn test_grid_coord_is_row_major() {
        assert_eq!(grid_coord(0, [10, 20], [4, 3], 1.0), [10.0, 20.0]);
        assert_eq!(grid_coord(3, [10, 20], [4, 3], 1.0), [13.0, 20.0]);
        assert_eq!(grid_coord(4, [10, 20], [4, 3], 1.0), [10.0, 21.0]);
        assert_eq!(grid_coord(5, [0, 0, 0], [2, 2, 2], 0.5), [0.5, 0.0, 0.5]);
    }

    #[test]
    fn test_min_max_merge() {
        let mut a = OutputMinMax::default();
        a.expand(0.25);
        a.expand(-0.5);
        let mut b = OutputMinMax::default();
        b.expand(0.75);
        let merged = a.merge(b);
        assert_eq!(merged.min, -0.5);
        assert_eq!(merged.max, 0.75);
        assert_eq!(OutputMinMax::default().merge(b), b);
    }
}
