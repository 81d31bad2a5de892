//! Exact Euclidean distance transform
//!
//! Separable lower-envelope algorithm (Felzenszwalb & Huttenlocher): squared
//! distances are computed column-wise then row-wise, each pass linear in the
//! line length.

use crate::types::{BinaryMask, FloatRaster};
use ndarray::{Array2, Axis};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Stand-in for "no background seen yet"; kept finite so envelope
/// intersections stay well defined.
const FAR: f64 = 1e20;

/// Distance from every pixel to the nearest zero pixel (0 on zero pixels).
///
/// When the mask contains no zero pixel every distance is `f32::INFINITY`.
pub fn euclidean_distance_transform(mask: &BinaryMask) -> FloatRaster {
    let (rows, cols) = mask.dim();
    if rows == 0 || cols == 0 {
        return FloatRaster::zeros((rows, cols));
    }

    let mut squared: Array2<f64> = mask.mapv(|v| if v == 0 { 0.0 } else { FAR });

    transform_lanes(&mut squared, Axis(1));
    transform_lanes(&mut squared, Axis(0));

    squared.mapv(|d| if d >= FAR / 2.0 { f32::INFINITY } else { d.sqrt() as f32 })
}

/// Run the 1-D transform over every lane along `axis`
fn transform_lanes(grid: &mut Array2<f64>, axis: Axis) {
    #[cfg(feature = "parallel")]
    {
        let lanes: Vec<_> = grid.lanes_mut(axis).into_iter().collect();
        lanes.into_par_iter().for_each(|mut lane| {
            let input: Vec<f64> = lane.iter().copied().collect();
            for (dst, value) in lane.iter_mut().zip(distance_1d(&input)) {
                *dst = value;
            }
        });
    }

    #[cfg(not(feature = "parallel"))]
    for mut lane in grid.lanes_mut(axis) {
        let input: Vec<f64> = lane.iter().copied().collect();
        for (dst, value) in lane.iter_mut().zip(distance_1d(&input)) {
            *dst = value;
        }
    }
}

/// Squared distance transform of a sampled function along one line
fn distance_1d(f: &[f64]) -> Vec<f64> {
    let n = f.len();
    let mut d = vec![0.0; n];
    if n == 0 {
        return d;
    }

    let mut v = vec![0usize; n];
    let mut z = vec![0.0f64; n + 1];
    let mut k = 0usize;
    z[0] = f64::NEG_INFINITY;
    z[1] = f64::INFINITY;

    let intersect = |q: usize, p: usize| -> f64 {
        let (qf, pf) = (q as f64, p as f64);
        ((f[q] + qf * qf) - (f[p] + pf * pf)) / (2.0 * qf - 2.0 * pf)
    };

    for q in 1..n {
        let mut s = intersect(q, v[k]);
        while s <= z[k] {
            k -= 1;
            s = intersect(q, v[k]);
        }
        k += 1;
        v[k] = q;
        z[k] = s;
        z[k + 1] = f64::INFINITY;
    }

    k = 0;
    for (q, out) in d.iter_mut().enumerate() {
        while z[k + 1] < q as f64 {
            k += 1;
        }
        let diff = q as f64 - v[k] as f64;
        *out = diff * diff + f[v[k]];
    }
    d
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_single_background_pixel() {
        let mut mask = BinaryMask::ones((5, 5));
        mask[[2, 2]] = 0;

        let dist = euclidean_distance_transform(&mask);
        assert_relative_eq!(dist[[2, 2]], 0.0);
        assert_relative_eq!(dist[[2, 4]], 2.0);
        assert_relative_eq!(dist[[0, 0]], 8.0_f32.sqrt(), epsilon = 1e-6);
        assert_relative_eq!(dist[[1, 3]], 2.0_f32.sqrt(), epsilon = 1e-6);
    }

    #[test]
    fn test_strip_distances() {
        let mask = array![[0u8, 1, 1, 1, 1, 1, 0]];
        let dist = euclidean_distance_transform(&mask);
        let values: Vec<f32> = dist.iter().copied().collect();
        assert_eq!(values, vec![0.0, 1.0, 2.0, 3.0, 2.0, 1.0, 0.0]);
    }

    #[test]
    fn test_all_foreground_is_infinite() {
        let mask = BinaryMask::ones((3, 4));
        let dist = euclidean_distance_transform(&mask);
        assert!(dist.iter().all(|d| d.is_infinite()));
    }

    #[test]
    fn test_matches_brute_force() {
        let mask = array![
            [1u8, 1, 0, 1, 1, 1],
            [1, 1, 1, 1, 1, 1],
            [1, 1, 1, 1, 0, 1],
            [0, 1, 1, 1, 1, 1],
        ];
        let dist = euclidean_distance_transform(&mask);

        let zeros: Vec<(usize, usize)> = mask
            .indexed_iter()
            .filter(|(_, &v)| v == 0)
            .map(|(idx, _)| idx)
            .collect();
        for ((i, j), &d) in dist.indexed_iter() {
            let brute = zeros
                .iter()
                .map(|&(r, c)| {
                    let dr = i as f32 - r as f32;
                    let dc = j as f32 - c as f32;
                    (dr * dr + dc * dc).sqrt()
                })
                .fold(f32::INFINITY, f32::min);
            assert_relative_eq!(d, brute, epsilon = 1e-5);
        }
    }
}
