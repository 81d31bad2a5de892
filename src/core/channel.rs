use crate::core::distance::euclidean_distance_transform;
use crate::core::labeling::{component_areas, label_components, Connectivity};
use crate::types::{BinaryMask, LabelImage, RiverError, RiverResult};
use serde::{Deserialize, Serialize};

/// Planform geometry of one water body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelGeometry {
    pub label: u32,
    pub area_m2: f64,
    /// Half the outline length; approximates centreline length for long channels
    pub length_m: f64,
    /// 2 * area / outline length
    pub mean_width_m: f64,
    /// Diameter of the largest inscribed disc
    pub max_width_m: f64,
}

/// Per-region channel geometry for a water mask.
///
/// Regions are 4-connected, so diagonal contact does not join two bodies.
/// The outline is the polygon traced along pixel edges, image borders
/// included. `pixel_size_m` is the ground sampling distance of a square pixel.
pub fn channel_geometry(mask: &BinaryMask, pixel_size_m: f64) -> RiverResult<Vec<ChannelGeometry>> {
    if !(pixel_size_m.is_finite() && pixel_size_m > 0.0) {
        return Err(RiverError::InvalidParameter(format!(
            "Pixel size must be positive, got {}",
            pixel_size_m
        )));
    }

    let (labels, count) = label_components(mask, Connectivity::Four);
    let areas = component_areas(&labels, count);
    let outlines = edge_perimeters(&labels, count);
    let widths = inscribed_widths(&labels, count);

    let geometries: Vec<ChannelGeometry> = (1..=count as usize)
        .map(|label| {
            let area_px = areas[label] as f64;
            let perimeter_px = outlines[label] as f64;

            ChannelGeometry {
                label: label as u32,
                area_m2: area_px * pixel_size_m * pixel_size_m,
                length_m: perimeter_px / 2.0 * pixel_size_m,
                mean_width_m: 2.0 * area_px / perimeter_px * pixel_size_m,
                max_width_m: widths[label] * pixel_size_m,
            }
        })
        .collect();

    log::debug!("Measured {} channel segments", geometries.len());
    Ok(geometries)
}

/// Pixel edges between each region and anything else (dry land or the image border)
fn edge_perimeters(labels: &LabelImage, count: u32) -> Vec<usize> {
    let (rows, cols) = labels.dim();
    let mut edges = vec![0usize; count as usize + 1];

    for ((i, j), &label) in labels.indexed_iter() {
        if label == 0 {
            continue;
        }
        let up = i > 0 && labels[[i - 1, j]] == label;
        let down = i + 1 < rows && labels[[i + 1, j]] == label;
        let left = j > 0 && labels[[i, j - 1]] == label;
        let right = j + 1 < cols && labels[[i, j + 1]] == label;
        edges[label as usize] += [up, down, left, right].iter().filter(|&&inside| !inside).count();
    }
    edges
}

/// Largest inscribed disc diameter per region, in pixels.
///
/// Distances are taken on the half-pixel lattice (pixel centres, edge
/// midpoints and corners). A lattice point is wet only when every pixel
/// touching it is water, so banks sit on pixel edges and the result is exact
/// for straight channels of any width.
fn inscribed_widths(labels: &LabelImage, count: u32) -> Vec<f64> {
    let (rows, cols) = labels.dim();
    let touching = |k: usize, len: usize| -> Option<(usize, usize)> {
        if k % 2 == 1 {
            Some((k / 2, k / 2))
        } else if k == 0 || k / 2 >= len {
            None
        } else {
            Some((k / 2 - 1, k / 2))
        }
    };

    let lattice = BinaryMask::from_shape_fn((2 * rows + 1, 2 * cols + 1), |(a, b)| {
        match (touching(a, rows), touching(b, cols)) {
            (Some((r0, r1)), Some((c0, c1))) => {
                let wet = labels[[r0, c0]] != 0
                    && labels[[r0, c1]] != 0
                    && labels[[r1, c0]] != 0
                    && labels[[r1, c1]] != 0;
                u8::from(wet)
            }
            _ => 0,
        }
    });
    // Half-pixel units: a distance of d is a radius of d / 2 pixels
    let distance = euclidean_distance_transform(&lattice);

    let mut widths = vec![0.0f64; count as usize + 1];
    for ((i, j), &label) in labels.indexed_iter() {
        if label == 0 {
            continue;
        }
        // Wet lattice points around a pixel centre belong to that pixel's region
        let mut best = 0.0f32;
        for a in 2 * i..=2 * i + 2 {
            for b in 2 * j..=2 * j + 2 {
                best = best.max(distance[[a, b]]);
            }
        }
        let slot = &mut widths[label as usize];
        *slot = slot.max(best as f64);
    }
    widths
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn vertical_strip(rows: usize, cols: usize, width: usize) -> BinaryMask {
        let mut mask = BinaryMask::zeros((rows, cols));
        for i in 0..rows {
            for j in 2..2 + width {
                mask[[i, j]] = 1;
            }
        }
        mask
    }

    #[test]
    fn test_straight_channel() {
        // 5 px wide, 60 px long strip across the full image height
        let channels = channel_geometry(&vertical_strip(60, 20, 5), 10.0).unwrap();
        assert_eq!(channels.len(), 1);
        let channel = &channels[0];

        // Outline: 2 * 60 + 2 * 5 = 130 pixel edges
        assert_relative_eq!(channel.area_m2, 300.0 * 100.0);
        assert_relative_eq!(channel.length_m, 650.0);
        assert_relative_eq!(channel.mean_width_m, 2.0 * 300.0 / 130.0 * 10.0, epsilon = 1e-9);
        assert_relative_eq!(channel.max_width_m, 50.0);
    }

    #[test]
    fn test_one_pixel_wide_channel() {
        let channels = channel_geometry(&vertical_strip(40, 6, 1), 30.0).unwrap();
        let channel = &channels[0];

        assert_relative_eq!(channel.length_m, 41.0 * 30.0);
        assert_relative_eq!(channel.mean_width_m, 80.0 / 82.0 * 30.0, epsilon = 1e-9);
        assert_relative_eq!(channel.max_width_m, 30.0);
    }

    #[test]
    fn test_max_width_for_odd_and_even_widths() {
        for width in 2..=4 {
            let channels = channel_geometry(&vertical_strip(40, 10, width), 30.0).unwrap();
            assert_eq!(channels.len(), 1);
            assert_relative_eq!(channels[0].max_width_m, width as f64 * 30.0);
        }
    }

    #[test]
    fn test_diagonal_pixels_are_separate_bodies() {
        let mut mask = BinaryMask::zeros((5, 5));
        for k in 1..4 {
            mask[[k, k]] = 1;
        }
        let channels = channel_geometry(&mask, 30.0).unwrap();
        assert_eq!(channels.len(), 3);
    }

    #[test]
    fn test_single_pixel() {
        let mut mask = BinaryMask::zeros((5, 5));
        mask[[2, 2]] = 1;
        let channels = channel_geometry(&mask, 30.0).unwrap();
        assert_relative_eq!(channels[0].length_m, 60.0);
        assert_relative_eq!(channels[0].mean_width_m, 15.0);
        assert_relative_eq!(channels[0].max_width_m, 30.0);
    }

    #[test]
    fn test_empty_and_invalid_input() {
        let mask = BinaryMask::zeros((5, 5));
        assert!(channel_geometry(&mask, 30.0).unwrap().is_empty());
        assert!(channel_geometry(&BinaryMask::zeros((0, 4)), 30.0).unwrap().is_empty());
        assert!(channel_geometry(&mask, 0.0).is_err());
        assert!(channel_geometry(&mask, f64::NAN).is_err());
    }
}
