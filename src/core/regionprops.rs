//! Shape descriptors for labelled mask regions
//!
//! Perimeter follows the 4-neighbourhood border weighting commonly used for
//! digital objects: border pixels are classified by the configuration of
//! their border neighbours and weighted 1 (straight run), √2 (diagonal step)
//! or (1 + √2) / 2 (corner).

use crate::core::labeling::{label_components, Connectivity};
use crate::types::{BinaryMask, LabelImage};
use geo::{ConvexHull, Intersects, MultiPoint, Point};
use serde::{Deserialize, Serialize};
use std::f64::consts::SQRT_2;

/// Measurements for a single connected region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionProps {
    pub label: u32,
    /// Pixel count
    pub area: usize,
    pub perimeter: f64,
    /// 0 for circular moments, approaching 1 for elongated regions
    pub eccentricity: f64,
    /// Area divided by convex hull area
    pub solidity: f64,
    /// (row, col)
    pub centroid: (f64, f64),
    /// (min_row, min_col, max_row, max_col), max exclusive
    pub bbox: (usize, usize, usize, usize),
}

/// Column-oriented metrics, one entry per region in label order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MorphologicalMetrics {
    pub area: Vec<f64>,
    pub perimeter: Vec<f64>,
    pub eccentricity: Vec<f64>,
    pub solidity: Vec<f64>,
}

impl MorphologicalMetrics {
    pub fn len(&self) -> usize {
        self.area.len()
    }

    pub fn is_empty(&self) -> bool {
        self.area.is_empty()
    }

    /// (name, values) pairs in a fixed order, for tabular and chart output
    pub fn columns(&self) -> [(&'static str, &[f64]); 4] {
        [
            ("area", self.area.as_slice()),
            ("perimeter", self.perimeter.as_slice()),
            ("eccentricity", self.eccentricity.as_slice()),
            ("solidity", self.solidity.as_slice()),
        ]
    }
}

impl From<&[RegionProps]> for MorphologicalMetrics {
    fn from(regions: &[RegionProps]) -> Self {
        Self {
            area: regions.iter().map(|r| r.area as f64).collect(),
            perimeter: regions.iter().map(|r| r.perimeter).collect(),
            eccentricity: regions.iter().map(|r| r.eccentricity).collect(),
            solidity: regions.iter().map(|r| r.solidity).collect(),
        }
    }
}

/// Measure every region of a label image
pub fn region_properties(labels: &LabelImage, count: u32) -> Vec<RegionProps> {
    let mut pixels: Vec<Vec<(usize, usize)>> = vec![Vec::new(); count as usize];
    for ((i, j), &label) in labels.indexed_iter() {
        if label > 0 {
            pixels[label as usize - 1].push((i, j));
        }
    }

    pixels
        .iter()
        .enumerate()
        .filter(|(_, coords)| !coords.is_empty())
        .map(|(idx, coords)| measure_region(idx as u32 + 1, coords))
        .collect()
}

/// Label a mask (8-connectivity) and return its per-region metrics
pub fn morphological_metrics(mask: &BinaryMask) -> MorphologicalMetrics {
    let (labels, count) = label_components(mask, Connectivity::Eight);
    let regions = region_properties(&labels, count);
    MorphologicalMetrics::from(regions.as_slice())
}

fn measure_region(label: u32, coords: &[(usize, usize)]) -> RegionProps {
    let area = coords.len();
    let n = area as f64;

    let (mut min_r, mut min_c, mut max_r, mut max_c) = (usize::MAX, usize::MAX, 0, 0);
    let (mut sum_r, mut sum_c) = (0.0, 0.0);
    for &(r, c) in coords {
        min_r = min_r.min(r);
        min_c = min_c.min(c);
        max_r = max_r.max(r);
        max_c = max_c.max(c);
        sum_r += r as f64;
        sum_c += c as f64;
    }
    let centroid = (sum_r / n, sum_c / n);

    // Local image with a one pixel pad so every neighbour lookup is in range
    let height = max_r - min_r + 3;
    let width = max_c - min_c + 3;
    let mut local = BinaryMask::zeros((height, width));
    for &(r, c) in coords {
        local[[r - min_r + 1, c - min_c + 1]] = 1;
    }

    RegionProps {
        label,
        area,
        perimeter: perimeter(&local),
        eccentricity: eccentricity(coords, centroid),
        solidity: area as f64 / convex_area(&local) as f64,
        centroid,
        bbox: (min_r, min_c, max_r + 1, max_c + 1),
    }
}

/// Border pixels: foreground pixels with a 4-neighbour outside the region.
/// Expects a zero pad around the region.
fn border_image(local: &BinaryMask) -> BinaryMask {
    let (h, w) = local.dim();
    let mut border = BinaryMask::zeros((h, w));
    for i in 1..h - 1 {
        for j in 1..w - 1 {
            if local[[i, j]] == 0 {
                continue;
            }
            let interior = local[[i - 1, j]] != 0
                && local[[i + 1, j]] != 0
                && local[[i, j - 1]] != 0
                && local[[i, j + 1]] != 0;
            if !interior {
                border[[i, j]] = 1;
            }
        }
    }
    border
}

fn perimeter(local: &BinaryMask) -> f64 {
    const KERNEL: [[u32; 3]; 3] = [[10, 2, 10], [2, 1, 2], [10, 2, 10]];

    let border = border_image(local);
    let (h, w) = border.dim();
    let mut total = 0.0;

    for i in 1..h - 1 {
        for j in 1..w - 1 {
            if border[[i, j]] == 0 {
                continue;
            }
            let mut code = 0u32;
            for (di, row) in KERNEL.iter().enumerate() {
                for (dj, &weight) in row.iter().enumerate() {
                    code += weight * border[[i + di - 1, j + dj - 1]] as u32;
                }
            }
            total += match code {
                5 | 7 | 15 | 17 | 25 | 27 => 1.0,
                21 | 33 => SQRT_2,
                13 | 23 => (1.0 + SQRT_2) / 2.0,
                _ => 0.0,
            };
        }
    }

    total
}

fn eccentricity(coords: &[(usize, usize)], centroid: (f64, f64)) -> f64 {
    let n = coords.len() as f64;
    let (mut mu_rr, mut mu_cc, mut mu_rc) = (0.0, 0.0, 0.0);
    for &(r, c) in coords {
        let dr = r as f64 - centroid.0;
        let dc = c as f64 - centroid.1;
        mu_rr += dr * dr;
        mu_cc += dc * dc;
        mu_rc += dr * dc;
    }
    mu_rr /= n;
    mu_cc /= n;
    mu_rc /= n;

    let mean = (mu_rr + mu_cc) / 2.0;
    let spread = (((mu_rr - mu_cc) / 2.0).powi(2) + mu_rc * mu_rc).sqrt();
    let major = mean + spread;
    let minor = (mean - spread).max(0.0);

    if major <= f64::EPSILON {
        return 0.0;
    }
    (1.0 - minor / major).max(0.0).sqrt()
}

/// Number of pixel centres inside the convex hull of the region's pixel squares
fn convex_area(local: &BinaryMask) -> usize {
    let border = border_image(local);
    let corners: Vec<Point<f64>> = border
        .indexed_iter()
        .filter(|&(_, &b)| b != 0)
        .flat_map(|((i, j), _)| {
            // x = column, y = row
            let (x, y) = (j as f64, i as f64);
            [
                Point::new(x - 0.5, y - 0.5),
                Point::new(x + 0.5, y - 0.5),
                Point::new(x - 0.5, y + 0.5),
                Point::new(x + 0.5, y + 0.5),
            ]
        })
        .collect();

    let hull = MultiPoint::from(corners).convex_hull();

    // Boundary points count as inside
    local
        .indexed_iter()
        .filter(|((i, j), _)| hull.intersects(&Point::new(*j as f64, *i as f64)))
        .count()
}
