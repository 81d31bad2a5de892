use crate::types::{BinaryMask, LabelImage};
use serde::{Deserialize, Serialize};

/// Pixel neighbourhood used when grouping mask pixels into objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Connectivity {
    /// Edge-sharing neighbours only
    Four,
    /// Edge- and corner-sharing neighbours
    Eight,
}

impl Default for Connectivity {
    fn default() -> Self {
        Connectivity::Eight
    }
}

impl Connectivity {
    pub(crate) fn offsets(&self) -> &'static [(isize, isize)] {
        const FOUR: [(isize, isize); 4] = [(-1, 0), (0, -1), (0, 1), (1, 0)];
        const EIGHT: [(isize, isize); 8] = [
            (-1, -1),
            (-1, 0),
            (-1, 1),
            (0, -1),
            (0, 1),
            (1, -1),
            (1, 0),
            (1, 1),
        ];
        match self {
            Connectivity::Four => &FOUR,
            Connectivity::Eight => &EIGHT,
        }
    }
}

/// Label connected foreground components.
///
/// Labels run from 1 to the returned count in raster-scan order of each
/// component's first pixel; background stays 0.
pub fn label_components(mask: &BinaryMask, connectivity: Connectivity) -> (LabelImage, u32) {
    let (rows, cols) = mask.dim();
    let mut labels = LabelImage::zeros((rows, cols));
    let mut next_label = 0u32;
    let mut stack = Vec::new();

    for i in 0..rows {
        for j in 0..cols {
            if mask[[i, j]] == 0 || labels[[i, j]] != 0 {
                continue;
            }

            next_label += 1;
            labels[[i, j]] = next_label;
            stack.push((i, j));

            while let Some((r, c)) = stack.pop() {
                for &(dr, dc) in connectivity.offsets() {
                    let nr = r as isize + dr;
                    let nc = c as isize + dc;
                    if nr < 0 || nc < 0 || nr >= rows as isize || nc >= cols as isize {
                        continue;
                    }
                    let (nr, nc) = (nr as usize, nc as usize);
                    if mask[[nr, nc]] != 0 && labels[[nr, nc]] == 0 {
                        labels[[nr, nc]] = next_label;
                        stack.push((nr, nc));
                    }
                }
            }
        }
    }

    log::debug!("Labelled {} components ({:?} connectivity)", next_label, connectivity);
    (labels, next_label)
}

/// Pixel count per label, index 0 holds the background count
pub fn component_areas(labels: &LabelImage, count: u32) -> Vec<usize> {
    let mut areas = vec![0usize; count as usize + 1];
    for &label in labels.iter() {
        areas[label as usize] += 1;
    }
    areas
}
