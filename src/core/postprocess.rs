use crate::core::labeling::{component_areas, label_components, Connectivity};
use crate::types::{BinaryMask, FloatRaster, RiverError, RiverResult};
use serde::{Deserialize, Serialize};

/// Mask clean-up parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PostprocessParams {
    /// Probability above which a pixel is water (strict)
    pub threshold: f32,
    /// Smallest object kept, in pixels
    pub min_size: usize,
    /// Fill background enclosed by water
    pub fill_holes: bool,
    /// Neighbourhood used for object grouping
    pub connectivity: Connectivity,
}

impl Default for PostprocessParams {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            min_size: 100,
            fill_holes: true,
            connectivity: Connectivity::Eight,
        }
    }
}

/// Turns a per-pixel water probability into a clean binary mask
#[derive(Debug, Clone)]
pub struct MaskPostProcessor {
    params: PostprocessParams,
}

impl MaskPostProcessor {
    pub fn new(params: PostprocessParams) -> Self {
        Self { params }
    }

    pub fn standard() -> Self {
        Self::new(PostprocessParams::default())
    }

    pub fn params(&self) -> &PostprocessParams {
        &self.params
    }

    /// Threshold, drop small objects, fill holes
    pub fn postprocess(&self, probability: &FloatRaster) -> RiverResult<BinaryMask> {
        if !self.params.threshold.is_finite() {
            return Err(RiverError::InvalidParameter(format!(
                "Threshold must be finite, got {}",
                self.params.threshold
            )));
        }

        log::debug!("Post-processing mask with parameters: {:?}", self.params);

        let binary = self.threshold(probability);
        let initial = count_set(&binary);

        let cleaned = remove_small_objects(&binary, self.params.min_size, self.params.connectivity);
        let after_removal = count_set(&cleaned);

        let result = if self.params.fill_holes {
            fill_holes(&cleaned)
        } else {
            cleaned
        };

        log::debug!(
            "Mask pixels: {} thresholded, {} after small-object removal, {} final",
            initial,
            after_removal,
            count_set(&result)
        );
        Ok(result)
    }

    pub fn threshold(&self, probability: &FloatRaster) -> BinaryMask {
        let t = self.params.threshold;
        probability.mapv(|p| u8::from(p > t))
    }
}

/// Drop connected components with fewer than `min_size` pixels
pub fn remove_small_objects(
    mask: &BinaryMask,
    min_size: usize,
    connectivity: Connectivity,
) -> BinaryMask {
    if min_size <= 1 {
        return mask.mapv(|v| u8::from(v != 0));
    }

    let (labels, count) = label_components(mask, connectivity);
    let areas = component_areas(&labels, count);
    let removed = areas[1..].iter().filter(|&&a| a < min_size).count();
    if removed > 0 {
        log::debug!("Removing {} of {} objects smaller than {} pixels", removed, count, min_size);
    }

    labels.mapv(|label| u8::from(label != 0 && areas[label as usize] >= min_size))
}

/// Fill background regions that are not 4-connected to the raster edge
pub fn fill_holes(mask: &BinaryMask) -> BinaryMask {
    let (rows, cols) = mask.dim();
    if rows == 0 || cols == 0 {
        return mask.clone();
    }
    let mut outside = ndarray::Array2::<bool>::from_elem((rows, cols), false);
    let mut stack = Vec::new();

    let mut seed = |r: usize, c: usize, stack: &mut Vec<(usize, usize)>| {
        if mask[[r, c]] == 0 && !outside[[r, c]] {
            outside[[r, c]] = true;
            stack.push((r, c));
        }
    };

    for c in 0..cols {
        seed(0, c, &mut stack);
        if rows > 1 {
            seed(rows - 1, c, &mut stack);
        }
    }
    for r in 0..rows {
        seed(r, 0, &mut stack);
        if cols > 1 {
            seed(r, cols - 1, &mut stack);
        }
    }

    while let Some((r, c)) = stack.pop() {
        for &(dr, dc) in Connectivity::Four.offsets() {
            let nr = r as isize + dr;
            let nc = c as isize + dc;
            if nr < 0 || nc < 0 || nr >= rows as isize || nc >= cols as isize {
                continue;
            }
            seed(nr as usize, nc as usize, &mut stack);
        }
    }

    outside.mapv(|o| u8::from(!o))
}

/// Legacy-shaped entry point: threshold, remove objects < 100 px, fill holes
pub fn postprocess_mask(probability: &FloatRaster, threshold: f32) -> RiverResult<BinaryMask> {
    MaskPostProcessor::new(PostprocessParams {
        threshold,
        ..PostprocessParams::default()
    })
    .postprocess(probability)
}

fn count_set(mask: &BinaryMask) -> usize {
    mask.iter().filter(|&&v| v != 0).count()
}
