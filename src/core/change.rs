//! Bank-line change between two dated water masks

use crate::core::distance::euclidean_distance_transform;
use crate::types::{check_shape, BinaryMask, RiverResult};
use ndarray::Zip;
use serde::{Deserialize, Serialize};

/// Change detection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangeParams {
    /// Distance-transform difference (pixels) counted as a meander shift
    pub shift_threshold: f32,
}

impl Default for ChangeParams {
    fn default() -> Self {
        Self { shift_threshold: 5.0 }
    }
}

/// Land lost to the channel (erosion) and gained from it (deposition)
#[derive(Debug, Clone)]
pub struct ErosionDeposition {
    /// Water before, dry after
    pub erosion_mask: BinaryMask,
    /// Dry before, water after
    pub deposition_mask: BinaryMask,
    pub erosion_pixels: usize,
    pub deposition_pixels: usize,
}

impl ErosionDeposition {
    /// Areas in squared metres for a square pixel of `pixel_size_m`
    pub fn areas_m2(&self, pixel_size_m: f64) -> (f64, f64) {
        let pixel_area = pixel_size_m * pixel_size_m;
        (
            self.erosion_pixels as f64 * pixel_area,
            self.deposition_pixels as f64 * pixel_area,
        )
    }
}

/// Compares channel masks captured at two dates
#[derive(Debug, Clone)]
pub struct ChangeDetector {
    params: ChangeParams,
}

impl ChangeDetector {
    pub fn new(params: ChangeParams) -> Self {
        Self { params }
    }

    pub fn standard() -> Self {
        Self::new(ChangeParams::default())
    }

    /// Pixel-set differences between the two masks
    pub fn erosion_deposition(
        &self,
        before: &BinaryMask,
        after: &BinaryMask,
    ) -> RiverResult<ErosionDeposition> {
        check_shape(before.dim(), after.dim())?;

        let erosion_mask =
            Zip::from(before).and(after).map_collect(|&b, &a| u8::from(b != 0 && a == 0));
        let deposition_mask =
            Zip::from(before).and(after).map_collect(|&b, &a| u8::from(b == 0 && a != 0));

        let erosion_pixels = erosion_mask.iter().filter(|&&v| v != 0).count();
        let deposition_pixels = deposition_mask.iter().filter(|&&v| v != 0).count();

        log::debug!(
            "Erosion: {} px, deposition: {} px",
            erosion_pixels,
            deposition_pixels
        );

        Ok(ErosionDeposition {
            erosion_mask,
            deposition_mask,
            erosion_pixels,
            deposition_pixels,
        })
    }

    /// Pixels whose distance to the nearest dry pixel moved by more than the
    /// shift threshold between the two dates
    pub fn meander_shifts(
        &self,
        before: &BinaryMask,
        after: &BinaryMask,
    ) -> RiverResult<BinaryMask> {
        check_shape(before.dim(), after.dim())?;

        let dist_before = euclidean_distance_transform(before);
        let dist_after = euclidean_distance_transform(after);
        let threshold = self.params.shift_threshold;

        let shifts = Zip::from(&dist_before)
            .and(&dist_after)
            .map_collect(|&d1, &d2| {
                let changed = match (d1.is_infinite(), d2.is_infinite()) {
                    (true, true) => false,
                    (true, false) | (false, true) => true,
                    (false, false) => (d1 - d2).abs() > threshold,
                };
                u8::from(changed)
            });

        log::debug!(
            "Meander shift pixels (> {} px): {}",
            threshold,
            shifts.iter().filter(|&&v| v != 0).count()
        );
        Ok(shifts)
    }
}

/// Erosion and deposition pixel counts with default parameters
pub fn calculate_erosion_deposition(
    before: &BinaryMask,
    after: &BinaryMask,
) -> RiverResult<(usize, usize)> {
    let result = ChangeDetector::standard().erosion_deposition(before, after)?;
    Ok((result.erosion_pixels, result.deposition_pixels))
}

/// Meander shift mask with the default 5 pixel threshold
pub fn detect_meander_shifts(before: &BinaryMask, after: &BinaryMask) -> RiverResult<BinaryMask> {
    ChangeDetector::standard().meander_shifts(before, after)
}
