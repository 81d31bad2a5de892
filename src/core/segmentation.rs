use crate::core::spectral::{scene_ndwi, DEFAULT_WATER_THRESHOLD};
use crate::types::{FloatRaster, RiverError, RiverResult, Scene};
use serde::{Deserialize, Serialize};

/// Produces a per-pixel water probability for a scene.
///
/// Implementations must return values in [0, 1] with the scene's raster
/// shape. A trained U-Net runtime plugs in here.
pub trait Segmenter: Send + Sync {
    fn name(&self) -> &str;

    fn water_probability(&self, scene: &Scene) -> RiverResult<FloatRaster>;
}

/// Spectral water segmenter parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NdwiSegmenterParams {
    /// NDWI value mapped to probability 0.5
    pub ndwi_threshold: f32,
    /// Logistic slope; larger values approach a hard threshold
    pub sharpness: f32,
}

impl Default for NdwiSegmenterParams {
    fn default() -> Self {
        Self {
            ndwi_threshold: DEFAULT_WATER_THRESHOLD,
            sharpness: 10.0,
        }
    }
}

/// Logistic transfer of NDWI: `1 / (1 + exp(-sharpness * (ndwi - threshold)))`.
///
/// A probability above 0.5 is equivalent to NDWI above the threshold, so the
/// standard 0.5 post-processing cut reproduces the plain NDWI river mask.
#[derive(Debug, Clone, Default)]
pub struct NdwiSegmenter {
    params: NdwiSegmenterParams,
}

impl NdwiSegmenter {
    pub fn new(params: NdwiSegmenterParams) -> RiverResult<Self> {
        if !(params.sharpness.is_finite() && params.sharpness > 0.0) {
            return Err(RiverError::InvalidParameter(format!(
                "Sharpness must be positive, got {}",
                params.sharpness
            )));
        }
        Ok(Self { params })
    }

    pub fn probability_from_ndwi(&self, ndwi: &FloatRaster) -> FloatRaster {
        let threshold = self.params.ndwi_threshold;
        let sharpness = self.params.sharpness;
        ndwi.mapv(|v| {
            if v.is_finite() {
                1.0 / (1.0 + (-sharpness * (v - threshold)).exp())
            } else {
                0.0
            }
        })
    }
}

impl Segmenter for NdwiSegmenter {
    fn name(&self) -> &str {
        "ndwi"
    }

    fn water_probability(&self, scene: &Scene) -> RiverResult<FloatRaster> {
        let ndwi = scene_ndwi(scene)?;
        Ok(self.probability_from_ndwi(&ndwi))
    }
}
