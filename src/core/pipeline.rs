//! Scene-to-time-series morphology analysis
//!
//! Each scene is segmented, cleaned and measured independently; consecutive
//! masks are then differenced to quantify channel migration.

use crate::core::change::{ChangeDetector, ChangeParams};
use crate::core::channel::{channel_geometry, ChannelGeometry};
use crate::core::postprocess::{MaskPostProcessor, PostprocessParams};
use crate::core::regionprops::{morphological_metrics, MorphologicalMetrics};
use crate::core::segmentation::{NdwiSegmenter, NdwiSegmenterParams, Segmenter};
use crate::types::{check_shape, BinaryMask, RiverError, RiverResult, Scene};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Full analysis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Ground sampling distance of a square pixel (metres)
    pub resolution_m: f64,
    pub segmenter: NdwiSegmenterParams,
    pub postprocess: PostprocessParams,
    pub change: ChangeParams,
    /// Analyse scenes concurrently (needs the `parallel` feature)
    pub parallel: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            resolution_m: 30.0,
            segmenter: NdwiSegmenterParams::default(),
            postprocess: PostprocessParams::default(),
            change: ChangeParams::default(),
            parallel: true,
        }
    }
}

impl AnalysisConfig {
    /// Parse a JSON document; absent fields keep their defaults
    pub fn from_json_str(json: &str) -> RiverResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> RiverResult<Self> {
        log::info!("Loading analysis configuration from {}", path.as_ref().display());
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> RiverResult<()> {
        if !(self.resolution_m.is_finite() && self.resolution_m > 0.0) {
            return Err(RiverError::InvalidParameter(format!(
                "resolution_m must be positive, got {}",
                self.resolution_m
            )));
        }
        if !self.postprocess.threshold.is_finite() {
            return Err(RiverError::InvalidParameter(
                "postprocess.threshold must be finite".to_string(),
            ));
        }
        if !(self.change.shift_threshold.is_finite() && self.change.shift_threshold >= 0.0) {
            return Err(RiverError::InvalidParameter(format!(
                "change.shift_threshold must be non-negative, got {}",
                self.change.shift_threshold
            )));
        }
        Ok(())
    }
}

/// Everything measured on a single scene
#[derive(Debug, Clone)]
pub struct SceneAnalysis {
    pub scene_id: String,
    pub date: NaiveDate,
    pub mask: BinaryMask,
    pub water_pixels: usize,
    pub water_area_m2: f64,
    pub metrics: MorphologicalMetrics,
    pub channels: Vec<ChannelGeometry>,
}

impl SceneAnalysis {
    pub fn summary(&self) -> SceneSummary {
        let total_area: f64 = self.channels.iter().map(|c| c.area_m2).sum();
        let mean_channel_width_m = if total_area > 0.0 {
            self.channels
                .iter()
                .map(|c| c.mean_width_m * c.area_m2)
                .sum::<f64>()
                / total_area
        } else {
            0.0
        };

        SceneSummary {
            scene_id: self.scene_id.clone(),
            date: self.date,
            water_pixels: self.water_pixels,
            water_area_m2: self.water_area_m2,
            region_count: self.channels.len(),
            mean_channel_width_m,
            total_channel_length_m: self.channels.iter().map(|c| c.length_m).sum(),
        }
    }
}

/// Per-date row of the morphology time series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneSummary {
    pub scene_id: String,
    pub date: NaiveDate,
    pub water_pixels: usize,
    pub water_area_m2: f64,
    pub region_count: usize,
    /// Area-weighted mean of per-region widths
    pub mean_channel_width_m: f64,
    pub total_channel_length_m: f64,
}

/// Change between two consecutive dates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeSummary {
    pub from_scene: String,
    pub to_scene: String,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub erosion_pixels: usize,
    pub deposition_pixels: usize,
    pub erosion_area_m2: f64,
    pub deposition_area_m2: f64,
    pub shifted_pixels: usize,
}

impl ChangeSummary {
    /// Erosion minus deposition area per year, None for same-day pairs
    pub fn net_change_m2_per_year(&self) -> Option<f64> {
        let days = (self.to_date - self.from_date).num_days();
        if days <= 0 {
            return None;
        }
        Some((self.erosion_area_m2 - self.deposition_area_m2) * 365.25 / days as f64)
    }
}

/// Serializable morphology history
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MorphologyTimeSeries {
    pub scenes: Vec<SceneSummary>,
    pub changes: Vec<ChangeSummary>,
}

impl MorphologyTimeSeries {
    /// Named (date, value) series suitable for plotting
    pub fn metric_series(&self) -> Vec<(String, Vec<(NaiveDate, f64)>)> {
        vec![
            (
                "Water Area (m²)".to_string(),
                self.scenes.iter().map(|s| (s.date, s.water_area_m2)).collect(),
            ),
            (
                "Channel Width (m)".to_string(),
                self.scenes.iter().map(|s| (s.date, s.mean_channel_width_m)).collect(),
            ),
            (
                "Erosion (m²)".to_string(),
                self.changes.iter().map(|c| (c.to_date, c.erosion_area_m2)).collect(),
            ),
            (
                "Deposition (m²)".to_string(),
                self.changes.iter().map(|c| (c.to_date, c.deposition_area_m2)).collect(),
            ),
        ]
    }

    pub fn to_json(&self) -> RiverResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Per-scene results together with the derived history
#[derive(Debug, Clone)]
pub struct SeriesAnalysis {
    pub analyses: Vec<SceneAnalysis>,
    pub time_series: MorphologyTimeSeries,
}

/// Segment, clean, measure and difference a stack of scenes
pub struct MorphologyAnalyzer {
    config: AnalysisConfig,
    segmenter: Box<dyn Segmenter>,
    postprocessor: MaskPostProcessor,
    change_detector: ChangeDetector,
}

impl MorphologyAnalyzer {
    /// Analyzer with the spectral (NDWI) segmenter
    pub fn new(config: AnalysisConfig) -> RiverResult<Self> {
        let segmenter = NdwiSegmenter::new(config.segmenter.clone())?;
        Self::with_segmenter(config, Box::new(segmenter))
    }

    pub fn with_segmenter(
        config: AnalysisConfig,
        segmenter: Box<dyn Segmenter>,
    ) -> RiverResult<Self> {
        config.validate()?;
        Ok(Self {
            postprocessor: MaskPostProcessor::new(config.postprocess.clone()),
            change_detector: ChangeDetector::new(config.change.clone()),
            segmenter,
            config,
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn analyze_scene(&self, scene: &Scene) -> RiverResult<SceneAnalysis> {
        log::info!("Analysing scene {} ({})", scene.id, scene.date);
        let shape = scene.dim()?;
        if shape.0 == 0 || shape.1 == 0 {
            return Err(RiverError::InvalidParameter(format!(
                "Scene {} has an empty {}x{} raster",
                scene.id, shape.0, shape.1
            )));
        }

        let probability = self.segmenter.water_probability(scene)?;
        check_shape(shape, probability.dim())?;

        let mask = self.postprocessor.postprocess(&probability)?;
        let water_pixels = mask.iter().filter(|&&v| v != 0).count();
        if water_pixels == 0 {
            log::warn!("⚠️  Scene {} has no water after post-processing", scene.id);
        }
        let pixel_area = self.config.resolution_m * self.config.resolution_m;

        let metrics = morphological_metrics(&mask);
        let channels = channel_geometry(&mask, self.config.resolution_m)?;

        log::debug!(
            "Scene {}: {} water pixels in {} regions (segmenter: {})",
            scene.id,
            water_pixels,
            channels.len(),
            self.segmenter.name()
        );

        Ok(SceneAnalysis {
            scene_id: scene.id.clone(),
            date: scene.date,
            mask,
            water_pixels,
            water_area_m2: water_pixels as f64 * pixel_area,
            metrics,
            channels,
        })
    }

    /// Analyse every scene in date order and difference consecutive masks
    pub fn analyze_series(&self, scenes: &[Scene]) -> RiverResult<SeriesAnalysis> {
        if scenes.is_empty() {
            return Err(RiverError::InvalidParameter(
                "At least one scene is required".to_string(),
            ));
        }

        let mut ordered: Vec<&Scene> = scenes.iter().collect();
        ordered.sort_by_key(|s| s.date);

        let shape = ordered[0].dim()?;
        for scene in &ordered[1..] {
            check_shape(shape, scene.dim()?)?;
        }

        log::info!(
            "🌊 Analysing {} scenes from {} to {}",
            ordered.len(),
            ordered[0].date,
            ordered[ordered.len() - 1].date
        );

        let analyses = self.analyze_all(&ordered)?;
        let changes = analyses
            .windows(2)
            .map(|pair| self.compare(&pair[0], &pair[1]))
            .collect::<RiverResult<Vec<_>>>()?;

        let time_series = MorphologyTimeSeries {
            scenes: analyses.iter().map(SceneAnalysis::summary).collect(),
            changes,
        };

        log::info!(
            "✅ Morphology analysis completed: {} scenes, {} change intervals",
            time_series.scenes.len(),
            time_series.changes.len()
        );

        Ok(SeriesAnalysis { analyses, time_series })
    }

    fn analyze_all(&self, scenes: &[&Scene]) -> RiverResult<Vec<SceneAnalysis>> {
        #[cfg(feature = "parallel")]
        if self.config.parallel {
            return scenes
                .par_iter()
                .map(|scene| self.analyze_scene(scene))
                .collect();
        }

        scenes.iter().map(|scene| self.analyze_scene(scene)).collect()
    }

    fn compare(&self, before: &SceneAnalysis, after: &SceneAnalysis) -> RiverResult<ChangeSummary> {
        let diff = self.change_detector.erosion_deposition(&before.mask, &after.mask)?;
        let shifts = self.change_detector.meander_shifts(&before.mask, &after.mask)?;
        let (erosion_area_m2, deposition_area_m2) = diff.areas_m2(self.config.resolution_m);

        Ok(ChangeSummary {
            from_scene: before.scene_id.clone(),
            to_scene: after.scene_id.clone(),
            from_date: before.date,
            to_date: after.date,
            erosion_pixels: diff.erosion_pixels,
            deposition_pixels: diff.deposition_pixels,
            erosion_area_m2,
            deposition_area_m2,
            shifted_pixels: shifts.iter().filter(|&&v| v != 0).count(),
        })
    }
}
