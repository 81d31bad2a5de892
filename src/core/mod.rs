//! Core morphology processing modules

pub mod change;
pub mod channel;
pub mod contour;
pub mod distance;
pub mod labeling;
pub mod pipeline;
pub mod postprocess;
pub mod preprocess;
pub mod regionprops;
pub mod segmentation;
pub mod spectral;
pub mod timeseries;

// Re-export main types
pub use change::{
    calculate_erosion_deposition, detect_meander_shifts, ChangeDetector, ChangeParams,
    ErosionDeposition,
};
pub use channel::{ChannelGeometry, channel_geometry};
pub use contour::{Contour, trace_external_contours};
pub use distance::euclidean_distance_transform;
pub use labeling::{Connectivity, label_components};
pub use pipeline::{
    AnalysisConfig, ChangeSummary, MorphologyAnalyzer, MorphologyTimeSeries, SceneAnalysis,
    SceneSummary, SeriesAnalysis,
};
pub use postprocess::{
    fill_holes, postprocess_mask, remove_small_objects, MaskPostProcessor, PostprocessParams,
};
pub use preprocess::{ImagePreprocessor, PreprocessParams, preprocess_image, resize_bilinear};
pub use regionprops::{MorphologicalMetrics, RegionProps, morphological_metrics, region_properties};
pub use segmentation::{NdwiSegmenter, NdwiSegmenterParams, Segmenter};
pub use spectral::{ndvi, ndwi, normalized_difference, river_mask};
pub use timeseries::{TimeSeriesPoint, band_time_series, region_mean};
