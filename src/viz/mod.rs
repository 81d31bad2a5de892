//! Chart and map layer builders

pub mod charts;

pub use charts::{
    erosion_deposition_pie, heatmap_figure, metrics_box_figure, river_layer, time_series_figure,
};
