//! Plotly figure and Leaflet layer specifications as JSON
//!
//! Figures follow the Plotly JSON schema (`{"data": [...], "layout": {...}}`)
//! so any Plotly front end can render them unchanged.

use crate::core::regionprops::MorphologicalMetrics;
use crate::io::geojson::mask_to_feature_collection;
use crate::types::{BinaryMask, FloatRaster, GeoTransform};
use chrono::NaiveDate;
use serde_json::{json, Value};

/// Default polygon style for water layers
pub const RIVER_LAYER_COLOR: &str = "#3388ff";

/// One trace per named series, lines with markers, unified hover
pub fn time_series_figure(series: &[(String, Vec<(NaiveDate, f64)>)], title: &str) -> Value {
    let traces: Vec<Value> = series
        .iter()
        .map(|(name, points)| {
            let x: Vec<String> = points
                .iter()
                .map(|(d, _)| d.format("%Y-%m-%d").to_string())
                .collect();
            let y: Vec<f64> = points.iter().map(|&(_, v)| v).collect();
            json!({
                "type": "scatter",
                "mode": "lines+markers",
                "name": name,
                "x": x,
                "y": y,
            })
        })
        .collect();

    json!({
        "data": traces,
        "layout": {
            "title": {"text": title},
            "xaxis": {"title": {"text": "Date"}},
            "yaxis": {"title": {"text": "Value"}},
            "hovermode": "x unified",
            "showlegend": true,
        },
    })
}

/// Box plot per metric with every region drawn as a jittered point
pub fn metrics_box_figure(metrics: &MorphologicalMetrics) -> Value {
    let traces: Vec<Value> = metrics
        .columns()
        .iter()
        .map(|(name, values)| {
            json!({
                "type": "box",
                "name": name,
                "y": values,
                "boxpoints": "all",
                "jitter": 0.3,
                "pointpos": -1.8,
            })
        })
        .collect();

    json!({
        "data": traces,
        "layout": {
            "title": {"text": "Morphological Metrics Distribution"},
            "yaxis": {"title": {"text": "Value"}},
            "showlegend": false,
        },
    })
}

/// Donut chart comparing erosion and deposition areas
pub fn erosion_deposition_pie(erosion_area: f64, deposition_area: f64) -> Value {
    json!({
        "data": [{
            "type": "pie",
            "labels": ["Erosion", "Deposition"],
            "values": [erosion_area, deposition_area],
            "hole": 0.3,
        }],
        "layout": {
            "title": {"text": "Erosion vs Deposition Areas"},
            "annotations": [{
                "text": "Area",
                "x": 0.5,
                "y": 0.5,
                "font": {"size": 20},
                "showarrow": false,
            }],
        },
    })
}

/// Heatmap of a raster, NaN cells rendered as gaps
pub fn heatmap_figure(raster: &FloatRaster, colorscale: &str) -> Value {
    let z: Vec<Vec<Option<f32>>> = raster
        .outer_iter()
        .map(|row| row.iter().map(|&v| v.is_finite().then_some(v)).collect())
        .collect();

    json!({
        "data": [{
            "type": "heatmap",
            "z": z,
            "colorscale": colorscale,
            "showscale": true,
            "hoverongaps": false,
        }],
        "layout": {
            "margin": {"l": 0, "r": 0, "t": 30, "b": 0},
        },
    })
}

/// GeoJSON layer of water polygons with its Leaflet path style
pub fn river_layer(mask: &BinaryMask, geo_transform: Option<&GeoTransform>, name: &str) -> Value {
    json!({
        "name": name,
        "data": mask_to_feature_collection(mask, geo_transform, name),
        "style": {
            "fillColor": RIVER_LAYER_COLOR,
            "color": RIVER_LAYER_COLOR,
            "weight": 2,
            "fillOpacity": 0.5,
        },
    })
}
