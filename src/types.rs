use chrono::NaiveDate;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Real-valued raster (reflectance, index, probability or distance)
pub type FloatRaster = Array2<f32>;

/// Binary raster, 1 = member, 0 = not a member
pub type BinaryMask = Array2<u8>;

/// Connected-component labels, 0 = background
pub type LabelImage = Array2<u32>;

/// Optical sensor the scene was acquired with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sensor {
    Sentinel2,
    Landsat8,
}

impl Sensor {
    pub fn green_band(&self) -> &'static str {
        match self {
            Sensor::Sentinel2 => "B3",
            Sensor::Landsat8 => "SR_B3",
        }
    }

    pub fn red_band(&self) -> &'static str {
        match self {
            Sensor::Sentinel2 => "B4",
            Sensor::Landsat8 => "SR_B4",
        }
    }

    pub fn nir_band(&self) -> &'static str {
        match self {
            Sensor::Sentinel2 => "B8",
            Sensor::Landsat8 => "SR_B5",
        }
    }
}

impl std::fmt::Display for Sensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sensor::Sentinel2 => write!(f, "Sentinel-2"),
            Sensor::Landsat8 => write!(f, "Landsat-8"),
        }
    }
}

/// Geospatial bounding box (degrees)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> RiverResult<Self> {
        if min_lon > max_lon || min_lat > max_lat {
            return Err(RiverError::InvalidParameter(format!(
                "Invalid bounding box: ({}, {}) - ({}, {})",
                min_lon, min_lat, max_lon, max_lat
            )));
        }
        Ok(Self { min_lon, min_lat, max_lon, max_lat })
    }

    /// Edges touching counts as intersecting
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_lon <= other.max_lon
            && other.min_lon <= self.max_lon
            && self.min_lat <= other.max_lat
            && other.min_lat <= self.max_lat
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }
}

/// Geospatial transformation parameters (GDAL ordering)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub top_left_x: f64,
    pub pixel_width: f64,
    pub rotation_x: f64,
    pub top_left_y: f64,
    pub rotation_y: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    pub fn from_gdal(coefficients: [f64; 6]) -> Self {
        Self {
            top_left_x: coefficients[0],
            pixel_width: coefficients[1],
            rotation_x: coefficients[2],
            top_left_y: coefficients[3],
            rotation_y: coefficients[4],
            pixel_height: coefficients[5],
        }
    }

    pub fn to_gdal(&self) -> [f64; 6] {
        [
            self.top_left_x,
            self.pixel_width,
            self.rotation_x,
            self.top_left_y,
            self.rotation_y,
            self.pixel_height,
        ]
    }

    /// World coordinate of a pixel centre
    pub fn pixel_to_world(&self, row: f64, col: f64) -> (f64, f64) {
        let px = col + 0.5;
        let py = row + 0.5;
        let x = self.top_left_x + px * self.pixel_width + py * self.rotation_x;
        let y = self.top_left_y + px * self.rotation_y + py * self.pixel_height;
        (x, y)
    }

    /// Area of one pixel in squared map units
    pub fn pixel_area(&self) -> f64 {
        (self.pixel_width * self.pixel_height - self.rotation_x * self.rotation_y).abs()
    }
}

/// One acquisition: a set of co-registered bands for a single date
#[derive(Debug, Clone)]
pub struct Scene {
    pub id: String,
    pub date: NaiveDate,
    pub sensor: Sensor,
    pub bands: HashMap<String, FloatRaster>,
    pub geo_transform: Option<GeoTransform>,
}

impl Scene {
    pub fn new(id: impl Into<String>, date: NaiveDate, sensor: Sensor) -> Self {
        Self {
            id: id.into(),
            date,
            sensor,
            bands: HashMap::new(),
            geo_transform: None,
        }
    }

    pub fn with_band(mut self, name: impl Into<String>, data: FloatRaster) -> Self {
        self.bands.insert(name.into(), data);
        self
    }

    pub fn with_geo_transform(mut self, geo_transform: GeoTransform) -> Self {
        self.geo_transform = Some(geo_transform);
        self
    }

    pub fn band(&self, name: &str) -> RiverResult<&FloatRaster> {
        self.bands
            .get(name)
            .ok_or_else(|| RiverError::MissingBand(format!("{} (scene {})", name, self.id)))
    }

    /// Common (rows, cols) of every band
    pub fn dim(&self) -> RiverResult<(usize, usize)> {
        let mut shape: Option<(usize, usize)> = None;
        for data in self.bands.values() {
            match shape {
                None => shape = Some(data.dim()),
                Some(expected) => check_shape(expected, data.dim())?,
            }
        }
        shape.ok_or_else(|| RiverError::MissingBand(format!("scene {} has no bands", self.id)))
    }
}

/// Error types for morphology processing
#[derive(Debug, thiserror::Error)]
pub enum RiverError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Missing band: {0}")]
    MissingBand(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "geotiff")]
    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),
}

/// Result type for morphology operations
pub type RiverResult<T> = Result<T, RiverError>;

pub(crate) fn check_shape(expected: (usize, usize), actual: (usize, usize)) -> RiverResult<()> {
    if expected != actual {
        return Err(RiverError::ShapeMismatch { expected, actual });
    }
    Ok(())
}
