//! Spectral indices for water and vegetation discrimination

use crate::types::{check_shape, BinaryMask, FloatRaster, RiverResult, Scene};
use ndarray::Zip;

/// Default NDWI cut-off above which a pixel is treated as open water
pub const DEFAULT_WATER_THRESHOLD: f32 = 0.2;

#[inline]
fn nd_pixel(a: f32, b: f32) -> f32 {
    if !a.is_finite() || !b.is_finite() {
        return f32::NAN;
    }
    let sum = a + b;
    if sum.abs() < 1e-10 {
        return f32::NAN;
    }
    (a - b) / sum
}

/// Normalized difference `(a - b) / (a + b)`.
///
/// Pixels where either input is non-finite or the denominator vanishes are NaN.
pub fn normalized_difference(
    band_a: &FloatRaster,
    band_b: &FloatRaster,
) -> RiverResult<FloatRaster> {
    check_shape(band_a.dim(), band_b.dim())?;

    #[cfg(feature = "parallel")]
    let result = Zip::from(band_a).and(band_b).par_map_collect(|&a, &b| nd_pixel(a, b));

    #[cfg(not(feature = "parallel"))]
    let result = Zip::from(band_a).and(band_b).map_collect(|&a, &b| nd_pixel(a, b));

    Ok(result)
}

/// Normalized Difference Water Index (McFeeters): `(Green - NIR) / (Green + NIR)`
pub fn ndwi(green: &FloatRaster, nir: &FloatRaster) -> RiverResult<FloatRaster> {
    normalized_difference(green, nir)
}

/// Normalized Difference Vegetation Index: `(NIR - Red) / (NIR + Red)`
pub fn ndvi(nir: &FloatRaster, red: &FloatRaster) -> RiverResult<FloatRaster> {
    normalized_difference(nir, red)
}

/// NDWI of a scene, resolving band names from its sensor
pub fn scene_ndwi(scene: &Scene) -> RiverResult<FloatRaster> {
    let green = scene.band(scene.sensor.green_band())?;
    let nir = scene.band(scene.sensor.nir_band())?;
    log::debug!("Computing NDWI for scene {} ({})", scene.id, scene.sensor);
    ndwi(green, nir)
}

/// NDVI of a scene, resolving band names from its sensor
pub fn scene_ndvi(scene: &Scene) -> RiverResult<FloatRaster> {
    let nir = scene.band(scene.sensor.nir_band())?;
    let red = scene.band(scene.sensor.red_band())?;
    log::debug!("Computing NDVI for scene {} ({})", scene.id, scene.sensor);
    ndvi(nir, red)
}

/// Binary river mask: NDWI strictly greater than `threshold`, NaN is dry
pub fn river_mask(ndwi: &FloatRaster, threshold: f32) -> BinaryMask {
    ndwi.mapv(|v| u8::from(v > threshold))
}
