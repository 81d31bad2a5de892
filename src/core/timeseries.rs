use crate::types::{check_shape, BinaryMask, FloatRaster, RiverResult, Scene};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Regional statistic for one acquisition date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub date: NaiveDate,
    /// None when no finite pixel fell inside the region
    pub value: Option<f64>,
}

/// Mean of the finite pixels inside `region` (whole raster when None)
pub fn region_mean(raster: &FloatRaster, region: Option<&BinaryMask>) -> RiverResult<Option<f64>> {
    if let Some(region) = region {
        check_shape(raster.dim(), region.dim())?;
    }

    let mut sum = 0.0f64;
    let mut count = 0usize;
    for ((i, j), &v) in raster.indexed_iter() {
        let included = region.map_or(true, |r| r[[i, j]] != 0);
        if included && v.is_finite() {
            sum += v as f64;
            count += 1;
        }
    }

    Ok(if count > 0 { Some(sum / count as f64) } else { None })
}

/// Regional mean of `band` for every scene, ordered by date
pub fn band_time_series(
    scenes: &[Scene],
    band: &str,
    region: Option<&BinaryMask>,
) -> RiverResult<Vec<TimeSeriesPoint>> {
    let mut points = scenes
        .iter()
        .map(|scene| {
            let value = region_mean(scene.band(band)?, region)?;
            if value.is_none() {
                log::warn!("No valid {} pixels in region for scene {}", band, scene.id);
            }
            Ok(TimeSeriesPoint { date: scene.date, value })
        })
        .collect::<RiverResult<Vec<_>>>()?;

    points.sort_by_key(|p| p.date);
    log::debug!("Extracted {} time series points for band {}", points.len(), band);
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Sensor;
    use ndarray::array;

    #[test]
    fn test_region_mean_skips_nan_and_outside() {
        let raster = array![[1.0_f32, 2.0], [f32::NAN, 10.0]];
        let region = array![[1u8, 0], [1, 1]];

        assert_eq!(region_mean(&raster, Some(&region)).unwrap(), Some(5.5));
        let all = region_mean(&raster, None).unwrap().unwrap();
        assert!((all - 13.0 / 3.0).abs() < 1e-9);

        let empty = BinaryMask::zeros((2, 2));
        assert_eq!(region_mean(&raster, Some(&empty)).unwrap(), None);
    }

    #[test]
    fn test_series_sorted_by_date() {
        let later = NaiveDate::from_ymd_opt(2021, 9, 1).unwrap();
        let earlier = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();
        let scenes = vec![
            Scene::new("b", later, Sensor::Sentinel2)
                .with_band("B4", FloatRaster::from_elem((2, 2), 3.0)),
            Scene::new("a", earlier, Sensor::Sentinel2)
                .with_band("B4", FloatRaster::from_elem((2, 2), 1.0)),
        ];

        let series = band_time_series(&scenes, "B4", None).unwrap();
        assert_eq!(series[0].date, earlier);
        assert_eq!(series[0].value, Some(1.0));
        assert_eq!(series[1].value, Some(3.0));

        assert!(band_time_series(&scenes, "B8", None).is_err());
    }
}
