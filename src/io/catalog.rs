//! Local scene catalogue with Earth-Engine style collection filters
//!
//! Scenes are described by a JSON catalogue (one record per acquisition with
//! footprint, metadata properties and per-band raster paths); queries apply
//! the same date / bounds / cloud-cover filters used for the hosted
//! Sentinel-2 and Landsat collections.

use crate::types::{BoundingBox, RiverError, RiverResult, Sensor};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const SENTINEL2_SR: &str = "COPERNICUS/S2_SR";
pub const LANDSAT8_C2_L2: &str = "LANDSAT/LC08/C02/T1_L2";

/// Maximum cloud cover (percent) accepted by the stock collection queries
pub const DEFAULT_MAX_CLOUD: f64 = 20.0;

/// Filter over a collection: `[start, end)` dates, footprint intersecting
/// `region`, and `cloud_property < max_cloud`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionQuery {
    pub collection_id: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub region: BoundingBox,
    pub cloud_property: String,
    pub max_cloud: f64,
}

impl CollectionQuery {
    /// Sentinel-2 surface reflectance, CLOUDY_PIXEL_PERCENTAGE < 20
    pub fn sentinel2(start: NaiveDate, end: NaiveDate, region: BoundingBox) -> RiverResult<Self> {
        Self::new(SENTINEL2_SR, start, end, region, "CLOUDY_PIXEL_PERCENTAGE")
    }

    /// Landsat 8 Collection 2 Level 2, CLOUD_COVER < 20
    pub fn landsat(start: NaiveDate, end: NaiveDate, region: BoundingBox) -> RiverResult<Self> {
        Self::new(LANDSAT8_C2_L2, start, end, region, "CLOUD_COVER")
    }

    fn new(
        collection_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        region: BoundingBox,
        cloud_property: &str,
    ) -> RiverResult<Self> {
        if end <= start {
            return Err(RiverError::InvalidParameter(format!(
                "Empty date range: {} .. {}",
                start, end
            )));
        }
        Ok(Self {
            collection_id: collection_id.to_string(),
            start,
            end,
            region,
            cloud_property: cloud_property.to_string(),
            max_cloud: DEFAULT_MAX_CLOUD,
        })
    }

    pub fn with_max_cloud(mut self, max_cloud: f64) -> Self {
        self.max_cloud = max_cloud;
        self
    }

    /// Sensor whose band naming applies to this collection
    pub fn sensor(&self) -> Option<Sensor> {
        match self.collection_id.as_str() {
            SENTINEL2_SR => Some(Sensor::Sentinel2),
            LANDSAT8_C2_L2 => Some(Sensor::Landsat8),
            _ => None,
        }
    }

    /// Records without the cloud property are rejected
    pub fn matches(&self, record: &SceneRecord) -> bool {
        record.collection_id == self.collection_id
            && record.date >= self.start
            && record.date < self.end
            && record.footprint.intersects(&self.region)
            && record
                .properties
                .get(&self.cloud_property)
                .map_or(false, |&cloud| cloud < self.max_cloud)
    }
}

/// One acquisition known to the catalogue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneRecord {
    pub id: String,
    pub collection_id: String,
    pub date: NaiveDate,
    pub footprint: BoundingBox,
    #[serde(default)]
    pub properties: HashMap<String, f64>,
    /// Band name to raster path, relative paths resolve against the catalogue file
    #[serde(default)]
    pub band_paths: HashMap<String, PathBuf>,
}

/// A set of scene records, usually loaded from a JSON file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneCatalog {
    pub scenes: Vec<SceneRecord>,
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

impl SceneCatalog {
    pub fn new(scenes: Vec<SceneRecord>) -> Self {
        Self { scenes, base_dir: None }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> RiverResult<Self> {
        let path = path.as_ref();
        log::info!("Loading scene catalogue from {}", path.display());

        let text = std::fs::read_to_string(path)?;
        let mut catalog: SceneCatalog = serde_json::from_str(&text)?;
        catalog.base_dir = path.parent().map(Path::to_path_buf);

        log::debug!("Catalogue holds {} scenes", catalog.scenes.len());
        Ok(catalog)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> RiverResult<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Matching records ordered by date, then id
    pub fn query(&self, query: &CollectionQuery) -> Vec<&SceneRecord> {
        let mut hits: Vec<&SceneRecord> = self.scenes.iter().filter(|r| query.matches(r)).collect();
        hits.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));

        log::info!(
            "Query {} {}..{} matched {} of {} scenes",
            query.collection_id,
            query.start,
            query.end,
            hits.len(),
            self.scenes.len()
        );
        hits
    }

    /// Absolute location of a record's band raster
    pub fn band_path(&self, record: &SceneRecord, band: &str) -> RiverResult<PathBuf> {
        let path = record
            .band_paths
            .get(band)
            .ok_or_else(|| RiverError::MissingBand(format!("{} (scene {})", band, record.id)))?;

        Ok(match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(id: &str, day: NaiveDate, cloud: f64, lon: f64) -> SceneRecord {
        SceneRecord {
            id: id.to_string(),
            collection_id: SENTINEL2_SR.to_string(),
            date: day,
            footprint: BoundingBox::new(lon, 20.0, lon + 1.0, 21.0).unwrap(),
            properties: HashMap::from([("CLOUDY_PIXEL_PERCENTAGE".to_string(), cloud)]),
            band_paths: HashMap::from([("B3".to_string(), PathBuf::from("b3.tif"))]),
        }
    }

    #[test]
    fn test_sentinel2_filters() {
        let region = BoundingBox::new(78.0, 20.0, 79.0, 21.0).unwrap();
        let query = CollectionQuery::sentinel2(date(2023, 1, 1), date(2023, 7, 1), region).unwrap();
        assert_eq!(query.sensor(), Some(Sensor::Sentinel2));

        let catalog = SceneCatalog::new(vec![
            record("late", date(2023, 5, 1), 5.0, 78.5),
            record("early", date(2023, 1, 1), 19.9, 78.5),
            record("cloudy", date(2023, 2, 1), 20.0, 78.5),
            record("end-date", date(2023, 7, 1), 1.0, 78.5),
            record("elsewhere", date(2023, 3, 1), 1.0, 90.0),
        ]);

        let ids: Vec<&str> = catalog.query(&query).iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["early", "late"]);
    }

    #[test]
    fn test_landsat_uses_cloud_cover_property() {
        let region = BoundingBox::new(78.0, 20.0, 79.0, 21.0).unwrap();
        let query = CollectionQuery::landsat(date(2020, 1, 1), date(2021, 1, 1), region).unwrap();
        assert_eq!(query.cloud_property, "CLOUD_COVER");
        assert_eq!(query.sensor(), Some(Sensor::Landsat8));

        // Sentinel record is in another collection
        assert!(!query.matches(&record("s2", date(2020, 6, 1), 0.0, 78.0)));
        assert!(CollectionQuery::landsat(date(2021, 1, 1), date(2021, 1, 1), region).is_err());
    }

    #[test]
    fn test_catalog_round_trip_resolves_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");

        let catalog = SceneCatalog::new(vec![record("a", date(2022, 2, 2), 3.0, 78.0)]);
        catalog.save(&path).unwrap();

        let loaded = SceneCatalog::load(&path).unwrap();
        assert_eq!(loaded.scenes, catalog.scenes);
        let resolved = loaded.band_path(&loaded.scenes[0], "B3").unwrap();
        assert_eq!(resolved, dir.path().join("b3.tif"));
        assert!(loaded.band_path(&loaded.scenes[0], "B8").is_err());
    }
}
