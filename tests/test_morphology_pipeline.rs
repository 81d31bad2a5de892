use chrono::NaiveDate;
use rivermorph::core::{band_time_series, AnalysisConfig, MorphologyAnalyzer};
use rivermorph::io::{
    mask_to_feature_collection, time_series_feature_collection, write_geojson, CollectionQuery,
    SceneCatalog, SceneRecord,
};
use rivermorph::types::{BoundingBox, FloatRaster, GeoTransform, Scene, Sensor};
use rivermorph::viz::{erosion_deposition_pie, time_series_figure};
use std::collections::HashMap;
use std::path::PathBuf;

const ROWS: usize = 48;
const COLS: usize = 48;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Synthetic Sentinel-2 scene: a vertical channel over bright vegetation
fn synthetic_scene(id: &str, day: NaiveDate, channel: std::ops::Range<usize>) -> Scene {
    let mut green = FloatRaster::from_elem((ROWS, COLS), 0.08);
    let mut nir = FloatRaster::from_elem((ROWS, COLS), 0.35);
    for i in 0..ROWS {
        for j in channel.clone() {
            green[[i, j]] = 0.12;
            nir[[i, j]] = 0.03;
        }
    }
    // Speckle of false water, removed by the size filter
    green[[2, 40]] = 0.5;
    nir[[2, 40]] = 0.01;

    Scene::new(id, day, Sensor::Sentinel2)
        .with_band("B3", green)
        .with_band("B8", nir)
        .with_geo_transform(GeoTransform::from_gdal([78.0, 0.0003, 0.0, 21.0, 0.0, -0.0003]))
}

fn record(id: &str, day: NaiveDate, cloud: f64) -> SceneRecord {
    SceneRecord {
        id: id.to_string(),
        collection_id: "COPERNICUS/S2_SR".to_string(),
        date: day,
        footprint: BoundingBox::new(78.0, 20.9, 78.1, 21.0).unwrap(),
        properties: HashMap::from([("CLOUDY_PIXEL_PERCENTAGE".to_string(), cloud)]),
        band_paths: HashMap::from([
            ("B3".to_string(), PathBuf::from(format!("{}_B3.tif", id))),
            ("B8".to_string(), PathBuf::from(format!("{}_B8.tif", id))),
        ]),
    }
}

#[test]
fn test_catalog_to_time_series() {
    let _ = env_logger::builder().is_test(true).try_init();

    let dir = tempfile::tempdir().unwrap();
    let catalog_path = dir.path().join("catalog.json");
    SceneCatalog::new(vec![
        record("S2_2021", date(2021, 3, 1), 4.0),
        record("S2_2019", date(2019, 3, 1), 12.0),
        record("S2_2020_cloudy", date(2020, 3, 1), 65.0),
        record("S2_2020", date(2020, 3, 3), 1.5),
    ])
    .save(&catalog_path)
    .unwrap();

    let catalog = SceneCatalog::load(&catalog_path).unwrap();
    let region = BoundingBox::new(78.02, 20.95, 78.05, 20.98).unwrap();
    let query = CollectionQuery::sentinel2(date(2019, 1, 1), date(2022, 1, 1), region).unwrap();
    let hits = catalog.query(&query);

    let ids: Vec<&str> = hits.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["S2_2019", "S2_2020", "S2_2021"]);
    assert_eq!(
        catalog.band_path(hits[0], "B3").unwrap(),
        dir.path().join("S2_2019_B3.tif")
    );

    // Channel drifts two columns east per acquisition
    let scenes: Vec<Scene> = hits
        .iter()
        .enumerate()
        .map(|(k, r)| synthetic_scene(&r.id, r.date, (20 + 2 * k)..(28 + 2 * k)))
        .collect();

    let analyzer = MorphologyAnalyzer::new(AnalysisConfig::default()).unwrap();
    let result = analyzer.analyze_series(&scenes).unwrap();
    let series = &result.time_series;

    println!("🌊 Analysed {} scenes", series.scenes.len());
    assert_eq!(series.scenes.len(), 3);
    assert_eq!(series.changes.len(), 2);

    for summary in &series.scenes {
        // 8 columns of 48 rows; the speckle pixel is gone
        assert_eq!(summary.water_pixels, 8 * ROWS);
        assert_eq!(summary.region_count, 1);
        assert!((summary.water_area_m2 - 8.0 * ROWS as f64 * 900.0).abs() < 1e-6);
    }

    for change in &series.changes {
        assert_eq!(change.erosion_pixels, 2 * ROWS);
        assert_eq!(change.deposition_pixels, 2 * ROWS);
        assert_eq!(change.shifted_pixels, 0);
    }
    assert_eq!(series.changes[0].from_scene, "S2_2019");
    assert_eq!(series.changes[1].to_scene, "S2_2021");

    let figure = time_series_figure(&series.metric_series(), "River Morphology Time Series");
    assert_eq!(figure["data"].as_array().unwrap().len(), 4);
    assert_eq!(figure["data"][2]["x"][0], "2020-03-03");

    let last = &series.changes[1];
    let pie = erosion_deposition_pie(last.erosion_area_m2, last.deposition_area_m2);
    assert_eq!(pie["data"][0]["values"][0], 2.0 * ROWS as f64 * 900.0);

    let parsed: serde_json::Value = serde_json::from_str(&series.to_json().unwrap()).unwrap();
    assert_eq!(parsed["scenes"][1]["date"], "2020-03-03");
}

#[test]
fn test_water_polygon_and_band_series_export() {
    let _ = env_logger::builder().is_test(true).try_init();

    let scenes = vec![
        synthetic_scene("b", date(2022, 6, 1), 10..16),
        synthetic_scene("a", date(2022, 1, 1), 10..16),
    ];
    let analyzer = MorphologyAnalyzer::new(AnalysisConfig {
        parallel: false,
        ..AnalysisConfig::default()
    })
    .unwrap();
    let analysis = analyzer.analyze_scene(&scenes[0]).unwrap();

    let gt = scenes[0].geo_transform;
    let polygons = mask_to_feature_collection(&analysis.mask, gt.as_ref(), "River Channel");
    assert_eq!(polygons.features.len(), 1);
    let ring = match polygons.features[0].geometry.as_ref().map(|g| &g.value) {
        Some(geojson::Value::Polygon(rings)) => rings[0].clone(),
        other => panic!("expected a polygon, got {:?}", other),
    };
    assert_eq!(ring.first(), ring.last());
    assert_eq!(ring.len(), 5);

    let series = band_time_series(&scenes, "B8", Some(&analysis.mask)).unwrap();
    assert_eq!(series.len(), 2);
    assert_eq!(series[0].date, date(2022, 1, 1));
    assert!((series[0].value.unwrap() - 0.03).abs() < 1e-6);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("channel.geojson");
    write_geojson(&path, &polygons).unwrap();
    write_geojson(dir.path().join("b8.geojson"), &time_series_feature_collection(&series)).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"Polygon\""));
}
