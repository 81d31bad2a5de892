use crate::io::catalog::{SceneCatalog, SceneRecord};
use crate::types::{BinaryMask, FloatRaster, GeoTransform, RiverError, RiverResult, Scene, Sensor};
use gdal::raster::Buffer;
use gdal::spatial_ref::SpatialRef;
use gdal::{Dataset, DriverManager};
use std::path::Path;

/// GeoTIFF reader/writer for scene bands and water masks
pub struct RasterIo;

impl RasterIo {
    /// Read one band (1-based) as f32 with its geotransform
    pub fn read_band<P: AsRef<Path>>(
        path: P,
        band_index: isize,
    ) -> RiverResult<(FloatRaster, GeoTransform)> {
        log::info!("Reading band {} from: {}", band_index, path.as_ref().display());

        let dataset = Dataset::open(path.as_ref())?;
        let geo_transform = dataset.geo_transform()?;
        let (width, height) = dataset.raster_size();

        if band_index < 1 || band_index > dataset.raster_count() {
            return Err(RiverError::MissingBand(format!(
                "band {} of {} in {}",
                band_index,
                dataset.raster_count(),
                path.as_ref().display()
            )));
        }

        log::debug!("Raster size: {}x{}", width, height);
        log::debug!("Raster geotransform: {:?}", geo_transform);

        let rasterband = dataset.rasterband(band_index)?;
        let band_data = rasterband.read_as::<f32>((0, 0), (width, height), (width, height), None)?;

        let array = FloatRaster::from_shape_vec((height, width), band_data.data)
            .map_err(|e| RiverError::Processing(format!("Failed to reshape band data: {}", e)))?;

        Ok((array, GeoTransform::from_gdal(geo_transform)))
    }

    /// Read every band path of a catalogue record into a scene
    pub fn load_scene(
        catalog: &SceneCatalog,
        record: &SceneRecord,
        sensor: Sensor,
    ) -> RiverResult<Scene> {
        log::info!("Loading scene {} ({} bands)", record.id, record.band_paths.len());

        let mut scene = Scene::new(record.id.clone(), record.date, sensor);
        let mut band_names: Vec<&String> = record.band_paths.keys().collect();
        band_names.sort();

        for name in band_names {
            let path = catalog.band_path(record, name)?;
            let (data, geo_transform) = Self::read_band(&path, 1)?;
            if scene.geo_transform.is_none() {
                scene.geo_transform = Some(geo_transform);
            }
            scene = scene.with_band(name.clone(), data);
        }

        scene.dim()?;
        Ok(scene)
    }

    /// Write a mask as a single-band Byte GeoTIFF
    pub fn write_mask<P: AsRef<Path>>(
        path: P,
        mask: &BinaryMask,
        geo_transform: &GeoTransform,
        epsg: u32,
    ) -> RiverResult<()> {
        let (height, width) = mask.dim();
        log::info!("Writing {}x{} mask to {}", height, width, path.as_ref().display());

        let driver = DriverManager::get_driver_by_name("GTiff")?;
        let mut dataset = driver.create_with_band_type::<u8, _>(
            path.as_ref(),
            width as isize,
            height as isize,
            1,
        )?;
        dataset.set_geo_transform(&geo_transform.to_gdal())?;
        dataset.set_spatial_ref(&SpatialRef::from_epsg(epsg)?)?;

        let mut band = dataset.rasterband(1)?;
        let buffer = Buffer::new((width, height), mask.iter().copied().collect());
        band.write((0, 0), (width, height), &buffer)?;
        Ok(())
    }
}
