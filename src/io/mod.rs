//! Scene catalogue, raster and vector I/O

pub mod catalog;
pub mod geojson;
#[cfg(feature = "geotiff")]
pub mod raster;

pub use catalog::{CollectionQuery, SceneCatalog, SceneRecord};
pub use geojson::{mask_to_feature_collection, time_series_feature_collection, write_geojson};
#[cfg(feature = "geotiff")]
pub use raster::RasterIo;
