//! rivermorph: River-channel morphology from satellite water masks
//!
//! Spectral water segmentation, mask clean-up, shape metrics and
//! multi-date erosion/deposition analysis on `ndarray` rasters, with optional
//! GeoTIFF I/O (`geotiff` feature) and Python bindings (`python` feature).

pub mod types;
pub mod io;
pub mod core;
pub mod viz;

// Re-export main types and functions for easier access
pub use types::{
    BinaryMask, BoundingBox, FloatRaster, GeoTransform, LabelImage, RiverError, RiverResult,
    Scene, Sensor,
};

pub use crate::core::{AnalysisConfig, MorphologyAnalyzer, MorphologyTimeSeries};
pub use io::{CollectionQuery, SceneCatalog};

#[cfg(feature = "python")]
mod python {
    use crate::core;
    use crate::types::RiverError;
    use numpy::{PyReadonlyArray2, PyReadonlyArray3, ToPyArray};
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;
    use pyo3::types::PyDict;

    fn to_py_err(e: RiverError) -> PyErr {
        PyValueError::new_err(format!("{}", e))
    }

    /// Convert PyReadonlyArray2 to ndarray Array2
    fn numpy_to_array2<T>(arr: PyReadonlyArray2<T>) -> ndarray::Array2<T>
    where
        T: Copy + numpy::Element,
    {
        arr.as_array().to_owned()
    }

    #[pyfunction]
    fn ndwi(
        py: Python,
        green: PyReadonlyArray2<f32>,
        nir: PyReadonlyArray2<f32>,
    ) -> PyResult<PyObject> {
        let result =
            core::ndwi(&numpy_to_array2(green), &numpy_to_array2(nir)).map_err(to_py_err)?;
        Ok(result.to_pyarray(py).into())
    }

    #[pyfunction]
    fn ndvi(
        py: Python,
        nir: PyReadonlyArray2<f32>,
        red: PyReadonlyArray2<f32>,
    ) -> PyResult<PyObject> {
        let result =
            core::ndvi(&numpy_to_array2(nir), &numpy_to_array2(red)).map_err(to_py_err)?;
        Ok(result.to_pyarray(py).into())
    }

    #[pyfunction]
    #[pyo3(signature = (image, rows = 256, cols = 256))]
    fn preprocess_image(
        py: Python,
        image: PyReadonlyArray3<u8>,
        rows: usize,
        cols: usize,
    ) -> PyResult<PyObject> {
        let image = image.as_array().to_owned();
        let result = core::preprocess_image(&image, (rows, cols)).map_err(to_py_err)?;
        Ok(result.to_pyarray(py).into())
    }

    #[pyfunction]
    #[pyo3(signature = (probability, threshold = 0.5))]
    fn postprocess_mask(
        py: Python,
        probability: PyReadonlyArray2<f32>,
        threshold: f32,
    ) -> PyResult<PyObject> {
        let mask =
            core::postprocess_mask(&numpy_to_array2(probability), threshold).map_err(to_py_err)?;
        Ok(mask.to_pyarray(py).into())
    }

    #[pyfunction]
    #[pyo3(signature = (mask, min_size = 100))]
    fn remove_small_objects(
        py: Python,
        mask: PyReadonlyArray2<u8>,
        min_size: usize,
    ) -> PyResult<PyObject> {
        let cleaned = core::remove_small_objects(
            &numpy_to_array2(mask),
            min_size,
            core::Connectivity::Eight,
        );
        Ok(cleaned.to_pyarray(py).into())
    }

    #[pyfunction]
    fn fill_holes(py: Python, mask: PyReadonlyArray2<u8>) -> PyResult<PyObject> {
        Ok(core::fill_holes(&numpy_to_array2(mask)).to_pyarray(py).into())
    }

    #[pyfunction]
    fn morphological_metrics(py: Python, mask: PyReadonlyArray2<u8>) -> PyResult<PyObject> {
        let metrics = core::morphological_metrics(&numpy_to_array2(mask));
        let result = PyDict::new(py);
        for (name, values) in metrics.columns() {
            result.set_item(name, values.to_vec())?;
        }
        Ok(result.into())
    }

    #[pyfunction]
    fn detect_meander_shifts(
        py: Python,
        before: PyReadonlyArray2<u8>,
        after: PyReadonlyArray2<u8>,
    ) -> PyResult<PyObject> {
        let shifts = core::detect_meander_shifts(&numpy_to_array2(before), &numpy_to_array2(after))
            .map_err(to_py_err)?;
        Ok(shifts.to_pyarray(py).into())
    }

    #[pyfunction]
    fn calculate_erosion_deposition(
        before: PyReadonlyArray2<u8>,
        after: PyReadonlyArray2<u8>,
    ) -> PyResult<(usize, usize)> {
        core::calculate_erosion_deposition(&numpy_to_array2(before), &numpy_to_array2(after))
            .map_err(to_py_err)
    }

    /// GeoJSON FeatureCollection string; `geo_transform` uses GDAL ordering
    #[pyfunction]
    #[pyo3(signature = (mask, geo_transform = None, name = "River Channel".to_string()))]
    fn mask_to_geojson(
        mask: PyReadonlyArray2<u8>,
        geo_transform: Option<Vec<f64>>,
        name: String,
    ) -> PyResult<String> {
        let gt = match geo_transform {
            Some(values) => {
                let coefficients: [f64; 6] = values.try_into().map_err(|_| {
                    PyValueError::new_err("geo_transform must have exactly 6 elements")
                })?;
                Some(crate::types::GeoTransform::from_gdal(coefficients))
            }
            None => None,
        };

        let fc = crate::io::mask_to_feature_collection(&numpy_to_array2(mask), gt.as_ref(), &name);
        Ok(fc.to_string())
    }

    /// Python module definition
    #[pymodule]
    fn _core(_py: Python, m: &PyModule) -> PyResult<()> {
        // Spectral indices
        m.add_function(wrap_pyfunction!(ndwi, m)?)?;
        m.add_function(wrap_pyfunction!(ndvi, m)?)?;

        // Segmentation input and mask clean-up
        m.add_function(wrap_pyfunction!(preprocess_image, m)?)?;
        m.add_function(wrap_pyfunction!(postprocess_mask, m)?)?;
        m.add_function(wrap_pyfunction!(remove_small_objects, m)?)?;
        m.add_function(wrap_pyfunction!(fill_holes, m)?)?;

        // Morphology and change
        m.add_function(wrap_pyfunction!(morphological_metrics, m)?)?;
        m.add_function(wrap_pyfunction!(detect_meander_shifts, m)?)?;
        m.add_function(wrap_pyfunction!(calculate_erosion_deposition, m)?)?;

        // Export
        m.add_function(wrap_pyfunction!(mask_to_geojson, m)?)?;

        Ok(())
    }
}
