use approx::assert_relative_eq;
use ndarray::Array3;
use rivermorph::core::{
    morphological_metrics, ndwi, postprocess_mask, preprocess_image, river_mask, Connectivity,
    MaskPostProcessor, PostprocessParams,
};
use rivermorph::types::{BinaryMask, FloatRaster};

/// 15x15 lake with a 3x3 island plus a 10 pixel noise blob
fn lake_probability() -> FloatRaster {
    let mut probability = FloatRaster::from_elem((32, 32), 0.1);
    for i in 5..20 {
        for j in 5..20 {
            probability[[i, j]] = 0.9;
        }
    }
    for i in 11..14 {
        for j in 11..14 {
            probability[[i, j]] = 0.2;
        }
    }
    for j in 20..30 {
        probability[[28, j]] = 0.8;
    }
    probability
}

#[test]
fn test_postprocess_removes_noise_and_fills_islands() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mask = postprocess_mask(&lake_probability(), 0.5).unwrap();

    assert_eq!(mask.iter().filter(|&&v| v != 0).count(), 15 * 15);
    assert_eq!(mask[[12, 12]], 1);
    assert_eq!(mask[[28, 25]], 0);

    let metrics = morphological_metrics(&mask);
    assert_eq!(metrics.len(), 1);
    assert_relative_eq!(metrics.area[0], 225.0);
    assert_relative_eq!(metrics.eccentricity[0], 0.0, epsilon = 1e-9);
    assert_relative_eq!(metrics.solidity[0], 1.0);
}

#[test]
fn test_custom_postprocessor_keeps_islands() {
    let processor = MaskPostProcessor::new(PostprocessParams {
        threshold: 0.5,
        min_size: 5,
        fill_holes: false,
        connectivity: Connectivity::Four,
    });
    let mask = processor.postprocess(&lake_probability()).unwrap();

    assert_eq!(mask[[12, 12]], 0);
    assert_eq!(mask[[28, 25]], 1);
    assert_eq!(mask.iter().filter(|&&v| v != 0).count(), 225 - 9 + 10);
}

#[test]
fn test_ndwi_mask_matches_threshold() {
    let green = FloatRaster::from_shape_vec((1, 3), vec![0.3, 0.1, 0.2]).unwrap();
    let nir = FloatRaster::from_shape_vec((1, 3), vec![0.1, 0.3, 0.2]).unwrap();

    let index = ndwi(&green, &nir).unwrap();
    assert_relative_eq!(index[[0, 0]], 0.5, epsilon = 1e-6);
    assert_relative_eq!(index[[0, 1]], -0.5, epsilon = 1e-6);

    let mask: BinaryMask = river_mask(&index, 0.2);
    assert_eq!(mask.into_raw_vec(), vec![1, 0, 0]);
}

#[test]
fn test_preprocess_image_resizes_and_scales() {
    let image = Array3::<u8>::from_elem((64, 48, 3), 255);
    let tile = preprocess_image(&image, (256, 256)).unwrap();

    assert_eq!(tile.dim(), (256, 256, 3));
    assert!(tile.iter().all(|&v| (v - 1.0).abs() < 1e-6));
}
