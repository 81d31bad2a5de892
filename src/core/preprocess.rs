use crate::types::{RiverError, RiverResult};
use ndarray::{Array3, ArrayView3};
use serde::{Deserialize, Serialize};

/// Image preprocessing parameters for segmentation input
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessParams {
    /// Output height in pixels
    pub target_rows: usize,
    /// Output width in pixels
    pub target_cols: usize,
    /// Divisor applied after resampling (255 for 8-bit imagery)
    pub scale: f32,
}

impl Default for PreprocessParams {
    fn default() -> Self {
        Self {
            target_rows: 256,
            target_cols: 256,
            scale: 255.0,
        }
    }
}

/// Resamples and normalizes image tiles (rows x cols x channels)
pub struct ImagePreprocessor {
    params: PreprocessParams,
}

impl ImagePreprocessor {
    pub fn new(params: PreprocessParams) -> Self {
        Self { params }
    }

    /// 256x256, 8-bit input
    pub fn standard() -> Self {
        Self::new(PreprocessParams::default())
    }

    /// Resize to the target size, round back to 8-bit levels, then scale into [0, 1]
    pub fn preprocess(&self, image: &Array3<u8>) -> RiverResult<Array3<f32>> {
        if self.params.scale <= 0.0 {
            return Err(RiverError::InvalidParameter(format!(
                "Scale must be positive, got {}",
                self.params.scale
            )));
        }

        log::debug!(
            "Preprocessing {:?} image to {}x{}",
            image.dim(),
            self.params.target_rows,
            self.params.target_cols
        );

        let as_float = image.mapv(f32::from);
        let mut resized = resize_bilinear(
            as_float.view(),
            self.params.target_rows,
            self.params.target_cols,
        )?;
        // Resampled 8-bit data is stored back as 8-bit before scaling
        let scale = self.params.scale;
        resized.mapv_inplace(|v| v.round().clamp(0.0, 255.0) / scale);
        Ok(resized)
    }
}

/// Bilinear resize with half-pixel centre alignment and edge clamping.
///
/// Source coordinate for output index `d` is `(d + 0.5) * in / out - 0.5`,
/// clamped to the valid range, which matches the usual INTER_LINEAR mapping.
pub fn resize_bilinear(
    image: ArrayView3<f32>,
    out_rows: usize,
    out_cols: usize,
) -> RiverResult<Array3<f32>> {
    let (rows, cols, channels) = image.dim();
    if rows == 0 || cols == 0 || channels == 0 {
        return Err(RiverError::InvalidParameter(format!(
            "Cannot resize empty image {:?}",
            image.dim()
        )));
    }
    if out_rows == 0 || out_cols == 0 {
        return Err(RiverError::InvalidParameter(format!(
            "Target size {}x{} must be non-zero",
            out_rows, out_cols
        )));
    }

    let row_taps = interpolation_taps(rows, out_rows);
    let col_taps = interpolation_taps(cols, out_cols);

    let mut output = Array3::<f32>::zeros((out_rows, out_cols, channels));
    for (r, &(r0, r1, wr)) in row_taps.iter().enumerate() {
        for (c, &(c0, c1, wc)) in col_taps.iter().enumerate() {
            for ch in 0..channels {
                let top = image[[r0, c0, ch]] * (1.0 - wc) + image[[r0, c1, ch]] * wc;
                let bottom = image[[r1, c0, ch]] * (1.0 - wc) + image[[r1, c1, ch]] * wc;
                output[[r, c, ch]] = top * (1.0 - wr) + bottom * wr;
            }
        }
    }

    Ok(output)
}

/// (lower index, upper index, weight of upper) per output index
fn interpolation_taps(input_len: usize, output_len: usize) -> Vec<(usize, usize, f32)> {
    let ratio = input_len as f64 / output_len as f64;
    let max_index = (input_len - 1) as f64;

    (0..output_len)
        .map(|d| {
            let src = ((d as f64 + 0.5) * ratio - 0.5).clamp(0.0, max_index);
            let lower = src.floor() as usize;
            let upper = (lower + 1).min(input_len - 1);
            (lower, upper, (src - lower as f64) as f32)
        })
        .collect()
}

/// Convenience wrapper: resize to `target` (rows, cols) and divide by 255
pub fn preprocess_image(image: &Array3<u8>, target: (usize, usize)) -> RiverResult<Array3<f32>> {
    ImagePreprocessor::new(PreprocessParams {
        target_rows: target.0,
        target_cols: target.1,
        ..PreprocessParams::default()
    })
    .preprocess(image)
}
