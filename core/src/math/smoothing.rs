use ndarray::Array2;

use crate::math::matrix::MatrixHelper;

pub struct SmoothingHelper;

impl SmoothingHelper {
    /// Local polynomial (Savitzky-Golay) smoothing of a scalar series.
    ///
    /// Even window lengths are decremented by one; the polynomial order is
    /// min(3, window - 1). A series shorter than the window is returned
    /// unchanged, and any numerical failure in the fit falls back to the
    /// unmodified series; smoothing never fails the pipeline.
    pub fn savgol(series: &[f32], window: usize) -> Vec<f32> {
        let mut window = window;
        if window % 2 == 0 {
            window = window.saturating_sub(1);
        }
        if window < 3 || series.len() < window {
            return series.to_vec();
        }
        let order = usize::min(3, window - 1);
        Self::polynomial_fit(series, window, order).unwrap_or_else(|| series.to_vec())
    }

    fn polynomial_fit(series: &[f32], window: usize, order: usize) -> Option<Vec<f32>> {
        let n = series.len();
        let half = window / 2;
        let cols = order + 1;

        // Vandermonde design matrix over the window offsets -half..=half.
        let mut design = Array2::<f64>::zeros((window, cols));
        for row in 0..window {
            let x = row as f64 - half as f64;
            let mut power = 1.0;
            for col in 0..cols {
                design[[row, col]] = power;
                power *= x;
            }
        }

        let normal = MatrixHelper::multiply(design.t(), design.view());
        let inverse = MatrixHelper::invert(&normal)?;
        let projector = MatrixHelper::multiply(inverse.view(), design.t());
        // Row r of the hat matrix gives the fitted value at window offset r.
        let hat = MatrixHelper::multiply(design.view(), projector.view());

        let mut smoothed = vec![0.0f32; n];
        for t in half..n - half {
            let mut acc = 0.0f64;
            for k in 0..window {
                acc += hat[[half, k]] * series[t - half + k] as f64;
            }
            smoothed[t] = acc as f32;
        }
        // Edges: evaluate the polynomial fitted to the first/last full window.
        for t in 0..half {
            let mut acc = 0.0f64;
            for k in 0..window {
                acc += hat[[t, k]] * series[k] as f64;
            }
            smoothed[t] = acc as f32;
        }
        let start = n - window;
        for t in n - half..n {
            let row = t - start;
            let mut acc = 0.0f64;
            for k in 0..window {
                acc += hat[[row, k]] * series[start + k] as f64;
            }
            smoothed[t] = acc as f32;
        }

        Some(smoothed)
    }
}
