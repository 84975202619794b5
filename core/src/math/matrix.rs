use ndarray::{Array2, ArrayView2};

pub struct MatrixHelper;

impl MatrixHelper {
    /// Multiply two 2D arrays (all f64 for the smoothing fits).
    pub fn multiply(lhs: ArrayView2<f64>, rhs: ArrayView2<f64>) -> Array2<f64> {
        lhs.dot(&rhs)
    }

    /// Gauss-Jordan inverse with partial pivoting. Returns `None` for a
    /// non-square or singular matrix.
    pub fn invert(matrix: &Array2<f64>) -> Option<Array2<f64>> {
        let n = matrix.nrows();
        if matrix.ncols() != n {
            return None;
        }

        let mut work = matrix.clone();
        let mut inverse = Array2::<f64>::eye(n);

        for col in 0..n {
            let mut pivot = col;
            for row in col + 1..n {
                if work[[row, col]].abs() > work[[pivot, col]].abs() {
                    pivot = row;
                }
            }
            if work[[pivot, col]].abs() < 1e-12 {
                return None;
            }
            if pivot != col {
                for k in 0..n {
                    work.swap([pivot, k], [col, k]);
                    inverse.swap([pivot, k], [col, k]);
                }
            }

            let scale = work[[col, col]];
            for k in 0..n {
                work[[col, k]] /= scale;
                inverse[[col, k]] /= scale;
            }
            for row in 0..n {
                if row == col {
                    continue;
                }
                let factor = work[[row, col]];
                if factor == 0.0 {
                    continue;
                }
                for k in 0..n {
                    work[[row, k]] -= factor * work[[col, k]];
                    inverse[[row, k]] -= factor * inverse[[col, k]];
                }
            }
        }

        Some(inverse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn multiply_matches_hand_computation() {
        let lhs = array![[1.0, 2.0], [3.0, 4.0]];
        let rhs = array![[5.0, 6.0], [7.0, 8.0]];
        let product = MatrixHelper::multiply(lhs.view(), rhs.view());
        assert_eq!(product, array![[19.0, 22.0], [43.0, 50.0]]);
    }

    #[test]
    fn invert_recovers_identity() {
        let m = array![[4.0, 7.0], [2.0, 6.0]];
        let inv = MatrixHelper::invert(&m).unwrap();
        let product = MatrixHelper::multiply(m.view(), inv.view());
        for i in 0..2 {
            for j in 0..2 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((product[[i, j]] - expected).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn invert_rejects_singular_matrix() {
        let m = array![[1.0, 2.0], [2.0, 4.0]];
        assert!(MatrixHelper::invert(&m).is_none());
    }
}
