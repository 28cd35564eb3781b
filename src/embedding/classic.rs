//! Classical (Torgerson) multidimensional scaling.
//!
//! Double-centres the squared dissimilarities, `B = -½ J D² J`, and reads the
//! coordinates off the top eigenpairs: column `c` is `v_c · sqrt(max(λ_c, 0))`.
//! Used on its own for `MdsMethod::Classic` and as the SMACOF starting point
//! otherwise.

use ndarray::{Array2, ArrayView2, Axis};

use crate::math::linalg::symmetric_eigen_desc;

/// Classical MDS of a symmetric dissimilarity matrix into `n_components` dimensions.
///
/// Components beyond the matrix rank (or beyond `n`) are zero.
pub fn classical_mds(dissimilarities: ArrayView2<'_, f64>, n_components: usize) -> Array2<f64> {
    let n = dissimilarities.nrows();
    if n == 0 {
        return Array2::zeros((0, n_components));
    }

    let squared = dissimilarities.mapv(|d| d * d);
    let row_means = squared.mean_axis(Axis(1)).unwrap_or_else(|| ndarray::Array1::zeros(n));
    let col_means = squared.mean_axis(Axis(0)).unwrap_or_else(|| ndarray::Array1::zeros(n));
    let grand_mean = row_means.mean().unwrap_or(0.0);

    let centred = Array2::from_shape_fn((n, n), |(i, j)| {
        -0.5 * (squared[[i, j]] - row_means[i] - col_means[j] + grand_mean)
    });

    let (values, vectors) = symmetric_eigen_desc(centred.view());
    let mut coords = Array2::zeros((n, n_components));
    for c in 0..n_components.min(values.len()) {
        let scale = values[c].max(0.0).sqrt();
        for i in 0..n {
            coords[[i, c]] = vectors[(i, c)] * scale;
        }
    }
    coords
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::distance::{pairwise_distances, DistanceMetric};
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array2};

    #[test]
    fn recovers_planar_distances() {
        let points: Array2<f64> = array![[0.0, 0.0], [3.0, 0.0], [0.0, 4.0], [3.0, 4.0], [1.5, 2.0]];
        let d = pairwise_distances(points.view(), DistanceMetric::Euclidean);
        let y = classical_mds(d.view(), 2);
        let d_hat = pairwise_distances(y.view(), DistanceMetric::Euclidean);
        for (a, b) in d.iter().zip(d_hat.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-8);
        }
    }

    #[test]
    fn extra_components_are_zero_for_tiny_inputs() {
        let d: Array2<f64> = array![[0.0, 1.0], [1.0, 0.0]];
        let y = classical_mds(d.view(), 3);
        assert_eq!(y.dim(), (2, 3));
        assert!(y.column(2).iter().all(|&v| v == 0.0));
    }
}
