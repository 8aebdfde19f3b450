use nalgebra::{ComplexField, DMatrix, RealField};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::{Computation, Error, Float};

/// The result of Mardia's multivariate normality test.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct MardiaComputation<T: Float> {
    /// The multivariate skewness `b1p` and its upper-tail chi-squared
    /// p-value with `p(p + 1)(p + 2) / 6` degrees of freedom.
    pub skewness: Computation<T>,

    /// The multivariate kurtosis `b2p`, the mean fourth power of the
    /// Mahalanobis distances.
    pub kurtosis_statistic: T,

    /// The standardized kurtosis, asymptotically standard normal under
    /// multivariate normality.
    pub kurtosis_z: T,

    /// Whether the sample is approximately multivariate normal at the fixed
    /// thresholds: skewness p-value above 0.05 and `|z|` below 1.96. Callers
    /// needing a different significance level must post-process the raw
    /// statistics.
    pub normal: bool,
}

/// Performs Mardia's skewness and kurtosis tests to assess multivariate
/// normality.
///
/// The rows are centered by the sample mean vector and weighted by the
/// inverse of the sample covariance matrix (the `n - 1` divisor). Skewness
/// sums the cubed bilinear form over all ordered pairs of centered rows;
/// kurtosis averages the fourth power of the per-row Mahalanobis distance.
///
/// Takes an argument `data` which is an iterator of iterators representing
/// the dataset (rows are observations).
///
/// This diagnostic is typically run on the response columns before trusting
/// the distributional assumptions of [`wilks_lambda`](crate::wilks_lambda).
///
/// # Examples
///
/// ```
/// use manova::mardia;
///
/// // Symmetric 2D data: the skewness statistic vanishes exactly.
/// let data = vec![
///     vec![1.0, 0.0],
///     vec![-1.0, 0.0],
///     vec![0.0, 1.0],
///     vec![0.0, -1.0],
///     vec![2.0, 1.0],
///     vec![-2.0, -1.0],
/// ];
///
/// let result = mardia(data).unwrap();
/// assert!(result.skewness.p_value > 0.05);
/// assert!(result.normal);
/// ```
pub fn mardia<T: Float + RealField, I: IntoIterator<Item = J>, J: IntoIterator<Item = T>>(
    data: I,
) -> Result<MardiaComputation<T>, Error> {
    let mut flat_data = Vec::new();
    let mut n = 0;
    let mut p = 0;

    for (i, row) in data.into_iter().enumerate() {
        n += 1;
        let mut row_len = 0;

        for val in row {
            if val.is_nan() {
                return Err(Error::ContainsNaN);
            }
            flat_data.push(val);
            row_len += 1;
        }

        if i == 0 {
            p = row_len;

            if p == 0 {
                return Err(Error::DimensionMismatch);
            }
        } else if row_len != p {
            return Err(Error::DimensionMismatch);
        }
    }

    if n < 2 {
        return Err(Error::InsufficientSampleSize {
            given: n,
            needed: 2,
        });
    }

    // With n <= p the centered rows cannot span R^p, so the covariance
    // matrix is always singular.
    if n <= p {
        return Err(Error::SingularCovariance);
    }

    let x_mat = DMatrix::from_row_slice(n, p, &flat_data);
    let mean_vec = x_mat.row_mean();
    let mut x_centered = x_mat;

    for i in 0..n {
        let mut row = x_centered.row_mut(i);
        row -= &mean_vec;
    }

    let s_mat =
        (x_centered.transpose() * &x_centered).map(|v| v / T::from(n - 1).unwrap());

    if ComplexField::abs(s_mat.determinant()) <= T::epsilon() {
        return Err(Error::SingularCovariance);
    }

    let s_inv = s_mat.try_inverse().ok_or(Error::SingularCovariance)?;

    // d_mat[(i, j)] is the bilinear form of centered rows i and j; its
    // diagonal holds the squared Mahalanobis distances.
    let d_mat = &x_centered * s_inv * x_centered.transpose();

    let n_f64 = n as f64;
    let p_f64 = p as f64;

    let entries = d_mat.as_slice();
    let sum_cubed: f64 = iter_if_parallel!(entries).map(|&v| v.to_f64().unwrap().powi(3)).sum();
    let b1p = sum_cubed / (n_f64 * n_f64);

    let chi_skew = n_f64 * b1p / 6.0;
    let df_skew = p_f64 * (p_f64 + 1.0) * (p_f64 + 2.0) / 6.0;
    let dist_skew = ChiSquared::new(df_skew)?;
    let p_skew = dist_skew.sf(chi_skew);

    let sum_diag_sq: f64 = d_mat.diagonal().iter().map(|&v| v.to_f64().unwrap().powi(2)).sum();
    let b2p = sum_diag_sq / n_f64;
    let expected_kurt = p_f64 * (p_f64 + 2.0);
    let kurtosis_z = (b2p - expected_kurt) / (8.0 * expected_kurt / n_f64).sqrt();

    let normal = p_skew > 0.05 && kurtosis_z.abs() < 1.96;

    Ok(MardiaComputation {
        skewness: Computation {
            statistic: T::from(b1p).unwrap(),
            p_value: T::from(p_skew).unwrap(),
        },
        kurtosis_statistic: T::from(b2p).unwrap(),
        kurtosis_z: T::from(kurtosis_z).unwrap(),
        normal,
    })
}
