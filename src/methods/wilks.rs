use std::hash::Hash;

use nalgebra::{ComplexField, RealField};
use statrs::distribution::{ContinuousCDF, FisherSnedecor};

use crate::{Error, Float, GroupedSample, ScatterMatrices};

/// The result of a Wilks' Lambda test.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct WilksComputation<T: Float> {
    /// Wilks' Lambda, `det(SSW) / det(SSB + SSW)`, in `(0, 1]`. Values near
    /// zero indicate strong group separation, values near one indicate none.
    pub lambda: T,

    /// The approximate F statistic derived from Lambda.
    pub statistic: T,

    /// The upper-tail probability of the F statistic.
    pub p_value: T,
}

/// Performs the Wilks' Lambda test on precomputed scatter matrices.
///
/// The statistic `Lambda = det(SSW) / det(SSB + SSW)` is transformed into an
/// approximate F statistic with `d1 = p(k - 1)` and `d2 = n - k - p + 1`
/// degrees of freedom:
///
/// ```text
/// F = (d2 / d1) * (1 - Lambda) / Lambda
/// ```
///
/// This transform is exact for `k = 2` or `p = 1` and a common approximation
/// otherwise. The p-value is the survival probability of `F`.
///
/// Takes the scatter matrices from [`GroupedSample::scatter`], the group
/// count `k`, and the total sample size `n`; the response dimension is read
/// off the matrices.
///
/// # Examples
///
/// ```
/// use manova::{GroupedSample, wilks_lambda};
///
/// let groups = ["a", "a", "a", "b", "b", "b"];
/// let rows = vec![
///     vec![1.0, 3.0],
///     vec![2.0, 2.5],
///     vec![3.0, 4.0],
///     vec![2.0, 3.5],
///     vec![3.0, 2.0],
///     vec![4.0, 3.0],
/// ];
///
/// let sample = GroupedSample::from_rows(groups, rows).unwrap();
/// let means = sample.means();
/// let scatter = sample.scatter(&means);
///
/// let result = wilks_lambda(&scatter, sample.group_count(), sample.n()).unwrap();
/// assert!(result.lambda > 0.0 && result.lambda <= 1.0);
/// // The group means barely differ, so the test does not reject.
/// assert!(result.p_value > 0.05);
/// ```
pub fn wilks_lambda<T: Float + RealField>(
    scatter: &ScatterMatrices<T>,
    k: usize,
    n: usize,
) -> Result<WilksComputation<T>, Error> {
    if k < 2 {
        return Err(Error::InsufficientGroups { given: k, needed: 2 });
    }

    let p = scatter.within.nrows();
    let d2 = n as i64 - k as i64 - p as i64 + 1;
    if d2 <= 0 {
        return Err(Error::InvalidDesign { d2 });
    }

    let d1 = (p * (k - 1)) as f64;
    let d2 = d2 as f64;

    let det_total = scatter.total().determinant();
    if ComplexField::abs(det_total) <= T::epsilon() {
        return Err(Error::SingularMatrix);
    }

    let lambda = scatter.within.determinant() / det_total;
    if lambda <= T::zero() {
        return Err(Error::SingularMatrix);
    }

    let lambda_f = lambda.to_f64().unwrap();
    let statistic = (d2 / d1) * (1.0 - lambda_f) / lambda_f;
    let dist = FisherSnedecor::new(d1, d2)?;
    let p_value = dist.sf(statistic);

    Ok(WilksComputation {
        lambda,
        statistic: T::from(statistic).unwrap(),
        p_value: T::from(p_value).unwrap(),
    })
}

/// Runs the full one-factor MANOVA pipeline: builds the grouped sample,
/// computes group means and scatter matrices, and reduces them with
/// [`wilks_lambda`].
///
/// Takes a group label per observation and a nested iterator of observation
/// rows, with the same validation rules as [`GroupedSample::from_rows`].
///
/// # Examples
///
/// ```
/// use manova::manova;
///
/// // Two groups of five bivariate observations, centered at (0, 0) and (5, 5).
/// let groups = ["a", "a", "a", "a", "a", "b", "b", "b", "b", "b"];
/// let rows = vec![
///     vec![0.5, -0.3],
///     vec![-1.2, 0.8],
///     vec![0.3, 1.1],
///     vec![-0.7, -0.9],
///     vec![1.0, 0.4],
///     vec![5.5, 4.7],
///     vec![4.3, 5.8],
///     vec![5.3, 6.1],
///     vec![4.6, 4.1],
///     vec![6.0, 5.4],
/// ];
///
/// let result = manova(groups, rows).unwrap();
/// assert!(result.lambda < 0.1);
/// assert!(result.p_value < 0.01);
/// ```
pub fn manova<T, L, G, I, J>(groups: G, rows: I) -> Result<WilksComputation<T>, Error>
where
    T: Float + RealField,
    L: Clone + Eq + Hash,
    G: IntoIterator<Item = L>,
    I: IntoIterator<Item = J>,
    J: IntoIterator<Item = T>,
{
    let sample = GroupedSample::from_rows(groups, rows)?;
    let means = sample.means();
    let scatter = sample.scatter(&means);

    wilks_lambda(&scatter, sample.group_count(), sample.n())
}
