use std::collections::HashMap;
use std::hash::Hash;

use nalgebra::{DMatrix, DVector, RealField};

use crate::{Error, Float};

/// A validated multivariate sample partitioned into groups.
///
/// Groups are discovered from the data in first-seen-label order, which
/// makes iteration (and therefore floating-point accumulation order)
/// deterministic without affecting the value of any statistic.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedSample<T: Float + RealField, L> {
    labels: Vec<L>,
    sizes: Vec<usize>,
    membership: Vec<usize>,
    data: DMatrix<T>,
}

/// Per-group mean vectors plus the grand mean, as produced by
/// [`GroupedSample::means`].
#[derive(Debug, Clone, PartialEq)]
pub struct GroupMeans<T: Float + RealField> {
    /// One mean vector per group, in first-seen-label order.
    pub per_group: Vec<DVector<T>>,

    /// The mean vector over all observations.
    pub grand: DVector<T>,
}

/// The between-group and within-group scatter (cross-product) matrices.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterMatrices<T: Float + RealField> {
    /// SSB, the between-group scatter matrix.
    pub between: DMatrix<T>,

    /// SSW, the within-group scatter matrix.
    pub within: DMatrix<T>,
}

impl<T: Float + RealField> ScatterMatrices<T> {
    /// Returns the total scatter matrix `SSB + SSW`, which equals the sum of
    /// outer products of every observation's deviation from the grand mean.
    #[must_use]
    pub fn total(&self) -> DMatrix<T> {
        &self.between + &self.within
    }
}

impl<T: Float + RealField, L: Clone + Eq + Hash> GroupedSample<T, L> {
    /// Builds a grouped sample from a group label per observation and a
    /// nested iterator of observation rows.
    ///
    /// Every row must have the same non-zero length, the number of labels
    /// must match the number of rows, the data must be free of `NaN`, and at
    /// least two distinct groups must be present.
    ///
    /// # Examples
    ///
    /// ```
    /// use manova::GroupedSample;
    ///
    /// let groups = ["a", "a", "b", "b"];
    /// let rows = vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0], vec![7.0, 8.0]];
    ///
    /// let sample = GroupedSample::from_rows(groups, rows).unwrap();
    /// assert_eq!(sample.group_sizes(), &[2, 2]);
    ///
    /// let means = sample.means();
    /// assert_eq!(means.grand[0], 4.0);
    /// assert_eq!(means.per_group[1][1], 7.0);
    /// ```
    pub fn from_rows<G, I, J>(groups: G, rows: I) -> Result<Self, Error>
    where
        G: IntoIterator<Item = L>,
        I: IntoIterator<Item = J>,
        J: IntoIterator<Item = T>,
    {
        let mut flat_data = Vec::new();
        let mut n = 0;
        let mut p = 0;

        for (i, row) in rows.into_iter().enumerate() {
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

        let mut labels = Vec::new();
        let mut sizes = Vec::new();
        let mut membership = Vec::with_capacity(n);
        let mut index: HashMap<L, usize> = HashMap::new();

        for label in groups {
            let g = *index.entry(label.clone()).or_insert_with(|| {
                labels.push(label);
                sizes.push(0);
                labels.len() - 1
            });
            sizes[g] += 1;
            membership.push(g);
        }

        if membership.len() != n {
            return Err(Error::DimensionMismatch);
        }

        if labels.len() < 2 {
            return Err(Error::InsufficientGroups {
                given: labels.len(),
                needed: 2,
            });
        }

        Ok(Self {
            labels,
            sizes,
            membership,
            data: DMatrix::from_row_slice(n, p, &flat_data),
        })
    }

    /// The total number of observations.
    #[must_use]
    pub fn n(&self) -> usize {
        self.data.nrows()
    }

    /// The number of response dimensions.
    #[must_use]
    pub fn p(&self) -> usize {
        self.data.ncols()
    }

    /// The number of distinct groups.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.labels.len()
    }

    /// The group labels in first-seen order.
    #[must_use]
    pub fn group_labels(&self) -> &[L] {
        &self.labels
    }

    /// The group sizes, parallel to [`group_labels`](Self::group_labels).
    #[must_use]
    pub fn group_sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// Computes the mean vector of each group and the grand mean vector.
    #[must_use]
    pub fn means(&self) -> GroupMeans<T> {
        let p = self.p();
        let mut per_group = vec![DVector::zeros(p); self.labels.len()];

        for (row, &g) in self.membership.iter().enumerate() {
            per_group[g] += self.data.row(row).transpose();
        }

        for (g, mean) in per_group.iter_mut().enumerate() {
            *mean /= T::from(self.sizes[g]).unwrap();
        }

        GroupMeans {
            per_group,
            grand: self.data.row_mean().transpose(),
        }
    }

    /// Accumulates the between-group and within-group scatter matrices from
    /// the given group means.
    ///
    /// SSB sums one outer product of `mean_g - grand_mean` per group, scaled
    /// by the group size; SSW sums the outer product of every observation's
    /// deviation from its own group mean.
    ///
    /// # Examples
    ///
    /// ```
    /// use manova::GroupedSample;
    ///
    /// let groups = ["a", "a", "b", "b"];
    /// let rows = vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0], vec![7.0, 8.0]];
    ///
    /// let sample = GroupedSample::from_rows(groups, rows).unwrap();
    /// let means = sample.means();
    /// let scatter = sample.scatter(&means);
    ///
    /// // Both group means are offset (2, 2) from the grand mean.
    /// assert_eq!(scatter.between[(0, 0)], 16.0);
    /// assert_eq!(scatter.within[(0, 0)], 4.0);
    /// ```
    #[must_use]
    pub fn scatter(&self, means: &GroupMeans<T>) -> ScatterMatrices<T> {
        let p = self.p();

        let mut between = DMatrix::zeros(p, p);
        for (g, mean) in means.per_group.iter().enumerate() {
            let diff = mean - &means.grand;
            between += (&diff * diff.transpose()) * T::from(self.sizes[g]).unwrap();
        }

        let mut within = DMatrix::zeros(p, p);
        for (row, &g) in self.membership.iter().enumerate() {
            let diff = self.data.row(row).transpose() - &means.per_group[g];
            within += &diff * diff.transpose();
        }

        ScatterMatrices { between, within }
    }
}
