use assert_float_eq::{assert_float_absolute_eq, assert_float_relative_eq};
use manova::{Error, GroupedSample, ScatterMatrices, manova, wilks_lambda};
use nalgebra::{DMatrix, DVector};

fn blocked_sample() -> (Vec<&'static str>, Vec<Vec<f64>>) {
    let groups = vec!["x", "x", "y", "y", "z", "z"];
    let rows = vec![
        vec![1.2, 0.5],
        vec![0.8, 1.9],
        vec![2.4, 2.2],
        vec![3.1, 1.7],
        vec![5.0, 4.2],
        vec![4.4, 3.9],
    ];

    (groups, rows)
}

#[test]
fn identical_group_means_give_lambda_one() {
    // Both groups hold the same four observations, so SSB vanishes.
    let groups = ["a", "a", "a", "a", "b", "b", "b", "b"];
    let rows = vec![
        vec![1.0, 2.0],
        vec![3.0, 3.0],
        vec![5.0, 1.0],
        vec![2.0, 5.0],
        vec![1.0, 2.0],
        vec![3.0, 3.0],
        vec![5.0, 1.0],
        vec![2.0, 5.0],
    ];

    let sample = GroupedSample::from_rows(groups, rows).unwrap();
    let means = sample.means();
    let scatter = sample.scatter(&means);

    for v in scatter.between.iter() {
        assert_float_absolute_eq!(*v, 0.0, 1e-12);
    }

    let result = wilks_lambda(&scatter, sample.group_count(), sample.n()).unwrap();
    assert_float_absolute_eq!(result.lambda, 1.0, 1e-12);
    assert_float_absolute_eq!(result.statistic, 0.0, 1e-12);
    assert!(result.p_value > 0.05);
}

#[test]
fn univariate_two_groups_match_classical_anova_f() {
    let a = [1.0, 2.0, 3.0];
    let b = [2.0, 3.0, 4.0];

    let groups = ["a", "a", "a", "b", "b", "b"];
    let rows = a.iter().chain(b.iter()).map(|&x| [x]);
    let result = manova(groups, rows).unwrap();

    // One-way ANOVA on the same data, computed from scalar sums of squares.
    let mean = |s: &[f64]| s.iter().sum::<f64>() / s.len() as f64;
    let (ma, mb) = (mean(&a), mean(&b));
    let grand = (ma + mb) / 2.0;
    let ssb = 3.0 * (ma - grand).powi(2) + 3.0 * (mb - grand).powi(2);
    let ssw = a.iter().map(|x| (x - ma).powi(2)).sum::<f64>()
        + b.iter().map(|x| (x - mb).powi(2)).sum::<f64>();
    let f_classical = (ssb / 1.0) / (ssw / 4.0);

    assert_float_relative_eq!(result.statistic, f_classical, 1e-12);
    assert_float_relative_eq!(result.lambda, 8.0 / 11.0, 1e-12);
    assert_float_relative_eq!(result.statistic, 1.5, 1e-12);
}

#[test]
fn scatter_matrices_sum_to_total_scatter() {
    let (groups, rows) = blocked_sample();
    let sample = GroupedSample::from_rows(groups, rows.clone()).unwrap();
    let means = sample.means();
    let scatter = sample.scatter(&means);
    let total = scatter.total();

    let mut expected = DMatrix::zeros(2, 2);
    for row in &rows {
        let diff = DVector::from_column_slice(row) - &means.grand;
        expected += &diff * diff.transpose();
    }

    for (actual, wanted) in total.iter().zip(expected.iter()) {
        assert_float_absolute_eq!(*actual, *wanted, 1e-9);
    }
}

#[test]
fn lambda_is_invariant_under_nonsingular_linear_transforms() {
    let (groups, rows) = blocked_sample();
    // y = A x with A = [[2, 1], [0, 3]], det(A) = 6.
    let transformed: Vec<Vec<f64>> = rows
        .iter()
        .map(|r| vec![2.0 * r[0] + r[1], 3.0 * r[1]])
        .collect();

    let original = manova(groups.clone(), rows).unwrap();
    let mapped = manova(groups, transformed).unwrap();

    assert_float_relative_eq!(original.lambda, mapped.lambda, 1e-9);
    assert_float_relative_eq!(original.statistic, mapped.statistic, 1e-9);
}

#[test]
fn well_separated_groups_reject() {
    // Two groups of five, centered at (0, 0) and (5, 5) with unit-scale noise.
    let groups = ["a", "a", "a", "a", "a", "b", "b", "b", "b", "b"];
    let rows = vec![
        vec![0.5, -0.3],
        vec![-1.2, 0.8],
        vec![0.3, 1.1],
        vec![-0.7, -0.9],
        vec![1.0, 0.4],
        vec![5.5, 4.7],
        vec![4.3, 5.8],
        vec![5.3, 6.1],
        vec![4.6, 4.1],
        vec![6.0, 5.4],
    ];

    let result = manova(groups, rows).unwrap();
    assert!(result.lambda < 0.1, "lambda = {}", result.lambda);
    assert!(result.p_value < 0.01, "p = {}", result.p_value);
}

#[test]
fn groups_are_discovered_in_first_seen_order() {
    let groups = ["beta", "alpha", "beta", "alpha"];
    let rows = vec![
        vec![1.0, 0.0],
        vec![0.0, 1.0],
        vec![2.0, 0.0],
        vec![0.0, 2.0],
    ];

    let sample = GroupedSample::from_rows(groups, rows).unwrap();
    assert_eq!(sample.group_labels(), &["beta", "alpha"]);
    assert_eq!(sample.group_sizes(), &[2, 2]);

    let means = sample.means();
    assert_float_absolute_eq!(means.per_group[0][0], 1.5, 1e-12);
    assert_float_absolute_eq!(means.per_group[1][1], 1.5, 1e-12);
}

#[test]
fn insufficient_residual_degrees_of_freedom() {
    // K = 3 groups, N = 5, P = 3: d2 = 5 - 3 - 3 + 1 = 0.
    let groups = ["a", "a", "b", "b", "c"];
    let rows = vec![
        vec![1.0, 2.0, 0.5],
        vec![2.0, 1.5, 1.0],
        vec![3.0, 0.5, 2.0],
        vec![2.5, 1.0, 1.5],
        vec![1.5, 2.5, 0.0],
    ];

    let err = manova::<f64, _, _, _, _>(groups, rows).unwrap_err();
    assert_eq!(err, Error::InvalidDesign { d2: 0 });
}

#[test]
fn collinear_responses_are_singular() {
    // Every observation lies on the line y = x, so SSB + SSW is singular.
    let groups = ["a", "a", "b", "b"];
    let rows = vec![
        vec![1.0, 1.0],
        vec![2.0, 2.0],
        vec![3.0, 3.0],
        vec![5.0, 5.0],
    ];

    let err = manova::<f64, _, _, _, _>(groups, rows).unwrap_err();
    assert_eq!(err, Error::SingularMatrix);
}

#[test]
fn wilks_lambda_requires_two_groups() {
    let scatter = ScatterMatrices {
        between: DMatrix::zeros(2, 2),
        within: DMatrix::identity(2, 2),
    };

    let err = wilks_lambda::<f64>(&scatter, 1, 10).unwrap_err();
    assert_eq!(
        err,
        Error::InsufficientGroups {
            given: 1,
            needed: 2
        }
    );
}

#[test]
fn input_validation() {
    let rows = || vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]];

    // A single group is not a design.
    let err = GroupedSample::from_rows(["a", "a", "a"], rows()).unwrap_err();
    assert_eq!(
        err,
        Error::InsufficientGroups {
            given: 1,
            needed: 2
        }
    );

    // Label count must match the row count.
    let err = GroupedSample::from_rows(["a", "b"], rows()).unwrap_err();
    assert_eq!(err, Error::DimensionMismatch);

    // Ragged rows.
    let err =
        GroupedSample::from_rows(["a", "b"], vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();
    assert_eq!(err, Error::DimensionMismatch);

    // Empty rows.
    let empty: Vec<Vec<f64>> = vec![vec![], vec![]];
    let err = GroupedSample::from_rows(["a", "b"], empty).unwrap_err();
    assert_eq!(err, Error::DimensionMismatch);

    // NaN anywhere in the responses.
    let err = GroupedSample::from_rows(
        ["a", "b"],
        vec![vec![1.0, f64::NAN], vec![3.0, 4.0]],
    )
    .unwrap_err();
    assert_eq!(err, Error::ContainsNaN);
}
