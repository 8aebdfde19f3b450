use thiserror::Error as ThisError;

/// Represents errors that can occur during a multivariate analysis.
#[derive(Debug, ThisError, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The input sample size is too small for the test.
    #[error("Sample size must be at least {needed}, but was given {given}.")]
    InsufficientSampleSize { given: usize, needed: usize },

    /// Fewer distinct groups were found in the data than the design requires.
    #[error("At least {needed} distinct groups are required, but found {given}.")]
    InsufficientGroups { given: usize, needed: usize },

    /// The observations do not form a rectangular table: rows of differing
    /// lengths, empty rows, or a group-label count that disagrees with the
    /// row count.
    #[error("Every observation must have the same, non-zero number of responses.")]
    DimensionMismatch,

    /// The input data contains `NaN` values.
    #[error("Input data must not contain NaN values.")]
    ContainsNaN,

    /// The total scatter matrix `SSB + SSW` has a numerically zero
    /// determinant (or the within-group scatter is degenerate), so Wilks'
    /// Lambda is undefined.
    #[error("The scatter matrices are singular, Wilks' Lambda is undefined.")]
    SingularMatrix,

    /// The sample covariance matrix is not invertible, e.g. because the
    /// sample size does not exceed the number of responses or the responses
    /// are collinear.
    #[error("The sample covariance matrix is singular, the test cannot be computed.")]
    SingularCovariance,

    /// The residual degrees of freedom of the F approximation are
    /// non-positive, so the approximation is undefined.
    #[error("The F approximation requires positive residual degrees of freedom, but d2 = {d2}.")]
    InvalidDesign { d2: i64 },

    /// See [`statrs::distribution::GammaError`].
    #[error("{0}")]
    GammaError(#[from] statrs::distribution::GammaError),

    /// See [`statrs::distribution::FisherSnedecorError`].
    #[error("{0}")]
    FisherSnedecorError(#[from] statrs::distribution::FisherSnedecorError),
}
