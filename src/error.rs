use thiserror::Error;

/// Input problems detected before any variable is created.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    /// Only the cataloged chains with 3, 4 or 5 stages are supported
    #[error("unsupported stage count {0}, expected one of 3, 4 or 5")]
    UnsupportedStageCount(usize),
    /// The aggregation factor must be at least one
    #[error("aggregation factor must be at least 1")]
    ZeroAggregation,
    /// The base horizon must contain at least one period
    #[error("the base horizon must contain at least one period")]
    EmptyHorizon,
    /// A per-period (or per-stage) vector has the wrong length
    #[error("`{field}` has length {actual}, expected {expected}")]
    LengthMismatch {
        field: String,
        expected: usize,
        actual: usize,
    },
    /// A quantity or cost that must be non-negative and finite is not
    #[error("`{field}` must be finite and non-negative, got {value}")]
    InvalidValue { field: String, value: f64 },
    /// Price break upper bounds must be strictly increasing
    #[error("price breaks of supplier `{supplier}` are not strictly increasing at interval {index}")]
    NonMonotonicPriceBreaks { supplier: String, index: usize },
    /// A supplier has no price breaks at all
    #[error("supplier `{0}` has no price breaks")]
    NoPriceBreaks(String),
    /// Cumulative capacities may only grow over time
    #[error("cumulative capacity of supplier `{supplier}` decreases in base period {period}")]
    NonMonotonicCapacity { supplier: String, period: usize },
    /// Order bounds are inverted
    #[error("supplier `{supplier}` has minimum order {min} above maximum order {max}")]
    InvertedOrderBounds { supplier: String, min: f64, max: f64 },
    /// Freight band has `min > max`
    #[error("freight band {index} has min {min} above max {max}")]
    InvertedFreightBand { index: usize, min: f64, max: f64 },
    /// Freight bands must be ordered and disjoint
    #[error("freight band {index} overlaps or precedes the band before it")]
    OverlappingFreightBands { index: usize },
    /// The number of production sites does not match the topology
    #[error("topology with {stages} stages needs {expected} production site(s), got {actual}")]
    SiteCountMismatch {
        stages: usize,
        expected: usize,
        actual: usize,
    },
    /// Weighted demand distribution with unusable weights
    #[error("demand weights must be {expected} non-negative values with a positive sum")]
    InvalidDemandWeights { expected: usize },
    /// The requested solver backend was not compiled in
    #[error("solver backend `{0}` is not available in this build")]
    MissingBackend(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
    /// A coefficient, bound or right-hand side is NaN or infinite where it must be finite
    #[error("non-finite value in `{name}`")]
    NonFinite { name: String },
    /// Lower bound above upper bound
    #[error("variable `{name}` has lower bound {lb} above upper bound {ub}")]
    InvalidBounds { name: String, lb: f64, ub: f64 },
    /// Referenced variable does not belong to the model
    #[error("`{0}` refers to a variable of another model")]
    UnknownVariable(String),
    /// Assignment does not match the model it is evaluated against
    #[error("assignment has {actual} values, the model has {expected} variables")]
    AssignmentSize { expected: usize, actual: usize },
    /// Failure inside a solver backend (not infeasibility)
    #[error("{backend} backend failed: {message}")]
    Backend { backend: String, message: String },
    #[error("invalid scenario document: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(feature = "gurobi")]
impl From<grb::Error> for Error {
    fn from(err: grb::Error) -> Self {
        Error::Backend {
            backend: "gurobi".to_string(),
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
