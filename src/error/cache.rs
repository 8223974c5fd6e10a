use thiserror::Error;

/// Failure to turn a key's samples into numbers.
#[derive(Debug, Error)]
pub enum ReductionError {
    #[error("Sample {index} is not numeric: '{value}'.")]
    NonNumeric { index: usize, value: String },
    #[error("Sample {index} has shape {found:?}, expected {expected:?}.")]
    RaggedShape {
        index: usize,
        expected: Vec<usize>,
        found: Vec<usize>,
    },
    #[error("Histogram range [{min}, {max}] is not finite.")]
    NonFiniteRange { min: f64, max: f64 },
    #[error("Failed to build sample array: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Failed to reduce '{key}' with mode {mode}: {source}")]
    Reduction {
        key: String,
        mode: &'static str,
        #[source]
        source: ReductionError,
    },
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}
