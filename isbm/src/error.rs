use thiserror::Error;

/// Failures local to a single trial. None of them is transient.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IsbmError {
    /// A probability outside `[0, 1]` (or NaN)
    #[error("{context}: probability {value} is outside [0, 1]")]
    InvalidProbability {
        /// offending value
        value: f64,
        /// where it was found
        context: &'static str,
    },

    /// A label that is neither `-1` nor `+1`
    #[error("label {value} of node {index} is not -1 or +1")]
    InvalidLabel {
        /// node index
        index: usize,
        /// offending label
        value: i8,
    },

    /// Both conditional Gibbs weights vanished (or became NaN)
    #[error("conditional weights of node {node} could not be normalized in sweep {sweep}")]
    DegenerateNormalization {
        /// node being updated
        node: usize,
        /// sweep index
        sweep: usize,
    },

    /// Rejected before any sampling takes place
    #[error("invalid configuration: {0}")]
    Configuration(String),
}

impl From<anyhow::Error> for IsbmError {
    fn from(e: anyhow::Error) -> Self {
        IsbmError::Configuration(format!("{:#}", e))
    }
}

/// Result alias for the sampling pipeline
pub type Result<T> = std::result::Result<T, IsbmError>;
