use std::{error::Error, fmt};

use rand_distr::uniform::Error as UniformError;

/// The model module's result type.
pub type Result<T> = std::result::Result<T, ModelError>;

/// Failures while building or validating model-side values.
#[derive(Debug)]
pub enum ModelError {
    /// A layer width that must be positive was zero.
    ZeroWidth { field: &'static str },

    /// A deep network was requested without any hidden layer widths.
    MissingHiddenLayers,

    /// Input and label matrices disagree on the number of rows.
    RowCountMismatch { inputs: usize, labels: usize },

    /// The derived initialization range was invalid.
    Distribution(UniformError),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::ZeroWidth { field } => write!(f, "{field} must be positive"),
            ModelError::MissingHiddenLayers => {
                write!(f, "deep network variant requires at least one hidden layer width")
            }
            ModelError::RowCountMismatch { inputs, labels } => write!(
                f,
                "row count mismatch: {inputs} input row(s) against {labels} label row(s)"
            ),
            ModelError::Distribution(e) => write!(f, "invalid initialization range: {e}"),
        }
    }
}

impl Error for ModelError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ModelError::Distribution(e) => Some(e),
            _ => None,
        }
    }
}

impl From<UniformError> for ModelError {
    fn from(value: UniformError) -> Self {
        Self::Distribution(value)
    }
}
