use std::{error::Error, fmt, io};

/// The coordinator module's result type.
pub type Result<T> = std::result::Result<T, CoordinatorErr>;

/// Precondition violations inside the update accumulator.
#[derive(Debug, PartialEq, Eq)]
pub enum ReduceError {
    /// An average was requested before any contribution was accumulated.
    Empty,
}

impl fmt::Display for ReduceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReduceError::Empty => {
                write!(f, "average requested with zero accumulated contributions")
            }
        }
    }
}

impl Error for ReduceError {}

/// Coordinator runtime failures.
#[derive(Debug)]
pub enum CoordinatorErr {
    Reduce(ReduceError),

    /// The inbox closed before the epoch target was reached.
    Interrupted { epochs_done: usize },
}

impl fmt::Display for CoordinatorErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordinatorErr::Reduce(e) => write!(f, "reduction failed: {e}"),
            CoordinatorErr::Interrupted { epochs_done } => write!(
                f,
                "inbox closed after {epochs_done} completed epoch(s), before the target"
            ),
        }
    }
}

impl Error for CoordinatorErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CoordinatorErr::Reduce(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ReduceError> for CoordinatorErr {
    fn from(value: ReduceError) -> Self {
        Self::Reduce(value)
    }
}

/// Boundary conversion for binaries / I/O APIs.
impl From<CoordinatorErr> for io::Error {
    fn from(value: CoordinatorErr) -> Self {
        io::Error::new(io::ErrorKind::Other, value)
    }
}
