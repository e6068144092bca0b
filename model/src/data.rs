use ndarray::{Array1, Array2};

use crate::error::{ModelError, Result};

/// One unit of work: a single input row with its label row.
#[derive(Debug, Clone, PartialEq)]
pub struct Example {
    pub input: Array1<f32>,
    pub label: Array1<f32>,
}

impl Example {
    pub fn new(input: Array1<f32>, label: Array1<f32>) -> Self {
        Self { input, label }
    }
}

/// A bulk training pair: two parallel matrices holding one example per row.
#[derive(Debug, Clone)]
pub struct ExamplePair {
    inputs: Array2<f32>,
    labels: Array2<f32>,
}

impl ExamplePair {
    /// Creates a new pair after checking both matrices describe the same rows.
    ///
    /// # Errors
    /// Returns `ModelError::RowCountMismatch` when the matrices disagree.
    pub fn new(inputs: Array2<f32>, labels: Array2<f32>) -> Result<Self> {
        if inputs.nrows() != labels.nrows() {
            return Err(ModelError::RowCountMismatch {
                inputs: inputs.nrows(),
                labels: labels.nrows(),
            });
        }

        Ok(Self { inputs, labels })
    }

    /// Number of example rows this pair represents.
    pub fn rows(&self) -> usize {
        self.inputs.nrows()
    }

    pub fn into_parts(self) -> (Array2<f32>, Array2<f32>) {
        (self.inputs, self.labels)
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn pair_accepts_matching_row_counts() {
        let inputs = array![[1.0, 2.0], [3.0, 4.0]];
        let labels = array![[1.0], [0.0]];
        let pair = ExamplePair::new(inputs, labels).unwrap();
        assert_eq!(pair.rows(), 2);
    }

    #[test]
    fn pair_rejects_mismatched_row_counts() {
        let inputs = array![[1.0, 2.0], [3.0, 4.0]];
        let labels = array![[1.0]];
        assert!(matches!(
            ExamplePair::new(inputs, labels),
            Err(ModelError::RowCountMismatch { inputs: 2, labels: 1 })
        ));
    }
}
