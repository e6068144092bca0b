use model::Reducible;

use crate::error::ReduceError;

/// Folds worker snapshots into a running elementwise total.
///
/// The merge is commutative, so the fold order across contributions does not
/// matter beyond floating-point rounding.
#[derive(Default)]
pub struct Accumulator<M> {
    running: Option<M>,
    count: usize,
}

impl<M: Reducible> Accumulator<M> {
    pub fn new() -> Self {
        Self {
            running: None,
            count: 0,
        }
    }

    /// Folds one contribution into the running total.
    pub fn accumulate(&mut self, contribution: M) {
        match &mut self.running {
            Some(total) => total.merge(&contribution),
            None => self.running = Some(contribution),
        }
        self.count += 1;
    }

    /// Number of contributions folded since the last `averaged` call.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Returns the elementwise mean of everything accumulated and resets.
    ///
    /// # Errors
    /// Returns `ReduceError::Empty` when nothing was accumulated, rather than
    /// dividing by zero.
    pub fn averaged(&mut self) -> Result<M, ReduceError> {
        let mut total = self.running.take().ok_or(ReduceError::Empty)?;
        let count = std::mem::take(&mut self.count);

        total.scale(1.0 / count as f32);
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Write};

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Flat(Vec<f32>);

    impl Reducible for Flat {
        fn merge(&mut self, other: &Self) {
            for (a, b) in self.0.iter_mut().zip(&other.0) {
                *a += b;
            }
        }

        fn scale(&mut self, factor: f32) {
            for a in &mut self.0 {
                *a *= factor;
            }
        }

        fn write_to<W: Write>(&self, sink: &mut W) -> io::Result<()> {
            for v in &self.0 {
                sink.write_all(&v.to_le_bytes())?;
            }
            Ok(())
        }
    }

    #[test]
    fn averaged_is_the_elementwise_mean() {
        let mut acc = Accumulator::new();
        acc.accumulate(Flat(vec![1.0, 2.0]));
        acc.accumulate(Flat(vec![3.0, 4.0]));

        let avg = acc.averaged().unwrap();
        assert_eq!(avg, Flat(vec![2.0, 3.0]));
    }

    #[test]
    fn averaged_is_order_insensitive() {
        let contributions = [
            Flat(vec![0.5, -1.0, 3.25]),
            Flat(vec![2.5, 0.0, -0.25]),
            Flat(vec![-3.0, 7.0, 0.0]),
        ];

        let mut forward = Accumulator::new();
        for c in contributions.iter().cloned() {
            forward.accumulate(c);
        }

        let mut backward = Accumulator::new();
        for c in contributions.iter().rev().cloned() {
            backward.accumulate(c);
        }

        let forward = forward.averaged().unwrap();
        let backward = backward.averaged().unwrap();
        for (a, b) in forward.0.iter().zip(&backward.0) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn averaged_on_empty_is_an_explicit_error() {
        let mut acc = Accumulator::<Flat>::new();
        assert_eq!(acc.averaged(), Err(ReduceError::Empty));
    }

    #[test]
    fn averaged_resets_the_accumulator() {
        let mut acc = Accumulator::new();
        acc.accumulate(Flat(vec![4.0]));
        assert_eq!(acc.count(), 1);

        acc.averaged().unwrap();
        assert_eq!(acc.count(), 0);
        assert_eq!(acc.averaged(), Err(ReduceError::Empty));

        acc.accumulate(Flat(vec![6.0]));
        assert_eq!(acc.averaged().unwrap(), Flat(vec![6.0]));
    }
}
