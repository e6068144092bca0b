use model::{Example, ExamplePair};

use crate::msg::ExampleBatch;

/// Decomposes a batch into one unit of work per example row.
///
/// Row order is preserved and the unit count always equals the row count of
/// the batch; nothing is dropped, merged, or deduplicated.
pub fn split_rows(batch: ExampleBatch) -> Vec<Example> {
    match batch {
        ExampleBatch::Pair(pair) => split_pair(pair),
        ExampleBatch::List(pairs) => pairs.into_iter().flat_map(split_pair).collect(),
    }
}

fn split_pair(pair: ExamplePair) -> Vec<Example> {
    let (inputs, labels) = pair.into_parts();

    inputs
        .outer_iter()
        .zip(labels.outer_iter())
        .map(|(input, label)| Example::new(input.to_owned(), label.to_owned()))
        .collect()
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn pair_splits_into_one_unit_per_row() {
        let pair = ExamplePair::new(
            array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]],
            array![[1.0], [0.0], [1.0]],
        )
        .unwrap();

        let units = split_rows(ExampleBatch::Pair(pair));
        assert_eq!(units.len(), 3);
        assert_eq!(units[0].input, array![1.0, 2.0]);
        assert_eq!(units[0].label, array![1.0]);
        assert_eq!(units[2].input, array![5.0, 6.0]);
        assert_eq!(units[2].label, array![1.0]);
    }

    #[test]
    fn list_preserves_pair_and_row_order() {
        let first = ExamplePair::new(array![[1.0], [2.0]], array![[10.0], [20.0]]).unwrap();
        let second = ExamplePair::new(array![[3.0]], array![[30.0]]).unwrap();

        let units = split_rows(ExampleBatch::List(vec![first, second]));
        assert_eq!(units.len(), 3);

        let inputs: Vec<f32> = units.iter().map(|u| u.input[0]).collect();
        assert_eq!(inputs, vec![1.0, 2.0, 3.0]);
        let labels: Vec<f32> = units.iter().map(|u| u.label[0]).collect();
        assert_eq!(labels, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn empty_batch_yields_no_units() {
        let units = split_rows(ExampleBatch::List(vec![]));
        assert!(units.is_empty());
    }
}
