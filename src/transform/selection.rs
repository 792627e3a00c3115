use std::marker::PhantomData;

use crate::Dataset;

/// Select items from a dataset by index, lazily.
///
/// The wrapper stores only the selection indices; `get(i)` forwards to the
/// wrapped dataset at `indices[i]`. Indices may repeat and appear in any
/// order, so the view doubles as a gather. Selection entries that fall
/// outside the wrapped dataset yield `None`.
///
/// Wrap a borrowed dataset (`SelectionDataset::new(&dataset, ..)`) when the
/// source must stay usable afterwards.
pub struct SelectionDataset<D, I> {
    dataset: D,
    indices: Vec<usize>,
    input: PhantomData<I>,
}

impl<D, I> SelectionDataset<D, I>
where
    D: Dataset<I>,
    I: Send + Sync,
{
    /// Creates a new selection over the given dataset.
    pub fn new(dataset: D, indices: Vec<usize>) -> Self {
        Self {
            dataset,
            indices,
            input: PhantomData,
        }
    }

    /// The selection indices, in selection order.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }
}

impl<D, I> Dataset<I> for SelectionDataset<D, I>
where
    D: Dataset<I>,
    I: Send + Sync,
{
    fn get(&self, index: usize) -> Option<I> {
        self.indices
            .get(index)
            .and_then(|&selected| self.dataset.get(selected))
    }

    fn len(&self) -> usize {
        self.indices.len()
    }
}
