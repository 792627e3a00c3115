use std::sync::Arc;

use crate::DatasetIterator;

/// A basic collection of items with a predefined size.
///
/// Implementations must be `Send + Sync` so datasets can be shared across
/// worker threads by consumers that want to.
pub trait Dataset<I>: Send + Sync {
    /// Gets the item at the given index, or `None` past the end.
    fn get(&self, index: usize) -> Option<I>;

    /// Gets the number of items in the dataset.
    fn len(&self) -> usize;

    /// Checks if the dataset is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns an iterator over the dataset.
    fn iter(&self) -> DatasetIterator<'_, I>
    where
        Self: Sized,
    {
        DatasetIterator::new(self)
    }
}

impl<'a, D, I> Dataset<I> for &'a D
where
    D: Dataset<I> + ?Sized,
{
    fn get(&self, index: usize) -> Option<I> {
        (**self).get(index)
    }

    fn len(&self) -> usize {
        (**self).len()
    }
}

impl<D, I> Dataset<I> for Arc<D>
where
    D: Dataset<I> + ?Sized,
{
    fn get(&self, index: usize) -> Option<I> {
        self.as_ref().get(index)
    }

    fn len(&self) -> usize {
        self.as_ref().len()
    }
}

impl<D, I> Dataset<I> for Box<D>
where
    D: Dataset<I> + ?Sized,
{
    fn get(&self, index: usize) -> Option<I> {
        self.as_ref().get(index)
    }

    fn len(&self) -> usize {
        self.as_ref().len()
    }
}
