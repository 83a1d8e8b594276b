//! Fixed-size batching of a record stream.

use crate::generator::GeneratorError;

/// Groups an iterator into batches of exactly `batch_size` items.
///
/// When the source ends mid-batch the final batch is padded with clones of
/// the fill value if one was configured, and emitted short otherwise. An
/// empty remainder produces no batch.
pub struct Batcher<I: Iterator> {
    source: I,
    batch_size: usize,
    fill: Option<I::Item>,
    exhausted: bool,
}

impl<I: Iterator> Batcher<I> {
    /// Create a batcher emitting `batch_size` items per batch.
    pub fn new(source: I, batch_size: usize) -> Result<Self, GeneratorError> {
        if batch_size == 0 {
            return Err(GeneratorError::InvalidConfig(
                "batch_size must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            source,
            batch_size,
            fill: None,
            exhausted: false,
        })
    }

    /// Pad the final batch of a finite source with clones of `fill`.
    pub fn with_fill(mut self, fill: I::Item) -> Self {
        self.fill = Some(fill);
        self
    }

    /// Get the batch size.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Produce the next batch, or `None` once the source is exhausted.
    pub fn next_batch(&mut self) -> Option<Vec<I::Item>>
    where
        I::Item: Clone,
    {
        if self.exhausted {
            return None;
        }

        let mut batch = Vec::with_capacity(self.batch_size);
        batch.extend(self.source.by_ref().take(self.batch_size));

        if batch.len() < self.batch_size {
            self.exhausted = true;
            if batch.is_empty() {
                return None;
            }
            if let Some(fill) = &self.fill {
                batch.resize(self.batch_size, fill.clone());
            }
        }

        Some(batch)
    }
}

impl<I> Iterator for Batcher<I>
where
    I: Iterator,
    I::Item: Clone,
{
    type Item = Vec<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_batch()
    }
}
