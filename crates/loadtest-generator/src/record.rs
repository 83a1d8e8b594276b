//! The record type pushed through the put-records API.

use bytes::Bytes;

/// A single record destined for the stream.
///
/// `data` is cheap to clone: records generated in corpus-reuse mode share
/// the generator's corpus allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Record payload.
    pub data: Bytes,
    /// Key used by the stream to route the record to a shard.
    pub partition_key: String,
}

impl Record {
    pub fn new(data: impl Into<Bytes>, partition_key: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            partition_key: partition_key.into(),
        }
    }

    /// Bytes accounted against throughput: payload plus partition key.
    pub fn size(&self) -> usize {
        self.data.len() + self.partition_key.len()
    }
}

/// Sum of [`Record::size`] over a slice of records.
pub fn total_size(records: &[Record]) -> u64 {
    records.iter().map(|r| r.size() as u64).sum()
}
