//! Per-bucket sequence allocation.

use partcode_database::AllocationTx;
use partcode_models::BucketKey;
use partcode_utils::{PartcodeError, PartcodeResult};

use crate::codec::AlphabetCodec;

#[derive(Debug, Clone, Copy)]
pub struct SequenceAllocator {
    capacity: u64,
}

impl SequenceAllocator {
    pub fn new(codec: &AlphabetCodec) -> Self {
        Self {
            capacity: codec.capacity(),
        }
    }

    /// Reserves the next sequence for `key` within `tx`.
    ///
    /// A full bucket is rejected before anything is written.
    pub async fn next_sequence(&self, tx: &mut AllocationTx, key: &BucketKey) -> PartcodeResult<u64> {
        let current = tx.counter(key).await?;
        let next = current + 1;

        if next > self.capacity {
            tracing::warn!(bucket = %key, capacity = self.capacity, "Sequence space exhausted");
            return Err(PartcodeError::sequence_exhausted(key.to_string(), self.capacity));
        }

        tx.set_counter(key, next).await?;
        Ok(next)
    }
}
