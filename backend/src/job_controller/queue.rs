use common::model::registration::RegistrationRecord;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// FIFO of registrations waiting to be written to the remote document.
///
/// Producers append at the tail. The flusher copies a batch from the head and
/// only removes it once the batch is stored, so a failed batch simply stays
/// in front of newer submissions. The lock is never held across an `.await`.
#[derive(Default)]
pub struct SubmissionQueue {
    records: Mutex<VecDeque<RegistrationRecord>>,
}

impl SubmissionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record and returns the new queue length.
    pub fn enqueue(&self, record: RegistrationRecord) -> usize {
        let mut records = self.lock();
        records.push_back(record);
        records.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copies up to `max` records from the head without removing them.
    pub fn peek_batch(&self, max: usize) -> Vec<RegistrationRecord> {
        self.lock().iter().take(max).cloned().collect()
    }

    /// Removes `count` records from the head once they have been persisted.
    pub fn remove_batch(&self, count: usize) {
        let mut records = self.lock();
        let count = count.min(records.len());
        records.drain(..count);
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<RegistrationRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
