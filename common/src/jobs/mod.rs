use serde::{Deserialize, Serialize};

/// Outcome of the most recent flush of the submission queue.
///
/// The backend records one of these after every flush cycle and reports it on
/// `GET /health` so an operator can tell a stalled queue from an idle one.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlushStatus {
    /// The queue was empty when the flush ran.
    #[default]
    Idle,
    /// A batch of this many records was written to the remote document.
    Flushed(u32),
    /// The batch could not be written and was kept at the head of the queue.
    Requeued { count: u32, reason: String },
}
