//! Buffering of registrations between the HTTP layer and the remote document.
//!
//! Submissions are acknowledged as soon as they are queued. A background
//! worker later moves them to the drive in batches:
//! - `queue::SubmissionQueue`: the in-memory FIFO of accepted records.
//! - `flusher::Flusher`: drains the queue into the remote CSV document on a
//!   timer or on demand, with bounded retries, and drains it once more on
//!   shutdown.
//!
//! Nothing here is durable. Records still queued when the process dies are
//! lost.

pub mod flusher;
pub mod queue;
