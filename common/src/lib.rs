//! Data shapes shared between the registration server and its clients.
//!
//! Everything here is plain serde data: the form schema, submitted records,
//! parsed CSV rows, request payloads and response bodies. No I/O lives in
//! this crate.

pub mod jobs;
pub mod model;
pub mod requests;
pub mod responses;
