//! Outbound email for CareLink
//!
//! Transactional notifications (benefit-request completion and the like)
//! are fire-and-forget from the caller's perspective: they are dispatched
//! after the primary write commits, and a failing mail provider never
//! fails or delays the operation that triggered them.

pub mod error;
pub mod service;

pub use error::*;
pub use service::*;
