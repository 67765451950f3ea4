//! Payment verification client
//!
//! Wraps the gateway's `GET /transaction/verify/{reference}` endpoint. The
//! call sits in the request path of wallet top-ups, so the client carries a
//! short, finite timeout. Anything the gateway does not report as a
//! successful payment is a failed verification, never a credit.

pub mod client;
pub mod error;

pub use client::*;
pub use error::*;
