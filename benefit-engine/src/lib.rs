//! Benefit engine for the CareLink platform
//!
//! Provides the loyalty-benefit core consumed by the HTTP server:
//! - Eligibility resolution from monthly order activity (direct or sponsored)
//! - Dependant directory (sponsor -> dependant delegation)
//! - Benefit request lifecycle (pending -> completed)
//! - Wallet/card balance ledger with gateway-verified top-ups
//! - Loyalty card issuance

pub mod cards;
pub mod dependants;
pub mod eligibility;
pub mod error;
pub mod models;
pub mod month;
pub mod policy;
pub mod requests;
pub mod wallet;

pub use cards::*;
pub use dependants::*;
pub use eligibility::*;
pub use error::*;
pub use models::*;
pub use month::*;
pub use policy::*;
pub use requests::*;
pub use wallet::*;
