// Application layer - use cases and orchestration.
// The balance read and the disbursement workflow live here; storage and the
// payout partner are reached only through the domain ports.

pub mod error;
pub mod service;

pub use error::*;
pub use service::*;
