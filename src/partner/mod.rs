//! HTTP client for the payout partner's disbursement API.

mod client;

pub use client::*;
