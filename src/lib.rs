pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod io;
pub mod logging;
pub mod partner;
pub mod server;
pub mod storage;

pub use application::{AppError, WalletService};
pub use storage::Repository;
