mod disbursement;
mod journal;
mod ledger;
mod money;
mod ports;
mod user_balance;

pub use disbursement::*;
pub use journal::*;
pub use ledger::*;
pub use money::*;
pub use ports::*;
pub use user_balance::*;
