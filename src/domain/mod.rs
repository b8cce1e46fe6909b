mod account;
mod ledger;
mod money;
mod password;
mod principal;
mod transaction;

pub use account::*;
pub use ledger::*;
pub use money::*;
pub use password::*;
pub use principal::*;
pub use transaction::*;
