mod ledger;
mod money;
mod summary;
mod transaction;

pub use ledger::*;
pub use money::*;
pub use summary::*;
pub use transaction::*;
