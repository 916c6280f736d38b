// Application layer - use cases and orchestration on top of the domain ledger.
// The CLI talks only to `LedgerService`; persistence stays behind it.

pub mod error;
pub mod service;

pub use error::*;
pub use service::*;
