//! Data models for Ledger

mod user;
mod session;
mod transaction;
mod debt;
mod savings;
mod budget;
mod settings;
mod summary;

pub use user::*;
pub use session::*;
pub use transaction::*;
pub use debt::*;
pub use savings::*;
pub use budget::*;
pub use settings::*;
pub use summary::*;
