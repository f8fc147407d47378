//! In-process read cache
//!
//! Memoizes read results for a fixed TTL. Writers invalidate the affected
//! namespaces before reporting success, so a read that follows a write never
//! sees pre-write data.

mod key;
mod store;

pub use key::{CacheKey, Namespace};
pub use store::{CacheEntry, CacheStore};
