//! Stale-while-revalidate cache for steady-state reads.
//!
//! Unlike the job path, a read that exhausts its retry budget surfaces an error: callers
//! show it and offer a manual retry. There is no synthesized fallback here.

mod policy;
mod refresh;
mod store;

pub use policy::CachePolicy;
pub use refresh::RefreshHandle;
pub use store::{CacheEntry, CacheRead, Freshness, QueryCache, QueryState};
