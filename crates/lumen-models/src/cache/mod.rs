//! Per-backend result caching.
//!
//! Each backend owns one [`ResultCache`] mapping a raw input string to the
//! output it produced, so repeating an identical input never re-runs
//! inference. Entries live as long as the backend; there is no eviction.

pub mod store;
pub mod types;

pub use store::ResultCache;
pub use types::CacheStats;
