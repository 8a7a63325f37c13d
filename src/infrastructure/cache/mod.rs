//! Response cache: key derivation and the SQLite store.

pub mod key;
pub mod store;

pub use key::{config_fingerprint, make_cache_key};
pub use store::CacheStore;
