//! Resolution cache backends.
//!
//! Every backend implements [`UrlCache`]. Which one a process uses is
//! decided once at startup; callers only ever see the trait.

pub mod moka;
pub mod noop;
pub mod redis;

pub use self::moka::{CacheConfig, MokaUrlCache};
pub use self::noop::NoopUrlCache;
pub use self::redis::RedisUrlCache;
pub use linkhop_core::cache::{Result, UrlCache, DEFAULT_CACHE_TTL};
pub use linkhop_core::CacheError;
