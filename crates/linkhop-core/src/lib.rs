//! Core types and traits for the linkhop URL shortener.
//!
//! This crate provides the shared vocabulary used by the allocator
//! (`linkhop-shortener`), the resolver (`linkhop-redirector`) and the
//! backends plugged into them (`linkhop-storage`, `linkhop-cache`).

pub mod cache;
pub mod error;
pub mod mapping;
pub mod repository;
pub mod retry;
pub mod shortcode;
pub mod shortener;

pub use cache::{UrlCache, DEFAULT_CACHE_TTL};
pub use error::{CacheError, CoreError, ShortenerError, StorageError};
pub use mapping::{Mapping, MappingId};
pub use repository::Repository;
pub use retry::{Attempt, RetryOutcome};
pub use shortcode::ShortCode;
pub use shortener::{Allocation, Shortener};
