//! Short code resolution.
//!
//! [`RedirectorService`] owns the read path: it answers from the cache
//! when it can and falls back to the repository on a miss, repopulating
//! the cache and counting the click as it goes.
//!
//! # Example
//!
//! ```rust,ignore
//! use linkhop_cache::MokaUrlCache;
//! use linkhop_redirector::{Redirector, RedirectorError, RedirectorService};
//! use linkhop_storage::InMemoryRepository;
//!
//! let service = RedirectorService::new(InMemoryRepository::new(), MokaUrlCache::new());
//! match service.resolve("aZ3k").await {
//!     Ok(long_url) => println!("Redirect to: {long_url}"),
//!     Err(RedirectorError::NotFound(_)) => println!("no such code"),
//!     Err(e) => return Err(e.into()),
//! }
//! ```

pub mod error;
pub mod redirector;
pub mod service;

pub use error::{RedirectorError, Result};
pub use redirector::Redirector;
pub use service::RedirectorService;
