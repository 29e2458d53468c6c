use crate::error::ShortenerError;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

type Result<T> = std::result::Result<T, ShortenerError>;

/// Number of codes the allocator tries before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Longest long URL the store accepts, in characters.
pub const MAX_LONG_URL_LENGTH: usize = 512;

/// The result of a successful allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    /// The newly reserved short code.
    pub short_code: ShortCode,
    /// The public URL that redirects to the long URL.
    pub short_url: String,
}

#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Reserves a fresh short code for `long_url` and returns it.
    async fn allocate(&self, long_url: &str) -> Result<Allocation>;
}
