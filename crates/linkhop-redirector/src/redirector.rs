use crate::Result;
use async_trait::async_trait;
use linkhop_core::Mapping;

#[async_trait]
pub trait Redirector: Send + Sync + 'static {
    /// Resolves a short code to the long URL it redirects to.
    ///
    /// Unknown or malformed codes yield [`RedirectorError::NotFound`].
    ///
    /// [`RedirectorError::NotFound`]: crate::RedirectorError::NotFound
    async fn resolve(&self, code: &str) -> Result<String>;

    /// Reads the full stored mapping, click count included.
    ///
    /// This bypasses the cache and does not count as a click.
    async fn lookup(&self, code: &str) -> Result<Mapping>;
}
