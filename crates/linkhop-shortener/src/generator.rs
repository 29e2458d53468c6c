pub mod random;

use linkhop_core::ShortCode;

/// Trait for generating candidate short codes.
///
/// Implementations are pure generators that don't interact with storage.
/// A generated code is only a candidate: uniqueness is decided by the
/// repository when the code is inserted.
pub trait Generator: Send + Sync + 'static {
    /// Draws the next candidate code.
    fn generate(&self) -> ShortCode;
}
