//! Short code allocation.
//!
//! [`ShortenerService`] owns the write path: it draws random base62
//! candidates from a [`Generator`], lets the repository's unique insert
//! decide who wins, retries collisions within a fixed budget and primes
//! the resolution cache for the new code.

pub mod generator;
pub mod service;

pub use generator::random::RandomGenerator;
pub use generator::Generator;
pub use linkhop_core::{Allocation, Shortener, ShortenerError};
pub use service::{ShortenerService, ShortenerSettings};
