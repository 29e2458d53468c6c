//! Durable mapping store backends.
//!
//! [`InMemoryRepository`] keeps everything in a sharded map and is meant for
//! tests and single-process deployments. [`MySqlRepository`] persists to a
//! MySQL table whose `UNIQUE` index on `short_code` arbitrates allocation
//! races.

pub mod memory;
pub mod mysql;

pub use linkhop_core::repository::{Repository, Result};
pub use linkhop_core::StorageError;
pub use memory::InMemoryRepository;
pub use mysql::MySqlRepository;
