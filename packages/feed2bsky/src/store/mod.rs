//! Dedup key stores.
//!
//! - [`PostgresDedupStore`] - durable store used by the CLI
//! - [`MemoryDedupStore`] - in-process store for tests and development

mod memory;
mod postgres;

pub use memory::MemoryDedupStore;
pub use postgres::PostgresDedupStore;
