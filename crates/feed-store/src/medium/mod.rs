//! Key-value media the feed store persists into.
//!
//! Every medium exposes the same byte-level contract (`get`, `set`, `remove`):
//! - In-memory map for tests and short-lived processes
//! - One file per key, written with atomic rename
//! - SQLite table with namespace-based isolation

mod file;
mod memory;
mod sqlite;
mod traits;

pub use file::FileMedium;
pub use memory::InMemoryMedium;
pub use sqlite::SqliteMedium;
pub use traits::KeyValueMedium;
