//! Feed Store - single-slot persistent cache for image feeds.
//!
//! A store keeps exactly one [`FeedSnapshot`] (an ordered list of images plus
//! the time it was captured) under a fixed key of a key-value medium. It offers
//! three operations, `retrieve`, `insert` and `delete`, each completing once
//! with a typed result.
//!
//! # Example
//!
//! ```rust,ignore
//! use feed_store::{CacheState, FeedStore, FeedStoreConfig, MediumFeedStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = FeedStoreConfig::default();
//!     let store = MediumFeedStore::open_sqlite_in_dir("./cache", &config)?;
//!
//!     match store.retrieve().await? {
//!         CacheState::Found(snapshot) => println!("{} cached images", snapshot.images.len()),
//!         CacheState::Empty => println!("Nothing cached yet"),
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod medium;
pub mod models;
pub mod store;

// Re-export commonly used types
pub use config::{FeedStoreConfig, StoreConfig};
pub use error::{
    DecodingError, DeletionError, EncodingError, FeedStoreError, InsertionError, Result,
    RetrievalError,
};
pub use medium::{FileMedium, InMemoryMedium, KeyValueMedium, SqliteMedium};
pub use models::{CacheState, FeedImage, FeedSnapshot};
pub use store::{FeedStore, MediumFeedStore};
