//! Storage abstraction and implementations for learning plans.
//!
//! Every plan and its step progress are stored under the plan's own id;
//! there is no shared key-value bag. `JsonStorage` keeps one JSON document
//! per record on disk, `MemoryStorage` keeps them in process.

#![warn(missing_docs)]

pub mod trait_;
pub mod json_storage;
pub mod memory;

pub use trait_::{PlanStore, StorageError, Result};
pub use json_storage::JsonStorage;
pub use memory::MemoryStorage;
