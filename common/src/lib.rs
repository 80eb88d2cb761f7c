//! Arcade Common Types
//!
//! Shared building blocks for the arcade games: round identifiers, the
//! key-value storage contract every game persists through, and the
//! shuffle helper used to build decks.

pub mod error;
pub mod identifiers;
pub mod shuffle;
pub mod store;

pub use error::*;
pub use identifiers::*;
pub use shuffle::shuffle;
pub use store::{load_json, save_json, FileStore, KeyValueStore, MemoryStore};
