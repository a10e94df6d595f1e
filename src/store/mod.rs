//! Read-only access to the social graph dataset

pub mod memory;
pub mod models;
pub mod neo4j;
pub mod traits;

pub use memory::{InMemoryGraphStore, Snapshot};
pub use models::*;
pub use neo4j::Neo4jGraphStore;
pub use traits::GraphStore;
