//! Persistence for the points ledger
//!
//! - `schemas`: document shapes and their indexes
//! - `store`: the `LedgerStore` trait the services depend on
//! - `memory` / `mongo_store`: the two implementations

pub mod memory;
pub mod mongo;
pub mod mongo_store;
pub mod schemas;
pub mod store;

pub use memory::MemoryStore;
pub use mongo::{MongoClient, MongoCollection};
pub use mongo_store::MongoStore;
pub use store::{LedgerStore, SubmissionQuery};
