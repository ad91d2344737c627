//! Adapters: concrete implementations of the ports.

pub mod events;
pub mod http;
pub mod memory;
pub mod postgres;

pub use events::{InMemorySyncBus, RedisSyncBroadcaster};
pub use memory::{InMemoryPendingCallStore, InMemoryPlanning};
pub use postgres::{
    PostgresPendingCallRepository, PostgresPlanningReader, PostgresPlanningStore,
    PostgresSyncLog, RetryPolicy, TransactionRunner,
};
