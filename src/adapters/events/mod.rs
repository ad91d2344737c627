//! Event adapters: the Redis broadcast channel and the in-memory bus.

mod in_memory;
mod redis_broadcaster;

pub use in_memory::InMemorySyncBus;
pub use redis_broadcaster::RedisSyncBroadcaster;
