//! Concrete store implementations.
//!
//! - [`postgres::PostgresStore`]: users, events, attendances, and profiles
//!   over one `PgPool`.
//! - [`session_redis::RedisSessionStore`]: sessions in Redis with TTL keys.
//! - [`session_memory::MemorySessionStore`]: in-process sessions for
//!   single-instance deployments and tests.

pub mod postgres;
pub mod session_memory;
pub mod session_redis;

pub use postgres::PostgresStore;
pub use session_memory::MemorySessionStore;
pub use session_redis::RedisSessionStore;
