//! Mock providers for testing.
//!
//! In-memory, deterministic implementations of the provider traits.
//! Available by default via the `test-utils` feature so downstream tests
//! and the integration suite can exercise the full router without
//! Postgres, Redis, or an SMTP relay.

pub mod email;
pub mod store;

pub use email::MockEmailProvider;
pub use store::MockStore;
