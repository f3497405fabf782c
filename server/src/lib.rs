//! Gather: an event-RSVP backend.
//!
//! A JSON HTTP API for organizing events and managing RSVPs, built on
//! Axum with swappable storage providers.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           Handlers (Axum)               │  ← HTTP, JSON, cookies
//! │  - Request validation                   │  ← CORS, tracing
//! │  - Response serialization               │  ← Correlation IDs
//! ├─────────────────────────────────────────┤
//! │           Providers (traits)            │
//! │  - UserStore / EventStore               │  ← Persistence contract
//! │  - SessionStore                         │  ← Session lifecycle
//! │  - EmailProvider                        │  ← Outbound mail
//! ├─────────────────────────────────────────┤
//! │           Stores (impls)                │
//! │  - PostgresStore                        │  ← Production persistence
//! │  - RedisSessionStore / Memory           │  ← Session backends
//! │  - MockStore (test-utils)               │  ← In-memory testing
//! └─────────────────────────────────────────┘
//! ```
//!
//! Handlers are generic over the provider traits, so the same router
//! serves production (Postgres + Redis + SMTP) and tests (all in-memory)
//! without conditional code paths.
//!
//! # Example
//!
//! ```ignore
//! use gather_server::{
//!     config::AppConfig,
//!     mocks::{MockEmailProvider, MockStore},
//!     router::api_router,
//!     state::AppState,
//!     stores::MemorySessionStore,
//! };
//!
//! let state = AppState::new(
//!     MockStore::new(),
//!     MemorySessionStore::new(),
//!     MockEmailProvider::new(),
//!     AppConfig::default(),
//! );
//! let app = api_router(state);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
#[cfg(feature = "test-utils")]
pub mod mocks;
pub mod password;
pub mod providers;
pub mod router;
pub mod state;
pub mod stores;
pub mod utils;

// Re-export key types for convenience
pub use config::AppConfig;
pub use error::{ApiError, Result};
pub use extractors::{CorrelationId, SessionCookie};
pub use middleware::{CORRELATION_ID_HEADER, correlation_id_layer};
pub use router::api_router;
pub use state::{AppState, AttendanceId, EventId, Session, SessionId, UserId};
