//! # evently-client: REST Client for Evently
//!
//! Everything that does I/O on behalf of the checkout: HTTP calls, config
//! files and the persisted session. Pricing and validation come from
//! `evently-core`; this crate only moves data.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Client Architecture                              │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                 load_checkout (loader.rs)                        │  │
//! │  │  event + points + coupons concurrently ──► CheckoutState         │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │ user edits via the core reducer        │
//! │  ┌────────────────────────────▼─────────────────────────────────────┐  │
//! │  │            TransactionSubmitter (submitter.rs)                   │  │
//! │  │  validate ──► package ──► POST once ──► TransactionRef           │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │ CheckoutApi trait (api.rs)             │
//! │  ┌────────────────────────────▼─────────────────────────────────────┐  │
//! │  │                     HttpApi (http.rs)                            │  │
//! │  │  reqwest, bearer token from SharedSession, X-Request-Id          │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  ClientConfig (config.rs) ── TOML + EVENTLY_* env                      │
//! │  SessionStore (session_store.rs) ── session.json                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`api`] - `CheckoutApi` trait
//! - [`config`] - Client configuration
//! - [`error`] - Client error types
//! - [`http`] - `HttpApi`, all REST endpoints
//! - [`loader`] - Checkout loader
//! - [`protocol`] - Wire bodies, envelopes, error parsing
//! - [`session_store`] - Session persistence
//! - [`submitter`] - Transaction submitter

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod loader;
pub mod protocol;
pub mod session_store;
pub mod submitter;

#[cfg(test)]
pub(crate) mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use api::CheckoutApi;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult, RemoteError};
pub use http::HttpApi;
pub use loader::load_checkout;
pub use protocol::{CreateTransactionRequest, Page};
pub use session_store::{SessionStore, SharedSession};
pub use submitter::TransactionSubmitter;
