//! Core components for signing Tuya OpenAPI requests.
//!
//! This crate provides the foundational types and traits shared by the
//! tuyasign crates.
//!
//! ## Overview
//!
//! - **Context**: A container that holds the HTTP transport and environment access
//! - **Traits**: [`HttpSend`] for the transport, [`Env`] for environment lookups,
//!   [`ProvideCredential`] and [`SigningCredential`] for credential loading
//! - **Chain**: [`ProvideCredentialChain`] tries several credential sources in order
//!
//! ## Utilities
//!
//! - [`hash`]: SHA256 and HMAC-SHA256 helpers
//! - [`time`]: Time manipulation utilities
//! - [`utils`]: General utilities including data redaction

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod context;
pub use context::{Context, Env, HttpSend, NoopEnv, NoopHttpSend, OsEnv, StaticEnv};

mod api;
pub use api::{ProvideCredential, SigningCredential};
mod chain;
pub use chain::ProvideCredentialChain;

mod error;
pub use error::{Error, ErrorKind, Result};
