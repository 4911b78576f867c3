//! Tuya OpenAPI signing implementation for tuyasign.
//!
//! Every call to the Tuya OpenAPI is authenticated by an HMAC-SHA256 signature
//! over a canonical form of the request, no session is kept between calls.
//!
//! ## Signature
//!
//! ```text
//! sign = HMAC-SHA256(secret, client_id [+ access_token] + t [+ nonce] + string_to_sign)
//!
//! string_to_sign = METHOD + "\n" +
//!                  SHA256(body) + "\n" +
//!                  signed headers + "\n" +
//!                  path + "?" + sorted query
//! ```
//!
//! The signature is sent as uppercase hex in the `sign` header next to
//! `client_id`, `t`, `sign_method`, `lang`, `Signature-Headers`, `nonce` and,
//! for business calls, `access_token`.
//!
//! ## Quick Start
//!
//! ```no_run
//! use tuyasign_core::{Context, OsEnv, Result};
//! use tuyasign_http_send_reqwest::ReqwestHttpSend;
//! use tuyasign_tuya_openapi::{Client, Config, DEFAULT_ENDPOINT};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let ctx = Context::new()
//!         .with_http_send(ReqwestHttpSend::default())
//!         .with_env(OsEnv);
//!
//!     // Access id and secret are read from TUYA_ACCESS_ID and TUYA_ACCESS_SECRET.
//!     let client = Client::new(ctx, Config::new().with_endpoint(DEFAULT_ENDPOINT));
//!
//!     client.set_switch("vdevo123456789", true).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Signing only
//!
//! [`RequestSigner`] can be used without [`Client`] to sign an
//! `http::request::Parts` for any transport.

#![warn(missing_docs)]

mod api;
pub use api::{Command, Token};

pub mod canonical;

mod client;
pub use client::Client;

mod config;
pub use config::Config;

mod constants;
pub use constants::{
    DEFAULT_ENDPOINT, TUYA_ACCESS_ID, TUYA_ACCESS_SECRET, TUYA_ENDPOINT,
};

mod credential;
pub use credential::Credential;

mod provide_credential;
pub use provide_credential::{
    ConfigCredentialProvider, DefaultCredentialProvider, EnvCredentialProvider,
    StaticCredentialProvider,
};

mod sign_request;
pub use sign_request::{sign, RequestSigner, SignedHeaders};
