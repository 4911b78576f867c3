use std::fmt::{Debug, Formatter};

use crate::constants::*;
use tuyasign_core::{utils::Redact, Context};

/// Config carries all the configuration for the Tuya OpenAPI client.
///
/// Config is read once when the client is built and never reloaded.
#[derive(Clone, Default)]
pub struct Config {
    /// `endpoint` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`TUYA_ENDPOINT`]
    pub endpoint: Option<String>,
    /// `access_id` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`TUYA_ACCESS_ID`]
    pub access_id: Option<String>,
    /// `access_secret` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`TUYA_ACCESS_SECRET`]
    pub access_secret: Option<String>,
}

impl Config {
    /// Create a new Config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set endpoint, for example [`DEFAULT_ENDPOINT`].
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set access_id
    pub fn with_access_id(mut self, access_id: impl Into<String>) -> Self {
        self.access_id = Some(access_id.into());
        self
    }

    /// Set access_secret
    pub fn with_access_secret(mut self, access_secret: impl Into<String>) -> Self {
        self.access_secret = Some(access_secret.into());
        self
    }

    /// Load config from env.
    ///
    /// Fields already set take precedence over env values.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        if let Some(v) = ctx.env_var(TUYA_ENDPOINT) {
            self.endpoint.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(TUYA_ACCESS_ID) {
            self.access_id.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(TUYA_ACCESS_SECRET) {
            self.access_secret.get_or_insert(v);
        }

        self
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("endpoint", &self.endpoint)
            .field("access_id", &self.access_id.as_ref().map(Redact::from))
            .field("access_secret", &self.access_secret.as_ref().map(Redact::from))
            .finish()
    }
}
