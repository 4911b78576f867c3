use async_trait::async_trait;
use std::sync::Arc;
use tuyasign_core::{Context, ProvideCredential, Result};

use crate::config::Config;
use crate::credential::Credential;

/// ConfigCredentialProvider will load credential from config.
///
/// Only the fields set on [`Config`] are used, env is left to
/// [`crate::EnvCredentialProvider`].
#[derive(Debug)]
pub struct ConfigCredentialProvider {
    config: Arc<Config>,
}

impl ConfigCredentialProvider {
    /// Create a new loader via config.
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ProvideCredential for ConfigCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
        if let (Some(id), Some(secret)) = (&self.config.access_id, &self.config.access_secret) {
            return Ok(Some(Credential::new(id, secret)));
        }

        Ok(None)
    }
}
