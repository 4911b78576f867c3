use crate::{constants::*, Credential};
use async_trait::async_trait;
use tuyasign_core::{Context, ProvideCredential, Result};

/// EnvCredentialProvider loads Tuya credentials from environment variables.
///
/// This provider looks for the following environment variables:
/// - `TUYA_ACCESS_ID`: The access id of the cloud project
/// - `TUYA_ACCESS_SECRET`: The access secret of the cloud project
#[derive(Debug, Default)]
pub struct EnvCredentialProvider;

impl EnvCredentialProvider {
    /// Create a new EnvCredentialProvider.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProvideCredential for EnvCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        match (ctx.env_var(TUYA_ACCESS_ID), ctx.env_var(TUYA_ACCESS_SECRET)) {
            (Some(id), Some(secret)) => Ok(Some(Credential::new(id, secret))),
            _ => Ok(None),
        }
    }
}
