//! Dispatcher sending signed requests through the [`Context`] transport.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{Method, Uri};
use log::debug;
use serde::de::DeserializeOwned;
use tuyasign_core::{Context, Error, ProvideCredential, Result, SigningCredential};

use crate::api::{ApiResponse, Command, Commands, Token};
use crate::canonical::check_method;
use crate::constants::*;
use crate::{Config, Credential, DefaultCredentialProvider, RequestSigner};

/// Client for the Tuya OpenAPI.
///
/// Every call is signed independently. The client caches the resolved
/// credential but never the bearer token: callers decide when to fetch a new
/// one with [`Client::get_token`].
#[derive(Clone, Debug)]
pub struct Client {
    ctx: Context,
    endpoint: Option<String>,
    provider: Arc<dyn ProvideCredential<Credential = Credential>>,
    signer: RequestSigner,
    credential: Arc<Mutex<Option<Credential>>>,
}

impl Client {
    /// Create a new client.
    ///
    /// `config` is merged with env values from `ctx` once, here. Credentials
    /// are resolved through [`DefaultCredentialProvider`] on first use.
    pub fn new(ctx: Context, config: Config) -> Self {
        let config = config.from_env(&ctx);
        let endpoint = config.endpoint.clone();
        let provider = DefaultCredentialProvider::new(Arc::new(config));

        Self {
            ctx,
            endpoint,
            provider: Arc::new(provider),
            signer: RequestSigner::new(),
            credential: Arc::new(Mutex::new(None)),
        }
    }

    /// Replace the credential provider.
    pub fn with_credential_provider(
        mut self,
        provider: impl ProvideCredential<Credential = Credential>,
    ) -> Self {
        self.provider = Arc::new(provider);
        self.credential = Arc::new(Mutex::new(None));
        self
    }

    /// Replace the request signer.
    pub fn with_signer(mut self, signer: RequestSigner) -> Self {
        self.signer = signer;
        self
    }

    fn endpoint(&self) -> Result<&str> {
        self.endpoint
            .as_deref()
            .map(|v| v.trim_end_matches('/'))
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                Error::config_invalid(format!(
                    "endpoint is not set, configure it or set {TUYA_ENDPOINT}"
                ))
            })
    }

    async fn credential(&self) -> Result<Credential> {
        let cached = self
            .credential
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(cred) = cached {
            return Ok(cred);
        }

        let cred = self
            .provider
            .provide_credential(&self.ctx)
            .await?
            .ok_or_else(|| {
                Error::config_invalid(format!(
                    "no credential found, configure it or set {TUYA_ACCESS_ID} and {TUYA_ACCESS_SECRET}"
                ))
            })?;
        if !cred.is_valid() {
            return Err(Error::credential_invalid(
                "access id and access secret must not be empty",
            ));
        }

        *self
            .credential
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(cred.clone());
        Ok(cred)
    }

    /// Sign and send a request to `endpoint + path`.
    ///
    /// - `GET` sends no body.
    /// - `POST` and `PUT` send `body` as json.
    /// - `DELETE` sends `body` as json too, the API accepts a body on it.
    ///
    /// A non-blank `access_token` authenticates a business call. Any status
    /// outside 2xx fails with a transport error carrying the status as code.
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        body: impl Into<Bytes>,
        access_token: Option<&str>,
        custom_headers: &HashMap<String, String>,
    ) -> Result<http::Response<Bytes>> {
        check_method(&method)?;
        let uri: Uri = format!("{}{}", self.endpoint()?, path).parse()?;
        let cred = self.credential().await?;

        let mut req = http::Request::builder().method(method.clone()).uri(uri);
        let body = if method == Method::GET {
            Bytes::new()
        } else {
            req = req.header(CONTENT_TYPE, "application/json");
            body.into()
        };
        let (mut parts, body) = req.body(body)?.into_parts();

        self.signer
            .sign_request(&mut parts, &body, &cred, access_token, custom_headers)?;
        debug!("dispatching {} {}", parts.method, parts.uri);

        let resp = self
            .ctx
            .http_send(http::Request::from_parts(parts, body))
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let content = String::from_utf8_lossy(resp.body());
            return Err(Error::transport(format!(
                "request to {path} failed with status {status}: {content}"
            ))
            .with_code(i64::from(status.as_u16())));
        }

        Ok(resp)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: impl Into<Bytes>,
        access_token: Option<&str>,
    ) -> Result<T> {
        let resp = self
            .execute(method, path, body, access_token, &HashMap::new())
            .await?;
        let resp: ApiResponse<T> = serde_json::from_slice(resp.body())?;
        resp.into_result()
    }

    /// Fetch a new bearer token.
    pub async fn get_token(&self) -> Result<Token> {
        let token: Token = self.call(Method::GET, TOKEN_PATH, Bytes::new(), None).await?;
        debug!("got token: {token:?}");
        Ok(token)
    }

    /// Send commands to a device, returns the result reported by the API.
    pub async fn send_commands(
        &self,
        access_token: &str,
        device_id: &str,
        commands: &[Command],
    ) -> Result<bool> {
        let body = serde_json::to_vec(&Commands { commands })
            .map_err(|e| Error::request_invalid("failed to serialize commands").with_source(e))?;
        self.call(
            Method::POST,
            &device_commands_path(device_id),
            body,
            Some(access_token),
        )
        .await
    }

    /// Turn the first switch of a device on or off.
    ///
    /// A fresh token is fetched for the call.
    pub async fn set_switch(&self, device_id: &str, on: bool) -> Result<bool> {
        let token = self.get_token().await?;
        self.send_commands(
            &token.access_token,
            device_id,
            &[Command::new(SWITCH_CODE, on)],
        )
        .await
    }
}
