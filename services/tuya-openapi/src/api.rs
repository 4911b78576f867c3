//! Payloads exchanged with the Tuya OpenAPI.

use std::fmt::{Debug, Formatter};

use serde::{Deserialize, Serialize};
use tuyasign_core::utils::Redact;
use tuyasign_core::{Error, ErrorKind, Result};

/// Envelope wrapping every API response.
///
/// ```json
/// {"success": false, "code": 1010, "msg": "token invalid", "t": 1660582212000}
/// ```
#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse<T> {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    msg: Option<String>,
    result: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Extract the result, turning `success: false` into an
    /// [`ErrorKind::ApiRejected`] error carrying the API code.
    pub(crate) fn into_result(self) -> Result<T> {
        if !self.success {
            let msg = self.msg.unwrap_or_else(|| "request rejected".to_string());
            return Err(match self.code {
                Some(code) => Error::api_rejected(code, msg),
                None => Error::new(ErrorKind::ApiRejected, msg),
            });
        }

        self.result
            .ok_or_else(|| Error::unexpected("response is successful but has no result"))
    }
}

/// Token issued by `GET /v1.0/token?grant_type=1`.
///
/// The token is short-lived, keeping it fresh is up to the caller.
#[derive(Clone, Deserialize)]
pub struct Token {
    /// Bearer token for business calls.
    pub access_token: String,
    /// Token used to renew `access_token`.
    #[serde(default)]
    pub refresh_token: String,
    /// Validity of `access_token` in seconds.
    #[serde(default)]
    pub expire_time: i64,
    /// User id bound to the token.
    #[serde(default)]
    pub uid: String,
}

impl Debug for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &Redact::from(&self.access_token))
            .field("refresh_token", &Redact::from(&self.refresh_token))
            .field("expire_time", &self.expire_time)
            .field("uid", &self.uid)
            .finish()
    }
}

/// A single device instruction, for example `switch_1 = true`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Command {
    /// Data point code.
    pub code: String,
    /// Value to set.
    pub value: serde_json::Value,
}

impl Command {
    /// Create a new command.
    pub fn new(code: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            code: code.into(),
            value: value.into(),
        }
    }
}

#[derive(Serialize)]
pub(crate) struct Commands<'a> {
    pub(crate) commands: &'a [Command],
}
