//! Tuya OpenAPI request signer.

use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::str::FromStr;

use http::header::HeaderName;
use http::uri::PathAndQuery;
use http::{HeaderMap, HeaderValue, Method, Uri};
use log::debug;
use tuyasign_core::hash::upper_hex_hmac_sha256;
use tuyasign_core::time::{format_timestamp_millis, now, DateTime};
use tuyasign_core::utils::{is_blank, non_blank, Redact};
use tuyasign_core::Result;

use crate::canonical::{
    check_method, normalize_path_and_query, request_path_and_query, string_to_sign,
};
use crate::constants::*;
use crate::credential::Credential;

/// RequestSigner that implements the Tuya OpenAPI signature.
///
/// - [Sign requests for cloud authorization](https://developer.tuya.com/en/docs/iot/new-singnature)
#[derive(Debug, Default, Clone)]
pub struct RequestSigner {
    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a new signer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Build the headers authenticating a request.
    ///
    /// `t` and `nonce` are taken from `custom_headers` when present, otherwise
    /// `t` is the current time in milliseconds and `nonce` is empty. A non-blank
    /// `access_token` is sent and mixed into the signature, a blank one is
    /// ignored as for the token call itself.
    pub fn build_headers(
        &self,
        cred: &Credential,
        access_token: Option<&str>,
        custom_headers: &HashMap<String, String>,
        method: &Method,
        uri: &Uri,
        body: &[u8],
    ) -> Result<SignedHeaders> {
        check_method(method)?;

        let t = match non_blank(custom_headers.get(TIMESTAMP).map(String::as_str)) {
            Some(t) => t.to_string(),
            None => format_timestamp_millis(self.time.unwrap_or_else(now)),
        };
        let nonce = custom_headers.get(NONCE).cloned().unwrap_or_default();
        let signature_headers = custom_headers
            .get(SIGNATURE_HEADERS)
            .cloned()
            .unwrap_or_default();
        let access_token = non_blank(access_token);

        let string_to_sign = string_to_sign(
            method,
            body,
            custom_headers,
            &normalize_path_and_query(uri),
        );
        debug!("string to sign: {string_to_sign:?}");

        let signature = sign(
            &cred.access_id,
            &cred.access_secret,
            &t,
            access_token,
            &nonce,
            &string_to_sign,
        );

        let mut headers = SignedHeaders::default();
        headers.push(CLIENT_ID, cred.access_id.clone());
        headers.push(TIMESTAMP, t);
        headers.push(SIGN_METHOD, HMAC_SHA256.to_string());
        headers.push(LANG, LANG_ZH.to_string());
        headers.push(SIGNATURE_HEADERS, signature_headers);
        headers.push(NONCE, nonce);
        if let Some(token) = access_token {
            headers.push(ACCESS_TOKEN, token.to_string());
        }
        headers.push(SIGN, signature);

        Ok(headers)
    }

    /// Sign the request in place.
    ///
    /// The uri is rewritten to its canonical path and sorted query, then the
    /// signed headers and every custom header are inserted.
    pub fn sign_request(
        &self,
        parts: &mut http::request::Parts,
        body: &[u8],
        cred: &Credential,
        access_token: Option<&str>,
        custom_headers: &HashMap<String, String>,
    ) -> Result<()> {
        let signed = self.build_headers(
            cred,
            access_token,
            custom_headers,
            &parts.method,
            &parts.uri,
            body,
        )?;

        let target = request_path_and_query(&parts.uri);
        parts.uri = {
            let mut uri_parts = std::mem::take(&mut parts.uri).into_parts();
            uri_parts.path_and_query = Some(PathAndQuery::from_str(&target)?);
            Uri::from_parts(uri_parts)?
        };

        for (name, value) in custom_headers {
            if signed.get(name).is_none() {
                parts
                    .headers
                    .insert(HeaderName::from_bytes(name.as_bytes())?, value.parse()?);
            }
        }
        signed.apply(&mut parts.headers)
    }
}

/// Calculate the signature.
///
/// ```text
/// HMAC-SHA256(secret, access_id + access_token + t + nonce + string_to_sign)
/// ```
///
/// `access_token` and `nonce` are skipped when blank. The result is uppercase
/// hex.
pub fn sign(
    access_id: &str,
    secret: &str,
    t: &str,
    access_token: Option<&str>,
    nonce: &str,
    string_to_sign: &str,
) -> String {
    let mut s = String::with_capacity(access_id.len() + t.len() + string_to_sign.len() + 64);
    s.push_str(access_id);
    if let Some(token) = non_blank(access_token) {
        s.push_str(token);
    }
    s.push_str(t);
    if !is_blank(nonce) {
        s.push_str(nonce);
    }
    s.push_str(string_to_sign);

    upper_hex_hmac_sha256(secret.as_bytes(), s.as_bytes())
}

/// Headers produced by [`RequestSigner::build_headers`], in the order they are
/// set.
///
/// Names keep the exact casing the API documents, for example
/// `Signature-Headers`.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SignedHeaders {
    headers: Vec<(&'static str, String)>,
}

impl SignedHeaders {
    fn push(&mut self, name: &'static str, value: String) {
        self.headers.push((name, value));
    }

    /// Get the value of the header, names are compared case-sensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.headers.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Number of headers.
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Whether no header is set.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Insert all headers into `headers`, replacing existing values.
    ///
    /// `sign` and `access_token` are marked sensitive.
    pub fn apply(&self, headers: &mut HeaderMap) -> Result<()> {
        for (name, value) in &self.headers {
            let mut value = HeaderValue::from_str(value)?;
            if *name == SIGN || *name == ACCESS_TOKEN {
                value.set_sensitive(true);
            }
            // http stores names lowercased, they are case-insensitive on the wire.
            headers.insert(HeaderName::from_bytes(name.as_bytes())?, value);
        }

        Ok(())
    }
}

impl Debug for SignedHeaders {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut m = f.debug_map();
        for (name, value) in &self.headers {
            if *name == ACCESS_TOKEN {
                m.entry(name, &Redact::from(value));
            } else {
                m.entry(name, value);
            }
        }
        m.finish()
    }
}
