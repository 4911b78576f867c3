//! Reqwest based [`HttpSend`] implementation.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::BodyExt;
use reqwest::{Client, Request};
use tuyasign_core::{Error, HttpSend, Result};

/// Timeouts applied to every request sent by [`ReqwestHttpSend`].
///
/// reqwest has no dedicated write timeout, so `write` extends the overall
/// per-request deadline (`connect + write + read`) instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Deadline for establishing the connection.
    pub connect: Duration,
    /// Deadline between two reads of the response.
    pub read: Duration,
    /// Deadline for sending the request.
    pub write: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(30),
            read: Duration::from_secs(30),
            write: Duration::from_secs(30),
        }
    }
}

impl Timeouts {
    fn total(&self) -> Duration {
        self.connect + self.write + self.read
    }
}

/// ReqwestHttpSend sends requests with a [`reqwest::Client`].
#[derive(Debug)]
pub struct ReqwestHttpSend {
    client: Client,
    request_timeout: Option<Duration>,
}

impl Default for ReqwestHttpSend {
    fn default() -> Self {
        Self::with_timeouts(Timeouts::default()).unwrap_or_else(|err| {
            log::warn!("failed to build http client with timeouts, fallback to default: {err}");
            Self::new(Client::default())
        })
    }
}

impl ReqwestHttpSend {
    /// Create a new ReqwestHttpSend with a reqwest::Client.
    ///
    /// Timeouts configured on the given client are kept as is.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            request_timeout: None,
        }
    }

    /// Create a new ReqwestHttpSend with independent connect, read and write
    /// timeouts.
    pub fn with_timeouts(timeouts: Timeouts) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(timeouts.connect)
            .read_timeout(timeouts.read)
            .build()
            .map_err(|e| Error::config_invalid("failed to build http client").with_source(e))?;

        Ok(Self {
            client,
            request_timeout: Some(timeouts.total()),
        })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::timeout(format!("http request timed out: {err}")).with_source(err)
    } else {
        Error::transport(format!("http request failed: {err}")).with_source(err)
    }
}

#[async_trait]
impl HttpSend for ReqwestHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let mut req = Request::try_from(req)
            .map_err(|e| Error::request_invalid("failed to convert request").with_source(e))?;
        if let Some(timeout) = self.request_timeout {
            *req.timeout_mut() = Some(timeout);
        }

        log::debug!("sending http request: {} {}", req.method(), req.url());
        let resp: http::Response<_> = self
            .client
            .execute(req)
            .await
            .map_err(map_reqwest_error)?
            .into();

        let (parts, body) = resp.into_parts();
        let bs = BodyExt::collect(body)
            .await
            .map(|buf| buf.to_bytes())
            .map_err(map_reqwest_error)?;
        Ok(http::Response::from_parts(parts, bs))
    }
}
