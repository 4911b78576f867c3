use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use http::{Method, Request, Response, StatusCode};
use pretty_assertions::assert_eq;
use tuyasign_core::{Context, Error, ErrorKind, HttpSend, Result, StaticEnv};
use tuyasign_tuya_openapi::{Client, Command, Config, StaticCredentialProvider};

use crate::expected_sign;

const TOKEN_RESPONSE: &str = r#"{"success":true,"t":1660582212000,"result":{"access_token":"tok1","refresh_token":"ref1","expire_time":7200,"uid":"u1"}}"#;
const COMMANDS_RESPONSE: &str = r#"{"success":true,"t":1660582212000,"result":true}"#;

/// Records every request and replies with queued responses.
#[derive(Debug, Clone, Default)]
struct MockHttpSend {
    requests: Arc<Mutex<Vec<Request<Bytes>>>>,
    responses: Arc<Mutex<VecDeque<Result<(StatusCode, &'static str)>>>>,
}

impl MockHttpSend {
    fn reply(self, status: StatusCode, body: &'static str) -> Self {
        self.responses.lock().unwrap().push_back(Ok((status, body)));
        self
    }

    fn fail(self, err: Error) -> Self {
        self.responses.lock().unwrap().push_back(Err(err));
        self
    }

    fn requests(&self) -> Vec<Request<Bytes>> {
        std::mem::take(&mut *self.requests.lock().unwrap())
    }
}

#[async_trait]
impl HttpSend for MockHttpSend {
    async fn http_send(&self, req: Request<Bytes>) -> Result<Response<Bytes>> {
        self.requests.lock().unwrap().push(req);
        let (status, body) = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected request")?;
        Ok(Response::builder()
            .status(status)
            .body(Bytes::from_static(body.as_bytes()))
            .unwrap())
    }
}

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn client(http: &MockHttpSend) -> Client {
    init();
    let ctx = Context::new().with_http_send(http.clone());
    let config = Config::new()
        .with_endpoint("https://openapi.tuyaus.com")
        .with_access_id("id1")
        .with_access_secret("key1");
    Client::new(ctx, config)
}

fn header<'a>(req: &'a Request<Bytes>, name: &str) -> &'a str {
    req.headers()
        .get(name)
        .unwrap_or_else(|| panic!("missing header {name}"))
        .to_str()
        .unwrap()
}

#[tokio::test]
async fn test_get_token() -> anyhow::Result<()> {
    let http = MockHttpSend::default().reply(StatusCode::OK, TOKEN_RESPONSE);
    let token = client(&http).get_token().await?;

    assert_eq!(token.access_token, "tok1");
    assert_eq!(token.refresh_token, "ref1");
    assert_eq!(token.expire_time, 7200);

    let reqs = http.requests();
    assert_eq!(reqs.len(), 1);
    let req = &reqs[0];
    assert_eq!(req.method(), Method::GET);
    assert_eq!(
        req.uri().to_string(),
        "https://openapi.tuyaus.com/v1.0/token?grant_type=1"
    );
    assert!(req.body().is_empty());
    assert_eq!(header(req, "client_id"), "id1");
    assert_eq!(header(req, "sign_method"), "HMAC-SHA256");
    assert_eq!(header(req, "lang"), "zh");
    assert_eq!(header(req, "signature-headers"), "");
    assert_eq!(header(req, "nonce"), "");
    assert!(req.headers().get("access_token").is_none());
    assert!(req.headers().get("content-type").is_none());

    let t = header(req, "t");
    assert_eq!(
        header(req, "sign"),
        expected_sign("id1", "key1", t, "", "GET", b"", "/v1.0/token?grant_type=1")
    );
    Ok(())
}

#[tokio::test]
async fn test_set_switch() -> anyhow::Result<()> {
    let http = MockHttpSend::default()
        .reply(StatusCode::OK, TOKEN_RESPONSE)
        .reply(StatusCode::OK, COMMANDS_RESPONSE);
    assert!(client(&http).set_switch("dev1", true).await?);

    let reqs = http.requests();
    assert_eq!(reqs.len(), 2);
    assert_eq!(reqs[0].uri().path(), "/v1.0/token");

    let req = &reqs[1];
    let body = br#"{"commands":[{"code":"switch_1","value":true}]}"#;
    assert_eq!(req.method(), Method::POST);
    assert_eq!(req.uri().path(), "/v1.0/iot-03/devices/dev1/commands");
    assert_eq!(req.body().as_ref(), body);
    assert_eq!(header(req, "content-type"), "application/json");
    assert_eq!(header(req, "access_token"), "tok1");

    let t = header(req, "t");
    assert_eq!(
        header(req, "sign"),
        expected_sign(
            "id1",
            "key1",
            t,
            "tok1",
            "POST",
            body,
            "/v1.0/iot-03/devices/dev1/commands"
        )
    );
    Ok(())
}

#[tokio::test]
async fn test_send_commands_reuses_token() -> anyhow::Result<()> {
    let http = MockHttpSend::default()
        .reply(StatusCode::OK, TOKEN_RESPONSE)
        .reply(StatusCode::OK, COMMANDS_RESPONSE);
    let client = client(&http);

    let token = client.get_token().await?;
    let result = client
        .send_commands(
            &token.access_token,
            "dev1",
            &[Command::new("switch_1", false)],
        )
        .await?;
    assert!(result);

    let reqs = http.requests();
    let token_calls = reqs
        .iter()
        .filter(|req| req.uri().path() == "/v1.0/token")
        .count();
    assert_eq!(reqs.len(), 2);
    assert_eq!(token_calls, 1);
    assert_eq!(header(&reqs[1], "access_token"), "tok1");
    assert_eq!(
        reqs[1].body().as_ref(),
        br#"{"commands":[{"code":"switch_1","value":false}]}"#
    );
    Ok(())
}

#[tokio::test]
async fn test_send_commands_rejected() {
    let http = MockHttpSend::default().reply(
        StatusCode::OK,
        r#"{"success":false,"code":1010,"msg":"token invalid","t":1660582212000}"#,
    );
    let err = client(&http)
        .send_commands("expired", "dev1", &[Command::new("switch_1", false)])
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ApiRejected);
    assert_eq!(err.code(), Some(1010));
    assert_eq!(err.message(), "token invalid");
}

#[tokio::test]
async fn test_execute_sorts_query() -> anyhow::Result<()> {
    let http = MockHttpSend::default().reply(StatusCode::OK, "{}");
    client(&http)
        .execute(
            Method::GET,
            "/v1.0/devices?page_size=20&page_no=1",
            Bytes::new(),
            Some("tok1"),
            &HashMap::new(),
        )
        .await?;

    let req = &http.requests()[0];
    assert_eq!(
        req.uri().path_and_query().map(|v| v.as_str()),
        Some("/v1.0/devices?page_no=1&page_size=20")
    );
    Ok(())
}

#[tokio::test]
async fn test_execute_get_drops_body() -> anyhow::Result<()> {
    let http = MockHttpSend::default().reply(StatusCode::OK, "{}");
    client(&http)
        .execute(
            Method::GET,
            "/v1.0/devices",
            r#"{"ignored":true}"#,
            Some("tok1"),
            &HashMap::new(),
        )
        .await?;

    let req = &http.requests()[0];
    assert!(req.body().is_empty());
    let t = header(req, "t");
    assert_eq!(
        header(req, "sign"),
        expected_sign("id1", "key1", t, "tok1", "GET", b"", "/v1.0/devices")
    );
    Ok(())
}

#[tokio::test]
async fn test_execute_delete_keeps_body() -> anyhow::Result<()> {
    let http = MockHttpSend::default().reply(StatusCode::OK, "{}");
    client(&http)
        .execute(
            Method::DELETE,
            "/v1.0/devices/dev1",
            r#"{"reason":"test"}"#,
            Some("tok1"),
            &HashMap::new(),
        )
        .await?;

    let req = &http.requests()[0];
    assert_eq!(req.method(), Method::DELETE);
    assert_eq!(req.body().as_ref(), br#"{"reason":"test"}"#);
    assert_eq!(header(req, "content-type"), "application/json");
    Ok(())
}

#[tokio::test]
async fn test_execute_sends_custom_headers() -> anyhow::Result<()> {
    let http = MockHttpSend::default().reply(StatusCode::OK, "{}");
    let custom = HashMap::from([
        ("Signature-Headers".to_string(), "area_id".to_string()),
        ("area_id".to_string(), "29a33e".to_string()),
        ("t".to_string(), "1660582212000".to_string()),
        ("nonce".to_string(), "n1".to_string()),
    ]);
    client(&http)
        .execute(Method::GET, "/v1.0/devices", Bytes::new(), Some("tok1"), &custom)
        .await?;

    let req = &http.requests()[0];
    assert_eq!(header(req, "area_id"), "29a33e");
    assert_eq!(header(req, "signature-headers"), "area_id");
    assert_eq!(header(req, "t"), "1660582212000");
    assert_eq!(header(req, "nonce"), "n1");
    Ok(())
}

#[tokio::test]
async fn test_unsupported_method_fails_before_io() {
    let http = MockHttpSend::default();
    let err = client(&http)
        .execute(
            Method::PATCH,
            "/v1.0/devices/dev1",
            Bytes::new(),
            None,
            &HashMap::new(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::MethodUnsupported);
    assert!(http.requests().is_empty());
}

#[tokio::test]
async fn test_non_success_status() {
    let http = MockHttpSend::default().reply(StatusCode::INTERNAL_SERVER_ERROR, "oops");
    let err = client(&http).get_token().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(err.code(), Some(500));
}

#[tokio::test]
async fn test_transport_error_propagates() {
    let http = MockHttpSend::default().fail(Error::timeout("read timed out"));
    let err = client(&http).get_token().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert_eq!(err.message(), "read timed out");
}

#[tokio::test]
async fn test_missing_endpoint() {
    init();
    let http = MockHttpSend::default();
    let ctx = Context::new().with_http_send(http.clone());
    let client = Client::new(ctx, Config::new().with_access_id("id1").with_access_secret("key1"));

    let err = client.get_token().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    assert!(http.requests().is_empty());
}

#[tokio::test]
async fn test_missing_credential() {
    init();
    let http = MockHttpSend::default();
    let ctx = Context::new().with_http_send(http.clone());
    let client = Client::new(ctx, Config::new().with_endpoint("https://openapi.tuyaus.com"));

    let err = client.get_token().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    assert!(http.requests().is_empty());
}

#[tokio::test]
async fn test_empty_credential() {
    let http = MockHttpSend::default();
    let client = client(&http).with_credential_provider(StaticCredentialProvider::new("", "key1"));

    let err = client.get_token().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CredentialInvalid);
}

#[tokio::test]
async fn test_config_from_env() -> anyhow::Result<()> {
    init();
    let http = MockHttpSend::default().reply(StatusCode::OK, TOKEN_RESPONSE);
    let ctx = Context::new()
        .with_http_send(http.clone())
        .with_env(StaticEnv {
            envs: HashMap::from([
                ("TUYA_ENDPOINT".to_string(), "https://openapi.tuyaeu.com/".to_string()),
                ("TUYA_ACCESS_ID".to_string(), "env_id".to_string()),
                ("TUYA_ACCESS_SECRET".to_string(), "env_secret".to_string()),
            ]),
        });
    Client::new(ctx, Config::new()).get_token().await?;

    let req = &http.requests()[0];
    assert_eq!(
        req.uri().to_string(),
        "https://openapi.tuyaeu.com/v1.0/token?grant_type=1"
    );
    assert_eq!(header(req, "client_id"), "env_id");
    Ok(())
}
