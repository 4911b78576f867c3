use std::collections::HashMap;

use http::{Method, Uri};
use pretty_assertions::assert_eq;
use tuyasign_core::hash::{hex_sha256, EMPTY_SHA256};
use tuyasign_core::time::from_timestamp_millis;
use tuyasign_tuya_openapi::canonical::{normalize_path_and_query, string_to_sign};
use tuyasign_tuya_openapi::{sign, Credential, RequestSigner};

use crate::expected_sign;

#[test]
fn test_token_request_fixture() {
    let s = string_to_sign(
        &Method::GET,
        b"",
        &HashMap::new(),
        "/v1.0/token?grant_type=1",
    );
    assert_eq!(
        s,
        format!("GET\n{EMPTY_SHA256}\n\n/v1.0/token?grant_type=1")
    );

    let body_hash = s.lines().nth(1).unwrap();
    assert_eq!(body_hash, hex_sha256(b""));
    assert!(body_hash
        .chars()
        .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));

    let actual = sign("id1", "key1", "1000", None, "", &s);
    assert_eq!(
        actual,
        "E195C2590E2C3D177A63EBE87C22A661F8277C673488F317697D05EF9468CB86"
    );
    assert_eq!(
        actual,
        expected_sign(
            "id1",
            "key1",
            "1000",
            "",
            "GET",
            b"",
            "/v1.0/token?grant_type=1"
        )
    );
}

#[test]
fn test_business_request_signature() {
    let cred = Credential::new("id1", "key1");
    let body = br#"{"commands":[{"code":"switch_1","value":true}]}"#;
    let uri: Uri = "https://openapi.tuyaus.com/v1.0/iot-03/devices/dev1/commands"
        .parse()
        .unwrap();

    let signed = RequestSigner::new()
        .with_time(from_timestamp_millis(1660582212000).unwrap())
        .build_headers(
            &cred,
            Some("tok1"),
            &HashMap::new(),
            &Method::POST,
            &uri,
            body,
        )
        .unwrap();

    assert_eq!(signed.get("t"), Some("1660582212000"));
    assert_eq!(signed.get("access_token"), Some("tok1"));
    assert_eq!(
        signed.get("sign").unwrap(),
        expected_sign(
            "id1",
            "key1",
            "1660582212000",
            "tok1",
            "POST",
            body,
            "/v1.0/iot-03/devices/dev1/commands"
        )
    );
}

#[test]
fn test_custom_headers_are_signed() {
    let custom = HashMap::from([
        ("Signature-Headers".to_string(), "area_id:call_id".to_string()),
        ("area_id".to_string(), "29a33e".to_string()),
        ("call_id".to_string(), "8afdb7".to_string()),
    ]);

    let s = string_to_sign(&Method::GET, b"", &custom, "/v1.0/devices");
    let lines: Vec<&str> = s.split('\n').collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[2], "area_id:29a33e");
    assert_eq!(lines[3], "call_id:8afdb7");
    assert_eq!(lines[4], "/v1.0/devices");
}

#[test]
fn test_body_hash_line() {
    let s = string_to_sign(&Method::PUT, b"{}", &HashMap::new(), "/v1.0/x");
    assert_eq!(s, format!("PUT\n{}\n\n/v1.0/x", hex_sha256(b"{}")));
}

#[test]
fn test_sorted_query_changes_nothing_in_signature() {
    let a: Uri = "https://h/v1.0/devices?b=2&a=1".parse().unwrap();
    let b: Uri = "https://h/v1.0/devices?a=1&b=2".parse().unwrap();
    assert_eq!(normalize_path_and_query(&a), normalize_path_and_query(&b));

    let cred = Credential::new("id1", "key1");
    let signer = RequestSigner::new().with_time(from_timestamp_millis(1000).unwrap());
    let sa = signer
        .build_headers(&cred, None, &HashMap::new(), &Method::GET, &a, b"")
        .unwrap();
    let sb = signer
        .build_headers(&cred, None, &HashMap::new(), &Method::GET, &b, b"")
        .unwrap();
    assert_eq!(sa, sb);
}
