//! Canonical form of a request, shared by the signer and the dispatcher.

use std::collections::{BTreeMap, HashMap};

use http::{Method, Uri};
use log::warn;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use tuyasign_core::hash::{hex_sha256, EMPTY_SHA256};
use tuyasign_core::utils::is_blank;
use tuyasign_core::{Error, Result};

use crate::constants::SIGNATURE_HEADERS;

/// Characters that must be escaped again once the query has been decoded and
/// sorted, so the result is a valid request target.
const QUERY_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'+')
    .add(b'<')
    .add(b'>')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Reject methods the API does not accept.
pub fn check_method(method: &Method) -> Result<()> {
    match *method {
        Method::GET | Method::POST | Method::PUT | Method::DELETE => Ok(()),
        _ => Err(Error::method_unsupported(format!(
            "method {method} is not supported, only GET, POST, PUT, DELETE are allowed"
        ))),
    }
}

/// Path and query of `uri` with the query decoded and sorted by key.
///
/// ```text
/// /a?b=2&a=1 => /a?a=1&b=2
/// ```
///
/// A query that cannot be decoded degrades to the path alone, use
/// [`try_normalize_path_and_query`] to observe the failure instead.
pub fn normalize_path_and_query(uri: &Uri) -> String {
    try_normalize_path_and_query(uri).unwrap_or_else(|err| {
        warn!("malformed query in {uri}, signing path only: {err}");
        canonical_path(uri).to_string()
    })
}

/// Strict variant of [`normalize_path_and_query`] that fails on malformed
/// percent-encoding or a query that does not decode to utf-8.
pub fn try_normalize_path_and_query(uri: &Uri) -> Result<String> {
    let path = canonical_path(uri);
    let query = sorted_query(uri)?;

    Ok(join_path_and_query(path, &query, |v| v.to_string()))
}

/// Path and sorted query of `uri` escaped back into a valid request target.
///
/// This is what goes on the wire, the server decodes it into the value
/// returned by [`normalize_path_and_query`].
pub fn request_path_and_query(uri: &Uri) -> String {
    let query = sorted_query(uri).unwrap_or_else(|err| {
        warn!("malformed query in {uri}, sending path only: {err}");
        BTreeMap::new()
    });

    join_path_and_query(canonical_path(uri), &query, |v| {
        utf8_percent_encode(v, QUERY_ENCODE_SET).to_string()
    })
}

/// Build the string to sign.
///
/// ## Format
///
/// ```text
/// HTTPMethod + "\n" +
/// Content-SHA256 + "\n" +
/// Headers + "\n" +
/// Url
/// ```
///
/// `Headers` lists every header named in `Signature-Headers` as `name:value`,
/// joined by `\n`. It's empty when `Signature-Headers` is absent.
pub fn string_to_sign(
    method: &Method,
    body: &[u8],
    custom_headers: &HashMap<String, String>,
    path_and_query: &str,
) -> String {
    let body_hash = if body.is_empty() {
        EMPTY_SHA256.to_string()
    } else {
        hex_sha256(body)
    };

    [
        method.as_str().to_ascii_uppercase(),
        body_hash,
        signed_header_line(custom_headers),
        path_and_query.to_string(),
    ]
    .join("\n")
}

fn signed_header_line(custom_headers: &HashMap<String, String>) -> String {
    let Some(names) = custom_headers.get(SIGNATURE_HEADERS) else {
        return String::new();
    };

    names
        .split(':')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| {
            let value = custom_headers.get(name).map(String::as_str).unwrap_or("");
            format!("{name}:{value}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn canonical_path(uri: &Uri) -> &str {
    match uri.path() {
        "" => "/",
        path => path,
    }
}

fn sorted_query(uri: &Uri) -> Result<BTreeMap<String, String>> {
    let Some(query) = uri.query() else {
        return Ok(BTreeMap::new());
    };
    let query = decode_query(query)?;
    if is_blank(&query) {
        return Ok(BTreeMap::new());
    }

    Ok(query
        .split('&')
        .filter(|kv| !kv.is_empty())
        .map(|kv| kv.split_once('=').unwrap_or((kv, "")))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect())
}

fn join_path_and_query(
    path: &str,
    query: &BTreeMap<String, String>,
    encode: impl Fn(&str) -> String,
) -> String {
    if query.is_empty() {
        return path.to_string();
    }

    let mut s = String::with_capacity(path.len() + 16);
    s.push_str(path);
    s.push('?');
    for (idx, (k, v)) in query.iter().enumerate() {
        if idx != 0 {
            s.push('&');
        }
        s.push_str(&encode(k));
        s.push('=');
        s.push_str(&encode(v));
    }

    s
}

/// Decode a query the way a form decoder does: `+` is a space, every `%`
/// must start a two digit hex escape and the result must be utf-8.
fn decode_query(query: &str) -> Result<String> {
    let bs = query.as_bytes();
    for (idx, _) in query.match_indices('%') {
        let valid = bs
            .get(idx + 1..idx + 3)
            .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
        if !valid {
            return Err(Error::request_invalid(format!(
                "invalid percent-encoding at offset {idx} of query {query:?}"
            )));
        }
    }

    let query = query.replace('+', " ");
    let decoded = percent_decode_str(&query).decode_utf8().map_err(|e| {
        Error::request_invalid(format!("query {query:?} is not valid utf-8")).with_source(e)
    })?;

    Ok(decoded.into_owned())
}
