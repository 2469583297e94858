//! Shared request parsing for route handlers: form bodies and typed
//! parameters.

use std::str::FromStr;
use thiserror::Error;

use crate::game::error::GameError;

/// Why a request was turned away before or during a game transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("missing parameter `{0}`")]
    Missing(&'static str),

    #[error("invalid value `{value}` for parameter `{name}`")]
    Invalid { name: &'static str, value: String },

    #[error(transparent)]
    Game(#[from] GameError),
}

/// Parse URL-encoded form body into key-value pairs.
/// Handles `key=value&key2=value2` format (from fetch/HTMX POST bodies).
pub fn parse_form_body(body: &str) -> Vec<(String, String)> {
    body.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, val) = pair.split_once('=').unwrap_or((pair, ""));
            (percent_decode(key), percent_decode(val))
        })
        .collect()
}

/// Percent-decode a URL-encoded value. Malformed escapes pass through as-is;
/// invalid UTF-8 is replaced.
pub fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() => {
                let decoded = core::str::from_utf8(&bytes[i + 1..i + 3])
                    .ok()
                    .and_then(|hex| u8::from_str_radix(hex, 16).ok());
                if let Some(b) = decoded {
                    out.push(b);
                    i += 3;
                    continue;
                }
                out.push(b'%');
            }
            b'+' => out.push(b' '),
            b => out.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Get a value by key from a list of key-value pairs.
pub fn get_param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// Required typed parameter.
pub fn require<T: FromStr>(
    params: &[(String, String)],
    key: &'static str,
) -> Result<T, RequestError> {
    optional(params, key)?.ok_or(RequestError::Missing(key))
}

/// Typed parameter that may be absent or empty.
pub fn optional<T: FromStr>(
    params: &[(String, String)],
    key: &'static str,
) -> Result<Option<T>, RequestError> {
    match get_param(params, key).map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(|_| RequestError::Invalid {
            name: key,
            value: raw.to_string(),
        }),
    }
}
