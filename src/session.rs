//! Session token extraction from browser cookies.
//!
//! The platform's auth layer stores its session state in cookies whose names
//! contain `stack`; each value is a URL-encoded JSON array whose second
//! element is the bearer token. The `/ask` handler uses this only to note
//! whether a session accompanied the request; the token itself is never
//! logged or forwarded.

use serde_json::Value;

/// Extract the session token from a raw `Cookie` header value.
///
/// Scans the semicolon-separated pairs for the first cookie whose name
/// contains `stack`, percent-decodes its value, parses it as a JSON array,
/// and returns the second element. Malformed candidates (bad encoding,
/// non-array JSON, too few elements, non-string token) yield `None`.
pub fn token_from_cookie_header(header: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (name, value) = pair.split_once('=')?;
        if !name.trim().contains("stack") {
            return None;
        }
        decode_token(value.trim())
    })
}

/// Decode one cookie value: URL-decoded JSON array, token at index 1.
fn decode_token(value: &str) -> Option<String> {
    let decoded = urlencoding::decode(value).ok()?;
    let parsed: Value = serde_json::from_str(&decoded).ok()?;
    let token = parsed.as_array()?.get(1)?.as_str()?;
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}
