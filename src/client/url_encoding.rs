//! URL encoding of request paths and query strings.
//!
//! Signing works on raw parameter values; encoding only happens when the
//! transport turns a [`SignedRequest`](super::SignedRequest) into a URL.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use super::headers::Params;

/// Characters percent-encoded in query keys and values (excluding space).
///
/// Unreserved characters (alphanumerics, `-`, `_`, `.`, `~`) are left as-is.
/// Space is mapped to `+` by [`url_encode`].
const QUERY_ENCODE_SET_NO_SPACE: &AsciiSet = &CONTROLS
    .add(b'"')
    .add(b'#')
    .add(b'$')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b',')
    .add(b'/')
    .add(b':')
    .add(b';')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'@')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}')
    .add(b'\'');

/// Characters percent-encoded in a single path segment.
const PATH_SEGMENT_ENCODE_SET: &AsciiSet = &QUERY_ENCODE_SET_NO_SPACE.add(b' ');

/// URL-encode a query component using `+` for spaces.
pub(super) fn url_encode(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut first = true;
    for chunk in s.split(' ') {
        if !first {
            result.push('+');
        }
        first = false;
        result.extend(utf8_percent_encode(chunk, QUERY_ENCODE_SET_NO_SPACE));
    }
    result
}

/// Percent-encode one path segment, such as a log store name.
pub(super) fn encode_path_segment(s: &str) -> String {
    utf8_percent_encode(s, PATH_SEGMENT_ENCODE_SET).to_string()
}

/// `k1=v1&k2=v2` with keys in sorted order.
pub(super) fn query_string(params: &Params) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", url_encode(k), url_encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Append `params` to `path`, which may already carry a query string.
pub(super) fn append_query(path: &str, params: &Params) -> String {
    if params.is_empty() {
        return path.to_owned();
    }
    let separator = if path.contains('?') { '&' } else { '?' };
    format!("{path}{separator}{}", query_string(params))
}
