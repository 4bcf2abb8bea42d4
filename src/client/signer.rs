//! Request signing.
//!
//! The signature is an HMAC-SHA1 over a canonical rendering of the request:
//!
//! ```text
//! METHOD\n
//! Content-MD5\n
//! Content-Type\n
//! Date\n
//! CanonicalizedHeaders\n
//! CanonicalizedResource
//! ```
//!
//! Only headers prefixed with `x-log-` or `x-acs-` take part in
//! `CanonicalizedHeaders`; every other header can change freely without
//! affecting the signature. `CanonicalizedResource` is `?` followed by the
//! sorted query parameters, or empty when there are none.

use std::fmt;

use base64::{Engine, engine::general_purpose::STANDARD as BASE64_STANDARD};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use md5::{Digest, Md5};
use sha1::Sha1;

use crate::error::{ErrorCode, LogError};

use super::config::HTTPMethod;
use super::headers::{CONTENT_MD5, CONTENT_TYPE, DATE, Headers, Params, SIGNED_HEADER_PREFIXES};

/// Scheme prefix of the `Authorization` header value.
pub const SIGNATURE_SCHEME: &str = "LOG";

type HmacSha1 = Hmac<Sha1>;

/// Computes `Authorization` values from the client's shared secret.
#[derive(Clone)]
pub struct Signer {
    access_key: String,
}

impl Signer {
    pub fn new(access_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
        }
    }

    /// `Authorization` header value for the request.
    ///
    /// `headers` must already hold `Date`, `Content-Type` and, for a
    /// non-empty body, `Content-MD5`.
    pub fn authorization(
        &self,
        method: HTTPMethod,
        headers: &Headers,
        params: &Params,
    ) -> Result<String, LogError> {
        let canonical = canonical_string(method, headers, params);
        let signature = hmac_sha1_base64(&self.access_key, &canonical)?;
        Ok(format!("{SIGNATURE_SCHEME}:{signature}"))
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("access_key", &"<redacted>")
            .finish()
    }
}

/// Render the string the signature is computed over.
pub fn canonical_string(method: HTTPMethod, headers: &Headers, params: &Params) -> String {
    let header = |name: &str| headers.get(name).map(String::as_str).unwrap_or_default();
    format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        method.as_str(),
        header(CONTENT_MD5),
        header(CONTENT_TYPE),
        header(DATE),
        canonicalized_headers(headers),
        canonicalized_resource(params),
    )
}

/// Vendor headers as sorted `key:value` lines.
pub fn canonicalized_headers(headers: &Headers) -> String {
    headers
        .iter()
        .filter(|(key, _)| SIGNED_HEADER_PREFIXES.iter().any(|p| key.starts_with(p)))
        .map(|(key, value)| format!("{key}:{value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// `?k1=v1&k2=v2` in key order, or empty without parameters.
pub fn canonicalized_resource(params: &Params) -> String {
    if params.is_empty() {
        return String::new();
    }
    let pairs: Vec<String> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
    format!("?{}", pairs.join("&"))
}

/// Uppercase hex MD5 digest of `body`, always 32 characters.
pub fn content_md5(body: &[u8]) -> String {
    Md5::digest(body)
        .iter()
        .map(|byte| format!("{byte:02X}"))
        .collect()
}

/// Base64 of HMAC-SHA1(`key`, `data`).
pub fn hmac_sha1_base64(key: &str, data: &str) -> Result<String, LogError> {
    let mut mac = HmacSha1::new_from_slice(key.as_bytes()).map_err(|err| {
        LogError::new(ErrorCode::InvalidParameter, format!("unusable access key: {err}"))
    })?;
    mac.update(data.as_bytes());
    Ok(BASE64_STANDARD.encode(mac.finalize().into_bytes()))
}

/// RFC-822 date in GMT, as expected in the `Date` header.
pub fn http_date(now: DateTime<Utc>) -> String {
    now.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    use crate::client::headers::{HOST, USER_AGENT, X_LOG_API_VERSION, X_LOG_BODY_RAW_SIZE};

    #[fixture]
    fn headers() -> Headers {
        Headers::from([
            (CONTENT_MD5.to_owned(), "5D41402ABC4B2A76B9719D911017C592".to_owned()),
            (CONTENT_TYPE.to_owned(), "application/json".to_owned()),
            (DATE.to_owned(), "Mon, 03 Jan 2022 10:00:00 GMT".to_owned()),
            (HOST.to_owned(), "logs.example.com".to_owned()),
            (USER_AGENT.to_owned(), "test-agent".to_owned()),
            (X_LOG_BODY_RAW_SIZE.to_owned(), "5".to_owned()),
            (X_LOG_API_VERSION.to_owned(), "0.6.0".to_owned()),
            ("x-acs-security-token".to_owned(), "tok".to_owned()),
        ])
    }

    #[rstest]
    fn canonical_string_layout(headers: Headers) {
        let params = Params::from([
            ("to".to_owned(), "200".to_owned()),
            ("from".to_owned(), "100".to_owned()),
        ]);
        let canonical = canonical_string(HTTPMethod::GET, &headers, &params);
        assert_eq!(
            canonical,
            "GET\n\
             5D41402ABC4B2A76B9719D911017C592\n\
             application/json\n\
             Mon, 03 Jan 2022 10:00:00 GMT\n\
             x-acs-security-token:tok\n\
             x-log-apiversion:0.6.0\n\
             x-log-bodyrawsize:5\n\
             ?from=100&to=200"
        );
    }

    #[rstest]
    fn canonical_string_without_md5_or_params() {
        let headers = Headers::from([(DATE.to_owned(), "d".to_owned())]);
        let canonical = canonical_string(HTTPMethod::POST, &headers, &Params::new());
        assert_eq!(canonical, "POST\n\n\nd\n\n");
    }

    #[rstest]
    fn md5_is_uppercase_and_padded() {
        assert_eq!(content_md5(b"hello"), "5D41402ABC4B2A76B9719D911017C592");
        assert_eq!(content_md5(b"").len(), 32);
    }

    #[rstest]
    fn hmac_matches_reference_vector() {
        let signature =
            hmac_sha1_base64("key", "The quick brown fox jumps over the lazy dog").expect("sign");
        assert_eq!(signature, "3nybhbi3iqa8ino29wqQcBydtNk=");
    }

    #[rstest]
    fn authorization_has_scheme_prefix(headers: Headers) {
        let signer = Signer::new("secret");
        let value = signer
            .authorization(HTTPMethod::POST, &headers, &Params::new())
            .expect("sign");
        let signature = value.strip_prefix("LOG:").expect("scheme prefix");
        assert_eq!(BASE64_STANDARD.decode(signature).expect("base64").len(), 20);
    }

    #[rstest]
    fn unsigned_headers_do_not_matter(headers: Headers) {
        let signer = Signer::new("secret");
        let before = signer
            .authorization(HTTPMethod::POST, &headers, &Params::new())
            .expect("sign");
        let mut changed = headers.clone();
        changed.insert(USER_AGENT.to_owned(), "other-agent".to_owned());
        changed.insert("X-Custom".to_owned(), "1".to_owned());
        let after = signer
            .authorization(HTTPMethod::POST, &changed, &Params::new())
            .expect("sign");
        assert_eq!(before, after);
    }

    #[rstest]
    fn vendor_headers_change_signature(headers: Headers) {
        let signer = Signer::new("secret");
        let before = signer
            .authorization(HTTPMethod::POST, &headers, &Params::new())
            .expect("sign");
        let mut changed = headers.clone();
        changed.insert(X_LOG_BODY_RAW_SIZE.to_owned(), "6".to_owned());
        let after = signer
            .authorization(HTTPMethod::POST, &changed, &Params::new())
            .expect("sign");
        assert_ne!(before, after);
    }

    #[rstest]
    fn date_format_is_rfc822() {
        let now = Utc.with_ymd_and_hms(2022, 1, 3, 9, 5, 7).single().expect("valid date");
        assert_eq!(http_date(now), "Mon, 03 Jan 2022 09:05:07 GMT");
    }

    #[rstest]
    fn debug_hides_secret() {
        assert!(!format!("{:?}", Signer::new("hunter2")).contains("hunter2"));
    }
}
