//! Header names used by the protocol.

use std::collections::BTreeMap;

/// Header mapping; keys are unique and kept exactly as produced.
pub type Headers = BTreeMap<String, String>;
/// Query-string parameters.
pub type Params = BTreeMap<String, String>;

pub const AUTHORIZATION: &str = "Authorization";
pub const CONTENT_LENGTH: &str = "Content-Length";
pub const CONTENT_MD5: &str = "Content-MD5";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const DATE: &str = "Date";
pub const HOST: &str = "Host";
pub const USER_AGENT: &str = "User-Agent";

pub const X_LOG_API_VERSION: &str = "x-log-apiversion";
pub const X_LOG_SIGNATURE_METHOD: &str = "x-log-signaturemethod";
pub const X_LOG_BODY_RAW_SIZE: &str = "x-log-bodyrawsize";
pub const X_LOG_COMPRESS_TYPE: &str = "x-log-compresstype";
pub const X_LOG_REQUEST_ID: &str = "x-log-requestid";
pub const X_LOG_IP: &str = "x-log-ip";
pub const X_LOG_SSL: &str = "x-log-ssl";
pub const X_ACS_SECURITY_TOKEN: &str = "x-acs-security-token";

/// Prefixes of the headers covered by the signature.
pub const SIGNED_HEADER_PREFIXES: [&str; 2] = ["x-log-", "x-acs-"];
