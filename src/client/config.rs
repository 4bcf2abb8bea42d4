//! Configuration structures consumed by the client.
//!
//! [`LogClientBuilder`](super::LogClientBuilder) constructs these values
//! before handing them to [`LogClient`](super::LogClient), which treats them
//! as read-only for its lifetime.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ErrorCode, LogError};
use crate::rate_limited_warner::DEFAULT_WARN_INTERVAL;

use super::endpoint::Endpoint;

/// Default connection timeout applied when establishing HTTP connections.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Default request timeout applied to HTTP requests.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(30);
/// Maximum number of records accepted in one batch.
pub const MAX_PUT_LINES: usize = 4096;
/// Maximum serialized batch size in bytes, before compression.
pub const MAX_PUT_SIZE: usize = 5 * 1024 * 1024;
/// Total attempts made for one put call.
pub const PUT_ATTEMPTS: u32 = 2;
/// API version announced in every request.
pub const API_VERSION: &str = "0.6.0";
/// Signature method announced in every request.
pub const SIGNATURE_METHOD: &str = "hmac-sha1";
/// User agent sent unless the caller overrides it.
pub const DEFAULT_USER_AGENT: &str = concat!("logservice-client-rust/", env!("CARGO_PKG_VERSION"));

/// HTTP methods used by the protocol.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HTTPMethod {
    /// Query requests.
    GET,
    /// Put requests.
    #[default]
    POST,
}

impl HTTPMethod {
    /// Convert to the string representation used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GET => "GET",
            Self::POST => "POST",
        }
    }
}

impl fmt::Display for HTTPMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compression codec applied to a serialized batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CompressType {
    /// Body sent as serialized.
    None,
    /// zlib-wrapped deflate.
    Gzip,
    /// Raw LZ4 block.
    #[default]
    Lz4,
}

impl CompressType {
    /// Identifier written to the `x-log-compresstype` header.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "",
            Self::Gzip => "deflate",
            Self::Lz4 => "lz4",
        }
    }
}

impl FromStr for CompressType {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Self::None),
            "deflate" | "gzip" => Ok(Self::Gzip),
            "lz4" => Ok(Self::Lz4),
            other => Err(LogError::new(
                ErrorCode::InvalidParameter,
                format!("invalid compress type: {other}, should be one of (none, deflate, lz4)"),
            )),
        }
    }
}

/// Wire format of a submitted batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ContentType {
    /// Protobuf-encoded log group.
    #[default]
    Binary,
    /// JSON object form.
    Json,
}

impl ContentType {
    /// Value of the `Content-Type` header.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Binary => "application/x-protobuf",
            Self::Json => "application/json",
        }
    }
}

/// Handling of query result entries that cannot be decoded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum QueryDecodeMode {
    /// Skip malformed entries and report them through a rate-limited warning.
    #[default]
    Lenient,
    /// Fail the whole query with `BadResponse`.
    Strict,
}

impl FromStr for QueryDecodeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            other => Err(format!("unknown query decode mode: {other}")),
        }
    }
}

/// Who the client is and how it identifies itself to the service.
#[derive(Clone)]
pub struct ClientIdentity {
    /// Service endpoint.
    pub endpoint: Endpoint,
    /// Shared secret used to sign requests.
    pub access_key: String,
    /// Temporary credential forwarded as `x-acs-security-token`.
    pub security_token: Option<String>,
    /// Source stamped on batches that do not name one.
    pub source_ip: String,
    /// Append a `__pack_unique_id__` tag to every batch.
    pub uuid_tag: bool,
    /// User agent header value.
    pub user_agent: String,
    /// Console debug marker sent as `x-log-ip`.
    pub console_real_ip: Option<String>,
    /// Console debug marker sent as `x-log-ssl`.
    pub console_use_ssl: Option<bool>,
}

impl ClientIdentity {
    /// Identity with the given endpoint and key and default optional fields.
    pub fn new(endpoint: Endpoint, access_key: impl Into<String>) -> Self {
        Self {
            endpoint,
            access_key: access_key.into(),
            security_token: None,
            source_ip: String::new(),
            uuid_tag: false,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            console_real_ip: None,
            console_use_ssl: None,
        }
    }
}

impl fmt::Debug for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientIdentity")
            .field("endpoint", &self.endpoint)
            .field("access_key", &"<redacted>")
            .field("security_token", &self.security_token.as_ref().map(|_| "<redacted>"))
            .field("source_ip", &self.source_ip)
            .field("uuid_tag", &self.uuid_tag)
            .field("user_agent", &self.user_agent)
            .field("console_real_ip", &self.console_real_ip)
            .field("console_use_ssl", &self.console_use_ssl)
            .finish()
    }
}

/// Full client configuration.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub identity: ClientIdentity,
    /// Timeout for establishing connections.
    pub connect_timeout: Duration,
    /// Timeout for a whole request.
    pub write_timeout: Duration,
    /// Policy for undecodable query entries.
    pub query_decode: QueryDecodeMode,
    /// Interval between rate-limited warnings.
    pub warn_interval: Duration,
}

impl ClientConfig {
    pub fn new(identity: ClientIdentity) -> Self {
        Self {
            identity,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            query_decode: QueryDecodeMode::default(),
            warn_interval: DEFAULT_WARN_INTERVAL,
        }
    }
}
