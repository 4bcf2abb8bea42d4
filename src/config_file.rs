//! Client configuration from INI files.
//!
//! Settings live in a `[log_client]` section:
//!
//! ```ini
//! [log_client]
//! endpoint = https://logs.example.com
//! access_key = secret
//! security_token = sts-token
//! source_ip = 10.0.0.7
//! uuid_tag = true
//! user_agent = my-service/1.0
//! connect_timeout_ms = 5000
//! write_timeout_ms = 30000
//! console_real_ip = 192.168.1.9
//! console_use_ssl = false
//! query_decode = strict
//! ```
//!
//! Only `endpoint` and `access_key` are required. Files are decoded as
//! UTF-8 unless another `encoding_rs` label is given.

use std::fs;
use std::io::{self, ErrorKind};
use std::path::Path;
use std::str::FromStr;

use encoding_rs::{Encoding, UTF_8};
use ini::{Ini, Properties};
use thiserror::Error;

use crate::client::{LogClientBuilder, QueryDecodeMode};

/// Section holding the client settings.
pub const CLIENT_SECTION: &str = "log_client";

/// Errors raised while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("{path} doesn't exist")]
    NotFound { path: String },
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("{path} is an empty file")]
    Empty { path: String },
    #[error("unknown encoding {0}")]
    UnknownEncoding(String),
    #[error("{path} is not valid {encoding}")]
    Decode { path: String, encoding: &'static str },
    #[error("{path} is invalid: {message}")]
    Parse { path: String, message: String },
    #[error("{path} has no [log_client] section")]
    MissingSection { path: String },
    #[error("[log_client] is missing required key {0}")]
    MissingKey(&'static str),
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Read `path` and turn its `[log_client]` section into a builder.
///
/// `encoding` is an `encoding_rs` label such as `"utf-8"` or `"gbk"`.
pub fn load_client_config(
    path: impl AsRef<Path>,
    encoding: Option<&str>,
) -> Result<LogClientBuilder, ConfigFileError> {
    let path = path.as_ref().display().to_string();
    let bytes = read_file_bytes(&path)?;
    if bytes.is_empty() {
        return Err(ConfigFileError::Empty { path });
    }
    let text = decode_contents(&path, &bytes, encoding)?;
    parse_client_config(&path, &text)
}

/// Parse INI `text`; `path` only labels errors.
pub fn parse_client_config(path: &str, text: &str) -> Result<LogClientBuilder, ConfigFileError> {
    let ini = Ini::load_from_str(text).map_err(|err| ConfigFileError::Parse {
        path: path.to_owned(),
        message: err.to_string(),
    })?;
    let section = ini
        .section(Some(CLIENT_SECTION))
        .ok_or_else(|| ConfigFileError::MissingSection {
            path: path.to_owned(),
        })?;
    builder_from_section(section)
}

fn read_file_bytes(path: &str) -> Result<Vec<u8>, ConfigFileError> {
    fs::read(path).map_err(|err| match err.kind() {
        ErrorKind::NotFound => ConfigFileError::NotFound {
            path: path.to_owned(),
        },
        _ => ConfigFileError::Io {
            path: path.to_owned(),
            source: err,
        },
    })
}

fn decode_contents(
    path: &str,
    bytes: &[u8],
    label: Option<&str>,
) -> Result<String, ConfigFileError> {
    let encoding = match label {
        Some(label) => {
            let normalized = label.trim().to_ascii_lowercase();
            Encoding::for_label(normalized.as_bytes())
                .ok_or_else(|| ConfigFileError::UnknownEncoding(label.to_owned()))?
        }
        None => UTF_8,
    };
    let (decoded, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(ConfigFileError::Decode {
            path: path.to_owned(),
            encoding: encoding.name(),
        });
    }
    Ok(decoded.into_owned())
}

fn builder_from_section(props: &Properties) -> Result<LogClientBuilder, ConfigFileError> {
    let required = |key: &'static str| {
        props
            .get(key)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(ConfigFileError::MissingKey(key))
    };
    let mut builder = LogClientBuilder::new(required("endpoint")?, required("access_key")?);

    if let Some(token) = props.get("security_token") {
        builder = builder.with_security_token(token.trim());
    }
    if let Some(ip) = props.get("source_ip") {
        builder = builder.with_source_ip(ip.trim());
    }
    if let Some(agent) = props.get("user_agent") {
        builder = builder.with_user_agent(agent.trim());
    }
    if let Some(ip) = props.get("console_real_ip") {
        builder = builder.with_console_real_ip(ip.trim());
    }
    if let Some(enabled) = parse_value(props, "uuid_tag", parse_bool)? {
        builder = builder.with_uuid_tag(enabled);
    }
    if let Some(ssl) = parse_value(props, "console_use_ssl", parse_bool)? {
        builder = builder.with_console_use_ssl(ssl);
    }
    if let Some(ms) = parse_value(props, "connect_timeout_ms", parse_from_str::<u64>)? {
        builder = builder.with_connect_timeout_ms(ms);
    }
    if let Some(ms) = parse_value(props, "write_timeout_ms", parse_from_str::<u64>)? {
        builder = builder.with_write_timeout_ms(ms);
    }
    if let Some(mode) = parse_value(props, "query_decode", parse_from_str::<QueryDecodeMode>)? {
        builder = builder.with_query_decode(mode);
    }
    Ok(builder)
}

fn parse_value<T>(
    props: &Properties,
    key: &'static str,
    parse: impl Fn(&str) -> Result<T, String>,
) -> Result<Option<T>, ConfigFileError> {
    let Some(raw) = props.get(key) else {
        return Ok(None);
    };
    parse(raw.trim())
        .map(Some)
        .map_err(|reason| ConfigFileError::InvalidValue {
            key,
            value: raw.to_owned(),
            reason,
        })
}

fn parse_from_str<T>(value: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: ToString,
{
    value.parse().map_err(|err: T::Err| err.to_string())
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err("expected a boolean".to_owned()),
    }
}
