//! Service endpoint parsing.

use std::fmt;

use crate::error::{ErrorCode, LogError};

/// URI scheme used to reach the service.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Scheme {
    #[default]
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

/// Parsed service endpoint: scheme plus `host[:port]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    scheme: Scheme,
    host: String,
}

impl Endpoint {
    /// Parse `http://host`, `https://host` or a bare `host`.
    ///
    /// A bare host defaults to plain HTTP and trailing slashes are dropped.
    /// IPv4 and IPv6 literal hosts are accepted as well as DNS names, so an
    /// endpoint such as `10.0.0.1:8080` is valid here.
    /// Anything that does not leave a usable `host[:port]` is rejected with
    /// [`ErrorCode::EndpointInvalid`].
    pub fn parse(endpoint: &str) -> Result<Self, LogError> {
        let trimmed = endpoint.trim();
        let (scheme, rest) = if let Some(rest) = trimmed.strip_prefix("http://") {
            (Scheme::Http, rest)
        } else if let Some(rest) = trimmed.strip_prefix("https://") {
            (Scheme::Https, rest)
        } else {
            (Scheme::Http, trimmed)
        };
        let host = rest.trim_end_matches('/');
        validate_host(host).map_err(|reason| {
            LogError::new(
                ErrorCode::EndpointInvalid,
                format!("invalid endpoint {endpoint:?}: {reason}"),
            )
        })?;
        Ok(Self {
            scheme,
            host: host.to_owned(),
        })
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// `host[:port]`, as sent in the `Host` header.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Absolute URL for `path_and_query`.
    pub fn url(&self, path_and_query: &str) -> String {
        format!("{}://{}{}", self.scheme.as_str(), self.host, path_and_query)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme.as_str(), self.host)
    }
}

fn validate_host(host: &str) -> Result<(), &'static str> {
    if host.is_empty() {
        return Err("host is empty");
    }
    if host
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '/' | '?' | '#' | '@' | '\\'))
    {
        return Err("host contains characters not allowed in an authority");
    }
    let name = match host.rsplit_once(':') {
        // Bracketed IPv6 literals keep their colons inside the brackets.
        Some((name, port)) if !port.contains(']') => {
            port.parse::<u16>().map_err(|_| "port is not a number")?;
            name
        }
        _ => host,
    };
    if name.is_empty() {
        return Err("host is empty");
    }
    Ok(())
}
