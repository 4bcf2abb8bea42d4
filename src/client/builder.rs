//! Builder for [`LogClient`].
//!
//! Collects identity, timeouts and decoding policy, validates them, and
//! wires in a transport. Unless one is supplied, the client gets a
//! [`UreqTransport`] configured with the builder's timeouts.

use std::fmt;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::error::LogError;
use crate::local_ip::local_machine_ip;

use super::config::{ClientConfig, ClientIdentity, QueryDecodeMode};
use super::endpoint::Endpoint;
use super::log_client::LogClient;
use super::transport::{Transport, UreqTransport};

/// Errors raised while building a client.
#[derive(Debug, Error)]
pub enum ClientBuildError {
    /// Invalid user supplied configuration.
    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),
    /// The endpoint could not be parsed.
    #[error(transparent)]
    Endpoint(#[from] LogError),
    /// The default transport could not be created.
    #[error(transparent)]
    Io(#[from] io::Error),
}

macro_rules! ensure_positive {
    ($value:expr, $field:expr) => {{
        if $value == 0 {
            Err(ClientBuildError::InvalidConfig(format!(
                "{} must be greater than zero",
                $field
            )))
        } else {
            Ok($value)
        }
    }};
}

macro_rules! option_setter {
    ($(#[$meta:meta])* $fn_name:ident, $field:ident, $ty:ty) => {
        $(#[$meta])*
        pub fn $fn_name(mut self, value: $ty) -> Self {
            self.$field = Some(value);
            self
        }
    };
}

/// Builder for constructing [`LogClient`] instances.
#[derive(Clone)]
pub struct LogClientBuilder {
    endpoint: String,
    access_key: String,
    security_token: Option<String>,
    source_ip: Option<String>,
    uuid_tag: bool,
    user_agent: Option<String>,
    console_real_ip: Option<String>,
    console_use_ssl: Option<bool>,
    connect_timeout_ms: Option<u64>,
    write_timeout_ms: Option<u64>,
    warn_interval_ms: Option<u64>,
    query_decode: Option<QueryDecodeMode>,
    transport: Option<Arc<dyn Transport>>,
}

impl LogClientBuilder {
    /// Create a builder for `endpoint` signing with `access_key`.
    pub fn new(endpoint: impl Into<String>, access_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            access_key: access_key.into(),
            security_token: None,
            source_ip: None,
            uuid_tag: false,
            user_agent: None,
            console_real_ip: None,
            console_use_ssl: None,
            connect_timeout_ms: None,
            write_timeout_ms: None,
            warn_interval_ms: None,
            query_decode: None,
            transport: None,
        }
    }

    /// Forward a temporary credential with every request.
    pub fn with_security_token(mut self, token: impl Into<String>) -> Self {
        self.security_token = Some(token.into());
        self
    }

    /// Source used for batches that do not name one.
    ///
    /// Defaults to the machine's outbound IP address.
    pub fn with_source_ip(mut self, source_ip: impl Into<String>) -> Self {
        self.source_ip = Some(source_ip.into());
        self
    }

    /// Append a `__pack_unique_id__` tag to every submitted batch.
    pub fn with_uuid_tag(mut self, enabled: bool) -> Self {
        self.uuid_tag = enabled;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_console_real_ip(mut self, ip: impl Into<String>) -> Self {
        self.console_real_ip = Some(ip.into());
        self
    }

    option_setter!(
        #[doc = "Send the `x-log-ssl` console debug marker."]
        with_console_use_ssl,
        console_use_ssl,
        bool
    );
    option_setter!(
        #[doc = "Set the connect timeout in milliseconds."]
        with_connect_timeout_ms,
        connect_timeout_ms,
        u64
    );
    option_setter!(
        #[doc = "Set the read/write timeout in milliseconds."]
        with_write_timeout_ms,
        write_timeout_ms,
        u64
    );
    option_setter!(
        #[doc = "Set the minimum interval between repeated warnings in milliseconds."]
        with_warn_interval_ms,
        warn_interval_ms,
        u64
    );
    option_setter!(
        #[doc = "Choose how undecodable query entries are handled."]
        with_query_decode,
        query_decode,
        QueryDecodeMode
    );

    /// Use `transport` instead of the default `ureq` transport.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    fn validate(&self) -> Result<(), ClientBuildError> {
        if self.access_key.is_empty() {
            return Err(ClientBuildError::InvalidConfig(
                "access key must not be empty".into(),
            ));
        }
        if let Some(timeout) = self.connect_timeout_ms {
            ensure_positive!(timeout, "connect_timeout_ms")?;
        }
        if let Some(timeout) = self.write_timeout_ms {
            ensure_positive!(timeout, "write_timeout_ms")?;
        }
        Ok(())
    }

    /// Validate the settings and resolve defaults.
    pub fn build_config(&self) -> Result<ClientConfig, ClientBuildError> {
        self.validate()?;
        let endpoint = Endpoint::parse(&self.endpoint)?;

        let mut identity = ClientIdentity::new(endpoint, self.access_key.clone());
        identity.security_token = self.security_token.clone();
        identity.source_ip = match self.source_ip.as_deref() {
            Some(ip) if !ip.is_empty() => ip.to_owned(),
            _ => local_machine_ip(),
        };
        identity.uuid_tag = self.uuid_tag;
        if let Some(user_agent) = &self.user_agent {
            identity.user_agent = user_agent.clone();
        }
        identity.console_real_ip = self.console_real_ip.clone();
        identity.console_use_ssl = self.console_use_ssl;

        let mut config = ClientConfig::new(identity);
        if let Some(ms) = self.connect_timeout_ms {
            config.connect_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = self.write_timeout_ms {
            config.write_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = self.warn_interval_ms {
            config.warn_interval = Duration::from_millis(ms);
        }
        if let Some(mode) = self.query_decode {
            config.query_decode = mode;
        }
        Ok(config)
    }

    /// Build the client.
    pub fn build(&self) -> Result<LogClient, ClientBuildError> {
        let config = self.build_config()?;
        let transport = match &self.transport {
            Some(transport) => Arc::clone(transport),
            None => Arc::new(UreqTransport::new(
                config.connect_timeout,
                config.write_timeout,
            )?),
        };
        Ok(LogClient::from_parts(config, transport))
    }
}

impl fmt::Debug for LogClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogClientBuilder")
            .field("endpoint", &self.endpoint)
            .field("access_key", &"<redacted>")
            .field("source_ip", &self.source_ip)
            .field("uuid_tag", &self.uuid_tag)
            .field("user_agent", &self.user_agent)
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .field("write_timeout_ms", &self.write_timeout_ms)
            .field("query_decode", &self.query_decode)
            .field("custom_transport", &self.transport.is_some())
            .finish_non_exhaustive()
    }
}
