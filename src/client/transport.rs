//! HTTP transport seam.
//!
//! The client talks to the service through [`Transport`]. The bundled
//! [`UreqTransport`] keeps a pooled `ureq` agent; tests substitute an
//! in-memory implementation.

use std::fmt;
use std::io::{self, Read};
use std::sync::Arc;
use std::time::Duration;

use native_tls::TlsConnector;
use parking_lot::Mutex;
use ureq::{Agent, AgentBuilder};

use super::config::HTTPMethod;
use super::endpoint::Endpoint;
use super::headers::Headers;
use super::request::SignedRequest;
use super::url_encoding::append_query;

/// Response as received from the wire, body not yet consumed.
pub struct RawResponse {
    pub status: u16,
    /// Header names are lowercased.
    pub headers: Headers,
    pub body: Box<dyn Read + Send>,
}

impl RawResponse {
    pub fn new(status: u16, headers: Headers, body: impl Read + Send + 'static) -> Self {
        let headers = headers
            .into_iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value))
            .collect();
        Self {
            status,
            headers,
            body: Box::new(body),
        }
    }
}

impl fmt::Debug for RawResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Sends signed requests to the service.
///
/// Any HTTP status counts as a response; `Err` means no response was
/// obtained at all.
pub trait Transport: Send + Sync {
    fn send(&self, endpoint: &Endpoint, request: &SignedRequest<'_>) -> io::Result<RawResponse>;

    /// Drop pooled connections so the next request opens a fresh one.
    fn discard_connections(&self) {}
}

/// Blocking transport over a pooled `ureq` agent.
pub struct UreqTransport {
    agent: Mutex<Agent>,
    connect_timeout: Duration,
    write_timeout: Duration,
    tls: Arc<TlsConnector>,
}

impl UreqTransport {
    /// Build a transport with the given connect and read/write timeouts.
    pub fn new(connect_timeout: Duration, write_timeout: Duration) -> io::Result<Self> {
        let tls = TlsConnector::new()
            .map(Arc::new)
            .map_err(|err| io::Error::other(format!("TLS setup failed: {err}")))?;
        let agent = build_agent(connect_timeout, write_timeout, Arc::clone(&tls));
        Ok(Self {
            agent: Mutex::new(agent),
            connect_timeout,
            write_timeout,
            tls,
        })
    }
}

fn build_agent(connect_timeout: Duration, write_timeout: Duration, tls: Arc<TlsConnector>) -> Agent {
    AgentBuilder::new()
        .timeout_connect(connect_timeout)
        .timeout_read(write_timeout)
        .timeout_write(write_timeout)
        .tls_connector(tls)
        .build()
}

impl Transport for UreqTransport {
    fn send(&self, endpoint: &Endpoint, request: &SignedRequest<'_>) -> io::Result<RawResponse> {
        let url = endpoint.url(&append_query(request.path, request.params));
        // Agents share their pool across clones; clone out so the lock is
        // not held for the duration of the call.
        let agent = self.agent.lock().clone();
        let mut req = agent.request(request.method.as_str(), &url);
        for (name, value) in &request.headers {
            req = req.set(name, value);
        }
        let result = match request.method {
            HTTPMethod::GET => req.call(),
            HTTPMethod::POST => req.send_bytes(request.body),
        };
        match result {
            Ok(response) | Err(ureq::Error::Status(_, response)) => Ok(into_raw(response)),
            Err(ureq::Error::Transport(err)) => Err(io::Error::other(err.to_string())),
        }
    }

    fn discard_connections(&self) {
        *self.agent.lock() =
            build_agent(self.connect_timeout, self.write_timeout, Arc::clone(&self.tls));
    }
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport")
            .field("connect_timeout", &self.connect_timeout)
            .field("write_timeout", &self.write_timeout)
            .finish_non_exhaustive()
    }
}

fn into_raw(response: ureq::Response) -> RawResponse {
    let status = response.status();
    let headers: Headers = response
        .headers_names()
        .into_iter()
        .filter_map(|name| {
            let value = response.header(&name)?.to_owned();
            Some((name, value))
        })
        .collect();
    RawResponse::new(status, headers, response.into_reader())
}
