//! The client facade and its submission loop.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use log::{debug, warn};

use crate::error::LogError;
use crate::rate_limited_warner::RateLimitedWarner;

use super::batch::{EncodedBatch, LogBatch, QueryLogsRequest};
use super::builder::LogClientBuilder;
use super::config::{ClientConfig, ClientIdentity, PUT_ATTEMPTS};
use super::request::{RequestBuilder, RequestDraft};
use super::response::{QueryLogsResponse, Response, parse_query_response, parse_response};
use super::signer::{Signer, http_date};
use super::transport::{RawResponse, Transport};

/// Attempts made for a query.
const QUERY_ATTEMPTS: u32 = 1;

/// What to do after an attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RetryDecision {
    /// Reset the transport's connections and try again.
    Retry,
    /// Return the error to the caller.
    Surface,
}

/// Decide whether a failed attempt is retried.
///
/// * A non-empty request id means the service processed and rejected the
///   request → [`RetryDecision::Surface`].
/// * Otherwise the failure happened before a server verdict →
///   [`RetryDecision::Retry`] while attempts remain.
pub(crate) fn classify_failure(err: &LogError, attempt: u32, max_attempts: u32) -> RetryDecision {
    if err.is_server_side() || attempt >= max_attempts {
        RetryDecision::Surface
    } else {
        RetryDecision::Retry
    }
}

/// Synchronous client for one service endpoint.
///
/// The client holds no per-call state and can be shared across threads.
pub struct LogClient {
    config: ClientConfig,
    signer: Signer,
    transport: Arc<dyn Transport>,
    warner: RateLimitedWarner,
}

impl LogClient {
    /// Start configuring a client for `endpoint`.
    pub fn builder(endpoint: impl Into<String>, access_key: impl Into<String>) -> LogClientBuilder {
        LogClientBuilder::new(endpoint, access_key)
    }

    pub(crate) fn from_parts(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        let signer = Signer::new(config.identity.access_key.as_str());
        let warner = RateLimitedWarner::new(config.warn_interval);
        Self {
            config,
            signer,
            transport,
            warner,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn identity(&self) -> &ClientIdentity {
        &self.config.identity
    }

    /// Submit `batch`, retrying once when no server verdict was obtained.
    ///
    /// Size limits are checked before anything is sent.
    ///
    /// # Errors
    ///
    /// Validation and encoding failures are returned without contacting
    /// the service. Server rejections carry the service's code and request
    /// id; transport failures surface as
    /// [`ErrorCode::RequestError`](crate::ErrorCode::RequestError) once both
    /// attempts are spent.
    pub fn put_logs(&self, batch: &LogBatch) -> Result<Response, LogError> {
        let draft = RequestBuilder::new(&self.config.identity).put_logs(batch)?;
        debug!(
            "putting {} records to {} ({} bytes)",
            batch.records.len(),
            batch.log_store,
            draft.body.len()
        );
        self.execute(&draft, PUT_ATTEMPTS, parse_response)
    }

    /// Submit an already serialized log group.
    pub fn put_encoded(&self, batch: &EncodedBatch) -> Result<Response, LogError> {
        let draft = RequestBuilder::new(&self.config.identity).put_encoded(batch)?;
        debug!(
            "putting encoded payload to {} ({} bytes)",
            batch.log_store,
            draft.body.len()
        );
        self.execute(&draft, PUT_ATTEMPTS, parse_response)
    }

    /// Query a log store. Queries are attempted once.
    pub fn get_logs(&self, request: &QueryLogsRequest) -> Result<QueryLogsResponse, LogError> {
        let draft = RequestBuilder::new(&self.config.identity).query_logs(request)?;
        let mode = self.config.query_decode;
        let response = self.execute(&draft, QUERY_ATTEMPTS, |raw| {
            parse_query_response(raw, mode)
        })?;
        if response.skipped() > 0 {
            self.warner.record_drops(response.skipped() as u64);
            self.warner.warn_if_due(|count| {
                warn!("LogClient skipped {count} malformed query entries");
            });
        }
        Ok(response)
    }

    fn execute<T>(
        &self,
        draft: &RequestDraft,
        max_attempts: u32,
        parse: impl Fn(RawResponse) -> Result<T, LogError>,
    ) -> Result<T, LogError> {
        let mut attempt = 1;
        loop {
            let err = match self.attempt(draft, &parse) {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            match classify_failure(&err, attempt, max_attempts) {
                RetryDecision::Surface => return Err(err),
                RetryDecision::Retry => {
                    warn!(
                        "LogClient {} {} failed (attempt {attempt}/{max_attempts}): {err}",
                        draft.method, draft.path
                    );
                    self.transport.discard_connections();
                    attempt += 1;
                }
            }
        }
    }

    fn attempt<T>(
        &self,
        draft: &RequestDraft,
        parse: &impl Fn(RawResponse) -> Result<T, LogError>,
    ) -> Result<T, LogError> {
        let date = http_date(Utc::now());
        let request = draft.sign(&self.signer, &date)?;
        let raw = self
            .transport
            .send(&self.config.identity.endpoint, &request)
            .map_err(LogError::transport)?;
        debug!(
            "{} {} answered {}",
            request.method, request.path, raw.status
        );
        parse(raw)
    }
}

impl Drop for LogClient {
    fn drop(&mut self) {
        self.warner.flush(|count| {
            warn!("LogClient skipped {count} malformed query entries");
        });
    }
}

impl fmt::Debug for LogClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
