//! Assembly of transport-agnostic requests.
//!
//! [`RequestBuilder`] turns an operation (put or query) into a
//! [`RequestDraft`]: method, resource path, parameters, the headers common
//! to every attempt, and the final body. Each attempt then calls
//! [`RequestDraft::sign`], which copies the headers, stamps the per-attempt
//! `Date`, body digest and length, and signs the copy. The draft itself is
//! never mutated, so retries cannot inherit state from a failed attempt.

use crate::error::{ErrorCode, LogError};

use super::batch::{EncodedBatch, LogBatch, QueryLogsRequest};
use super::compress::compress;
use super::config::{
    API_VERSION, ClientIdentity, CompressType, ContentType, HTTPMethod, MAX_PUT_LINES,
    MAX_PUT_SIZE, SIGNATURE_METHOD,
};
use super::headers::{
    AUTHORIZATION, CONTENT_LENGTH, CONTENT_MD5, CONTENT_TYPE, DATE, HOST, Headers, Params,
    USER_AGENT, X_ACS_SECURITY_TOKEN, X_LOG_API_VERSION, X_LOG_BODY_RAW_SIZE,
    X_LOG_COMPRESS_TYPE, X_LOG_IP, X_LOG_SIGNATURE_METHOD, X_LOG_SSL,
};
use super::serialise::{encode_batch, pack_unique_id};
use super::signer::{Signer, content_md5};
use super::url_encoding::{encode_path_segment, url_encode};

/// Request state shared by every attempt of one logical call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestDraft {
    pub method: HTTPMethod,
    /// Resource path; routed puts carry their `?key=` here.
    pub path: String,
    pub params: Params,
    pub headers: Headers,
    pub body: Vec<u8>,
}

/// A request ready to be handed to a transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedRequest<'a> {
    pub method: HTTPMethod,
    pub path: &'a str,
    pub params: &'a Params,
    pub headers: Headers,
    pub body: &'a [u8],
}

impl SignedRequest<'_> {
    pub fn content_length(&self) -> usize {
        self.body.len()
    }
}

impl RequestDraft {
    /// Produce a signed copy of the draft dated `date`.
    pub fn sign(&self, signer: &Signer, date: &str) -> Result<SignedRequest<'_>, LogError> {
        let mut headers = self.headers.clone();
        headers.insert(DATE.to_owned(), date.to_owned());
        if !self.body.is_empty() {
            headers.insert(CONTENT_MD5.to_owned(), content_md5(&self.body));
        }
        headers.insert(CONTENT_LENGTH.to_owned(), self.body.len().to_string());
        let authorization = signer.authorization(self.method, &headers, &self.params)?;
        headers.insert(AUTHORIZATION.to_owned(), authorization);
        Ok(SignedRequest {
            method: self.method,
            path: &self.path,
            params: &self.params,
            headers,
            body: &self.body,
        })
    }
}

/// Resource path of a put: load-balanced unless a shard key is given.
pub fn put_logs_path(log_store: &str, shard_key: Option<&str>) -> String {
    let base = format!("/logstores/{}", encode_path_segment(log_store));
    match shard_key.filter(|key| !key.is_empty()) {
        Some(key) => format!("{base}/shards/route?key={}", url_encode(key)),
        None => format!("{base}/shards/lb"),
    }
}

/// Resource path of a query.
pub fn query_logs_path(log_store: &str) -> String {
    format!("/logstores/{}", encode_path_segment(log_store))
}

/// Builds drafts on behalf of one client identity.
#[derive(Clone, Copy, Debug)]
pub struct RequestBuilder<'a> {
    identity: &'a ClientIdentity,
}

impl<'a> RequestBuilder<'a> {
    pub fn new(identity: &'a ClientIdentity) -> Self {
        Self { identity }
    }

    /// Validate, serialize and compress `batch` into a put draft.
    ///
    /// # Errors
    ///
    /// * [`ErrorCode::InvalidParameter`] for an empty log store name.
    /// * [`ErrorCode::InvalidLogSize`] when the batch holds more than
    ///   [`MAX_PUT_LINES`] records or serializes to more than
    ///   [`MAX_PUT_SIZE`] bytes.
    /// * [`ErrorCode::EncodingException`] when the topic is missing or
    ///   serialization fails.
    pub fn put_logs(&self, batch: &LogBatch) -> Result<RequestDraft, LogError> {
        validate_log_store(&batch.log_store)?;
        if batch.records.len() > MAX_PUT_LINES {
            return Err(LogError::new(
                ErrorCode::InvalidLogSize,
                format!("logItems' length exceeds maximum limitation: {MAX_PUT_LINES} lines"),
            ));
        }
        let unique_id = self.identity.uuid_tag.then(pack_unique_id);
        let payload = encode_batch(batch, &self.identity.source_ip, unique_id.as_deref())?;
        self.put_draft(
            &batch.log_store,
            batch.shard_key.as_deref(),
            batch.content_type,
            batch.compress_type,
            payload,
        )
    }

    /// Build a put draft from an already serialized payload.
    pub fn put_encoded(&self, batch: &EncodedBatch) -> Result<RequestDraft, LogError> {
        validate_log_store(&batch.log_store)?;
        self.put_draft(
            &batch.log_store,
            batch.shard_key.as_deref(),
            batch.content_type,
            batch.compress_type,
            batch.payload.clone(),
        )
    }

    /// Build a query draft.
    pub fn query_logs(&self, request: &QueryLogsRequest) -> Result<RequestDraft, LogError> {
        validate_log_store(&request.log_store)?;
        Ok(RequestDraft {
            method: HTTPMethod::GET,
            path: query_logs_path(&request.log_store),
            params: request.params(),
            headers: self.common_headers(),
            body: Vec::new(),
        })
    }

    fn put_draft(
        &self,
        log_store: &str,
        shard_key: Option<&str>,
        content_type: ContentType,
        compress_type: CompressType,
        payload: Vec<u8>,
    ) -> Result<RequestDraft, LogError> {
        if payload.len() > MAX_PUT_SIZE {
            return Err(LogError::new(
                ErrorCode::InvalidLogSize,
                format!("logItems' size exceeds maximum limitation: {MAX_PUT_SIZE} bytes"),
            ));
        }
        let body = compress(compress_type, payload).map_err(|err| {
            LogError::new(ErrorCode::EncodingException, format!("compression failed: {err}"))
                .with_source(err)
        })?;

        let mut headers = self.common_headers();
        headers.insert(CONTENT_TYPE.to_owned(), content_type.as_str().to_owned());
        headers.insert(X_LOG_BODY_RAW_SIZE.to_owned(), body.raw_size.to_string());
        if body.codec != CompressType::None {
            headers.insert(X_LOG_COMPRESS_TYPE.to_owned(), body.codec.as_str().to_owned());
        }
        Ok(RequestDraft {
            method: HTTPMethod::POST,
            path: put_logs_path(log_store, shard_key),
            params: Params::new(),
            headers,
            body: body.bytes,
        })
    }

    /// Headers sent with every request before per-attempt fields are added.
    fn common_headers(&self) -> Headers {
        let identity = self.identity;
        let mut headers = Headers::new();
        headers.insert(USER_AGENT.to_owned(), identity.user_agent.clone());
        headers.insert(CONTENT_TYPE.to_owned(), ContentType::Binary.as_str().to_owned());
        headers.insert(HOST.to_owned(), identity.endpoint.host().to_owned());
        headers.insert(X_LOG_API_VERSION.to_owned(), API_VERSION.to_owned());
        headers.insert(X_LOG_SIGNATURE_METHOD.to_owned(), SIGNATURE_METHOD.to_owned());
        if let Some(token) = identity.security_token.as_ref().filter(|t| !t.is_empty()) {
            headers.insert(X_ACS_SECURITY_TOKEN.to_owned(), token.clone());
        }
        if let Some(ip) = identity.console_real_ip.as_ref().filter(|ip| !ip.is_empty()) {
            headers.insert(X_LOG_IP.to_owned(), ip.clone());
        }
        if let Some(ssl) = identity.console_use_ssl {
            headers.insert(X_LOG_SSL.to_owned(), ssl.to_string());
        }
        headers
    }
}

fn validate_log_store(log_store: &str) -> Result<(), LogError> {
    if log_store.trim().is_empty() {
        return Err(LogError::new(
            ErrorCode::InvalidParameter,
            "logStore must not be empty",
        ));
    }
    Ok(())
}
