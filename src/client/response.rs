//! Response parsing.
//!
//! Every parse function consumes the [`RawResponse`], reading the body to
//! the end before inspecting it. The body is released when the function
//! returns, whichever path it takes.

use std::io::Read;

use serde_json::Value;

use crate::error::{ErrorCode, LogError};
use crate::log_record::QueriedLog;

use super::config::QueryDecodeMode;
use super::headers::{Headers, X_LOG_REQUEST_ID};
use super::serialise::decode_queried_log;
use super::transport::RawResponse;

const ERROR_CODE_FIELD: &str = "errorCode";
const ERROR_MESSAGE_FIELD: &str = "errorMessage";

/// Successful service response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    status: u16,
    headers: Headers,
    body: Vec<u8>,
}

impl Response {
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Response headers; names are lowercased.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Header lookup ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Request id assigned by the service, empty if none was sent.
    pub fn request_id(&self) -> &str {
        self.header(X_LOG_REQUEST_ID).unwrap_or_default()
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

/// Result of a query call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryLogsResponse {
    response: Response,
    logs: Vec<QueriedLog>,
    skipped: usize,
}

impl QueryLogsResponse {
    pub fn response(&self) -> &Response {
        &self.response
    }

    pub fn request_id(&self) -> &str {
        self.response.request_id()
    }

    /// Decoded entries in response order.
    pub fn logs(&self) -> &[QueriedLog] {
        &self.logs
    }

    pub fn into_logs(self) -> Vec<QueriedLog> {
        self.logs
    }

    /// Entries dropped because they could not be decoded.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

/// Read the whole response and turn a non-200 status into an error.
pub fn parse_response(raw: RawResponse) -> Result<Response, LogError> {
    let RawResponse {
        status,
        headers,
        mut body,
    } = raw;
    let request_id = headers.get(X_LOG_REQUEST_ID).cloned().unwrap_or_default();
    let mut bytes = Vec::new();
    body.read_to_end(&mut bytes).map_err(|err| {
        bad_response(format!("failed to read response body: {err}"), &request_id).with_source(err)
    })?;
    drop(body);

    if status != 200 {
        return Err(error_from_body(&bytes, &request_id));
    }
    Ok(Response {
        status,
        headers,
        body: bytes,
    })
}

/// Parse a query response, decoding its JSON array of entries.
///
/// Malformed entries are skipped and counted in [`QueryDecodeMode::Lenient`]
/// and fail the call in [`QueryDecodeMode::Strict`].
pub fn parse_query_response(
    raw: RawResponse,
    mode: QueryDecodeMode,
) -> Result<QueryLogsResponse, LogError> {
    let response = parse_response(raw)?;
    let request_id = response.request_id().to_owned();
    let document = parse_json(&response.body, &request_id)?;
    let Value::Array(elements) = document else {
        return Err(bad_response("query response is not a JSON array", &request_id));
    };

    let mut logs = Vec::with_capacity(elements.len());
    let mut skipped = 0;
    for (index, element) in elements.iter().enumerate() {
        match decode_queried_log(element) {
            Ok(log) => logs.push(log),
            Err(reason) if mode == QueryDecodeMode::Lenient => {
                log::debug!("skipping query entry {index}: {reason}");
                skipped += 1;
            }
            Err(reason) => {
                return Err(bad_response(
                    format!("query entry {index} is malformed: {reason}"),
                    &request_id,
                ));
            }
        }
    }
    Ok(QueryLogsResponse {
        response,
        logs,
        skipped,
    })
}

fn error_from_body(body: &[u8], request_id: &str) -> LogError {
    let document = match parse_json(body, request_id) {
        Ok(document) => document,
        Err(err) => return err,
    };
    let field = |name: &str| document.get(name).and_then(Value::as_str);
    match (field(ERROR_CODE_FIELD), field(ERROR_MESSAGE_FIELD)) {
        (Some(code), Some(message)) => LogError::from_server(code, message, request_id),
        _ => LogError::new(
            ErrorCode::InvalidErrorResponse,
            format!("error response lacks {ERROR_CODE_FIELD} or {ERROR_MESSAGE_FIELD}: {document}"),
        )
        .with_request_id(request_id),
    }
}

fn parse_json(body: &[u8], request_id: &str) -> Result<Value, LogError> {
    if body.is_empty() {
        return Err(bad_response("response body is empty", request_id));
    }
    let text = std::str::from_utf8(body).map_err(|err| {
        bad_response("response body is not valid UTF-8", request_id).with_source(err)
    })?;
    serde_json::from_str(text).map_err(|err| {
        bad_response(format!("response body is not valid JSON: {err}"), request_id)
            .with_source(err)
    })
}

fn bad_response(message: impl Into<String>, request_id: &str) -> LogError {
    LogError::new(ErrorCode::BadResponse, message).with_request_id(request_id)
}
