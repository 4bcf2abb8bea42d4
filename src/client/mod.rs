//! Client for the log service HTTP API.
//!
//! [`LogClient`] submits batches of [`LogRecord`](crate::LogRecord) values
//! and queries stored logs. A call flows through these stages:
//!
//! 1. [`RequestBuilder`] validates the batch and serializes it (protobuf or
//!    JSON), compresses it (deflate or LZ4) and fixes the path and headers.
//! 2. Each attempt signs a fresh copy of the request with [`Signer`].
//! 3. The [`Transport`] sends it; [`UreqTransport`] is the default.
//! 4. The response is drained and parsed into a [`Response`] or a
//!    [`LogError`](crate::LogError).
//!
//! # Retry Semantics
//!
//! - **Put**: at most two attempts. A failure carrying a server request id
//!   is a verdict and is returned at once; any other failure resets the
//!   transport's connections and is retried once.
//! - **Query**: a single attempt.
//!
//! # Wire Formats
//!
//! - **Binary** (default): protobuf `LogGroup`, `application/x-protobuf`.
//! - **JSON**: `{"__topic__", "__source__", "__logs__", "__tags__"}`,
//!   `application/json`.

mod batch;
mod builder;
mod compress;
mod config;
mod endpoint;
pub mod headers;
mod log_client;
mod proto;
mod record;
mod request;
mod response;
mod serialise;
mod signer;
mod transport;
mod url_encoding;

#[cfg(test)]
mod tests;

pub use batch::{EncodedBatch, LogBatch, QueryLogsRequest};
pub use builder::{ClientBuildError, LogClientBuilder};
pub use compress::{CompressedBody, compress, decompress};
pub use config::{
    API_VERSION, ClientConfig, ClientIdentity, CompressType, ContentType, DEFAULT_CONNECT_TIMEOUT,
    DEFAULT_USER_AGENT, DEFAULT_WRITE_TIMEOUT, HTTPMethod, MAX_PUT_LINES, MAX_PUT_SIZE,
    PUT_ATTEMPTS, QueryDecodeMode, SIGNATURE_METHOD,
};
pub use endpoint::{Endpoint, Scheme};
pub use headers::{Headers, Params};
pub use log_client::LogClient;
pub use proto::{Log, LogGroup, Pair};
pub use request::{RequestBuilder, RequestDraft, SignedRequest, put_logs_path, query_logs_path};
pub use response::{QueryLogsResponse, Response};
pub use serialise::{decode_queried_log, encode_batch};
pub use signer::{Signer, canonical_string, content_md5, http_date};
pub use transport::{RawResponse, Transport, UreqTransport};
