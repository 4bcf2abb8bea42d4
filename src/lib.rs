//! Client for a remote log ingestion service.
//!
//! Applications push batches of timestamped key/value records with
//! [`LogClient::put_logs`] and read them back with [`LogClient::get_logs`].
//! Requests are serialized as protobuf or JSON, compressed with deflate or
//! LZ4, and signed with HMAC-SHA1. See [`client`] for the request pipeline
//! and retry rules.

pub mod client;
pub mod config_file;
pub mod error;
pub mod local_ip;
pub mod log_record;
pub mod rate_limited_warner;

pub use client::{
    ClientBuildError, ClientConfig, ClientIdentity, CompressType, ContentType, EncodedBatch,
    LogBatch, LogClient, LogClientBuilder, QueryDecodeMode, QueryLogsRequest, QueryLogsResponse,
    Response, Transport, UreqTransport,
};
pub use config_file::{ConfigFileError, load_client_config, parse_client_config};
pub use error::{ErrorCode, LogError};
pub use log_record::{LogContent, LogRecord, QueriedLog};
pub use rate_limited_warner::RateLimitedWarner;
