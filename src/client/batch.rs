//! Caller-facing descriptions of put and query operations.

use std::collections::BTreeMap;

use crate::log_record::{LogContent, LogRecord};

use super::config::{CompressType, ContentType};

/// Records submitted to one log store in a single put call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LogBatch {
    /// Target log store.
    pub log_store: String,
    /// Topic of the batch. Encoding fails while it is `None`; an empty
    /// string is valid.
    pub topic: Option<String>,
    /// Source of the records; empty means the client's local address.
    pub source: String,
    /// Tags attached to the whole batch.
    pub tags: Vec<LogContent>,
    pub records: Vec<LogRecord>,
    pub compress_type: CompressType,
    pub content_type: ContentType,
    /// Pins the batch to a shard instead of load-balanced placement.
    pub shard_key: Option<String>,
}

impl LogBatch {
    /// Batch for `log_store` with default encoding and compression.
    pub fn new(log_store: impl Into<String>) -> Self {
        Self {
            log_store: log_store.into(),
            ..Self::default()
        }
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push(LogContent::new(key, value));
        self
    }

    pub fn with_record(mut self, record: LogRecord) -> Self {
        self.records.push(record);
        self
    }

    pub fn with_records(mut self, records: impl IntoIterator<Item = LogRecord>) -> Self {
        self.records.extend(records);
        self
    }

    pub fn with_compress_type(mut self, compress_type: CompressType) -> Self {
        self.compress_type = compress_type;
        self
    }

    pub fn with_content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = content_type;
        self
    }

    pub fn with_shard_key(mut self, shard_key: impl Into<String>) -> Self {
        self.shard_key = Some(shard_key.into());
        self
    }
}

/// Already-serialized log group bytes submitted as they are.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EncodedBatch {
    pub log_store: String,
    /// Serialized payload, before compression.
    pub payload: Vec<u8>,
    pub compress_type: CompressType,
    pub content_type: ContentType,
    pub shard_key: Option<String>,
}

impl EncodedBatch {
    /// Binary payload for `log_store`, compressed with the default codec.
    pub fn new(log_store: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            log_store: log_store.into(),
            payload,
            ..Self::default()
        }
    }

    pub fn with_compress_type(mut self, compress_type: CompressType) -> Self {
        self.compress_type = compress_type;
        self
    }

    pub fn with_content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = content_type;
        self
    }

    pub fn with_shard_key(mut self, shard_key: impl Into<String>) -> Self {
        self.shard_key = Some(shard_key.into());
        self
    }
}

/// Query against one log store.
///
/// Parameters are opaque to the client; they are signed and forwarded as
/// query-string parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryLogsRequest {
    pub log_store: String,
    /// Start of the time range, seconds since the epoch.
    pub from: u32,
    /// End of the time range, seconds since the epoch.
    pub to: u32,
    pub topic: Option<String>,
    pub query: Option<String>,
    /// Maximum number of lines to return.
    pub line: Option<u32>,
    pub offset: Option<u32>,
    pub reverse: Option<bool>,
    /// Additional parameters passed through verbatim.
    pub extra: BTreeMap<String, String>,
}

impl QueryLogsRequest {
    pub fn new(log_store: impl Into<String>, from: u32, to: u32) -> Self {
        Self {
            log_store: log_store.into(),
            from,
            to,
            ..Self::default()
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn with_paging(mut self, line: u32, offset: u32) -> Self {
        self.line = Some(line);
        self.offset = Some(offset);
        self
    }

    pub fn with_reverse(mut self, reverse: bool) -> Self {
        self.reverse = Some(reverse);
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Query-string parameters for the request.
    pub fn params(&self) -> BTreeMap<String, String> {
        let mut params = self.extra.clone();
        params.insert("type".into(), "log".into());
        params.insert("from".into(), self.from.to_string());
        params.insert("to".into(), self.to.to_string());
        if let Some(topic) = &self.topic {
            params.insert("topic".into(), topic.clone());
        }
        if let Some(query) = &self.query {
            params.insert("query".into(), query.clone());
        }
        if let Some(line) = self.line {
            params.insert("line".into(), line.to_string());
        }
        if let Some(offset) = self.offset {
            params.insert("offset".into(), offset.to_string());
        }
        if let Some(reverse) = self.reverse {
            params.insert("reverse".into(), reverse.to_string());
        }
        params
    }
}
