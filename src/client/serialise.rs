//! Serialization of batches and decoding of query results.
//!
//! Two wire formats are supported for puts:
//!
//! - **Binary**: a protobuf `LogGroup` (see [`proto`](super::proto)).
//! - **JSON**: an object with `__topic__`, `__source__`, `__logs__` and
//!   `__tags__` keys, rendered through the views in [`record`](super::record).
//!
//! Query results arrive as a JSON array of flat objects and are decoded one
//! element at a time so the caller decides what to do with malformed entries.

use prost::Message;
use serde_json::Value;
use uuid::Uuid;

use crate::error::{ErrorCode, LogError};
use crate::log_record::{LogRecord, QueriedLog};

use super::batch::LogBatch;
use super::config::ContentType;
use super::proto::{self, Pair};
use super::record::{JsonLogGroup, SOURCE_KEY, TIME_KEY, UNIQUE_ID_TAG};

/// Encode `batch` in its selected content type.
///
/// `source_fallback` replaces an empty batch source. When `unique_id` is
/// set it is appended as the `__pack_unique_id__` tag.
///
/// # Errors
///
/// Returns [`ErrorCode::EncodingException`] if the batch has no topic, a
/// record carries an empty content key, a JSON record uses the reserved
/// `__time__` key, or the JSON encoder fails. An empty topic is valid.
pub fn encode_batch(
    batch: &LogBatch,
    source_fallback: &str,
    unique_id: Option<&str>,
) -> Result<Vec<u8>, LogError> {
    let topic = batch.topic.as_deref().ok_or_else(|| {
        LogError::new(ErrorCode::EncodingException, "topic is required")
    })?;
    validate_keys(&batch.records, batch.content_type)?;
    let source = if batch.source.is_empty() {
        source_fallback
    } else {
        batch.source.as_str()
    };
    match batch.content_type {
        ContentType::Binary => Ok(encode_binary(batch, topic, source, unique_id)),
        ContentType::Json => encode_json(batch, topic, source, unique_id),
    }
}

fn validate_keys(records: &[LogRecord], content_type: ContentType) -> Result<(), LogError> {
    for (index, record) in records.iter().enumerate() {
        for content in &record.contents {
            if content.key.is_empty() {
                return Err(LogError::new(
                    ErrorCode::EncodingException,
                    format!("record {index} has a content with an empty key"),
                ));
            }
            // The JSON object already carries the record time under this key.
            if content_type == ContentType::Json && content.key == TIME_KEY {
                return Err(LogError::new(
                    ErrorCode::EncodingException,
                    format!("record {index} uses the reserved key {TIME_KEY}"),
                ));
            }
        }
    }
    Ok(())
}

fn encode_binary(batch: &LogBatch, topic: &str, source: &str, unique_id: Option<&str>) -> Vec<u8> {
    let mut log_tags: Vec<Pair> = batch
        .tags
        .iter()
        .map(|tag| Pair::new(&tag.key, &tag.value))
        .collect();
    if let Some(unique_id) = unique_id {
        log_tags.push(Pair::new(UNIQUE_ID_TAG, unique_id));
    }
    let logs = batch
        .records
        .iter()
        .map(|record| proto::Log {
            time: record.time,
            contents: record
                .contents
                .iter()
                .map(|c| Pair::new(&c.key, &c.value))
                .collect(),
        })
        .collect();
    proto::LogGroup {
        logs,
        reserved: None,
        topic: Some(topic.to_owned()),
        source: Some(source.to_owned()),
        log_tags,
    }
    .encode_to_vec()
}

fn encode_json(
    batch: &LogBatch,
    topic: &str,
    source: &str,
    unique_id: Option<&str>,
) -> Result<Vec<u8>, LogError> {
    let group = JsonLogGroup {
        topic,
        source,
        records: &batch.records,
        tags: &batch.tags,
        unique_id,
    };
    serde_json::to_vec(&group).map_err(|err| {
        LogError::new(ErrorCode::EncodingException, err.to_string()).with_source(err)
    })
}

/// Generate a value for the `__pack_unique_id__` tag: a random v4 UUID
/// followed by a random fraction.
pub fn pack_unique_id() -> String {
    format!("{}-{}", Uuid::new_v4(), rand::random::<f64>())
}

/// Decode one element of a query result array.
///
/// `__source__` and `__time__` are lifted out; every other field becomes a
/// content pair in document order. Non-string values are rendered as JSON
/// text and `null` becomes an empty string.
///
/// # Errors
///
/// Returns a description of the problem when the element is not an object
/// or its `__time__` is not a 32-bit unsigned integer.
pub fn decode_queried_log(element: &Value) -> Result<QueriedLog, String> {
    let object = element
        .as_object()
        .ok_or_else(|| format!("expected a JSON object, found {element}"))?;
    let mut queried = QueriedLog::default();
    for (key, value) in object {
        match key.as_str() {
            SOURCE_KEY => queried.source = value_to_string(value),
            TIME_KEY => queried.record.time = parse_time(value)?,
            _ => queried.record.push(key.as_str(), value_to_string(value)),
        }
    }
    Ok(queried)
}

fn parse_time(value: &Value) -> Result<u32, String> {
    let parsed = match value {
        Value::Number(number) => number.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(text) => text.trim().parse::<u32>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| format!("invalid {TIME_KEY} value {value}"))
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
