//! Log record representation shared by the put and query paths.
//!
//! A [`LogRecord`] is one log line: a timestamp in whole seconds and an
//! ordered list of key/value [`LogContent`] pairs. Query results pair each
//! record with the source it was collected from ([`QueriedLog`]).

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Key/value pair attached to a record or a batch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LogContent {
    pub key: String,
    pub value: String,
}

impl LogContent {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// One log line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LogRecord {
    /// Seconds since the Unix epoch.
    pub time: u32,
    /// Content pairs in insertion order.
    pub contents: Vec<LogContent>,
}

impl LogRecord {
    /// Construct an empty record stamped with `time`.
    pub fn new(time: u32) -> Self {
        Self {
            time,
            contents: Vec::new(),
        }
    }

    /// Construct an empty record stamped with the current wall-clock time.
    pub fn now() -> Self {
        let time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|dur| u32::try_from(dur.as_secs()).unwrap_or(u32::MAX))
            .unwrap_or_default();
        Self::new(time)
    }

    /// Append a content pair.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.contents.push(LogContent::new(key, value));
    }

    /// Append a content pair whose value may be missing.
    ///
    /// A missing value is stored as an empty string.
    pub fn push_optional(&mut self, key: impl Into<String>, value: Option<String>) {
        self.push(key, value.unwrap_or_default());
    }

    /// Builder-style variant of [`push`](Self::push).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    /// Look up the first value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.contents
            .iter()
            .find(|content| content.key == key)
            .map(|content| content.value.as_str())
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.time)?;
        for content in &self.contents {
            write!(f, " {}={}", content.key, content.value)?;
        }
        Ok(())
    }
}

/// A record returned by a query together with its source.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueriedLog {
    pub source: String,
    pub record: LogRecord,
}
