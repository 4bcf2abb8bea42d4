//! Zero-copy serializable views for the JSON wire format.
//!
//! The views borrow from the batch so encoding does not clone record
//! contents, and they write map keys in a fixed order so the produced body
//! is stable for a given batch. A key repeated within one record or within
//! the tags is written once, at its first position, with its last value.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use serde::Serialize;
use serde::ser::{SerializeMap, SerializeSeq, Serializer};

use crate::log_record::{LogContent, LogRecord};

pub(super) const TOPIC_KEY: &str = "__topic__";
pub(super) const SOURCE_KEY: &str = "__source__";
pub(super) const LOGS_KEY: &str = "__logs__";
pub(super) const TAGS_KEY: &str = "__tags__";
pub(super) const TIME_KEY: &str = "__time__";
pub(super) const UNIQUE_ID_TAG: &str = "__pack_unique_id__";

/// JSON view of a whole batch.
pub(super) struct JsonLogGroup<'a> {
    pub(super) topic: &'a str,
    pub(super) source: &'a str,
    pub(super) records: &'a [LogRecord],
    pub(super) tags: &'a [LogContent],
    pub(super) unique_id: Option<&'a str>,
}

impl JsonLogGroup<'_> {
    fn has_tags(&self) -> bool {
        !self.tags.is_empty() || self.unique_id.is_some()
    }

    fn count_fields(&self) -> usize {
        3 + usize::from(self.has_tags())
    }
}

impl Serialize for JsonLogGroup<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.count_fields()))?;
        map.serialize_entry(TOPIC_KEY, self.topic)?;
        map.serialize_entry(SOURCE_KEY, self.source)?;
        map.serialize_entry(LOGS_KEY, &JsonLogs(self.records))?;
        if self.has_tags() {
            map.serialize_entry(
                TAGS_KEY,
                &JsonTags {
                    tags: self.tags,
                    unique_id: self.unique_id,
                },
            )?;
        }
        map.end()
    }
}

struct JsonLogs<'a>(&'a [LogRecord]);

impl Serialize for JsonLogs<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for record in self.0 {
            seq.serialize_element(&JsonLog(record))?;
        }
        seq.end()
    }
}

struct JsonLog<'a>(&'a LogRecord);

impl Serialize for JsonLog<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let contents = last_wins(
            self.0
                .contents
                .iter()
                .map(|c| (c.key.as_str(), c.value.as_str())),
        );
        let mut map = serializer.serialize_map(Some(1 + contents.len()))?;
        map.serialize_entry(TIME_KEY, &self.0.time)?;
        for (key, value) in contents {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

struct JsonTags<'a> {
    tags: &'a [LogContent],
    unique_id: Option<&'a str>,
}

impl Serialize for JsonTags<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let tags = last_wins(
            self.tags
                .iter()
                .map(|t| (t.key.as_str(), t.value.as_str()))
                .chain(self.unique_id.map(|id| (UNIQUE_ID_TAG, id))),
        );
        let mut map = serializer.serialize_map(Some(tags.len()))?;
        for (key, value) in tags {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Collapse repeated keys, keeping the first position and the last value.
fn last_wins<'a>(pairs: impl Iterator<Item = (&'a str, &'a str)>) -> Vec<(&'a str, &'a str)> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut out: Vec<(&str, &str)> = Vec::new();
    for (key, value) in pairs {
        match positions.entry(key) {
            Entry::Occupied(slot) => out[*slot.get()].1 = value,
            Entry::Vacant(slot) => {
                slot.insert(out.len());
                out.push((key, value));
            }
        }
    }
    out
}
