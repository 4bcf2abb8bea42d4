//! Protobuf messages of the binary wire format.
//!
//! ```protobuf
//! message Log {
//!     required uint32 Time = 1;
//!     message Content {
//!         required string Key = 1;
//!         required string Value = 2;
//!     }
//!     repeated Content Contents = 2;
//! }
//!
//! message LogTag {
//!     required string Key = 1;
//!     required string Value = 2;
//! }
//!
//! message LogGroup {
//!     repeated Log Logs = 1;
//!     optional string Reserved = 2;
//!     optional string Topic = 3;
//!     optional string Source = 4;
//!     repeated LogTag LogTags = 6;
//! }
//! ```

use prost::Message;

#[derive(Clone, PartialEq, Message)]
pub struct Log {
    #[prost(uint32, required, tag = "1")]
    pub time: u32,
    #[prost(message, repeated, tag = "2")]
    pub contents: Vec<Pair>,
}

/// Key/value entry used both for log contents and group tags.
#[derive(Clone, PartialEq, Message)]
pub struct Pair {
    #[prost(string, required, tag = "1")]
    pub key: String,
    #[prost(string, required, tag = "2")]
    pub value: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct LogGroup {
    #[prost(message, repeated, tag = "1")]
    pub logs: Vec<Log>,
    #[prost(string, optional, tag = "2")]
    pub reserved: Option<String>,
    #[prost(string, optional, tag = "3")]
    pub topic: Option<String>,
    #[prost(string, optional, tag = "4")]
    pub source: Option<String>,
    #[prost(message, repeated, tag = "6")]
    pub log_tags: Vec<Pair>,
}

impl Pair {
    pub fn new(key: &str, value: &str) -> Self {
        Self {
            key: key.to_owned(),
            value: value.to_owned(),
        }
    }
}
