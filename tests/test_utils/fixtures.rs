//! Fixtures pairing a [`LogClient`] with the recording transport behind it.

use std::sync::Arc;

use logservice_client::{LogBatch, LogClient, LogClientBuilder, LogRecord};
use logservice_client::{CompressType, ContentType};

use super::recording_transport::{RecordingTransport, Scripted};

pub const ACCESS_KEY: &str = "test-secret";
pub const SOURCE_IP: &str = "10.0.0.7";

/// Build a client whose transport replays `script`.
pub fn scripted_client(
    script: impl IntoIterator<Item = Scripted>,
) -> (Arc<RecordingTransport>, LogClient) {
    scripted_client_with(script, |builder| builder)
}

/// Like [`scripted_client`], letting the caller adjust the builder first.
pub fn scripted_client_with(
    script: impl IntoIterator<Item = Scripted>,
    configure: impl FnOnce(LogClientBuilder) -> LogClientBuilder,
) -> (Arc<RecordingTransport>, LogClient) {
    let transport = Arc::new(RecordingTransport::new(script));
    let builder = LogClientBuilder::new("https://logs.example.com", ACCESS_KEY)
        .with_source_ip(SOURCE_IP)
        .with_transport(Arc::clone(&transport) as Arc<dyn logservice_client::Transport>);
    let client = configure(builder).build().expect("build client");
    (transport, client)
}

/// One-record JSON batch without compression.
pub fn json_batch() -> LogBatch {
    LogBatch::new("app")
        .with_topic("t1")
        .with_content_type(ContentType::Json)
        .with_compress_type(CompressType::None)
        .with_record(LogRecord::new(1000).with("a", "1"))
}
