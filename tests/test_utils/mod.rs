pub mod fixtures;
pub mod recording_transport;

pub use recording_transport::{RecordedRequest, RecordingTransport, Scripted};
