//! In-memory [`Transport`] that records every request and replays a script
//! of canned outcomes.

use std::collections::VecDeque;
use std::io::{self, Cursor};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use logservice_client::Transport;
use logservice_client::client::{Endpoint, HTTPMethod, Headers, Params, RawResponse, SignedRequest};

/// Outcome of one `send` call.
#[derive(Clone, Debug)]
pub enum Scripted {
    Reply {
        status: u16,
        request_id: Option<String>,
        body: String,
    },
    Fail(io::ErrorKind),
}

impl Scripted {
    pub fn ok(request_id: &str) -> Self {
        Self::Reply {
            status: 200,
            request_id: Some(request_id.to_owned()),
            body: String::new(),
        }
    }

    pub fn json(request_id: &str, body: &str) -> Self {
        Self::Reply {
            status: 200,
            request_id: Some(request_id.to_owned()),
            body: body.to_owned(),
        }
    }

    pub fn error(status: u16, request_id: Option<&str>, body: &str) -> Self {
        Self::Reply {
            status,
            request_id: request_id.map(str::to_owned),
            body: body.to_owned(),
        }
    }
}

/// Copy of a request as the transport saw it.
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub url: String,
    pub method: HTTPMethod,
    pub path: String,
    pub params: Params,
    pub headers: Headers,
    pub body: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct RecordingTransport {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<RecordedRequest>>,
    resets: AtomicUsize,
}

impl RecordingTransport {
    pub fn new(script: impl IntoIterator<Item = Scripted>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().expect("requests lock").len()
    }

    /// Number of `discard_connections` calls.
    pub fn resets(&self) -> usize {
        self.resets.load(Ordering::SeqCst)
    }
}

impl Transport for RecordingTransport {
    fn send(&self, endpoint: &Endpoint, request: &SignedRequest<'_>) -> io::Result<RawResponse> {
        self.requests
            .lock()
            .expect("requests lock")
            .push(RecordedRequest {
                url: endpoint.url(request.path),
                method: request.method,
                path: request.path.to_owned(),
                params: request.params.clone(),
                headers: request.headers.clone(),
                body: request.body.to_vec(),
            });
        let next = self
            .script
            .lock()
            .expect("script lock")
            .pop_front()
            .unwrap_or(Scripted::Fail(io::ErrorKind::ConnectionRefused));
        match next {
            Scripted::Reply {
                status,
                request_id,
                body,
            } => {
                let mut headers = Headers::new();
                if let Some(id) = request_id {
                    headers.insert("x-log-requestid".to_owned(), id);
                }
                Ok(RawResponse::new(status, headers, Cursor::new(body.into_bytes())))
            }
            Scripted::Fail(kind) => Err(io::Error::new(kind, "scripted failure")),
        }
    }

    fn discard_connections(&self) {
        self.resets.fetch_add(1, Ordering::SeqCst);
    }
}
