//! End-to-end tests for the client over a real socket.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use rstest::{fixture, rstest};

use crate::error::ErrorCode;
use crate::log_record::LogRecord;

use super::{CompressType, ContentType, LogBatch, LogClient, LogClientBuilder, QueryLogsRequest};

#[derive(Debug)]
struct CapturedRequest {
    method: String,
    path: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl CapturedRequest {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// What the mock server does with each accepted connection.
enum Reply {
    Respond {
        status: u16,
        request_id: Option<&'static str>,
        body: &'static str,
    },
    /// Read the request and close the socket without answering.
    Hangup,
}

fn ok(request_id: &'static str) -> Reply {
    Reply::Respond {
        status: 200,
        request_id: Some(request_id),
        body: "",
    }
}

fn status_text(code: u16) -> &'static str {
    match code {
        200 => "OK",
        400 => "Bad Request",
        401 => "Unauthorized",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

fn parse_header_line(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    line.split_once(':')
        .map(|(key, value)| (key.trim().to_lowercase(), value.trim().to_string()))
}

fn read_http_request(stream: &mut TcpStream) -> CapturedRequest {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));

    let mut request_line = String::new();
    reader
        .read_line(&mut request_line)
        .expect("read request line");
    let parts: Vec<&str> = request_line.trim().split(' ').collect();
    let method = parts.first().unwrap_or(&"").to_string();
    let path = parts.get(1).unwrap_or(&"").to_string();

    let mut headers = Vec::new();
    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).expect("read header");
        if line.trim().is_empty() {
            break;
        }
        let Some((key, value)) = parse_header_line(&line) else {
            continue;
        };
        if key == "content-length" {
            content_length = value.parse().unwrap_or(0);
        }
        headers.push((key, value));
    }

    let mut body = vec![0u8; content_length];
    if content_length > 0 {
        reader.read_exact(&mut body).expect("read body");
    }
    CapturedRequest {
        method,
        path,
        headers,
        body,
    }
}

fn spawn_server(
    listener: TcpListener,
    replies: Vec<Reply>,
) -> (SocketAddr, mpsc::Receiver<CapturedRequest>) {
    let addr = listener.local_addr().expect("listener has address");
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        for reply in replies {
            let Ok((mut stream, _)) = listener.accept() else {
                break;
            };
            let captured = read_http_request(&mut stream);
            if let Reply::Respond {
                status,
                request_id,
                body,
            } = reply
            {
                let id_header = request_id
                    .map(|id| format!("x-log-requestid: {id}\r\n"))
                    .unwrap_or_default();
                let response = format!(
                    "HTTP/1.1 {status} {}\r\nContent-Length: {}\r\nConnection: close\r\n{id_header}\r\n{body}",
                    status_text(status),
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes());
            }
            drop(stream);
            let _ = tx.send(captured);
        }
    });

    (addr, rx)
}

#[fixture]
fn tcp_listener() -> TcpListener {
    TcpListener::bind(("127.0.0.1", 0)).expect("bind ephemeral listener")
}

fn client_for(addr: SocketAddr) -> LogClient {
    LogClientBuilder::new(format!("http://{addr}"), "secret")
        .with_source_ip("10.0.0.7")
        .with_connect_timeout_ms(5_000)
        .with_write_timeout_ms(5_000)
        .build()
        .expect("build client")
}

fn json_batch() -> LogBatch {
    LogBatch::new("app")
        .with_topic("t1")
        .with_content_type(ContentType::Json)
        .with_compress_type(CompressType::None)
        .with_record(LogRecord::new(1000).with("a", "1"))
}

fn expect_no_more(rx: &mpsc::Receiver<CapturedRequest>) {
    assert!(
        rx.recv_timeout(Duration::from_millis(300)).is_err(),
        "unexpected extra request"
    );
}

#[rstest]
fn put_logs_sends_signed_json(tcp_listener: TcpListener) {
    let (addr, rx) = spawn_server(tcp_listener, vec![ok("r1")]);
    let client = client_for(addr);

    let response = client.put_logs(&json_batch()).expect("put succeeds");
    assert_eq!(response.request_id(), "r1");

    let captured = rx.recv_timeout(Duration::from_secs(5)).expect("request");
    assert_eq!(captured.method, "POST");
    assert_eq!(captured.path, "/logstores/app/shards/lb");
    assert_eq!(
        String::from_utf8(captured.body.clone()).expect("utf-8"),
        r#"{"__topic__":"t1","__source__":"10.0.0.7","__logs__":[{"__time__":1000,"a":"1"}]}"#
    );
    assert_eq!(captured.header("content-type"), Some("application/json"));
    assert_eq!(captured.header("x-log-apiversion"), Some("0.6.0"));
    assert_eq!(captured.header("x-log-signaturemethod"), Some("hmac-sha1"));
    assert_eq!(
        captured.header("x-log-bodyrawsize"),
        Some(captured.body.len().to_string().as_str())
    );
    assert!(captured.header("x-log-compresstype").is_none());
    assert_eq!(captured.header("content-md5").map(str::len), Some(32));
    assert!(captured.header("date").is_some_and(|d| d.ends_with("GMT")));
    assert!(
        captured
            .header("authorization")
            .is_some_and(|auth| auth.starts_with("LOG:"))
    );
}

#[rstest]
fn routed_put_uses_shard_key(tcp_listener: TcpListener) {
    let (addr, rx) = spawn_server(tcp_listener, vec![ok("r2")]);
    let client = client_for(addr);

    client
        .put_logs(&json_batch().with_shard_key("abc"))
        .expect("put succeeds");
    let captured = rx.recv_timeout(Duration::from_secs(5)).expect("request");
    assert_eq!(captured.path, "/logstores/app/shards/route?key=abc");
}

#[rstest]
fn server_rejection_is_not_retried(tcp_listener: TcpListener) {
    let replies = vec![
        Reply::Respond {
            status: 400,
            request_id: Some("r3"),
            body: r#"{"errorCode":"PostBodyInvalid","errorMessage":"bad body"}"#,
        },
        ok("unused"),
    ];
    let (addr, rx) = spawn_server(tcp_listener, replies);
    let client = client_for(addr);

    let err = client.put_logs(&json_batch()).expect_err("rejected");
    assert_eq!(err.code(), &ErrorCode::Server("PostBodyInvalid".into()));
    assert_eq!(err.message(), "bad body");
    assert_eq!(err.request_id(), "r3");

    rx.recv_timeout(Duration::from_secs(5)).expect("first request");
    expect_no_more(&rx);
}

#[rstest]
fn dropped_connection_is_retried_once(tcp_listener: TcpListener) {
    let (addr, rx) = spawn_server(tcp_listener, vec![Reply::Hangup, ok("r4")]);
    let client = client_for(addr);

    let response = client.put_logs(&json_batch()).expect("second attempt succeeds");
    assert_eq!(response.request_id(), "r4");

    let first = rx.recv_timeout(Duration::from_secs(5)).expect("first request");
    let second = rx.recv_timeout(Duration::from_secs(5)).expect("second request");
    assert_eq!(first.body, second.body);
    assert_eq!(first.path, second.path);
}

#[rstest]
fn retry_gives_up_after_two_attempts(tcp_listener: TcpListener) {
    let replies = vec![Reply::Hangup, Reply::Hangup, ok("unused")];
    let (addr, rx) = spawn_server(tcp_listener, replies);
    let client = client_for(addr);

    let err = client.put_logs(&json_batch()).expect_err("both attempts fail");
    assert_eq!(err.code(), &ErrorCode::RequestError);
    assert_eq!(err.request_id(), "");

    rx.recv_timeout(Duration::from_secs(5)).expect("first request");
    rx.recv_timeout(Duration::from_secs(5)).expect("second request");
    expect_no_more(&rx);
}

#[rstest]
fn query_decodes_entries(tcp_listener: TcpListener) {
    let replies = vec![Reply::Respond {
        status: 200,
        request_id: Some("q1"),
        body: r#"[{"__source__":"h","__time__":5,"k":"v"}]"#,
    }];
    let (addr, rx) = spawn_server(tcp_listener, replies);
    let client = client_for(addr);

    let request = QueryLogsRequest::new("app", 100, 200).with_query("status:500 AND *");
    let response = client.get_logs(&request).expect("query succeeds");
    assert_eq!(response.request_id(), "q1");
    assert_eq!(response.logs().len(), 1);
    assert_eq!(response.logs()[0].source, "h");
    assert_eq!(response.logs()[0].record.get("k"), Some("v"));

    let captured = rx.recv_timeout(Duration::from_secs(5)).expect("request");
    assert_eq!(captured.method, "GET");
    assert_eq!(
        captured.path,
        "/logstores/app?from=100&query=status%3A500+AND+*&to=200&type=log"
    );
    assert!(captured.header("content-md5").is_none());
}

#[rstest]
fn query_is_attempted_once(tcp_listener: TcpListener) {
    let (addr, rx) = spawn_server(tcp_listener, vec![Reply::Hangup, ok("unused")]);
    let client = client_for(addr);

    let err = client
        .get_logs(&QueryLogsRequest::new("app", 1, 2))
        .expect_err("query fails");
    assert_eq!(err.code(), &ErrorCode::RequestError);

    rx.recv_timeout(Duration::from_secs(5)).expect("first request");
    expect_no_more(&rx);
}
