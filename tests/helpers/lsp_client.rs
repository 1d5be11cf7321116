//! LSP client for E2E tests.
//!
//! Provides a simple LSP client that communicates with the rustfmt-ls binary
//! via stdin/stdout using JSON-RPC 2.0 protocol.

// These methods are shared across multiple test binaries but not all tests use every method.
#![allow(dead_code)]

use serde_json::{Value, json};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{Duration, Instant};

const TIMEOUT: Duration = Duration::from_secs(30);

/// LSP client for communicating with the rustfmt-ls binary.
///
/// Handles JSON-RPC 2.0 message framing with Content-Length headers and
/// request/response matching. Server-initiated requests are answered
/// automatically (`workspace/applyEdit` is accepted); they and all
/// notifications are kept for later inspection.
pub struct LspClient {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: BufReader<ChildStdout>,
    request_id: i64,
    /// Server notifications seen so far
    notifications: Vec<Value>,
    /// Server-to-client requests seen so far
    server_requests: Vec<Value>,
    /// Value of `applied` returned for `workspace/applyEdit`
    apply_edits: bool,
}

impl LspClient {
    /// Spawn rustfmt-ls with `config_home` as its XDG config directory.
    pub fn new(config_home: &Path) -> Self {
        // `CARGO_BIN_EXE_rustfmt-ls` is set by Cargo's test harness for integration tests.
        let mut child = Command::new(env!("CARGO_BIN_EXE_rustfmt-ls"))
            .env("XDG_CONFIG_HOME", config_home)
            .env_remove("RUSTUP_TOOLCHAIN")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .expect("Failed to spawn rustfmt-ls binary");

        let stdin = child.stdin.take().expect("Failed to get stdin");
        let stdout = BufReader::new(child.stdout.take().expect("Failed to get stdout"));

        Self {
            child,
            stdin: Some(stdin),
            stdout,
            request_id: 0,
            notifications: Vec::new(),
            server_requests: Vec::new(),
            apply_edits: true,
        }
    }

    /// Answer future `workspace/applyEdit` requests with `applied: false`.
    pub fn decline_edits(&mut self) {
        self.apply_edits = false;
    }

    /// Send `initialize` followed by `initialized`.
    pub fn initialize(&mut self, params: Value) -> Value {
        let response = self.send_request("initialize", params);
        self.send_notification("initialized", json!({}));
        response
    }

    /// Send an LSP request and return the response.
    pub fn send_request(&mut self, method: &str, params: Value) -> Value {
        let request_id = self.send_request_async(method, params);
        self.receive_response_for_id(request_id)
    }

    /// Send an LSP request without waiting for the response.
    pub fn send_request_async(&mut self, method: &str, params: Value) -> i64 {
        self.request_id += 1;
        let request_id = self.request_id;

        let mut request = serde_json::Map::new();
        request.insert("jsonrpc".to_string(), json!("2.0"));
        request.insert("id".to_string(), json!(request_id));
        request.insert("method".to_string(), json!(method));
        if !params.is_null() {
            request.insert("params".to_string(), params);
        }

        self.send_message(&Value::Object(request));
        request_id
    }

    /// Send an LSP notification (no response expected).
    pub fn send_notification(&mut self, method: &str, params: Value) {
        let mut notification = serde_json::Map::new();
        notification.insert("jsonrpc".to_string(), json!("2.0"));
        notification.insert("method".to_string(), json!(method));
        if !params.is_null() {
            notification.insert("params".to_string(), params);
        }

        self.send_message(&Value::Object(notification));
    }

    /// Notifications with the given method received so far.
    pub fn notifications(&self, method: &str) -> Vec<Value> {
        self.notifications
            .iter()
            .filter(|n| n["method"] == method)
            .map(|n| n["params"].clone())
            .collect()
    }

    /// Server requests with the given method received so far.
    pub fn server_requests(&self, method: &str) -> Vec<Value> {
        self.server_requests
            .iter()
            .filter(|r| r["method"] == method)
            .map(|r| r["params"].clone())
            .collect()
    }

    /// Wait until a notification with `method` matching `predicate` arrives.
    pub fn wait_for_notification(
        &mut self,
        method: &str,
        predicate: impl Fn(&Value) -> bool,
    ) -> Value {
        let start = Instant::now();
        let mut seen = 0;
        loop {
            if let Some(found) = self.notifications[seen..]
                .iter()
                .find(|n| n["method"] == method && predicate(&n["params"]))
            {
                return found["params"].clone();
            }
            seen = self.notifications.len();
            if start.elapsed() > TIMEOUT {
                panic!("Timeout waiting for {} notification", method);
            }
            let message = self.receive_message();
            self.dispatch(message);
        }
    }

    fn send_message(&mut self, message: &Value) {
        let body = serde_json::to_string(message).expect("Failed to serialize message");
        let header = format!("Content-Length: {}\r\n\r\n", body.len());

        let stdin = self.stdin.as_mut().expect("stdin already closed");
        stdin
            .write_all(header.as_bytes())
            .expect("Failed to write header");
        stdin
            .write_all(body.as_bytes())
            .expect("Failed to write body");
        stdin.flush().expect("Failed to flush stdin");
    }

    /// Receive the response for `expected_id`, handling everything else on the way.
    pub fn receive_response_for_id(&mut self, expected_id: i64) -> Value {
        let start = Instant::now();
        loop {
            if start.elapsed() > TIMEOUT {
                panic!("Timeout waiting for response with id {}", expected_id);
            }
            let message = self.receive_message();
            if message.get("method").is_none() && message["id"].as_i64() == Some(expected_id) {
                return message;
            }
            self.dispatch(message);
        }
    }

    /// Record a non-response message, answering server requests.
    fn dispatch(&mut self, message: Value) {
        let Some(method) = message.get("method").and_then(Value::as_str) else {
            return;
        };
        match message.get("id") {
            Some(id) => {
                let result = match method {
                    "workspace/applyEdit" => json!({ "applied": self.apply_edits }),
                    _ => Value::Null,
                };
                let response = json!({ "jsonrpc": "2.0", "id": id.clone(), "result": result });
                self.send_message(&response);
                self.server_requests.push(message);
            }
            None => self.notifications.push(message),
        }
    }

    /// Receive a single LSP message with Content-Length framing.
    fn receive_message(&mut self) -> Value {
        const MAX_HEADERS: u32 = 100;

        let mut header = String::new();
        let mut header_count = 0u32;
        loop {
            if header_count >= MAX_HEADERS {
                panic!("Exceeded maximum header count ({})", MAX_HEADERS);
            }

            header.clear();
            let bytes_read = self
                .stdout
                .read_line(&mut header)
                .expect("Failed to read header line");
            if bytes_read == 0 {
                panic!("Server closed connection prematurely while reading header");
            }
            header_count += 1;

            if let Some(len) = header.strip_prefix("Content-Length:") {
                let len: usize = len.trim().parse().expect("Invalid Content-Length value");

                let mut empty = String::new();
                self.stdout
                    .read_line(&mut empty)
                    .expect("Failed to read empty line");

                let mut body = vec![0u8; len];
                std::io::Read::read_exact(&mut self.stdout, &mut body)
                    .expect("Failed to read body");
                return serde_json::from_slice(&body).expect("Failed to parse message");
            }
        }
    }

    /// Send `shutdown` and `exit`, then wait for the process to end.
    pub fn shutdown(&mut self) -> Option<std::process::ExitStatus> {
        let response = self.send_request("shutdown", Value::Null);
        assert!(response.get("error").is_none(), "shutdown failed: {}", response);
        self.send_notification("exit", Value::Null);
        self.stdin = None;
        self.wait_for_exit(Duration::from_secs(5))
    }

    /// Wait for the process to exit with a timeout.
    pub fn wait_for_exit(&mut self, timeout: Duration) -> Option<std::process::ExitStatus> {
        let start = Instant::now();
        loop {
            match self.child.try_wait() {
                Ok(Some(status)) => return Some(status),
                Ok(None) => {
                    if start.elapsed() > timeout {
                        return None;
                    }
                    std::thread::sleep(Duration::from_millis(50));
                }
                Err(_) => return None,
            }
        }
    }

    fn kill(&mut self) {
        if let Ok(Some(_)) = self.child.try_wait() {
            return;
        }
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

impl Drop for LspClient {
    fn drop(&mut self) {
        self.kill();
    }
}
