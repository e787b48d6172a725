//! In-memory host for exercising extensions outside the WASM sandbox.
//!
//! `MockHost` answers commands from per-command scripted replies, records
//! every envelope it receives, and fakes sockets, hashing, HTTP and plugin
//! config.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};

use moosync_types::MainCommand;
use serde_json::Value;
use sha2::{Digest, Sha256, Sha512};

use crate::bridge::{HostBridge, HttpRequest, HttpResponse};
use crate::error::{EdkError, Result};

#[derive(Debug, Default)]
struct FakeSocket {
    incoming: VecDeque<u8>,
    written: Vec<u8>,
}

/// A scripted stand-in for the Moosync host.
#[derive(Debug, Default)]
pub struct MockHost {
    replies: RefCell<HashMap<String, VecDeque<String>>>,
    sent: RefCell<Vec<String>>,
    socket_paths: RefCell<HashMap<String, Vec<u8>>>,
    sockets: RefCell<HashMap<i64, FakeSocket>>,
    next_socket: Cell<i64>,
    http_replies: RefCell<HashMap<String, HttpResponse>>,
    http_requests: RefCell<Vec<HttpRequest>>,
    config: RefCell<HashMap<String, String>>,
    time: Cell<u64>,
}

impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Scripting ─────────────────────────────────────────────────────

    /// Queue a raw reply for the command with envelope key `tag`.
    ///
    /// Replies are consumed in order; the last one keeps answering.
    /// Unscripted commands get `null`.
    pub fn respond_raw(&self, tag: &str, reply: impl Into<String>) {
        self.replies
            .borrow_mut()
            .entry(tag.to_string())
            .or_default()
            .push_back(reply.into());
    }

    /// Queue a JSON reply for the command with envelope key `tag`.
    pub fn respond(&self, tag: &str, reply: Value) {
        self.respond_raw(tag, reply.to_string());
    }

    /// Accept socket connections to `path`, serving `incoming` to readers.
    pub fn listen(&self, path: &str, incoming: &[u8]) {
        self.socket_paths
            .borrow_mut()
            .insert(path.to_string(), incoming.to_vec());
    }

    /// Answer HTTP requests to `url` with `status` and `body`.
    pub fn respond_http(&self, url: &str, status: u16, body: impl Into<Vec<u8>>) {
        self.http_replies.borrow_mut().insert(
            url.to_string(),
            HttpResponse {
                status,
                body: body.into(),
            },
        );
    }

    pub fn set_config(&self, key: &str, value: &str) {
        self.config
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    pub fn with_config(self, key: &str, value: &str) -> Self {
        self.set_config(key, value);
        self
    }

    pub fn set_time(&self, secs: u64) {
        self.time.set(secs);
    }

    // ── Inspection ────────────────────────────────────────────────────

    /// Every envelope received, oldest first.
    pub fn sent(&self) -> Vec<String> {
        self.sent.borrow().clone()
    }

    /// Received envelopes decoded back into commands.
    pub fn sent_commands(&self) -> Vec<MainCommand> {
        self.sent
            .borrow()
            .iter()
            .filter_map(|e| serde_json::from_str(e).ok())
            .collect()
    }

    pub fn last_sent(&self) -> Option<Value> {
        self.sent
            .borrow()
            .last()
            .and_then(|e| serde_json::from_str(e).ok())
    }

    /// Bytes written to the socket with id `sock_id`.
    pub fn written(&self, sock_id: i64) -> Vec<u8> {
        self.sockets
            .borrow()
            .get(&sock_id)
            .map(|s| s.written.clone())
            .unwrap_or_default()
    }

    pub fn http_requests(&self) -> Vec<HttpRequest> {
        self.http_requests.borrow().clone()
    }
}

fn envelope_tag(envelope: &str) -> Result<String> {
    let value: Value = serde_json::from_str(envelope)?;
    value
        .as_object()
        .filter(|obj| obj.len() == 1)
        .and_then(|obj| obj.keys().next().cloned())
        .ok_or_else(|| EdkError::Host(format!("malformed envelope: {envelope}")))
}

impl HostBridge for MockHost {
    fn send_main_command(&self, envelope: &str) -> Result<String> {
        let tag = envelope_tag(envelope)?;
        self.sent.borrow_mut().push(envelope.to_string());

        let mut replies = self.replies.borrow_mut();
        let reply = match replies.get_mut(&tag) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        Ok(reply.unwrap_or_else(|| "null".to_string()))
    }

    fn open_clientfd(&self, path: &str) -> Result<i64> {
        let Some(incoming) = self.socket_paths.borrow().get(path).cloned() else {
            return Ok(-1);
        };
        let id = self.next_socket.get() + 1;
        self.next_socket.set(id);
        self.sockets.borrow_mut().insert(
            id,
            FakeSocket {
                incoming: incoming.into(),
                written: Vec::new(),
            },
        );
        Ok(id)
    }

    fn write_sock(&self, sock_id: i64, buf: &[u8]) -> Result<i64> {
        match self.sockets.borrow_mut().get_mut(&sock_id) {
            Some(socket) => {
                socket.written.extend_from_slice(buf);
                Ok(buf.len() as i64)
            }
            None => Ok(-1),
        }
    }

    fn read_sock(&self, sock_id: i64, read_len: u64) -> Result<Vec<u8>> {
        let mut sockets = self.sockets.borrow_mut();
        let socket = sockets
            .get_mut(&sock_id)
            .ok_or_else(|| EdkError::Host(format!("unknown socket {sock_id}")))?;
        let n = (read_len as usize).min(socket.incoming.len());
        Ok(socket.incoming.drain(..n).collect())
    }

    fn hash(&self, algorithm: &str, data: &[u8]) -> Result<Vec<u8>> {
        match algorithm {
            "SHA-256" => Ok(Sha256::digest(data).to_vec()),
            "SHA-512" => Ok(Sha512::digest(data).to_vec()),
            other => Err(EdkError::Host(format!("mock host cannot hash {other}"))),
        }
    }

    fn http_request(&self, request: &HttpRequest) -> Result<HttpResponse> {
        self.http_requests.borrow_mut().push(request.clone());
        Ok(self
            .http_replies
            .borrow()
            .get(&request.url)
            .cloned()
            .unwrap_or(HttpResponse {
                status: 404,
                body: b"not found".to_vec(),
            }))
    }

    fn system_time(&self) -> Result<u64> {
        Ok(self.time.get())
    }

    fn config(&self, key: &str) -> Result<Option<String>> {
        Ok(self.config.borrow().get(key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unscripted_command_answers_null() {
        let host = MockHost::new();
        let reply = host.send_main_command(r#"{"GetVolume":[]}"#).unwrap();
        assert_eq!(reply, "null");
        assert_eq!(host.sent(), vec![r#"{"GetVolume":[]}"#.to_string()]);
    }

    #[test]
    fn test_replies_consumed_in_order_last_sticks() {
        let host = MockHost::new();
        host.respond("GetTime", json!(1.0));
        host.respond("GetTime", json!(2.0));
        let env = r#"{"GetTime":[]}"#;
        assert_eq!(host.send_main_command(env).unwrap(), "1.0");
        assert_eq!(host.send_main_command(env).unwrap(), "2.0");
        assert_eq!(host.send_main_command(env).unwrap(), "2.0");
    }

    #[test]
    fn test_rejects_multi_key_envelope() {
        let host = MockHost::new();
        assert!(host.send_main_command(r#"{"A":[],"B":[]}"#).is_err());
        assert!(host.sent().is_empty());
    }

    #[test]
    fn test_socket_round_trip() {
        let host = MockHost::new();
        host.listen("/tmp/sock", b"hello world");
        assert_eq!(host.open_clientfd("/nope").unwrap(), -1);

        let id = host.open_clientfd("/tmp/sock").unwrap();
        assert!(id > 0);
        assert_eq!(host.read_sock(id, 5).unwrap(), b"hello");
        assert_eq!(host.read_sock(id, 100).unwrap(), b" world");
        assert_eq!(host.write_sock(id, b"ping").unwrap(), 4);
        assert_eq!(host.written(id), b"ping");
    }

    #[test]
    fn test_hash_sha256() {
        let host = MockHost::new();
        let digest = host.hash("SHA-256", b"abc").unwrap();
        assert_eq!(digest.len(), 32);
        assert_eq!(digest[..4], [0xba, 0x78, 0x16, 0xbf]);
        assert!(host.hash("MD5", b"abc").is_err());
    }
}
