//! Host bridge: the primitives the host exposes to a guest extension.
//!
//! Everything above this module talks to the host through [`HostBridge`].
//! Inside the WASM sandbox the implementation is [`ExtismHost`], which calls
//! the host functions Moosync registers in the `extism:host/user` namespace;
//! native builds plug in a scripted host for tests.

use std::collections::BTreeMap;

use crate::error::Result;

// ─── HTTP ───────────────────────────────────────────────────────────────

/// An outgoing HTTP request handed to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub method: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: "GET".to_string(),
            headers: BTreeMap::new(),
            body: None,
        }
    }
}

/// What the host returns for an HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

// ─── Bridge trait ───────────────────────────────────────────────────────

/// Host primitives available to an extension.
pub trait HostBridge {
    /// Send a serialized command envelope; returns the host's JSON reply.
    fn send_main_command(&self, envelope: &str) -> Result<String>;

    /// Open a client socket at `path`. Negative values signal failure.
    fn open_clientfd(&self, path: &str) -> Result<i64>;

    /// Write `buf` to a socket; returns the host's status/byte count.
    fn write_sock(&self, sock_id: i64, buf: &[u8]) -> Result<i64>;

    /// Read up to `read_len` bytes from a socket.
    fn read_sock(&self, sock_id: i64, read_len: u64) -> Result<Vec<u8>>;

    /// Digest `data` with the named algorithm (`SHA-1`, `SHA-256`, `SHA-512`).
    fn hash(&self, algorithm: &str, data: &[u8]) -> Result<Vec<u8>>;

    fn http_request(&self, request: &HttpRequest) -> Result<HttpResponse>;

    /// Seconds since the Unix epoch, as seen by the host.
    fn system_time(&self) -> Result<u64>;

    /// Read a plugin config value set by the host.
    fn config(&self, key: &str) -> Result<Option<String>>;
}

// ─── Extism guest implementation ────────────────────────────────────────

#[cfg(target_arch = "wasm32")]
mod host {
    use extism_pdk::host_fn;

    #[host_fn]
    extern "ExtismHost" {
        pub fn send_main_command(command: String) -> String;
        pub fn system_time() -> u64;
        pub fn open_clientfd(path: String) -> i64;
        pub fn write_sock(sock_id: i64, buf: Vec<u8>) -> i64;
        pub fn read_sock(sock_id: i64, read_len: u64) -> Vec<u8>;
        pub fn hash(hash_type: String, data: Vec<u8>) -> Vec<u8>;
    }
}

/// The real host, reached through Extism host functions.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtismHost;

#[cfg(target_arch = "wasm32")]
impl HostBridge for ExtismHost {
    fn send_main_command(&self, envelope: &str) -> Result<String> {
        Ok(unsafe { host::send_main_command(envelope.to_string())? })
    }

    fn open_clientfd(&self, path: &str) -> Result<i64> {
        Ok(unsafe { host::open_clientfd(path.to_string())? })
    }

    fn write_sock(&self, sock_id: i64, buf: &[u8]) -> Result<i64> {
        Ok(unsafe { host::write_sock(sock_id, buf.to_vec())? })
    }

    fn read_sock(&self, sock_id: i64, read_len: u64) -> Result<Vec<u8>> {
        Ok(unsafe { host::read_sock(sock_id, read_len)? })
    }

    fn hash(&self, algorithm: &str, data: &[u8]) -> Result<Vec<u8>> {
        Ok(unsafe { host::hash(algorithm.to_string(), data.to_vec())? })
    }

    fn http_request(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let mut req = extism_pdk::HttpRequest::new(&request.url).with_method(&request.method);
        for (name, value) in &request.headers {
            req = req.with_header(name, value);
        }
        let res = extism_pdk::http::request::<Vec<u8>>(&req, request.body.clone())?;
        Ok(HttpResponse {
            status: res.status_code(),
            body: res.body(),
        })
    }

    fn system_time(&self) -> Result<u64> {
        Ok(unsafe { host::system_time()? })
    }

    fn config(&self, key: &str) -> Result<Option<String>> {
        Ok(extism_pdk::config::get(key)?)
    }
}
