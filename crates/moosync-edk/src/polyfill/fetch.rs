//! A synchronous `fetch` over the host HTTP primitive.
//!
//! The host only reports a status code and a body, so response headers,
//! redirects and streaming are not available. `Response::headers` echoes
//! the headers that were sent.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;

use crate::bridge::{HostBridge, HttpRequest};
use crate::error::{EdkError, Result};

// ─── Headers ────────────────────────────────────────────────────────────

/// Header map with case-insensitive names, iterated in name order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: BTreeMap<String, String>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.entries.insert(name.to_ascii_lowercase(), value.into());
    }

    /// Adds to an existing value, comma separated.
    pub fn append(&mut self, name: &str, value: &str) {
        self.entries
            .entry(name.to_ascii_lowercase())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }

    pub fn has(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_ascii_lowercase())
    }

    pub fn delete(&mut self, name: &str) {
        self.entries.remove(&name.to_ascii_lowercase());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.set(name.as_ref(), value);
        }
        headers
    }
}

// ─── Request ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct RequestInit {
    /// Defaults to `GET`.
    pub method: Option<String>,
    pub headers: Headers,
    pub body: Option<Vec<u8>>,
}

impl RequestInit {
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Perform an HTTP request through the host.
///
/// Fails with [`EdkError::HttpStatus`] when the host answers with a
/// non-2xx status.
pub fn fetch(bridge: &dyn HostBridge, url: &str, init: RequestInit) -> Result<Response> {
    url::Url::parse(url)?;

    let method = init
        .method
        .as_deref()
        .map(str::to_ascii_uppercase)
        .unwrap_or_else(|| "GET".to_string());
    let request = HttpRequest {
        url: url.to_string(),
        method,
        headers: init
            .headers
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        body: init.body,
    };

    tracing::debug!(method = %request.method, url = %request.url, "fetch");
    let reply = bridge.http_request(&request)?;

    let response = Response::from_parts(url, reply.status, reply.body, init.headers);
    if !response.ok() {
        return Err(EdkError::HttpStatus {
            status: response.status,
            body: response.text(),
        });
    }
    Ok(response)
}

// ─── Response ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    url: String,
    status: u16,
    body: Vec<u8>,
    headers: Headers,
}

impl Response {
    /// Wrap a reply without checking its status.
    pub fn from_parts(
        url: impl Into<String>,
        status: u16,
        body: impl Into<Vec<u8>>,
        headers: Headers,
    ) -> Self {
        Self {
            url: url.into(),
            status,
            body: body.into(),
            headers,
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Body as UTF-8, with invalid sequences replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    /// The request headers; the host does not report response headers.
    pub fn headers(&self) -> &Headers {
        tracing::debug!(url = %self.url, "response headers are the request headers");
        &self.headers
    }

    /// The body for failed responses, `OK` otherwise.
    pub fn status_text(&self) -> String {
        if self.ok() {
            "OK".to_string()
        } else {
            self.text()
        }
    }

    pub fn redirected(&self) -> bool {
        false
    }
}
