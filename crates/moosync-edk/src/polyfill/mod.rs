//! Browser-style helpers for extension code: base64, digests, fetch and
//! DOM events.

pub mod base64;
pub mod crypto;
pub mod event;
pub mod fetch;

pub use self::base64::{atob, btoa};
pub use self::crypto::{digest, DigestAlgorithm};
pub use self::event::{
    AddEventListenerOptions, Callback, CustomEvent, Event, EventInit, EventListener, EventTarget,
    TargetId,
};
pub use self::fetch::{fetch, Headers, RequestInit, Response};
