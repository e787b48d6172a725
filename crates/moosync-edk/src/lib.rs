//! Moosync Extension Development Kit
//!
//! Everything a Moosync extension compiled to WASM needs: typed calls back
//! into the host ([`Api`]), handler registration for host events
//! ([`ExtensionBuilder`]), the exported wrappers the host invokes, log
//! forwarding to the host log, and browser-style polyfills (fetch, base64,
//! digest, DOM events).
//!
//! An extension crate builds its handlers in a constructor and hands it to
//! [`extension!`]:
//!
//! ```ignore
//! use std::rc::Rc;
//! use moosync_edk::{Extension, HostBridge};
//!
//! fn build(host: Rc<dyn HostBridge>) -> Extension {
//!     Extension::builder("my-extension", host).build()
//! }
//!
//! moosync_edk::extension!(build);
//! ```

pub mod api;
pub mod bridge;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod logger;
pub mod logging;
pub mod polyfill;
pub mod registry;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

#[cfg(target_arch = "wasm32")]
pub mod exports;

pub use api::{Api, SocketHandle};
pub use bridge::{HostBridge, HttpRequest, HttpResponse};
pub use config::EdkConfig;
pub use dispatch::{Export, Extension, ExtensionBuilder};
pub use error::{EdkError, Result};
pub use logger::ExtensionLogger;
pub use registry::{EventRegistry, HandlerFuture, RawHandler};

pub use moosync_types as types;

#[cfg(target_arch = "wasm32")]
pub use bridge::ExtismHost;

/// Define the module's `entry` export from an extension constructor
/// `fn(Rc<dyn HostBridge>) -> Extension`.
///
/// Native builds expand to nothing, so the same crate can be unit tested
/// against a scripted host.
#[macro_export]
macro_rules! extension {
    ($ctor:path) => {
        #[cfg(target_arch = "wasm32")]
        #[no_mangle]
        pub extern "C" fn entry() -> i32 {
            $crate::exports::start($ctor)
        }
    };
}
