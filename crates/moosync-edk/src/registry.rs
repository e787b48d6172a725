//! Event registry. Maps each extension event to its handler.
//!
//! Handlers are registered once while the extension is built and live for
//! the lifetime of the guest instance. A name maps to exactly one handler;
//! registering again replaces the previous one.

use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::rc::Rc;

use futures::future::{FutureExt, LocalBoxFuture};
use moosync_types::{EventName, ExtensionEvent, ProviderScope};
use serde_json::Value;

use crate::error::Result;

/// Future returned by a raw handler.
pub type HandlerFuture = LocalBoxFuture<'static, Result<Option<Value>>>;

/// An untyped handler: optional JSON input in, optional JSON output out.
pub type RawHandler = Rc<dyn Fn(Option<Value>) -> HandlerFuture>;

#[derive(Clone, Default)]
pub struct EventRegistry {
    handlers: BTreeMap<EventName, RawHandler>,
}

impl std::fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRegistry")
            .field("events", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an untyped handler for `name`, replacing any existing one.
    pub fn register<F, Fut>(&mut self, name: EventName, handler: F)
    where
        F: Fn(Option<Value>) -> Fut + 'static,
        Fut: Future<Output = Result<Option<Value>>> + 'static,
    {
        let raw: RawHandler =
            Rc::new(move |input: Option<Value>| -> HandlerFuture { handler(input).boxed_local() });
        self.insert(name, raw);
    }

    /// Register a typed handler for event `E`.
    ///
    /// The input is decoded into `E::Args` (a missing input decodes from
    /// `null`) and the output encoded from `E::Output`; an output that
    /// encodes to `null` is reported as no result.
    pub fn on<E, F, Fut>(&mut self, handler: F)
    where
        E: ExtensionEvent + 'static,
        F: Fn(E::Args) -> Fut + 'static,
        Fut: Future<Output = Result<E::Output>> + 'static,
    {
        let handler = Rc::new(handler);
        let raw: RawHandler = Rc::new(move |input: Option<Value>| -> HandlerFuture {
            let handler = Rc::clone(&handler);
            async move {
                let args: E::Args = serde_json::from_value(input.unwrap_or(Value::Null))?;
                let output = (*handler)(args).await?;
                Ok(match serde_json::to_value(output)? {
                    Value::Null => None,
                    value => Some(value),
                })
            }
            .boxed_local()
        });
        self.insert(E::NAME, raw);
    }

    fn insert(&mut self, name: EventName, handler: RawHandler) {
        let replaced = self.handlers.insert(name, handler).is_some();
        tracing::debug!(event = %name, replaced, "registered event handler");
    }

    pub fn contains(&self, name: EventName) -> bool {
        self.handlers.contains_key(&name)
    }

    /// Registered event names, in declaration order.
    pub fn events(&self) -> impl Iterator<Item = EventName> + '_ {
        self.handlers.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Distinct scopes implied by the registered events, in declaration order.
    pub fn provider_scopes(&self) -> Vec<ProviderScope> {
        self.events()
            .filter_map(EventName::scope)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Run the handler for `name`.
    ///
    /// Unregistered events resolve to `Ok(None)`. `getProviderScopes`
    /// without an explicit handler answers with [`provider_scopes`] when at
    /// least one scope-bearing event is registered.
    ///
    /// [`provider_scopes`]: EventRegistry::provider_scopes
    pub async fn invoke(&self, name: EventName, input: Option<Value>) -> Result<Option<Value>> {
        if let Some(handler) = self.handlers.get(&name) {
            let handler = Rc::clone(handler);
            return handler(input).await;
        }

        if name == EventName::GetProviderScopes {
            let scopes = self.provider_scopes();
            if !scopes.is_empty() {
                return Ok(Some(serde_json::to_value(scopes)?));
            }
        }

        tracing::debug!(event = %name, "no handler registered, ignoring");
        Ok(None)
    }
}
