//! Minimal DOM `Event` / `EventTarget`.
//!
//! There is no tree: dispatch only reaches listeners on the target itself,
//! in registration order. Handlers may add or remove listeners on the same
//! target while a dispatch is running; listeners added mid-dispatch are not
//! called by that dispatch and removed ones are skipped.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

// ─── Event ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventInit {
    pub bubbles: bool,
    pub cancelable: bool,
    pub composed: bool,
}

/// Identity of an [`EventTarget`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetId(u64);

thread_local! {
    static NEXT_TARGET: Cell<u64> = const { Cell::new(1) };
}

pub struct Event {
    event_type: String,
    init: EventInit,
    time_stamp: u64,
    phase: Cell<u16>,
    current_target: Cell<Option<TargetId>>,
    canceled: Cell<bool>,
    stop_propagation: Cell<bool>,
    stop_immediate: Cell<bool>,
    in_passive_listener: Cell<bool>,
    detail: Option<Rc<dyn Any>>,
}

impl Event {
    pub const NONE: u16 = 0;
    pub const CAPTURING_PHASE: u16 = 1;
    pub const AT_TARGET: u16 = 2;
    pub const BUBBLING_PHASE: u16 = 3;

    pub fn new(event_type: impl Into<String>, init: EventInit) -> Self {
        Self::at(event_type, init, 0)
    }

    /// An event stamped with `time_stamp` milliseconds.
    pub fn at(event_type: impl Into<String>, init: EventInit, time_stamp: u64) -> Self {
        Self {
            event_type: event_type.into(),
            init,
            time_stamp,
            phase: Cell::new(Self::AT_TARGET),
            current_target: Cell::new(None),
            canceled: Cell::new(false),
            stop_propagation: Cell::new(false),
            stop_immediate: Cell::new(false),
            in_passive_listener: Cell::new(false),
            detail: None,
        }
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn bubbles(&self) -> bool {
        self.init.bubbles
    }

    pub fn cancelable(&self) -> bool {
        self.init.cancelable
    }

    pub fn composed(&self) -> bool {
        self.init.composed
    }

    pub fn event_phase(&self) -> u16 {
        self.phase.get()
    }

    pub fn current_target(&self) -> Option<TargetId> {
        self.current_target.get()
    }

    /// The current target, if any.
    pub fn composed_path(&self) -> Vec<TargetId> {
        self.current_target.get().into_iter().collect()
    }

    pub fn time_stamp(&self) -> u64 {
        self.time_stamp
    }

    /// Events built by extension code are never trusted.
    pub fn is_trusted(&self) -> bool {
        false
    }

    pub fn stop_propagation(&self) {
        self.stop_propagation.set(true);
    }

    pub fn propagation_stopped(&self) -> bool {
        self.stop_propagation.get()
    }

    pub fn stop_immediate_propagation(&self) {
        self.stop_propagation.set(true);
        self.stop_immediate.set(true);
    }

    pub fn prevent_default(&self) {
        if self.in_passive_listener.get() {
            tracing::error!(
                event = %self.event_type,
                "unable to preventDefault inside passive event listener invocation"
            );
            return;
        }
        if self.init.cancelable {
            self.canceled.set(true);
        }
    }

    pub fn default_prevented(&self) -> bool {
        self.canceled.get()
    }

    /// Payload of a [`CustomEvent`] carrying a `T`.
    pub fn detail<T: Any>(&self) -> Option<&T> {
        self.detail.as_deref()?.downcast_ref()
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("type", &self.event_type)
            .field("init", &self.init)
            .field("phase", &self.phase.get())
            .field("default_prevented", &self.canceled.get())
            .finish_non_exhaustive()
    }
}

/// An [`Event`] with a typed `detail` payload.
pub struct CustomEvent<T> {
    event: Event,
    detail: Rc<T>,
}

impl<T: Any> CustomEvent<T> {
    pub fn new(event_type: impl Into<String>, init: EventInit, detail: T) -> Self {
        let detail = Rc::new(detail);
        let mut event = Event::new(event_type, init);
        event.detail = Some(Rc::clone(&detail) as Rc<dyn Any>);
        Self { event, detail }
    }

    pub fn detail(&self) -> &T {
        &self.detail
    }
}

impl<T> Deref for CustomEvent<T> {
    type Target = Event;

    fn deref(&self) -> &Event {
        &self.event
    }
}

// ─── Listeners ──────────────────────────────────────────────────────────

/// Object-style listener, the `handleEvent` form.
pub trait EventListener {
    fn handle_event(&self, event: &Event);
}

#[derive(Clone)]
pub enum Callback {
    Function(Rc<dyn Fn(&Event)>),
    Object(Rc<dyn EventListener>),
}

impl Callback {
    pub fn function(f: impl Fn(&Event) + 'static) -> Self {
        Callback::Function(Rc::new(f))
    }

    pub fn object(listener: Rc<dyn EventListener>) -> Self {
        Callback::Object(listener)
    }

    fn addr(&self) -> *const () {
        match self {
            Callback::Function(f) => Rc::as_ptr(f) as *const (),
            Callback::Object(o) => Rc::as_ptr(o) as *const (),
        }
    }

    /// Same underlying function or object.
    pub fn same(&self, other: &Callback) -> bool {
        self.addr() == other.addr()
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callback::Function(_) => write!(f, "Function({:p})", self.addr()),
            Callback::Object(_) => write!(f, "Object({:p})", self.addr()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddEventListenerOptions {
    pub capture: bool,
    pub passive: bool,
    pub once: bool,
}

/// `true` means capture, as with the boolean form of `addEventListener`.
impl From<bool> for AddEventListenerOptions {
    fn from(capture: bool) -> Self {
        Self {
            capture,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListenerKind {
    Capture,
    Bubble,
    Attribute,
}

#[derive(Debug)]
struct ListenerNode {
    callback: Callback,
    kind: ListenerKind,
    passive: bool,
    once: bool,
    removed: Cell<bool>,
}

impl ListenerNode {
    fn matches(&self, callback: &Callback, capture: bool) -> bool {
        self.kind != ListenerKind::Attribute
            && (self.kind == ListenerKind::Capture) == capture
            && self.callback.same(callback)
    }
}

// ─── EventTarget ────────────────────────────────────────────────────────

pub struct EventTarget {
    id: TargetId,
    listeners: RefCell<HashMap<String, Vec<Rc<ListenerNode>>>>,
}

impl Default for EventTarget {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self.listeners.borrow();
        let mut types: Vec<_> = listeners.keys().collect();
        types.sort();
        f.debug_struct("EventTarget")
            .field("id", &self.id)
            .field("types", &types)
            .finish()
    }
}

impl EventTarget {
    pub fn new() -> Self {
        let id = NEXT_TARGET.with(|next| {
            let id = next.get();
            next.set(id + 1);
            id
        });
        Self {
            id: TargetId(id),
            listeners: RefCell::new(HashMap::new()),
        }
    }

    pub fn id(&self) -> TargetId {
        self.id
    }

    /// Registers `callback` unless the same callback is already registered
    /// with the same capture flag.
    pub fn add_event_listener(
        &self,
        event_type: &str,
        callback: Callback,
        options: impl Into<AddEventListenerOptions>,
    ) {
        let options = options.into();
        let mut listeners = self.listeners.borrow_mut();
        let list = listeners.entry(event_type.to_string()).or_default();
        if list.iter().any(|node| node.matches(&callback, options.capture)) {
            return;
        }
        list.push(Rc::new(ListenerNode {
            callback,
            kind: if options.capture {
                ListenerKind::Capture
            } else {
                ListenerKind::Bubble
            },
            passive: options.passive,
            once: options.once,
            removed: Cell::new(false),
        }));
    }

    pub fn remove_event_listener(
        &self,
        event_type: &str,
        callback: &Callback,
        options: impl Into<AddEventListenerOptions>,
    ) {
        let capture = options.into().capture;
        let mut listeners = self.listeners.borrow_mut();
        if let Some(list) = listeners.get_mut(event_type) {
            if let Some(pos) = list.iter().position(|node| node.matches(callback, capture)) {
                list.remove(pos).removed.set(true);
            }
        }
    }

    /// The `on<type>` handler, if set.
    pub fn event_handler(&self, event_type: &str) -> Option<Callback> {
        self.listeners
            .borrow()
            .get(event_type)?
            .iter()
            .find(|node| node.kind == ListenerKind::Attribute)
            .map(|node| node.callback.clone())
    }

    /// Replace the `on<type>` handler; `None` clears it. A new handler runs
    /// after every listener already registered.
    pub fn set_event_handler(&self, event_type: &str, callback: Option<Callback>) {
        let mut listeners = self.listeners.borrow_mut();
        let list = listeners.entry(event_type.to_string()).or_default();
        if let Some(pos) = list
            .iter()
            .position(|node| node.kind == ListenerKind::Attribute)
        {
            list.remove(pos).removed.set(true);
        }
        if let Some(callback) = callback {
            list.push(Rc::new(ListenerNode {
                callback,
                kind: ListenerKind::Attribute,
                passive: false,
                once: false,
                removed: Cell::new(false),
            }));
        }
    }

    pub fn listener_count(&self, event_type: &str) -> usize {
        self.listeners
            .borrow()
            .get(event_type)
            .map_or(0, Vec::len)
    }

    /// Run the listeners for `event`'s type. Returns `false` when a
    /// listener prevented the default action.
    pub fn dispatch_event(&self, event: &Event) -> bool {
        let snapshot: Vec<Rc<ListenerNode>> = self
            .listeners
            .borrow()
            .get(event.event_type())
            .cloned()
            .unwrap_or_default();

        event.current_target.set(Some(self.id));
        event.phase.set(Event::AT_TARGET);

        for node in snapshot {
            if node.removed.get() {
                continue;
            }
            if node.once {
                self.detach(event.event_type(), &node);
            }

            event.in_passive_listener.set(node.passive);
            match &node.callback {
                Callback::Function(f) => f(event),
                Callback::Object(listener) if node.kind != ListenerKind::Attribute => {
                    listener.handle_event(event)
                }
                Callback::Object(_) => {}
            }
            event.in_passive_listener.set(false);

            if event.stop_immediate.get() {
                break;
            }
        }

        event.phase.set(Event::NONE);
        !event.default_prevented()
    }

    fn detach(&self, event_type: &str, node: &Rc<ListenerNode>) {
        node.removed.set(true);
        if let Some(list) = self.listeners.borrow_mut().get_mut(event_type) {
            list.retain(|other| !Rc::ptr_eq(other, node));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Rc<RefCell<Vec<String>>>, impl Fn(&str) -> Callback) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let make = move |name: &str| {
            let sink = Rc::clone(&sink);
            let name = name.to_string();
            Callback::function(move |_| sink.borrow_mut().push(name.clone()))
        };
        (log, make)
    }

    fn cancelable() -> EventInit {
        EventInit {
            cancelable: true,
            ..EventInit::default()
        }
    }

    // ── Event ─────────────────────────────────────────────────────────

    #[test]
    fn test_new_event_defaults() {
        let event = Event::new("ping", EventInit::default());
        assert_eq!(event.event_type(), "ping");
        assert_eq!(event.event_phase(), Event::AT_TARGET);
        assert_eq!(event.time_stamp(), 0);
        assert!(!event.is_trusted());
        assert!(event.composed_path().is_empty());
        assert!(event.detail::<String>().is_none());
    }

    #[test]
    fn test_prevent_default_requires_cancelable() {
        let plain = Event::new("x", EventInit::default());
        plain.prevent_default();
        assert!(!plain.default_prevented());

        let event = Event::new("x", cancelable());
        event.prevent_default();
        assert!(event.default_prevented());
    }

    #[test]
    fn test_custom_event_detail() {
        let event = CustomEvent::new("song", EventInit::default(), vec![1u32, 2]);
        assert_eq!(event.detail(), &vec![1, 2]);
        assert_eq!(event.event_type(), "song");
        assert_eq!(Event::detail::<Vec<u32>>(&event), Some(&vec![1, 2]));
        assert!(Event::detail::<String>(&event).is_none());
    }

    // ── Dispatch ──────────────────────────────────────────────────────

    #[test]
    fn test_dispatch_in_registration_order() {
        let target = EventTarget::new();
        let (log, make) = recorder();
        target.add_event_listener("x", make("a"), false);
        target.add_event_listener("x", make("b"), true);
        target.add_event_listener("y", make("other"), false);

        let event = Event::new("x", EventInit::default());
        assert!(target.dispatch_event(&event));
        assert_eq!(*log.borrow(), vec!["a", "b"]);
        assert_eq!(event.event_phase(), Event::NONE);
        assert_eq!(event.composed_path(), vec![target.id()]);
    }

    #[test]
    fn test_duplicate_listener_ignored() {
        let target = EventTarget::new();
        let (log, make) = recorder();
        let cb = make("a");
        target.add_event_listener("x", cb.clone(), false);
        target.add_event_listener("x", cb.clone(), false);
        target.add_event_listener("x", cb.clone(), true);
        assert_eq!(target.listener_count("x"), 2);

        target.dispatch_event(&Event::new("x", EventInit::default()));
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn test_remove_listener() {
        let target = EventTarget::new();
        let (log, make) = recorder();
        let cb = make("a");
        target.add_event_listener("x", cb.clone(), false);
        target.remove_event_listener("x", &cb, true);
        assert_eq!(target.listener_count("x"), 1);
        target.remove_event_listener("x", &cb, false);
        assert_eq!(target.listener_count("x"), 0);

        target.dispatch_event(&Event::new("x", EventInit::default()));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_once_listener_runs_once() {
        let target = EventTarget::new();
        let (log, make) = recorder();
        let options = AddEventListenerOptions {
            once: true,
            ..AddEventListenerOptions::default()
        };
        target.add_event_listener("x", make("a"), options);

        target.dispatch_event(&Event::new("x", EventInit::default()));
        target.dispatch_event(&Event::new("x", EventInit::default()));
        assert_eq!(*log.borrow(), vec!["a"]);
        assert_eq!(target.listener_count("x"), 0);
    }

    #[test]
    fn test_stop_immediate_propagation() {
        let target = EventTarget::new();
        let (log, make) = recorder();
        target.add_event_listener(
            "x",
            Callback::function(|e: &Event| e.stop_immediate_propagation()),
            false,
        );
        target.add_event_listener("x", make("after"), false);

        let event = Event::new("x", EventInit::default());
        target.dispatch_event(&event);
        assert!(log.borrow().is_empty());
        assert!(event.propagation_stopped());
    }

    #[test]
    fn test_prevent_default_result() {
        let target = EventTarget::new();
        target.add_event_listener("x", Callback::function(|e: &Event| e.prevent_default()), false);

        assert!(!target.dispatch_event(&Event::new("x", cancelable())));
        assert!(target.dispatch_event(&Event::new("x", EventInit::default())));
    }

    #[test]
    fn test_passive_listener_cannot_prevent_default() {
        let target = EventTarget::new();
        let options = AddEventListenerOptions {
            passive: true,
            ..AddEventListenerOptions::default()
        };
        target.add_event_listener(
            "x",
            Callback::function(|e: &Event| e.prevent_default()),
            options,
        );

        let event = Event::new("x", cancelable());
        assert!(target.dispatch_event(&event));
        assert!(!event.default_prevented());
    }

    #[test]
    fn test_listener_removed_mid_dispatch_is_skipped() {
        let target = Rc::new(EventTarget::new());
        let (log, make) = recorder();
        let second = make("second");

        let t = Rc::clone(&target);
        let victim = second.clone();
        target.add_event_listener(
            "x",
            Callback::function(move |_| t.remove_event_listener("x", &victim, false)),
            false,
        );
        target.add_event_listener("x", second, false);

        target.dispatch_event(&Event::new("x", EventInit::default()));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_listener_added_mid_dispatch_waits() {
        let target = Rc::new(EventTarget::new());
        let (log, make) = recorder();
        let late = make("late");

        let t = Rc::clone(&target);
        target.add_event_listener(
            "x",
            Callback::function(move |_| t.add_event_listener("x", late.clone(), false)),
            false,
        );

        target.dispatch_event(&Event::new("x", EventInit::default()));
        assert!(log.borrow().is_empty());
        target.dispatch_event(&Event::new("x", EventInit::default()));
        assert_eq!(*log.borrow(), vec!["late"]);
    }

    // ── Handler objects and attributes ────────────────────────────────

    struct Counter(Cell<u32>);

    impl EventListener for Counter {
        fn handle_event(&self, _event: &Event) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn test_object_listener() {
        let target = EventTarget::new();
        let counter = Rc::new(Counter(Cell::new(0)));
        target.add_event_listener("x", Callback::object(counter.clone()), false);
        target.dispatch_event(&Event::new("x", EventInit::default()));
        assert_eq!(counter.0.get(), 1);
    }

    #[test]
    fn test_object_not_called_through_attribute() {
        let target = EventTarget::new();
        let counter = Rc::new(Counter(Cell::new(0)));
        target.set_event_handler("x", Some(Callback::object(counter.clone())));
        target.dispatch_event(&Event::new("x", EventInit::default()));
        assert_eq!(counter.0.get(), 0);
        assert!(target.event_handler("x").is_some());
    }

    #[test]
    fn test_event_handler_replace_and_clear() {
        let target = EventTarget::new();
        let (log, make) = recorder();
        let first = make("first");
        target.set_event_handler("x", Some(first.clone()));
        target.add_event_listener("x", make("listener"), false);
        target.set_event_handler("x", Some(make("second")));

        assert!(!target.event_handler("x").is_some_and(|h| h.same(&first)));
        target.dispatch_event(&Event::new("x", EventInit::default()));
        assert_eq!(*log.borrow(), vec!["listener", "second"]);

        target.set_event_handler("x", None);
        assert!(target.event_handler("x").is_none());
        assert_eq!(target.listener_count("x"), 1);
    }

    #[test]
    fn test_attribute_does_not_block_listener_removal() {
        let target = EventTarget::new();
        let (_, make) = recorder();
        let cb = make("a");
        target.set_event_handler("x", Some(cb.clone()));
        target.remove_event_listener("x", &cb, false);
        assert!(target.event_handler("x").is_some());
    }
}
