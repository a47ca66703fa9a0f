//! Purpose: Report every invalid-item recovery decision to registered listeners.
//! Exports: `Notifier`, `Listener`, `Event`, `Action`, `ErasedValue`.
//! Role: Observability seam for diagnostics and tests; decoding never depends on it.
//! Invariants: Listeners run synchronously, in registration order, once per event.
//! Invariants: Delivery iterates a snapshot, so listeners may (de)register while it runs.
//! Invariants: A poisoned registry lock is recovered; a listener panic never wedges the bus.

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, Weak};

use crate::core::error::DecodingError;
use crate::core::policy::{InvalidItemBehaviour, InvalidItemLocation};

type Handler = Arc<dyn Fn(&Event) + Send + Sync>;

/// One terminal recovery decision for one invalid item.
#[derive(Clone, Debug)]
pub struct Event {
    pub action: Action,
    pub location: InvalidItemLocation,
    pub behaviour: InvalidItemBehaviour<ErasedValue>,
    pub error: DecodingError,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    Removed,
    ChangedValue(ErasedValue),
    Failed,
}

/// A substituted item with its concrete type hidden.
///
/// Equality compares `Debug` renderings, so `ErasedValue::new("a".to_string())`
/// equals any other erased `String` holding `"a"`.
#[derive(Clone)]
pub struct ErasedValue {
    value: Arc<dyn Any + Send + Sync>,
    rendered: String,
}

impl ErasedValue {
    pub fn new<T>(value: T) -> Self
    where
        T: Any + Send + Sync + fmt::Debug,
    {
        let rendered = format!("{value:?}");
        Self {
            value: Arc::new(value),
            rendered,
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    pub fn rendered(&self) -> &str {
        &self.rendered
    }
}

impl PartialEq for ErasedValue {
    fn eq(&self, other: &Self) -> bool {
        self.rendered == other.rendered
    }
}

impl fmt::Debug for ErasedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered)
    }
}

impl fmt::Display for ErasedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered)
    }
}

struct Registry {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(u64, Handler)>>,
}

impl Registry {
    fn lock(&self) -> MutexGuard<'_, Vec<(u64, Handler)>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn remove(&self, id: u64) {
        let mut listeners = self.lock();
        if let Some(position) = listeners.iter().position(|(candidate, _)| *candidate == id) {
            listeners.remove(position);
            tracing::trace!(listener = id, "invalid-item listener removed");
        }
    }
}

/// Shared listener registry; clones point at the same registry.
#[derive(Clone)]
pub struct Notifier {
    registry: Arc<Registry>,
}

impl Notifier {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Registry {
                next_id: AtomicU64::new(1),
                listeners: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Process-wide registry used by decoders built with default options.
    pub fn global() -> &'static Notifier {
        static GLOBAL: OnceLock<Notifier> = OnceLock::new();
        GLOBAL.get_or_init(Notifier::new)
    }

    pub fn add_listener<F>(&self, handler: F) -> Listener
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        self.registry.lock().push((id, Arc::new(handler)));
        tracing::trace!(listener = id, "invalid-item listener added");
        Listener {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Same effect as `Listener::stop_listening`; handles from another registry are ignored.
    pub fn remove_listener(&self, listener: &Listener) {
        if std::ptr::eq(listener.registry.as_ptr(), Arc::as_ptr(&self.registry)) {
            self.registry.remove(listener.id);
        }
    }

    pub fn clear_listeners(&self) {
        let removed = {
            let mut listeners = self.registry.lock();
            let removed = listeners.len();
            listeners.clear();
            removed
        };
        tracing::trace!(removed, "invalid-item listeners cleared");
    }

    pub fn listener_count(&self) -> usize {
        self.registry.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listener_count() == 0
    }

    pub fn same_registry(&self, other: &Notifier) -> bool {
        Arc::ptr_eq(&self.registry, &other.registry)
    }

    pub fn emit(&self, event: &Event) {
        for handler in self.snapshot() {
            handler(event);
        }
    }

    /// Builds the event only when someone is listening.
    pub(crate) fn emit_with(&self, build: impl FnOnce() -> Event) {
        let handlers = self.snapshot();
        if handlers.is_empty() {
            return;
        }
        let event = build();
        for handler in handlers {
            handler(&event);
        }
    }

    fn snapshot(&self) -> Vec<Handler> {
        self.registry
            .lock()
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Registration handle returned by `Notifier::add_listener`.
///
/// Dropping the handle keeps the listener registered.
#[derive(Debug)]
pub struct Listener {
    id: u64,
    registry: Weak<Registry>,
}

impl Listener {
    pub fn stop_listening(&self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }
    }
}
