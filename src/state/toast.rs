//! Toast queue
//!
//! Toasts are transient messages that disappear on their own after a TTL
//! (5 seconds by default) or when dismissed. Each toast gets its own timer
//! task on the current Tokio runtime:
//! - dismissal removes the toast and aborts its timer
//! - a timer that fires for an already removed toast does nothing
//!
//! Outside a runtime toasts never expire and must be dismissed.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::task::AbortHandle;
use tracing::debug;

use super::StateEvent;
use crate::models::{Severity, ToastMessage};

/// Default time a toast stays visible
pub const DEFAULT_TOAST_TTL: Duration = Duration::from_secs(5);

struct Inner {
    toasts: Mutex<Vec<ToastMessage>>,
    timers: Mutex<HashMap<String, AbortHandle>>,
    ttl: Duration,
    events: Option<broadcast::Sender<StateEvent>>,
}

impl Inner {
    fn toasts(&self) -> MutexGuard<'_, Vec<ToastMessage>> {
        self.toasts.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn timers(&self) -> MutexGuard<'_, HashMap<String, AbortHandle>> {
        self.timers.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn take(&self, id: &str) -> bool {
        let removed = {
            let mut toasts = self.toasts();
            let before = toasts.len();
            toasts.retain(|t| t.id != id);
            toasts.len() != before
        };
        if removed {
            if let Some(events) = &self.events {
                let _ = events.send(StateEvent::ToastsChanged);
            }
        }
        removed
    }
}

/// Active toasts, oldest first.
#[derive(Clone)]
pub struct ToastQueue {
    inner: Arc<Inner>,
}

impl ToastQueue {
    pub fn new(ttl: Duration) -> Self {
        Self::build(ttl, None)
    }

    /// Queue that announces every change on `events`
    pub fn with_events(ttl: Duration, events: broadcast::Sender<StateEvent>) -> Self {
        Self::build(ttl, Some(events))
    }

    fn build(ttl: Duration, events: Option<broadcast::Sender<StateEvent>>) -> Self {
        Self {
            inner: Arc::new(Inner {
                toasts: Mutex::new(Vec::new()),
                timers: Mutex::new(HashMap::new()),
                ttl,
                events,
            }),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.inner.ttl
    }

    /// Append a toast and start its expiry timer. Returns the toast id.
    pub fn push(&self, message: impl Into<String>, kind: Severity) -> String {
        let toast = ToastMessage::new(message, kind);
        let id = toast.id.clone();
        debug!("Toast [{}] {}", toast.kind, toast.message);

        self.inner.toasts().push(toast);
        if let Some(events) = &self.inner.events {
            let _ = events.send(StateEvent::ToastsChanged);
        }
        self.schedule_expiry(&id);
        id
    }

    fn schedule_expiry(&self, id: &str) {
        let Ok(handle) = Handle::try_current() else {
            debug!("No async runtime; toast {} will not expire on its own", id);
            return;
        };

        // Hold the timer map while spawning so the timer cannot finish
        // before its handle is registered.
        let mut timers = self.inner.timers();
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let ttl = self.inner.ttl;
        let toast_id = id.to_string();

        let task = handle.spawn(async move {
            tokio::time::sleep(ttl).await;
            if let Some(inner) = weak.upgrade() {
                inner.timers().remove(&toast_id);
                if inner.take(&toast_id) {
                    debug!("Toast {} expired", toast_id);
                }
            }
        });
        timers.insert(id.to_string(), task.abort_handle());
    }

    /// Remove a toast before it expires. Returns whether it was present;
    /// removing an unknown or already expired id is a no-op.
    pub fn dismiss(&self, id: &str) -> bool {
        if let Some(timer) = self.inner.timers().remove(id) {
            timer.abort();
        }
        self.inner.take(id)
    }

    /// Snapshot of the active toasts
    pub fn active(&self) -> Vec<ToastMessage> {
        self.inner.toasts().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.toasts().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of running expiry timers
    pub fn pending_timers(&self) -> usize {
        self.inner.timers().len()
    }
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_TTL)
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        for (_, timer) in self.timers.get_mut().unwrap_or_else(|e| e.into_inner()).drain() {
            timer.abort();
        }
    }
}
