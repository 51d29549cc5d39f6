//! Session change notifications

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};

use log::{debug, trace};

use crate::session::Session;

/// A session transition reported by the identity provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthChangeEvent {
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
}

type Listener = Arc<dyn Fn(AuthChangeEvent, Option<&Session>) + Send + Sync>;
type ListenerMap = RwLock<HashMap<u64, Listener>>;

/// Registry of session-change callbacks
#[derive(Clone, Default)]
pub(crate) struct Listeners {
    next_id: Arc<AtomicU64>,
    map: Arc<ListenerMap>,
}

impl Listeners {
    pub(crate) fn add<F>(&self, callback: F) -> Subscription
    where
        F: Fn(AuthChangeEvent, Option<&Session>) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.map
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id, Arc::new(callback));
        debug!("Registered auth state listener {}", id);

        Subscription {
            id,
            map: Arc::downgrade(&self.map),
        }
    }

    /// Deliver `event` to every listener.
    ///
    /// The map lock is released before callbacks run, so a callback may drop
    /// its own subscription.
    pub(crate) fn emit(&self, event: AuthChangeEvent, session: Option<&Session>) {
        let listeners: Vec<Listener> = self
            .map
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .cloned()
            .collect();

        trace!("Emitting {:?} to {} listener(s)", event, listeners.len());
        for listener in listeners {
            listener(event, session);
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.map.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// An active session-change subscription.
///
/// The listener is removed when the subscription is dropped or
/// [`Subscription::unsubscribe`] is called.
#[must_use = "dropping a Subscription immediately removes the listener"]
pub struct Subscription {
    id: u64,
    map: Weak<ListenerMap>,
}

impl Subscription {
    /// A subscription that was never attached to a provider
    pub(crate) fn inert() -> Self {
        Self {
            id: 0,
            map: Weak::new(),
        }
    }

    /// Whether this subscription is attached to a live provider
    pub fn is_active(&self) -> bool {
        self.map.strong_count() > 0
    }

    /// Remove the listener
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(map) = self.map.upgrade() {
            map.write()
                .unwrap_or_else(|e| e.into_inner())
                .remove(&self.id);
            debug!("Removed auth state listener {}", self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn emit_reaches_every_listener() {
        let listeners = Listeners::default();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let first = {
            let seen = seen.clone();
            listeners.add(move |event, _| seen.lock().unwrap().push(("first", event)))
        };
        let second = {
            let seen = seen.clone();
            listeners.add(move |event, _| seen.lock().unwrap().push(("second", event)))
        };

        listeners.emit(AuthChangeEvent::SignedOut, None);

        let mut seen = seen.lock().unwrap().clone();
        seen.sort_by_key(|(name, _)| *name);
        assert_eq!(
            seen,
            vec![
                ("first", AuthChangeEvent::SignedOut),
                ("second", AuthChangeEvent::SignedOut)
            ]
        );
        drop((first, second));
    }

    #[test]
    fn dropped_subscription_stops_delivery() {
        let listeners = Listeners::default();
        let count = Arc::new(AtomicU64::new(0));

        let subscription = {
            let count = count.clone();
            listeners.add(move |_, _| {
                count.fetch_add(1, Ordering::SeqCst);
            })
        };
        listeners.emit(AuthChangeEvent::SignedIn, None);
        subscription.unsubscribe();
        listeners.emit(AuthChangeEvent::SignedIn, None);

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(listeners.len(), 0);
    }

    #[test]
    fn inert_subscription_is_inactive() {
        let subscription = Subscription::inert();
        assert!(!subscription.is_active());
    }
}
