//! Page-wide keyboard stream with scoped subscriptions.
//!
//! The stream only records who is listening. Delivering a key returns the
//! subscriptions that should see it; the page runtime routes each one to its
//! owner. A subscription is released when its guard is dropped, so a
//! component can never leave a listener behind.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::{Rc, Weak};

/// Keys the page distinguishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Space,
    Enter,
    Escape,
    Character(char),
    Other,
}

impl Key {
    /// Maps a DOM `KeyboardEvent.key` value.
    #[must_use]
    pub fn from_dom(key: &str) -> Self {
        match key {
            " " | "Spacebar" => Key::Space,
            "Enter" => Key::Enter,
            "Escape" | "Esc" => Key::Escape,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Character(c),
                    _ => Key::Other,
                }
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

#[derive(Debug, Default)]
struct Listeners {
    next_id: u64,
    active: BTreeSet<SubscriptionId>,
}

/// Handle to the page's keyboard stream. Clones share the same listeners.
#[derive(Clone, Debug, Default)]
pub struct KeyboardEvents {
    listeners: Rc<RefCell<Listeners>>,
}

impl KeyboardEvents {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener for every key delivered to the page.
    #[must_use = "dropping the subscription releases it immediately"]
    pub fn subscribe(&self) -> KeySubscription {
        let mut listeners = self.listeners.borrow_mut();
        let id = SubscriptionId(listeners.next_id);
        listeners.next_id += 1;
        listeners.active.insert(id);
        tracing::debug!(subscription = id.0, "keyboard subscription acquired");
        KeySubscription {
            id,
            listeners: Rc::downgrade(&self.listeners),
        }
    }

    /// Subscriptions that should receive `key`, in subscription order.
    #[must_use]
    pub fn deliver(&self, key: Key) -> Vec<SubscriptionId> {
        let listeners = self.listeners.borrow();
        tracing::debug!(?key, listeners = listeners.active.len(), "key delivered");
        listeners.active.iter().copied().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.borrow().active.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn is_active(&self, id: SubscriptionId) -> bool {
        self.listeners.borrow().active.contains(&id)
    }
}

/// A live listener on the keyboard stream. Released on drop.
#[derive(Debug)]
pub struct KeySubscription {
    id: SubscriptionId,
    listeners: Weak<RefCell<Listeners>>,
}

impl KeySubscription {
    #[must_use]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }
}

impl Drop for KeySubscription {
    fn drop(&mut self) {
        // The stream may already be gone with its page.
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.borrow_mut().active.remove(&self.id);
            tracing::debug!(subscription = self.id.0, "keyboard subscription released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_dom_keys() {
        assert_eq!(Key::from_dom(" "), Key::Space);
        assert_eq!(Key::from_dom("Enter"), Key::Enter);
        assert_eq!(Key::from_dom("x"), Key::Character('x'));
        assert_eq!(Key::from_dom("ArrowLeft"), Key::Other);
        assert_eq!(Key::from_dom(""), Key::Other);
    }

    #[test]
    fn delivers_to_active_subscriptions() {
        let events = KeyboardEvents::new();
        let first = events.subscribe();
        let second = events.subscribe();
        assert_eq!(events.deliver(Key::Space), vec![first.id(), second.id()]);
    }

    #[test]
    fn drop_releases_exactly_once() {
        let events = KeyboardEvents::new();
        let kept = events.subscribe();
        let released = events.subscribe();
        let released_id = released.id();
        drop(released);

        assert_eq!(events.len(), 1);
        assert!(!events.is_active(released_id));
        assert_eq!(events.deliver(Key::Space), vec![kept.id()]);
    }

    #[test]
    fn ids_are_not_reused() {
        let events = KeyboardEvents::new();
        let first = events.subscribe().id();
        let second = events.subscribe().id();
        assert_ne!(first, second);
        assert!(events.is_empty());
    }

    #[test]
    fn outliving_the_stream_is_harmless() {
        let events = KeyboardEvents::new();
        let subscription = events.subscribe();
        drop(events);
        drop(subscription);
    }
}
