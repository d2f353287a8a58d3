use crate::keyboard::{Key, KeyboardEvents, KeySubscription, SubscriptionId};

/// The component's hold on the page keyboard stream.
///
/// Acquired on attach and released by dropping it on detach.
#[derive(Debug)]
pub struct InputBinding {
    subscription: KeySubscription,
    trigger: Key,
}

impl InputBinding {
    /// Key that re-renders the active exercise.
    pub const RERENDER_KEY: Key = Key::Space;

    #[must_use]
    pub fn acquire(events: &KeyboardEvents) -> Self {
        Self {
            subscription: events.subscribe(),
            trigger: Self::RERENDER_KEY,
        }
    }

    #[must_use]
    pub fn subscription(&self) -> SubscriptionId {
        self.subscription.id()
    }

    /// Whether a key delivered to `subscription` should trigger a re-render.
    #[must_use]
    pub fn triggers(&self, subscription: SubscriptionId, key: Key) -> bool {
        subscription == self.subscription.id() && key == self.trigger
    }
}
