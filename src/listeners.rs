//! Subscribers notified when a ripple cycle finishes.
//!
//! Hosts use these to run deferred work once the feedback is over, such as
//! firing a click. The registry is a cheap handle (`Clone` shares it) so a
//! callback can hold one and unsubscribe itself, or others, while a
//! notification is running.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Handle returned by [`CompletionListeners::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Callback = Rc<dyn Fn()>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    entries: Vec<(ListenerId, Callback)>,
}

/// Ordered set of completion callbacks.
#[derive(Clone, Default)]
pub struct CompletionListeners {
    inner: Rc<RefCell<Registry>>,
}

impl CompletionListeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback`; it runs after every completed cycle until
    /// unsubscribed.
    pub fn subscribe(&self, callback: impl Fn() + 'static) -> ListenerId {
        let mut registry = self.inner.borrow_mut();
        let id = ListenerId(registry.next_id);
        registry.next_id += 1;
        registry.entries.push((id, Rc::new(callback)));
        id
    }

    /// Remove a subscriber. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut registry = self.inner.borrow_mut();
        let before = registry.entries.len();
        registry.entries.retain(|(entry, _)| *entry != id);
        registry.entries.len() != before
    }

    pub fn clear(&self) {
        self.inner.borrow_mut().entries.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Call every subscriber in registration order.
    ///
    /// Subscribers added during the notification wait for the next one;
    /// subscribers removed during it are skipped if they have not run yet.
    pub(crate) fn notify(&self) {
        let ids: Vec<ListenerId> = self
            .inner
            .borrow()
            .entries
            .iter()
            .map(|(id, _)| *id)
            .collect();

        for id in ids {
            let callback = self
                .inner
                .borrow()
                .entries
                .iter()
                .find(|(entry, _)| *entry == id)
                .map(|(_, callback)| callback.clone());
            if let Some(callback) = callback {
                callback();
            }
        }
    }
}

impl fmt::Debug for CompletionListeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionListeners")
            .field("len", &self.len())
            .finish()
    }
}
