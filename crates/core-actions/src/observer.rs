//! Yank observers.
//!
//! The list is copy-on-write: `add`/`remove` swap in a new vector and `notify` walks a
//! snapshot, so an observer may register or drop observers from inside its own
//! callback without a lock held across the loop.

use std::sync::Arc;

use arc_swap::ArcSwap;
use core_state::TextRange;
use core_text::TextHost;
use tracing::trace;

pub trait YankObserver: Send + Sync {
    /// Called once per committed yank with the aggregate range. Register contents may
    /// not be updated yet.
    fn yank_performed(&self, text: &dyn TextHost, range: &TextRange);
}

pub struct YankObservers {
    list: ArcSwap<Vec<Arc<dyn YankObserver>>>,
}

impl Default for YankObservers {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for YankObservers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YankObservers")
            .field("len", &self.len())
            .finish()
    }
}

impl YankObservers {
    pub fn new() -> Self {
        Self {
            list: ArcSwap::from_pointee(Vec::new()),
        }
    }

    pub fn add(&self, observer: Arc<dyn YankObserver>) {
        self.list.rcu(|current| {
            let mut next = Vec::clone(current);
            next.push(Arc::clone(&observer));
            next
        });
    }

    /// Remove a previously added observer. Returns false if it was not registered.
    pub fn remove(&self, observer: &Arc<dyn YankObserver>) -> bool {
        let mut removed = false;
        self.list.rcu(|current| {
            let next: Vec<_> = current
                .iter()
                .filter(|o| !Arc::ptr_eq(o, observer))
                .cloned()
                .collect();
            removed = next.len() != current.len();
            next
        });
        removed
    }

    pub fn len(&self) -> usize {
        self.list.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn notify(&self, text: &dyn TextHost, range: &TextRange) {
        let snapshot = self.list.load_full();
        trace!(target: "actions.yank", observers = snapshot.len(), "observers_notified");
        for observer in snapshot.iter() {
            observer.yank_performed(text, range);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_text::Buffer;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counter(AtomicUsize);

    impl YankObserver for Counter {
        fn yank_performed(&self, _text: &dyn TextHost, _range: &TextRange) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    // Registers `late` the first time it is notified.
    struct Recruiter {
        list: Arc<YankObservers>,
        late: Mutex<Option<Arc<dyn YankObserver>>>,
    }

    impl YankObserver for Recruiter {
        fn yank_performed(&self, _text: &dyn TextHost, _range: &TextRange) {
            if let Some(late) = self.late.lock().unwrap().take() {
                self.list.add(late);
            }
        }
    }

    #[test]
    fn add_notify_remove() {
        let buf = Buffer::from_str("t", "abc").unwrap();
        let observers = YankObservers::new();
        let counter = Arc::new(Counter::default());
        let handle: Arc<dyn YankObserver> = counter.clone();
        observers.add(handle.clone());
        observers.notify(&buf, &TextRange::new(0, 1));
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
        assert!(observers.remove(&handle));
        assert!(!observers.remove(&handle));
        observers.notify(&buf, &TextRange::new(0, 1));
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
        assert!(observers.is_empty());
    }

    #[test]
    fn observer_added_during_notify_waits_for_next_round() {
        let buf = Buffer::from_str("t", "abc").unwrap();
        let observers = Arc::new(YankObservers::new());
        let late = Arc::new(Counter::default());
        observers.add(Arc::new(Recruiter {
            list: observers.clone(),
            late: Mutex::new(Some(late.clone() as Arc<dyn YankObserver>)),
        }));
        observers.notify(&buf, &TextRange::new(0, 2));
        assert_eq!(late.0.load(Ordering::SeqCst), 0);
        assert_eq!(observers.len(), 2);
        observers.notify(&buf, &TextRange::new(0, 2));
        assert_eq!(late.0.load(Ordering::SeqCst), 1);
    }
}
