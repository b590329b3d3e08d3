//! Per-professional write serialization.
//!
//! Booking and timetable writes are read-check-write sequences against a store
//! that offers no transactions. Running them under a professional's lock makes
//! the sequence atomic with respect to every other writer that shares the same
//! [`ProfessionalLocks`] registry. Writers in other processes are not covered;
//! such deployments need an exclusion constraint in the store itself.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::records::UserId;

/// A registry handing out one mutex per professional.
///
/// Cloning is cheap and clones share the registry.
#[derive(Debug, Clone, Default)]
pub struct ProfessionalLocks {
    inner: Arc<Mutex<HashMap<UserId, Arc<Mutex<()>>>>>,
}

impl ProfessionalLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding `professional`'s lock.
    ///
    /// Calls for different professionals proceed in parallel. The entry is
    /// dropped once no call holds or awaits it, so the registry only ever
    /// holds professionals with writes in flight.
    pub fn with<R>(&self, professional: &UserId, f: impl FnOnce() -> R) -> R {
        let lock = {
            let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(map.entry(professional.clone()).or_default())
        };
        let result = {
            // The guarded value is `()`, so a poisoned lock carries no broken state.
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            f()
        };
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        // Clones are only taken under the map lock: two references means the
        // registry's and ours.
        if Arc::strong_count(&lock) == 2 {
            map.remove(professional);
        }
        result
    }

    /// Number of professionals with a write in flight.
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_same_professional_is_serialized() {
        let locks = ProfessionalLocks::new();
        let inside = Arc::new(AtomicUsize::new(0));
        let max_inside = Arc::new(AtomicUsize::new(0));
        let prof = UserId::new("prof-1");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let (locks, inside, max_inside, prof) =
                    (locks.clone(), inside.clone(), max_inside.clone(), prof.clone());
                thread::spawn(move || {
                    locks.with(&prof, || {
                        let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                        max_inside.fetch_max(now, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(2));
                        inside.fetch_sub(1, Ordering::SeqCst);
                    })
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
        assert!(locks.is_empty());
    }

    #[test]
    fn test_returns_closure_value() {
        let locks = ProfessionalLocks::new();
        assert!(locks.is_empty());
        let v = locks.with(&UserId::new("p"), || 42);
        assert_eq!(v, 42);
    }

    #[test]
    fn test_entries_are_released_after_use() {
        let locks = ProfessionalLocks::new();
        for i in 0..100 {
            let prof = UserId::new(format!("prof-{i}"));
            locks.with(&prof, || assert_eq!(locks.len(), 1));
        }
        assert!(locks.is_empty());
    }

    #[test]
    fn test_entry_survives_while_awaited() {
        let locks = ProfessionalLocks::new();
        let prof = UserId::new("prof-1");
        let (entered_tx, entered_rx) = std::sync::mpsc::channel();
        let waiter = locks.with(&prof, || {
            let (shared, queued) = (locks.clone(), prof.clone());
            let waiter = thread::spawn(move || {
                shared.with(&queued, || entered_tx.send(()).unwrap());
            });
            // Give the waiter time to queue on the held lock.
            thread::sleep(Duration::from_millis(20));
            assert_eq!(locks.len(), 1);
            waiter
        });
        waiter.join().unwrap();
        entered_rx.recv().unwrap();
        assert!(locks.is_empty());
    }
}
