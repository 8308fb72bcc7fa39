use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Count of outstanding network calls, shared between the call sites that
/// start requests and the idle monitor that defers logout while any are open.
///
/// Clones share the same count.
#[derive(Debug, Clone, Default)]
pub struct InFlightCounter {
    count: Arc<AtomicUsize>,
}

impl InFlightCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a call as started. The returned guard marks it finished when
    /// dropped, so every exit path of the caller is covered.
    pub fn begin(&self) -> InFlightGuard {
        self.increment();
        InFlightGuard {
            counter: self.clone(),
        }
    }

    pub fn increment(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }

    /// Floors at zero.
    pub fn decrement(&self) {
        let _ = self
            .count
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
    }

    pub fn active(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    pub fn is_busy(&self) -> bool {
        self.active() > 0
    }
}

#[must_use = "dropping the guard immediately ends the call it tracks"]
#[derive(Debug)]
pub struct InFlightGuard {
    counter: InFlightCounter,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.counter.decrement();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_pairs_increment_and_decrement() {
        let counter = InFlightCounter::new();
        {
            let _a = counter.begin();
            let _b = counter.clone().begin();
            assert_eq!(counter.active(), 2);
        }
        assert_eq!(counter.active(), 0);
        assert!(!counter.is_busy());
    }

    #[test]
    fn test_decrement_floors_at_zero() {
        let counter = InFlightCounter::new();
        counter.decrement();
        counter.decrement();
        assert_eq!(counter.active(), 0);

        counter.increment();
        assert!(counter.is_busy());
    }

    #[test]
    fn test_guard_released_on_early_return() {
        fn fails_midway(counter: &InFlightCounter) -> Result<(), String> {
            let _guard = counter.begin();
            if counter.is_busy() {
                return Err("boom".to_string());
            }
            Ok(())
        }

        let counter = InFlightCounter::new();
        assert!(fails_midway(&counter).is_err());
        assert_eq!(counter.active(), 0);
    }
}
