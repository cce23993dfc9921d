use std::sync::{Arc, Mutex, MutexGuard};

/// Ordered log of driver entry points hit by a [`NullDriver`](super::NullDriver).
///
/// Clones share the same log, so a caller can keep one after the driver has
/// been moved into a device.
#[derive(Debug, Clone, Default)]
pub struct CallTrace {
    calls: Arc<Mutex<Vec<&'static str>>>,
}

impl CallTrace {
    fn lock(&self) -> MutexGuard<'_, Vec<&'static str>> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn record(&self, call: &'static str) {
        self.lock().push(call);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.lock().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.lock().iter().filter(|c| **c == call).count()
    }

    pub fn contains(&self, call: &str) -> bool {
        self.count(call) > 0
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_calls() {
        let trace = CallTrace::default();
        let view = trace.clone();
        trace.record("submit");
        trace.record("submit");
        trace.record("wait");
        assert_eq!(view.count("submit"), 2);
        assert_eq!(view.calls(), vec!["submit", "submit", "wait"]);

        view.clear();
        assert!(!trace.contains("wait"));
    }
}
