use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Registry of sessions with an advice request currently in flight.
///
/// Invariant: at most one outstanding request per session. A second
/// submission while the slot is taken is refused outright; there is no
/// queueing and no cancellation of the in-flight call.
#[derive(Clone, Default)]
pub struct ActiveRequests {
    inner: Arc<Mutex<HashSet<Uuid>>>,
}

impl ActiveRequests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the session's slot. Returns `None` if a request is already
    /// in flight; the returned guard frees the slot when dropped, whether
    /// the request resolves or fails.
    pub fn try_begin(&self, session_id: Uuid) -> Option<InFlightGuard> {
        let mut active = self.inner.lock().unwrap();
        if active.insert(session_id) {
            Some(InFlightGuard {
                registry: self.inner.clone(),
                session_id,
            })
        } else {
            None
        }
    }

    pub fn is_busy(&self, session_id: Uuid) -> bool {
        self.inner.lock().unwrap().contains(&session_id)
    }
}

pub struct InFlightGuard {
    registry: Arc<Mutex<HashSet<Uuid>>>,
    session_id: Uuid,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.registry.lock().unwrap().remove(&self.session_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_claim_is_refused_until_guard_drops() {
        let active = ActiveRequests::new();
        let id = Uuid::new_v4();

        let guard = active.try_begin(id).unwrap();
        assert!(active.is_busy(id));
        assert!(active.try_begin(id).is_none());

        drop(guard);
        assert!(!active.is_busy(id));
        assert!(active.try_begin(id).is_some());
    }

    #[test]
    fn sessions_do_not_block_each_other() {
        let active = ActiveRequests::new();
        let _a = active.try_begin(Uuid::new_v4()).unwrap();
        let _b = active.try_begin(Uuid::new_v4()).unwrap();
    }
}
