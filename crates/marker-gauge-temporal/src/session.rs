use crate::{FilteredResult, TemporalError, TemporalFilter, TemporalFilterParams};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Shared handle to one session's filter.
pub type SessionHandle = Arc<Mutex<TemporalFilter>>;

/// One [`TemporalFilter`] per session id.
///
/// The map lock is held only long enough to look up or insert a handle; the
/// per-session lock serializes requests that share a session. A panic while a
/// lock is held leaves the filter usable: poisoned guards are recovered.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    params: TemporalFilterParams,
    sessions: Mutex<HashMap<String, SessionHandle>>,
}

fn recover<'a, T>(
    result: Result<MutexGuard<'a, T>, PoisonError<MutexGuard<'a, T>>>,
) -> MutexGuard<'a, T> {
    result.unwrap_or_else(PoisonError::into_inner)
}

impl SessionRegistry {
    pub fn new(params: TemporalFilterParams) -> Self {
        Self {
            params,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn params(&self) -> &TemporalFilterParams {
        &self.params
    }

    /// Handle for `session_id`, created empty on first use.
    pub fn session(&self, session_id: &str) -> SessionHandle {
        let mut sessions = recover(self.sessions.lock());
        sessions
            .entry(session_id.to_owned())
            .or_insert_with(|| {
                log::debug!("temporal: new session '{session_id}'");
                Arc::new(Mutex::new(TemporalFilter::new(self.params.clone())))
            })
            .clone()
    }

    /// Ingest into `session_id`'s filter.
    pub fn ingest(
        &self,
        session_id: &str,
        distance_m: f64,
        now: f64,
    ) -> Result<FilteredResult, TemporalError> {
        let handle = self.session(session_id);
        let mut filter = recover(handle.lock());
        filter.ingest(distance_m, now)
    }

    /// Forget `session_id`; returns whether it existed.
    pub fn remove(&self, session_id: &str) -> bool {
        recover(self.sessions.lock()).remove(session_id).is_some()
    }

    /// Drop sessions whose newest sample is older than `idle_s` at `now`,
    /// along with sessions that never received a sample.
    pub fn evict_idle(&self, now: f64, idle_s: f64) -> usize {
        let mut sessions = recover(self.sessions.lock());
        let before = sessions.len();
        sessions.retain(|_, handle| {
            let filter = recover(handle.lock());
            filter
                .window()
                .newest()
                .is_some_and(|s| now - s.timestamp <= idle_s)
        });
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        recover(self.sessions.lock()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
