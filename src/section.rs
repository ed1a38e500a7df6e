//! Section State Store: the per-panel `idle → loading → ready | error` machine.
//!
//! A `SectionStore` is a cheap handle (`Clone`) onto shared state so a fetch
//! can run on any thread and report back. Overlapping fetches are never
//! cancelled. Under the default [`RacePolicy::LastResolved`] whichever response
//! arrives last is what the panel shows, regardless of issue order.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::Result;
use crate::report::ReportPayload;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionState {
    pub data: Option<ReportPayload>,
    pub loading: bool,
    pub error: Option<String>,
    /// Set by the first completed fetch and never cleared.
    pub loaded: bool,
}

/// How overlapping fetches on one store resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RacePolicy {
    /// Every completion is applied; the last to arrive wins.
    #[default]
    LastResolved,
    /// Completions from a request older than the newest issued one are dropped.
    LatestIssued,
}

/// What happens to existing data when a new fetch starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadMode {
    /// Previous data stays visible while loading.
    #[default]
    KeepStale,
    /// Data is cleared; used for the page-blocking summary.
    ClearWhileLoading,
}

/// Issued by [`SectionStore::begin`]; hand it back to [`SectionStore::finish`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct Ticket(u64);

#[derive(Debug, Default)]
struct Inner {
    state: SectionState,
    issued: u64,
}

#[derive(Debug, Clone, Default)]
pub struct SectionStore {
    inner: Arc<Mutex<Inner>>,
    policy: RacePolicy,
    mode: LoadMode,
}

impl SectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store for the top-level summary: clears data while loading.
    pub fn summary() -> Self {
        Self {
            mode: LoadMode::ClearWhileLoading,
            ..Self::default()
        }
    }

    pub fn with_policy(mut self, policy: RacePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> RacePolicy {
        self.policy
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // State is plain data; a panic mid-update cannot leave it torn.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn snapshot(&self) -> SectionState {
        self.lock().state.clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.lock().state.loaded
    }

    /// Enter `loading`. Existing data is kept unless the store clears on load.
    pub fn begin(&self) -> Ticket {
        let mut inner = self.lock();
        inner.issued += 1;
        inner.state.loading = true;
        inner.state.error = None;
        if self.mode == LoadMode::ClearWhileLoading {
            inner.state.data = None;
        }
        Ticket(inner.issued)
    }

    /// Apply a fetch outcome. Returns false when the policy discarded it.
    pub fn finish(&self, ticket: Ticket, result: Result<ReportPayload>) -> bool {
        let mut inner = self.lock();
        if self.policy == RacePolicy::LatestIssued && ticket.0 < inner.issued {
            tracing::debug!(ticket = ticket.0, latest = inner.issued, "dropping stale response");
            return false;
        }

        let state = &mut inner.state;
        state.loading = false;
        state.loaded = true;
        match result {
            Ok(data) => {
                state.data = Some(data);
                state.error = None;
            }
            Err(e) => {
                tracing::debug!(error = %e, "section fetch failed");
                state.error = Some(e.to_string());
            }
        }
        true
    }

    /// Run `fetch` on the calling thread, bracketed by `begin`/`finish`.
    pub fn dispatch<F>(&self, fetch: F) -> bool
    where
        F: FnOnce() -> Result<ReportPayload>,
    {
        let ticket = self.begin();
        let result = fetch();
        self.finish(ticket, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DashboardError;
    use crate::report::{DepartmentProfitReport, ReportPayload};
    use std::sync::mpsc;
    use std::thread;

    fn payload(total: f64) -> ReportPayload {
        ReportPayload::DepartmentProfit(DepartmentProfitReport {
            data: Vec::new(),
            total_profit: Some(total),
        })
    }

    fn failure() -> DashboardError {
        DashboardError::Http {
            status: 500,
            body: "boom".to_string(),
        }
    }

    #[test]
    fn starts_idle_and_unloaded() {
        let state = SectionStore::new().snapshot();
        assert_eq!(state, SectionState::default());
    }

    #[test]
    fn success_sets_data_and_loaded() {
        let store = SectionStore::new();
        store.dispatch(|| Ok(payload(1.0)));
        let state = store.snapshot();
        assert_eq!(state.data, Some(payload(1.0)));
        assert!(!state.loading);
        assert!(state.error.is_none());
        assert!(state.loaded);
    }

    #[test]
    fn stale_data_stays_visible_while_loading() {
        let store = SectionStore::new();
        store.dispatch(|| Ok(payload(1.0)));

        let observer = store.clone();
        store.dispatch(|| {
            let during = observer.snapshot();
            assert!(during.loading);
            assert!(during.error.is_none());
            assert_eq!(during.data, Some(payload(1.0)));
            Ok(payload(2.0))
        });
        assert_eq!(store.snapshot().data, Some(payload(2.0)));
    }

    #[test]
    fn summary_clears_data_while_loading() {
        let store = SectionStore::summary();
        store.dispatch(|| Ok(payload(1.0)));
        let observer = store.clone();
        store.dispatch(|| {
            assert_eq!(observer.snapshot().data, None);
            Err(failure())
        });
        let state = store.snapshot();
        assert_eq!(state.data, None);
        assert_eq!(state.error.as_deref(), Some("API 500: boom"));
    }

    #[test]
    fn error_keeps_last_known_good_data() {
        let store = SectionStore::new();
        store.dispatch(|| Ok(payload(1.0)));
        store.dispatch(|| Err(failure()));
        let state = store.snapshot();
        assert_eq!(state.data, Some(payload(1.0)));
        assert_eq!(state.error.as_deref(), Some("API 500: boom"));
        assert!(state.loaded);
        assert!(!state.loading);
    }

    #[test]
    fn loading_clears_previous_error() {
        let store = SectionStore::new();
        store.dispatch(|| Err(failure()));
        let ticket = store.begin();
        let state = store.snapshot();
        assert!(state.loading);
        assert!(state.error.is_none());
        let _ = store.finish(ticket, Ok(payload(3.0)));
    }

    #[test]
    fn loaded_never_resets() {
        let store = SectionStore::new();
        store.dispatch(|| Err(failure()));
        assert!(store.is_loaded());
        let ticket = store.begin();
        assert!(store.is_loaded());
        let _ = store.finish(ticket, Ok(payload(1.0)));
        store.dispatch(|| Err(failure()));
        assert!(store.is_loaded());
    }

    /// Issue A then B; B resolves first, A last.
    fn race(policy: RacePolicy) -> SectionState {
        let store = SectionStore::new().with_policy(policy);
        let (release_a, wait_a) = mpsc::channel::<()>();
        let (a_started, a_ready) = mpsc::channel::<()>();

        let a_store = store.clone();
        let a = thread::spawn(move || {
            a_store.dispatch(|| {
                a_started.send(()).unwrap();
                wait_a.recv().unwrap();
                Ok(payload(1.0))
            })
        });
        a_ready.recv().unwrap();

        store.dispatch(|| Ok(payload(2.0)));
        release_a.send(()).unwrap();
        a.join().unwrap();
        store.snapshot()
    }

    #[test]
    fn last_resolved_response_wins_by_default() {
        let state = race(RacePolicy::LastResolved);
        assert_eq!(state.data, Some(payload(1.0)));
    }

    #[test]
    fn latest_issued_policy_drops_stale_response() {
        let state = race(RacePolicy::LatestIssued);
        assert_eq!(state.data, Some(payload(2.0)));
        assert!(!state.loading);
    }
}
