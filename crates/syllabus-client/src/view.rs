//! Report views and the staleness guard
//!
//! A view owns the state one report screen renders from. Loads may overlap:
//! each load takes a [`LoadTicket`] when it starts, and its result is only
//! stored if no newer load has started and the view has not been closed in
//! the meantime. Stale results are dropped on arrival; in-flight requests are
//! never cancelled.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde_json::Value;
use syllabus_report::{NormalizedReport, ReportKind};
use tracing::{error, info, warn};

/// Refresh counter value captured when a load starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

/// How a load ended
#[derive(Debug)]
pub enum LoadOutcome<E> {
    /// Result stored in the view
    Loaded,
    /// Load failed while still current; the view fell back to its empty state
    Failed(E),
    /// A newer load or a close overtook this one; nothing was stored
    Stale,
}

impl<E> LoadOutcome<E> {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded)
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale)
    }
}

/// Point-in-time copy of a view
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSnapshot<T> {
    pub value: T,
    /// When `value` was last published; `None` for the initial empty state
    pub loaded_at: Option<DateTime<Utc>>,
    pub loading: bool,
}

#[derive(Debug)]
struct ViewState<T> {
    generation: u64,
    value: T,
    loaded_at: Option<DateTime<Utc>>,
    loading: bool,
}

/// Shared handle to one report view
#[derive(Debug)]
pub struct ReportView<T> {
    state: Arc<Mutex<ViewState<T>>>,
    empty: Arc<T>,
}

impl<T> Clone for ReportView<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            empty: Arc::clone(&self.empty),
        }
    }
}

impl<T: Clone> ReportView<T> {
    /// Create a view showing `empty` until something is published
    pub fn new(empty: T) -> Self {
        Self {
            state: Arc::new(Mutex::new(ViewState {
                generation: 0,
                value: empty.clone(),
                loaded_at: None,
                loading: false,
            })),
            empty: Arc::new(empty),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ViewState<T>> {
        // No invariant spans a panic inside these short sections
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a load, invalidating every earlier ticket
    pub fn begin_load(&self) -> LoadTicket {
        let mut state = self.lock();
        state.generation += 1;
        state.loading = true;
        LoadTicket {
            generation: state.generation,
        }
    }

    /// Whether a result for `ticket` would still be stored
    pub fn is_live(&self, ticket: LoadTicket) -> bool {
        self.lock().generation == ticket.generation
    }

    /// Store `value` if `ticket` is still live. Returns whether it was stored.
    pub fn publish(&self, ticket: LoadTicket, value: T) -> bool {
        let mut state = self.lock();
        if state.generation != ticket.generation {
            warn!(
                ticket = ticket.generation,
                current = state.generation,
                "Discarding stale report load"
            );
            return false;
        }

        state.value = value;
        state.loaded_at = Some(Utc::now());
        state.loading = false;
        true
    }

    /// Run `future` as a load of this view.
    ///
    /// The ticket is taken when this is called, not when the returned future
    /// is first polled, so call order decides which load is newest.
    pub fn load<F, E>(&self, future: F) -> impl Future<Output = LoadOutcome<E>>
    where
        F: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        self.load_with(future, |value| value)
    }

    /// Like [`load`](Self::load), converting the raw result before publishing
    pub fn load_with<F, R, E, N>(
        &self,
        future: F,
        convert: N,
    ) -> impl Future<Output = LoadOutcome<E>>
    where
        F: Future<Output = Result<R, E>>,
        N: FnOnce(R) -> T,
        E: std::fmt::Display,
    {
        let ticket = self.begin_load();
        let view = self.clone();

        async move {
            match future.await {
                Ok(raw) => {
                    if view.publish(ticket, convert(raw)) {
                        info!(generation = ticket.generation, "Report view updated");
                        LoadOutcome::Loaded
                    } else {
                        LoadOutcome::Stale
                    }
                }
                Err(e) => {
                    if view.publish(ticket, view.empty_value()) {
                        error!(error = %e, generation = ticket.generation, "Report load failed");
                        LoadOutcome::Failed(e)
                    } else {
                        LoadOutcome::Stale
                    }
                }
            }
        }
    }

    /// Unmount: invalidate in-flight loads and return to the empty state
    pub fn close(&self) {
        let mut state = self.lock();
        state.generation += 1;
        state.value = self.empty_value();
        state.loaded_at = None;
        state.loading = false;
    }

    pub fn snapshot(&self) -> ViewSnapshot<T> {
        let state = self.lock();
        ViewSnapshot {
            value: state.value.clone(),
            loaded_at: state.loaded_at,
            loading: state.loading,
        }
    }

    pub fn value(&self) -> T {
        self.lock().value.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    fn empty_value(&self) -> T {
        T::clone(&self.empty)
    }
}

impl ReportView<NormalizedReport> {
    /// A view of `kind` starting from its empty report
    pub fn for_kind(kind: ReportKind) -> Self {
        Self::new(NormalizedReport::empty(kind))
    }

    pub fn kind(&self) -> ReportKind {
        self.empty.kind()
    }

    /// Load a raw service payload and normalize it as this view's kind
    pub fn load_payload<F, E>(&self, future: F) -> impl Future<Output = LoadOutcome<E>>
    where
        F: Future<Output = Result<Value, E>>,
        E: std::fmt::Display,
    {
        let kind = self.kind();
        self.load_with(future, move |payload| {
            NormalizedReport::from_payload(kind, &payload)
        })
    }
}
