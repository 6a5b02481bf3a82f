//! Debounced search session with a generation-based staleness guard.
//!
//! Each query change restarts a quiet-period timer; only the latest keystroke
//! survives it. When the timer fires, the evaluation is stamped with a fresh
//! generation number and recorded as current. A finished evaluation is
//! published only if its generation is still current, so results that arrive
//! out of order are dropped silently.
//!
//! Async Cancellation Architecture:
//! Debounce timers hold child tokens of a session-wide `CancellationToken`.
//! Replacing or clearing the query cancels the pending timer; dropping the
//! session cancels the parent via a `DropGuard`, which tears down every timer
//! and in-flight evaluation. Superseded in-flight evaluations are left to
//! finish and are ignored by the generation check.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::SearchConfig;
use crate::interface::{SearchError, SearchEvent, SearchPhase, SearchRecord};
use crate::query::Query;
use crate::search::rank_scored_query;

/// Global fallback Tokio runtime for sessions created outside any runtime context.
/// Shared across all sessions and never dropped.
static FALLBACK_RUNTIME: Lazy<tokio::runtime::Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("scout-session")
        .build()
        .expect("Failed to create fallback tokio runtime")
});

/// Current runtime if available, otherwise the global fallback.
fn runtime_handle() -> tokio::runtime::Handle {
    tokio::runtime::Handle::try_current().unwrap_or_else(|_| FALLBACK_RUNTIME.handle().clone())
}

/// RAII guard that cancels a token when dropped.
struct DropGuard {
    token: CancellationToken,
}

impl DropGuard {
    fn new(token: CancellationToken) -> Self {
        Self { token }
    }
}

impl Drop for DropGuard {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// EVALUATORS
// ─────────────────────────────────────────────────────────────────────────────

/// Produces the result list for one dispatched query.
///
/// May be local and effectively synchronous, or backed by a remote service
/// that completes in any order relative to dispatch.
#[async_trait]
pub trait Evaluator: Send + Sync + 'static {
    type Item: Send + 'static;

    async fn evaluate(&self, query: Query) -> Result<Vec<Self::Item>, SearchError>;
}

/// Ranks an immutable snapshot of records with the local scorer.
pub struct LocalEvaluator<R> {
    records: Arc<Vec<R>>,
    config: Arc<SearchConfig>,
}

impl<R> LocalEvaluator<R> {
    pub fn new(records: Arc<Vec<R>>, config: SearchConfig) -> Self {
        Self {
            records,
            config: Arc::new(config),
        }
    }
}

#[async_trait]
impl<R> Evaluator for LocalEvaluator<R>
where
    R: SearchRecord + Clone + Send + Sync + 'static,
{
    type Item = R;

    async fn evaluate(&self, query: Query) -> Result<Vec<R>, SearchError> {
        let records = Arc::clone(&self.records);
        let config = Arc::clone(&self.config);

        // Scoring is CPU-bound; keep it off the async workers
        tokio::task::spawn_blocking(move || {
            rank_scored_query(&records, &query, &config)
                .into_iter()
                .map(|ranked| ranked.record.clone())
                .collect::<Vec<R>>()
        })
        .await
        .map_err(|_join_error| SearchError::Cancelled)
    }
}

/// Adapts an async closure, typically a call to a remote search service.
pub struct FnEvaluator<F, T> {
    f: F,
    _item: PhantomData<fn() -> T>,
}

impl<F, T> FnEvaluator<F, T> {
    pub fn new(f: F) -> Self {
        Self {
            f,
            _item: PhantomData,
        }
    }
}

#[async_trait]
impl<F, Fut, T> Evaluator for FnEvaluator<F, T>
where
    F: Fn(Query) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<T>, SearchError>> + Send + 'static,
    T: Send + 'static,
{
    type Item = T;

    async fn evaluate(&self, query: Query) -> Result<Vec<T>, SearchError> {
        (self.f)(query).await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// SESSION
// ─────────────────────────────────────────────────────────────────────────────

/// Guard bookkeeping. Every field is only touched under the session mutex.
struct GuardState {
    phase: SearchPhase,
    /// Bumped whenever a timer is armed or disarmed; a timer that wakes with
    /// a stale sequence number does nothing.
    timer_seq: u64,
    pending: Option<CancellationToken>,
    /// Last generation handed out. Never reset, so a result from before a
    /// clear cannot collide with a later generation.
    generation: u64,
    current: Option<u64>,
    last_published: Option<u64>,
    busy: bool,
}

struct SessionInner<E: Evaluator> {
    evaluator: E,
    debounce: Duration,
    state: Mutex<GuardState>,
    events: mpsc::UnboundedSender<SearchEvent<E::Item>>,
    shutdown: CancellationToken,
}

impl<E: Evaluator> SessionInner<E> {
    /// Timer fired: stamp a generation and run the evaluation.
    async fn dispatch(&self, seq: u64, query: Query) {
        let generation = {
            let mut state = self.state.lock();
            if state.timer_seq != seq {
                return;
            }
            state.pending = None;
            state.generation += 1;
            let generation = state.generation;
            state.current = Some(generation);
            state.phase = SearchPhase::InFlight;
            state.busy = true;
            let _ = self.events.send(SearchEvent::Started { generation });
            generation
        };

        debug!(generation, query = query.normalized(), "dispatching search");

        tokio::select! {
            _ = self.shutdown.cancelled() => {}
            outcome = self.evaluator.evaluate(query) => self.resolve(generation, outcome),
        }
    }

    fn resolve(&self, generation: u64, outcome: Result<Vec<E::Item>, SearchError>) {
        let mut state = self.state.lock();
        if state.current != Some(generation) {
            debug!(generation, current = ?state.current, "discarding stale search result");
            return;
        }

        state.busy = false;
        state.last_published = Some(generation);
        if state.pending.is_none() {
            state.phase = SearchPhase::Resolved;
        }

        let (results, notice) = match outcome {
            Ok(results) => (results, None),
            Err(err) => {
                warn!(generation, error = %err, "search evaluation failed");
                (Vec::new(), Some(err.to_string()))
            }
        };
        let _ = self.events.send(SearchEvent::Resolved {
            generation,
            results,
            notice,
        });
    }
}

/// One search box's debounce timer and staleness guard.
///
/// Sessions never share generation counters; give each search box its own.
/// Events are delivered on the receiver returned by [`SearchSession::new`].
pub struct SearchSession<E: Evaluator> {
    inner: Arc<SessionInner<E>>,
    runtime: tokio::runtime::Handle,
    _guard: DropGuard,
}

impl<E: Evaluator> SearchSession<E> {
    pub fn new(evaluator: E, debounce: Duration) -> (Self, mpsc::UnboundedReceiver<SearchEvent<E::Item>>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();
        let inner = Arc::new(SessionInner {
            evaluator,
            debounce,
            state: Mutex::new(GuardState {
                phase: SearchPhase::Idle,
                timer_seq: 0,
                pending: None,
                generation: 0,
                current: None,
                last_published: None,
                busy: false,
            }),
            events,
            shutdown: shutdown.clone(),
        });

        let session = Self {
            inner,
            runtime: runtime_handle(),
            _guard: DropGuard::new(shutdown),
        };
        (session, receiver)
    }

    /// Session using the configured debounce delay.
    pub fn with_config(evaluator: E, config: &SearchConfig) -> (Self, mpsc::UnboundedReceiver<SearchEvent<E::Item>>) {
        Self::new(evaluator, config.debounce())
    }

    /// Feed the latest text of the search box.
    ///
    /// A blank query clears immediately; anything else (re)arms the timer.
    pub fn update_query(&self, raw_query: &str) {
        let query = Query::new(raw_query);
        if query.is_blank() {
            self.clear();
            return;
        }

        let timer = self.inner.shutdown.child_token();
        let seq = {
            let mut state = self.inner.state.lock();
            if let Some(previous) = state.pending.replace(timer.clone()) {
                previous.cancel();
            }
            state.timer_seq += 1;
            state.phase = SearchPhase::Pending;
            state.timer_seq
        };

        let inner = Arc::clone(&self.inner);
        self.runtime.spawn(async move {
            tokio::select! {
                _ = timer.cancelled() => return,
                _ = tokio::time::sleep(inner.debounce) => {}
            }
            inner.dispatch(seq, query).await;
        });
    }

    /// Drop back to idle without waiting for anything in flight.
    pub fn clear(&self) {
        let mut state = self.inner.state.lock();
        if let Some(timer) = state.pending.take() {
            timer.cancel();
        }
        state.timer_seq += 1;
        state.current = None;
        state.busy = false;
        state.phase = SearchPhase::Idle;
        debug!(last_generation = state.generation, "search cleared");
        let _ = self.inner.events.send(SearchEvent::Cleared);
    }

    pub fn phase(&self) -> SearchPhase {
        self.inner.state.lock().phase
    }

    pub fn is_busy(&self) -> bool {
        self.inner.state.lock().busy
    }

    /// Generation whose result would currently be published.
    pub fn current_generation(&self) -> Option<u64> {
        self.inner.state.lock().current
    }

    pub fn last_published_generation(&self) -> Option<u64> {
        self.inner.state.lock().last_published
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AccountCandidate;
    use tokio::sync::mpsc::error::TryRecvError;

    const DEBOUNCE: Duration = Duration::from_millis(220);

    async fn sleep_ms(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    /// Echoes the normalized query after a per-query delay.
    fn delayed_echo(delays: &'static [(&'static str, u64)]) -> impl Evaluator<Item = String> {
        FnEvaluator::new(move |query: Query| {
            let delay = delays
                .iter()
                .find(|(q, _)| *q == query.normalized())
                .map_or(0, |(_, ms)| *ms);
            async move {
                sleep_ms(delay).await;
                Ok::<_, SearchError>(vec![query.normalized().to_string()])
            }
        })
    }

    fn failing(message: &'static str) -> impl Evaluator<Item = String> {
        FnEvaluator::new(move |_query: Query| {
            std::future::ready(Err::<Vec<String>, _>(SearchError::Evaluation(message.into())))
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_keeps_only_last_keystroke() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        let evaluator = FnEvaluator::new(move |query: Query| {
            seen_clone.lock().push(query.normalized().to_string());
            std::future::ready(Ok::<_, SearchError>(vec![query.normalized().to_string()]))
        });
        let (session, mut rx) = SearchSession::new(evaluator, DEBOUNCE);

        for partial in ["n", "nv", "nvi", "nvid"] {
            session.update_query(partial);
            assert_eq!(session.phase(), SearchPhase::Pending);
            sleep_ms(100).await;
        }
        assert!(seen.lock().is_empty(), "nothing evaluates inside the quiet window");

        assert_eq!(rx.recv().await, Some(SearchEvent::Started { generation: 1 }));
        assert_eq!(
            rx.recv().await,
            Some(SearchEvent::Resolved {
                generation: 1,
                results: vec!["nvid".to_string()],
                notice: None,
            })
        );
        assert_eq!(*seen.lock(), vec!["nvid".to_string()]);
        assert_eq!(session.phase(), SearchPhase::Resolved);
        assert!(!session.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn test_out_of_order_completion_keeps_newest() {
        // "nv" is slow, "nvidia" is fast: G1 dispatched first, resolves last
        let (session, mut rx) = SearchSession::new(delayed_echo(&[("nv", 500), ("nvidia", 10)]), DEBOUNCE);

        session.update_query("nv");
        assert_eq!(rx.recv().await, Some(SearchEvent::Started { generation: 1 }));
        assert_eq!(session.phase(), SearchPhase::InFlight);

        session.update_query("nvidia");
        assert_eq!(rx.recv().await, Some(SearchEvent::Started { generation: 2 }));
        assert_eq!(
            rx.recv().await,
            Some(SearchEvent::Resolved {
                generation: 2,
                results: vec!["nvidia".to_string()],
                notice: None,
            })
        );

        // Let G1 finish well after G2 was published
        sleep_ms(1_000).await;
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
        assert_eq!(session.last_published_generation(), Some(2));
        assert_eq!(session.phase(), SearchPhase::Resolved);
        assert!(!session.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_result_leaves_busy_with_newer_generation() {
        let (session, mut rx) = SearchSession::new(delayed_echo(&[("nv", 500), ("nvidia", 2_000)]), DEBOUNCE);

        session.update_query("nv");
        assert_eq!(rx.recv().await, Some(SearchEvent::Started { generation: 1 }));
        session.update_query("nvidia");
        assert_eq!(rx.recv().await, Some(SearchEvent::Started { generation: 2 }));

        // G1 lands and is discarded; G2 is still running
        sleep_ms(600).await;
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
        assert!(session.is_busy());
        assert_eq!(session.phase(), SearchPhase::InFlight);
        assert_eq!(session.last_published_generation(), None);

        assert!(matches!(rx.recv().await, Some(SearchEvent::Resolved { generation: 2, .. })));
        assert!(!session.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_publishes_empty_with_notice() {
        let (session, mut rx) = SearchSession::new(failing("remote unavailable"), DEBOUNCE);

        session.update_query("nvidia");
        assert_eq!(rx.recv().await, Some(SearchEvent::Started { generation: 1 }));
        assert_eq!(
            rx.recv().await,
            Some(SearchEvent::Resolved {
                generation: 1,
                results: vec![],
                notice: Some("Search failed: remote unavailable".to_string()),
            })
        );
        assert!(!session.is_busy());
        assert_eq!(session.phase(), SearchPhase::Resolved);
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_failure_does_not_overwrite_newer_result() {
        let evaluator = FnEvaluator::new(|query: Query| async move {
            if query.normalized() == "nv" {
                sleep_ms(500).await;
                Err(SearchError::Evaluation("timeout".into()))
            } else {
                Ok(vec![query.normalized().to_string()])
            }
        });
        let (session, mut rx) = SearchSession::new(evaluator, DEBOUNCE);

        session.update_query("nv");
        assert_eq!(rx.recv().await, Some(SearchEvent::Started { generation: 1 }));
        session.update_query("nvidia");
        assert_eq!(rx.recv().await, Some(SearchEvent::Started { generation: 2 }));
        assert!(matches!(rx.recv().await, Some(SearchEvent::Resolved { generation: 2, notice: None, .. })));

        sleep_ms(1_000).await;
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
        assert_eq!(session.last_published_generation(), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_cancels_pending_timer() {
        let (session, mut rx) = SearchSession::new(delayed_echo(&[]), DEBOUNCE);

        session.update_query("nvidia");
        sleep_ms(100).await;
        session.update_query("   ");
        assert_eq!(rx.recv().await, Some(SearchEvent::Cleared));
        assert_eq!(session.phase(), SearchPhase::Idle);

        sleep_ms(1_000).await;
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty), "timer must not fire after clear");
        assert_eq!(session.current_generation(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_discards_in_flight_result() {
        let (session, mut rx) = SearchSession::new(delayed_echo(&[("nvidia", 500)]), DEBOUNCE);

        session.update_query("nvidia");
        assert_eq!(rx.recv().await, Some(SearchEvent::Started { generation: 1 }));
        assert!(session.is_busy());

        session.clear();
        assert_eq!(rx.recv().await, Some(SearchEvent::Cleared));
        assert!(!session.is_busy());

        sleep_ms(1_000).await;
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
        assert_eq!(session.phase(), SearchPhase::Idle);
        assert_eq!(session.last_published_generation(), None);

        // Generations keep counting after a clear
        session.update_query("nv");
        assert_eq!(rx.recv().await, Some(SearchEvent::Started { generation: 2 }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sessions_have_independent_generations() {
        let (accounts, mut accounts_rx) = SearchSession::new(delayed_echo(&[]), DEBOUNCE);
        let (posts, mut posts_rx) = SearchSession::new(delayed_echo(&[]), DEBOUNCE);

        accounts.update_query("jack");
        assert_eq!(accounts_rx.recv().await, Some(SearchEvent::Started { generation: 1 }));
        accounts_rx.recv().await;
        accounts.update_query("jill");
        assert_eq!(accounts_rx.recv().await, Some(SearchEvent::Started { generation: 2 }));

        posts.update_query("gpu");
        assert_eq!(posts_rx.recv().await, Some(SearchEvent::Started { generation: 1 }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_session_cancels_everything() {
        let (session, mut rx) = SearchSession::new(delayed_echo(&[("slow", 500)]), DEBOUNCE);
        session.update_query("slow");
        assert_eq!(rx.recv().await, Some(SearchEvent::Started { generation: 1 }));

        drop(session);
        // Sender lives in the session; once tasks wind down the channel closes
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_local_evaluator_ranks_snapshot() {
        let records = Arc::new(vec![
            AccountCandidate::new("jack", vec!["nvidianetworkng".into()]),
            AccountCandidate::new("amy", vec!["rustlang".into()]),
            AccountCandidate::new("jill", vec!["nvidia_news".into()]),
        ]);
        let config = SearchConfig::accounts();
        let (session, mut rx) =
            SearchSession::with_config(LocalEvaluator::new(Arc::clone(&records), config.clone()), &config);

        session.update_query("nvidia");
        assert_eq!(rx.recv().await, Some(SearchEvent::Started { generation: 1 }));
        match rx.recv().await {
            Some(SearchEvent::Resolved { generation, results, notice }) => {
                assert_eq!(generation, 1);
                assert!(notice.is_none());
                let owners: Vec<&str> = results.iter().map(|r| r.owner.as_str()).collect();
                assert_eq!(owners, ["jill", "jack"]);
            }
            other => panic!("expected Resolved, got {:?}", other),
        }
    }

    /// Sessions built outside any tokio runtime fall back to the global one.
    #[test]
    fn test_session_works_without_external_tokio_runtime() {
        let (session, mut rx) = SearchSession::new(delayed_echo(&[]), Duration::from_millis(5));
        session.update_query("nvidia");

        let started = futures::executor::block_on(rx.recv());
        assert_eq!(started, Some(SearchEvent::Started { generation: 1 }));
        let resolved = futures::executor::block_on(rx.recv());
        assert!(matches!(resolved, Some(SearchEvent::Resolved { generation: 1, .. })));
    }
}
