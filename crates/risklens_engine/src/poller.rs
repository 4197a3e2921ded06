use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use risklens_core::{
    update, AppState, CycleId, CycleOutcome, DashboardViewModel, Effect, Msg, RefreshTrigger,
    DEFAULT_SOURCE_TAGS,
};
use risklens_logging::{lens_debug, lens_error, lens_info, lens_warn};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, timeout, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{fetch_feeds, FeedEndpoints, Fetcher};

#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub refresh_interval: Duration,
    /// Upper bound for one cycle; hitting it counts as a failed fetch.
    pub cycle_timeout: Duration,
    pub source_tags: Vec<String>,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(30),
            cycle_timeout: Duration::from_secs(10),
            source_tags: DEFAULT_SOURCE_TAGS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// Owner-side handle of a running poller. Dropping it also stops the poller,
/// but only `shutdown` waits for the task to finish.
pub struct PollerHandle {
    refresh_tx: mpsc::UnboundedSender<RefreshTrigger>,
    view_rx: watch::Receiver<DashboardViewModel>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Requests a manual cycle. Ignored if one is already in flight.
    pub fn refresh(&self) {
        if self.refresh_tx.send(RefreshTrigger::Manual).is_err() {
            lens_warn!("Manual refresh requested after the poller stopped");
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardViewModel> {
        self.view_rx.clone()
    }

    pub fn snapshot(&self) -> DashboardViewModel {
        self.view_rx.borrow().clone()
    }

    /// Stops the timer, aborts any in-flight cycle and waits for the task.
    /// Nothing is published after this returns.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(err) = self.task.await {
            lens_warn!("Poller task ended abnormally: {}", err);
        }
    }
}

/// Starts the poller on the current tokio runtime. The first cycle runs
/// immediately.
pub fn spawn_poller(
    fetcher: Arc<dyn Fetcher>,
    endpoints: FeedEndpoints,
    config: PollerConfig,
) -> PollerHandle {
    let state = AppState::with_source_tags(&config.source_tags);
    let (view_tx, view_rx) = watch::channel(state.view());
    let (refresh_tx, refresh_rx) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();

    let poller = Poller {
        fetcher,
        endpoints: Arc::new(endpoints),
        refresh_interval: config.refresh_interval,
        cycle_timeout: config.cycle_timeout,
        state,
        view_tx,
        cancel: cancel.clone(),
    };
    let task = tokio::spawn(poller.run(refresh_rx));

    PollerHandle {
        refresh_tx,
        view_rx,
        cancel,
        task,
    }
}

struct Poller {
    fetcher: Arc<dyn Fetcher>,
    endpoints: Arc<FeedEndpoints>,
    refresh_interval: Duration,
    cycle_timeout: Duration,
    state: AppState,
    view_tx: watch::Sender<DashboardViewModel>,
    cancel: CancellationToken,
}

impl Poller {
    async fn run(mut self, mut refresh_rx: mpsc::UnboundedReceiver<RefreshTrigger>) {
        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Msg>();
        let mut in_flight: Option<(CycleId, JoinHandle<()>)> = None;
        // `interval` panics on a zero period.
        let mut ticker = interval(self.refresh_interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut started = false;

        lens_info!(
            "Poller started events={} summary={} interval={:?}",
            self.endpoints.events,
            self.endpoints.summary,
            self.refresh_interval
        );

        loop {
            let msg = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                Some(msg) = done_rx.recv() => {
                    in_flight = None;
                    msg
                }
                joined = join_cycle(&mut in_flight), if in_flight.is_some() => {
                    in_flight = None;
                    match joined {
                        Some(msg) => msg,
                        // Finished normally; its completion is already queued.
                        None => continue,
                    }
                }
                _ = ticker.tick() => {
                    let trigger = if started {
                        RefreshTrigger::Scheduled
                    } else {
                        RefreshTrigger::Startup
                    };
                    started = true;
                    Msg::RefreshRequested { trigger }
                }
                trigger = refresh_rx.recv() => match trigger {
                    Some(trigger) => Msg::RefreshRequested { trigger },
                    // Handle dropped.
                    None => break,
                },
            };

            self.log_incoming(&msg);
            let (state, effects) = update(std::mem::take(&mut self.state), msg);
            self.state = state;

            for effect in effects {
                match effect {
                    Effect::StartCycle { cycle_id } => {
                        lens_debug!("Cycle {} started", cycle_id);
                        in_flight = Some((cycle_id, self.spawn_cycle(cycle_id, done_tx.clone())));
                    }
                }
            }

            if self.state.consume_dirty() {
                self.view_tx.send_replace(self.state.view());
            }
        }

        if let Some((_, handle)) = in_flight.take() {
            handle.abort();
        }
        lens_info!("Poller stopped");
    }

    fn spawn_cycle(
        &self,
        cycle_id: CycleId,
        done_tx: mpsc::UnboundedSender<Msg>,
    ) -> JoinHandle<()> {
        let fetcher = self.fetcher.clone();
        let endpoints = self.endpoints.clone();
        let limit = self.cycle_timeout;

        tokio::spawn(async move {
            let outcome = match timeout(limit, fetch_feeds(fetcher.as_ref(), &endpoints)).await {
                Ok(Ok(snapshot)) => CycleOutcome::Fetched {
                    events: snapshot.events,
                    summary: snapshot.summary,
                },
                Ok(Err(err)) => CycleOutcome::Failed {
                    reason: err.to_string(),
                },
                Err(_) => CycleOutcome::Failed {
                    reason: format!("cycle timed out after {} ms", limit.as_millis()),
                },
            };
            let _ = done_tx.send(Msg::CycleCompleted {
                cycle_id,
                outcome,
                completed_at: Utc::now(),
            });
        })
    }

    fn log_incoming(&self, msg: &Msg) {
        match msg {
            Msg::RefreshRequested { trigger } => {
                if let Some(cycle_id) = self.state.in_flight() {
                    lens_debug!(
                        "Refresh {:?} ignored: cycle {} still in flight",
                        trigger,
                        cycle_id
                    );
                }
            }
            Msg::CycleCompleted {
                cycle_id,
                outcome: CycleOutcome::Fetched { events, .. },
                ..
            } => {
                lens_info!("Cycle {} fetched {} events", cycle_id, events.len());
            }
            Msg::CycleCompleted {
                cycle_id,
                outcome: CycleOutcome::Failed { reason },
                ..
            } => {
                lens_warn!("Cycle {} failed, serving fallback data: {}", cycle_id, reason);
            }
        }
    }
}

/// Waits for the in-flight cycle task. A task that died before reporting
/// back is turned into a failed completion so `loading` cannot stick.
async fn join_cycle(in_flight: &mut Option<(CycleId, JoinHandle<()>)>) -> Option<Msg> {
    let (cycle_id, handle) = in_flight.as_mut()?;
    let err = handle.await.err()?;
    lens_error!("Cycle {} task died: {}", cycle_id, err);
    let reason = if err.is_panic() {
        "cycle task panicked"
    } else {
        "cycle task cancelled"
    };
    Some(Msg::CycleCompleted {
        cycle_id: *cycle_id,
        outcome: CycleOutcome::Failed {
            reason: reason.to_string(),
        },
        completed_at: Utc::now(),
    })
}
