use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, info};

use crate::{
    error::AppError,
    state::FetchState,
    timings::{PrayerTimings, TimingsClient},
};

/// Owns the fetch state for one screen and the request currently in flight.
///
/// Each [`activate`](Self::activate) starts a new `Loading` state and exactly
/// one request. Older requests are aborted, and an activation generation
/// keeps any response that still slips through from overwriting newer state.
pub struct TimingsFetcher {
    client: Arc<TimingsClient>,
    state: Arc<watch::Sender<FetchState>>,
    generation: Arc<AtomicU64>,
    in_flight: Option<JoinHandle<()>>,
}

impl TimingsFetcher {
    pub fn new(client: TimingsClient) -> Self {
        let (state, _) = watch::channel(FetchState::Loading);
        Self {
            client: Arc::new(client),
            state: Arc::new(state),
            generation: Arc::new(AtomicU64::new(0)),
            in_flight: None,
        }
    }

    pub fn client(&self) -> &TimingsClient {
        &self.client
    }

    /// Starts a fresh fetch, superseding any fetch still in flight.
    ///
    /// Must be called from within a tokio runtime.
    pub fn activate(&mut self) -> watch::Receiver<FetchState> {
        self.cancel_in_flight();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_replace(FetchState::Loading);
        info!("Activation {} for {}", generation, self.client.config().address);

        let client = Arc::clone(&self.client);
        let state = Arc::clone(&self.state);
        let current = Arc::clone(&self.generation);
        self.in_flight = Some(tokio::spawn(async move {
            let outcome = client.fetch().await;
            publish(&state, &current, generation, outcome);
        }));

        self.state.subscribe()
    }

    /// Aborts the in-flight request; the state is left as it is.
    pub fn deactivate(&mut self) {
        if self.cancel_in_flight() {
            info!("Cancelled in-flight fetch for {}", self.client.config().address);
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> FetchState {
        self.state.borrow().clone()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Waits until the current activation reaches a terminal state.
    pub async fn wait_for_completion(&self) -> FetchState {
        let mut receiver = self.state.subscribe();
        // sender is owned by self, so the channel stays open
        match receiver.wait_for(FetchState::is_terminal).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        }
    }

    fn cancel_in_flight(&mut self) -> bool {
        self.generation.fetch_add(1, Ordering::SeqCst);
        match self.in_flight.take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            }
            _ => false,
        }
    }
}

/// Writes `outcome` for `generation` unless a newer activation started or a
/// terminal state was already published. Returns whether the state changed.
fn publish(
    state: &watch::Sender<FetchState>,
    current: &AtomicU64,
    generation: u64,
    outcome: Result<Option<PrayerTimings>, AppError>,
) -> bool {
    state.send_if_modified(|value| {
        if current.load(Ordering::SeqCst) != generation || value.is_terminal() {
            debug!("Dropping outcome of superseded activation {}", generation);
            return false;
        }
        *value = std::mem::take(value).transition(outcome);
        true
    })
}

impl Drop for TimingsFetcher {
    fn drop(&mut self) {
        self.deactivate();
    }
}
