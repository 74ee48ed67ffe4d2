use crate::data::collector::{PollError, TelemetryClient};
use crate::data::snapshot::{Channel, TelemetrySnapshot};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Duration;

pub mod collector;
pub mod history;
pub mod metrics;
pub mod persist;
pub mod snapshot;

/// Most recent snapshot received by the poller, if any.
pub type LatestSnapshot = watch::Receiver<Option<Arc<TelemetrySnapshot>>>;

/// What the poller hands to the presentation side after each cycle.
#[derive(Debug, Clone)]
pub enum PollEvent {
    Snapshot(Arc<TelemetrySnapshot>),
    Failed(String),
}

/// Background loop: resolve, fetch, publish, sleep.
pub struct Poller {
    client: TelemetryClient,
    endpoint: watch::Receiver<String>,
    delay: Duration,
}

impl Poller {
    pub fn new(client: TelemetryClient, endpoint: watch::Receiver<String>, delay: Duration) -> Self {
        Self {
            client,
            endpoint,
            delay,
        }
    }

    /// Spawn the loop on the runtime and return the handle that controls it.
    pub fn spawn(self, sender: mpsc::UnboundedSender<PollEvent>) -> PollerHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let (latest_tx, latest_rx) = watch::channel(None);
        let task = tokio::spawn(self.run(sender, latest_tx, stop_rx));
        PollerHandle {
            stop: stop_tx,
            latest: latest_rx,
            task,
        }
    }

    async fn run(
        self,
        sender: mpsc::UnboundedSender<PollEvent>,
        latest: watch::Sender<Option<Arc<TelemetrySnapshot>>>,
        mut stop: watch::Receiver<bool>,
    ) {
        tracing::info!("poller started");

        while !*stop.borrow() {
            // Edits made while the previous cycle ran apply from here on.
            let resolver_url = self.endpoint.borrow().clone();
            let outcome = self.client.poll_once(&resolver_url).await;

            if *stop.borrow() {
                break;
            }

            let event = match outcome {
                Ok(snapshot) => {
                    tracing::debug!("received snapshot with {} channels", Self::known_fields(&snapshot));
                    let snapshot = Arc::new(snapshot);
                    latest.send_replace(Some(snapshot.clone()));
                    PollEvent::Snapshot(snapshot)
                }
                Err(err) => {
                    Self::log_failure(&resolver_url, &err);
                    PollEvent::Failed(err.to_string())
                }
            };

            if sender.send(event).is_err() {
                // Receiver dropped, exit the loop
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.delay) => {}
                changed = stop.changed() => {
                    if changed.is_err() {
                        // handle dropped without an explicit stop
                        break;
                    }
                }
            }
        }

        tracing::info!("poller stopped");
    }

    fn known_fields(snapshot: &TelemetrySnapshot) -> usize {
        Channel::ALL
            .iter()
            .filter(|channel| snapshot.raw(channel.name()).is_some())
            .count()
    }

    fn log_failure(resolver_url: &str, err: &PollError) {
        match err {
            PollError::MissingApiUrl => {
                tracing::warn!(resolver = resolver_url, "skipping cycle: {}", err)
            }
            _ => tracing::warn!(resolver = resolver_url, "poll cycle failed: {}", err),
        }
    }
}

/// Owner-side controls for a running [`Poller`].
pub struct PollerHandle {
    stop: watch::Sender<bool>,
    latest: watch::Receiver<Option<Arc<TelemetrySnapshot>>>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Read side of the latest-snapshot slot.
    pub fn latest(&self) -> LatestSnapshot {
        self.latest.clone()
    }

    /// Ask the loop to finish and wait until it has. An in-flight request is
    /// allowed to complete but its result is discarded.
    pub async fn stop(self) {
        self.stop.send_replace(true);
        if let Err(err) = self.task.await {
            tracing::error!("poller task ended abnormally: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::collector::REQUEST_TIMEOUT;
    use crate::test_support::{MockService, Route};
    use serde_json::json;

    fn start(
        resolver_url: String,
        delay: Duration,
    ) -> (
        PollerHandle,
        mpsc::UnboundedReceiver<PollEvent>,
        watch::Sender<String>,
    ) {
        let (endpoint_tx, endpoint_rx) = watch::channel(resolver_url);
        let (tx, rx) = mpsc::unbounded_channel();
        let client = TelemetryClient::new(REQUEST_TIMEOUT).unwrap();
        let handle = Poller::new(client, endpoint_rx, delay).spawn(tx);
        (handle, rx, endpoint_tx)
    }

    #[tokio::test]
    async fn test_publishes_snapshots_and_updates_latest() {
        let service = MockService::start(
            Route::resolver_to_self(),
            Route::json(json!({"V_Main": 12.0, "I_Total": 2.0})),
        )
        .await;
        let (handle, mut rx, _endpoint) = start(service.resolver_url(), Duration::from_millis(20));

        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        match event {
            PollEvent::Snapshot(snapshot) => assert_eq!(snapshot.value(Channel::VMain), 12.0),
            other => panic!("expected snapshot, got {:?}", other),
        }
        let latest = handle.latest();
        assert!(latest.borrow().is_some());
        handle.stop().await;
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_the_loop() {
        let service = MockService::start(Route::resolver_to_self(), Route::not_found()).await;
        let (handle, mut rx, _endpoint) = start(service.resolver_url(), Duration::from_millis(10));

        for _ in 0..3 {
            let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
                .await
                .unwrap()
                .unwrap();
            assert!(matches!(event, PollEvent::Failed(_)));
        }
        assert!(handle.latest().borrow().is_none());

        service.set_data(Route::json(json!({"Temp1": 31.5})));
        let snapshot = loop {
            match tokio::time::timeout(Duration::from_secs(5), rx.recv())
                .await
                .unwrap()
                .unwrap()
            {
                PollEvent::Snapshot(snapshot) => break snapshot,
                PollEvent::Failed(_) => continue,
            }
        };
        assert_eq!(snapshot.value(Channel::Temp1), 31.5);
        handle.stop().await;
    }

    #[tokio::test]
    async fn test_endpoint_edit_applies_on_next_cycle() {
        let good = MockService::start(
            Route::resolver_to_self(),
            Route::json(json!({"V_Main": 5.0})),
        )
        .await;
        let (handle, mut rx, endpoint) =
            start("http://127.0.0.1:9/unreachable".to_string(), Duration::from_millis(10));

        let first = tokio::time::timeout(Duration::from_secs(10), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(first, PollEvent::Failed(_)));

        endpoint.send_replace(good.resolver_url());
        let snapshot = loop {
            match tokio::time::timeout(Duration::from_secs(10), rx.recv())
                .await
                .unwrap()
                .unwrap()
            {
                PollEvent::Snapshot(snapshot) => break snapshot,
                PollEvent::Failed(_) => continue,
            }
        };
        assert_eq!(snapshot.value(Channel::VMain), 5.0);
        assert!(good.resolver_hits() >= 1);
        handle.stop().await;
    }

    #[tokio::test]
    async fn test_stop_waits_for_in_flight_fetch_and_publishes_nothing_after() {
        let service = MockService::start(
            Route::resolver_to_self(),
            Route::json(json!({"V_Main": 1.0})).delayed(Duration::from_millis(300)),
        )
        .await;
        let (handle, mut rx, _endpoint) = start(service.resolver_url(), Duration::from_millis(10));

        tokio::time::timeout(Duration::from_secs(5), service.data_request_started())
            .await
            .unwrap();
        let started = std::time::Instant::now();
        handle.stop().await;
        // stop blocked until the slow response came back
        assert!(started.elapsed() >= Duration::from_millis(200));

        // the sender went away with the task, and the in-flight result was dropped
        assert!(rx.recv().await.is_none());
        assert_eq!(service.data_hits(), 1);
    }

    #[tokio::test]
    async fn test_loop_ends_when_receiver_is_dropped() {
        let service = MockService::start(Route::resolver_to_self(), Route::json(json!({}))).await;
        let (handle, rx, _endpoint) = start(service.resolver_url(), Duration::from_millis(5));
        drop(rx);
        tokio::time::timeout(Duration::from_secs(5), async {
            while !handle.task.is_finished() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();
        handle.stop().await;
    }
}
