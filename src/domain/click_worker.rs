//! Background click attribution worker.
//!
//! Redirect handlers push [`VisitEvent`]s into a bounded channel through
//! [`ClickQueue`]; [`run_click_worker`] drains it, attributing and storing
//! each visit with bounded concurrency and retrying transient store failures.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc};
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, error, info, warn};

use crate::application::services::ClickService;
use crate::domain::click_event::{VisitContext, VisitEvent};
use crate::domain::geolocation::GeoLocator;
use crate::domain::repositories::ClickRepository;

/// Store attempts after the first failure.
const STORE_RETRIES: usize = 3;

/// Sending half of the click channel, shared by request handlers.
#[derive(Clone)]
pub struct ClickQueue {
    sender: mpsc::Sender<VisitEvent>,
}

impl ClickQueue {
    /// Creates a queue holding at most `capacity` pending visits.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<VisitEvent>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, receiver)
    }

    /// Queues a visit without waiting.
    ///
    /// A full or closed queue drops the visit with an error log; the
    /// redirect itself is never affected.
    pub fn record_visit(&self, link_id: i64, ending: &str, target_url: &str, context: VisitContext) {
        let event = VisitEvent::new(link_id, ending.to_string(), target_url.to_string(), context);

        if let Err(e) = self.sender.try_send(event) {
            metrics::counter!("click_events_dropped_total").increment(1);
            error!(link_id, ending, "Dropping click event: {}", e);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Free slots left in the queue.
    pub fn capacity(&self) -> usize {
        self.sender.capacity()
    }
}

/// Runs until every [`ClickQueue`] is dropped and the channel is drained.
///
/// At most `concurrency` visits are attributed at once; geolocation latency
/// therefore limits throughput but never blocks the redirect path.
pub async fn run_click_worker<C, G>(
    mut rx: mpsc::Receiver<VisitEvent>,
    click_service: Arc<ClickService<C, G>>,
    concurrency: usize,
) where
    C: ClickRepository + ?Sized + 'static,
    G: GeoLocator + ?Sized + 'static,
{
    let permits = Arc::new(Semaphore::new(concurrency.max(1)));
    info!(concurrency, "Click worker started");

    while let Some(event) = rx.recv().await {
        let Ok(permit) = Arc::clone(&permits).acquire_owned().await else {
            break;
        };
        let service = Arc::clone(&click_service);

        tokio::spawn(async move {
            let _permit = permit;
            process(&service, event).await;
        });
    }

    // Wait for in-flight attributions before returning.
    let _ = permits.acquire_many(concurrency.max(1) as u32).await;
    info!("Click worker stopped");
}

async fn process<C, G>(service: &ClickService<C, G>, event: VisitEvent)
where
    C: ClickRepository + ?Sized,
    G: GeoLocator + ?Sized,
{
    let click = service.attribute(&event).await;

    let strategy = ExponentialBackoff::from_millis(10)
        .max_delay(Duration::from_secs(1))
        .map(jitter)
        .take(STORE_RETRIES);

    let result = Retry::spawn(strategy, || {
        let click = click.clone();
        async move {
            service.store(click).await.inspect_err(|e| {
                warn!(link_id = event.link_id, "Click insert failed, retrying: {}", e);
            })
        }
    })
    .await;

    match result {
        Ok(stored) => {
            metrics::counter!("clicks_recorded_total").increment(1);
            debug!(click_id = stored.id, ending = %stored.ending, "Recorded click");
        }
        Err(e) => {
            metrics::counter!("click_events_failed_total").increment(1);
            error!(link_id = event.link_id, ending = %event.ending, "Failed to record click: {}", e);
        }
    }
}
