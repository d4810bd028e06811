//! Subscribe benchmark runner
//!
//! All workers launch at once, register a subscription, and stay
//! listening for a fixed dwell window sized from the spec: delay x
//! message count when a delay is configured, otherwise a 5 second
//! fallback. The window is a best-effort timer, never a completion
//! condition: reaching the expected message count does not end it early.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info};

use super::metrics::{throughput, RunMetrics, RunOutcome};
use super::{Benchmark, BenchmarkSpec};
use crate::client::{MessageCallback, SessionClient, SessionFactory};
use crate::shutdown::ShutdownSignal;

const FALLBACK_DWELL: Duration = Duration::from_secs(5);

impl<F: SessionFactory + 'static> Benchmark<F> {
    /// Run the subscribe benchmark, blocking until every worker's dwell
    /// window has elapsed.
    pub async fn run_subscribe(&self) {
        let outcome = self.execute_subscribe().await;
        info!(
            clients = self.spec.clients,
            expected = self.spec.total_messages(),
            received = outcome.metrics.received,
            failed = outcome.metrics.failed,
            elapsedSec = outcome.elapsed.as_secs_f64(),
            throughputMsgPerSec = throughput(outcome.metrics.received, outcome.elapsed),
            "finished subscribe benchmark"
        );
    }

    pub(crate) async fn execute_subscribe(&self) -> RunOutcome {
        let metrics = Arc::new(RunMetrics::new());
        info!(
            clients = self.spec.clients,
            topic = %self.spec.topic,
            "started subscribe benchmark"
        );

        let workers: Vec<_> = (0..self.spec.clients)
            .map(|index| {
                let factory = Arc::clone(&self.factory);
                let spec = Arc::clone(&self.spec);
                let metrics = Arc::clone(&metrics);
                let shutdown = self.shutdown.clone();
                tokio::spawn(async move {
                    subscribe_worker(factory, spec, index, metrics, shutdown).await;
                })
            })
            .collect();

        for worker in workers {
            let _ = worker.await;
        }

        RunOutcome {
            metrics: metrics.snapshot(),
            elapsed: metrics.elapsed(),
        }
    }
}

fn dwell_window(spec: &BenchmarkSpec) -> Duration {
    if spec.delay_ms > 0 {
        Duration::from_millis(spec.delay_ms * u64::from(spec.message_count))
    } else {
        FALLBACK_DWELL
    }
}

async fn subscribe_worker<F: SessionFactory>(
    factory: Arc<F>,
    spec: Arc<BenchmarkSpec>,
    index: u32,
    metrics: Arc<RunMetrics>,
    mut shutdown: ShutdownSignal,
) {
    let settings = spec.session(index);
    let mut client = factory.create(&settings);

    if let Err(err) = client.connect().await {
        metrics.record_failed(1);
        error!(
            client_id = %settings.client_id,
            error = %err,
            "subscriber connection failed"
        );
        client.disconnect().await;
        return;
    }
    info!(client_id = %settings.client_id, "connected");

    let on_message: MessageCallback = {
        let metrics = Arc::clone(&metrics);
        let client_id = settings.client_id.clone();
        let topic = spec.topic.clone();
        Box::new(move |payload: &str| {
            metrics.record_received();
            debug!(client_id = %client_id, topic = %topic, payload = %payload, "received");
        })
    };

    if let Err(err) = client
        .subscribe(&spec.topic, spec.qos, spec.retained, on_message)
        .await
    {
        metrics.record_failed(1);
        error!(client_id = %settings.client_id, error = %err, "failed to subscribe");
        client.disconnect().await;
        return;
    }

    shutdown.sleep(dwell_window(&spec)).await;
    client.disconnect().await;
}
