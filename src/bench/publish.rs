//! Publish benchmark runner
//!
//! All workers launch at once, each publishing a fixed per-client quota.
//! A worker that fails to connect forfeits its entire quota as failed
//! messages; a single failed publish costs one message and the worker
//! keeps going. Delivery accounting is exactly-once per attempt: either
//! the delivery callback fires or the publish call returns an error,
//! never both.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use super::metrics::{throughput, RunMetrics, RunOutcome};
use super::{Benchmark, BenchmarkSpec};
use crate::client::{DeliveryCallback, SessionClient, SessionFactory};
use crate::shutdown::ShutdownSignal;

impl<F: SessionFactory + 'static> Benchmark<F> {
    /// Run the publish benchmark, blocking until every worker has
    /// finished its quota (or wound down on shutdown).
    pub async fn run_publish(&self) {
        let outcome = self.execute_publish().await;
        let total = self.spec.total_messages();
        info!(
            clients = self.spec.clients,
            messagesPerClient = self.spec.message_count,
            totalMessages = total,
            successful = outcome.metrics.succeeded,
            failed = outcome.metrics.failed,
            elapsedSec = outcome.elapsed.as_secs_f64(),
            throughputMsgPerSec = throughput(total, outcome.elapsed),
            "finished publish benchmark"
        );
    }

    pub(crate) async fn execute_publish(&self) -> RunOutcome {
        let metrics = Arc::new(RunMetrics::new());
        info!(
            clients = self.spec.clients,
            messagesPerClient = self.spec.message_count,
            "started publish benchmark"
        );

        let workers: Vec<_> = (0..self.spec.clients)
            .map(|index| {
                let factory = Arc::clone(&self.factory);
                let spec = Arc::clone(&self.spec);
                let metrics = Arc::clone(&metrics);
                let shutdown = self.shutdown.clone();
                tokio::spawn(async move {
                    publish_worker(factory, spec, index, metrics, shutdown).await;
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

async fn publish_worker<F: SessionFactory>(
    factory: Arc<F>,
    spec: Arc<BenchmarkSpec>,
    index: u32,
    metrics: Arc<RunMetrics>,
    mut shutdown: ShutdownSignal,
) {
    let settings = spec.session(index);
    let mut client = factory.create(&settings);

    if let Err(err) = client.connect().await {
        // The whole intended quota is forfeited: no partial credit.
        metrics.record_failed(u64::from(spec.message_count));
        error!(
            client_id = %settings.client_id,
            error = %err,
            "couldn't establish client"
        );
        client.disconnect().await;
        return;
    }
    info!(client_id = %settings.client_id, "connected");

    for _ in 0..spec.message_count {
        if spec.delay_ms > 0 {
            if !shutdown
                .sleep(Duration::from_millis(spec.delay_ms))
                .await
            {
                break;
            }
        } else if shutdown.is_signaled() {
            break;
        }

        let on_delivered: DeliveryCallback = {
            let metrics = Arc::clone(&metrics);
            let client_id = settings.client_id.clone();
            let topic = spec.topic.clone();
            let qos = spec.qos.as_u8();
            Box::new(move || {
                metrics.record_succeeded(1);
                info!(client_id = %client_id, topic = %topic, qos, "published");
            })
        };

        if let Err(err) = client
            .publish(
                &spec.topic,
                spec.qos,
                spec.retained,
                &spec.message,
                on_delivered,
            )
            .await
        {
            metrics.record_failed(1);
            error!(client_id = %settings.client_id, error = %err, "failed to publish message");
        }
    }

    client.disconnect().await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bench::testkit::{build_spec, mock_benchmark, mock_benchmark_with_shutdown};
    use crate::bench::SpecOverride;
    use crate::client::mock::MockBehavior;
    use crate::shutdown;
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn every_delivery_is_counted_once() {
        // Scenario: 1 client, no delay, 3 messages, broker always
        // connects and delivers.
        let spec = build_spec(vec![
            SpecOverride::Clients(1),
            SpecOverride::Delay(0),
            SpecOverride::MessageCount(3),
        ]);
        let (bench, ledger) = mock_benchmark(spec, MockBehavior::default());
        let outcome = bench.execute_publish().await;

        assert_eq!(outcome.metrics.succeeded, 3);
        assert_eq!(outcome.metrics.failed, 0);
        assert_eq!(ledger.publishes.load(Ordering::Relaxed), 3);
        assert_eq!(ledger.disconnects.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn connect_failure_forfeits_the_full_quota() {
        // Scenario: 3 clients x 2 messages, every connect fails.
        let spec = build_spec(vec![
            SpecOverride::Clients(3),
            SpecOverride::Delay(0),
            SpecOverride::MessageCount(2),
        ]);
        let (bench, ledger) = mock_benchmark(
            spec,
            MockBehavior {
                fail_connect: true,
                ..MockBehavior::default()
            },
        );
        let outcome = bench.execute_publish().await;

        assert_eq!(outcome.metrics.failed, 6);
        assert_eq!(outcome.metrics.succeeded, 0);
        assert_eq!(ledger.publishes.load(Ordering::Relaxed), 0);
        // Connections are released even after a failed connect.
        assert_eq!(ledger.disconnects.load(Ordering::Relaxed), 3);
    }

    #[tokio::test]
    async fn publish_errors_cost_one_message_and_the_loop_continues() {
        let spec = build_spec(vec![
            SpecOverride::Clients(2),
            SpecOverride::Delay(0),
            SpecOverride::MessageCount(4),
        ]);
        let (bench, ledger) = mock_benchmark(
            spec,
            MockBehavior {
                fail_publish: true,
                ..MockBehavior::default()
            },
        );
        let outcome = bench.execute_publish().await;

        // Each attempt errored; the error return and the delivery callback
        // are mutually exclusive, so nothing lands in succeeded.
        assert_eq!(outcome.metrics.failed, 8);
        assert_eq!(outcome.metrics.succeeded, 0);
        assert_eq!(ledger.disconnects.load(Ordering::Relaxed), 2);
    }

    #[tokio::test]
    async fn undelivered_publishes_are_never_double_counted() {
        // Publish calls succeed locally but the broker never confirms:
        // neither counter moves for those attempts.
        let spec = build_spec(vec![
            SpecOverride::Clients(1),
            SpecOverride::Delay(0),
            SpecOverride::MessageCount(5),
        ]);
        let (bench, _ledger) = mock_benchmark(
            spec,
            MockBehavior {
                deliver: false,
                ..MockBehavior::default()
            },
        );
        let outcome = bench.execute_publish().await;

        assert_eq!(outcome.metrics.succeeded, 0);
        assert_eq!(outcome.metrics.failed, 0);
    }

    #[tokio::test]
    async fn shutdown_mid_run_stops_the_message_loop() {
        let spec = build_spec(vec![
            SpecOverride::Clients(2),
            SpecOverride::Delay(50),
            SpecOverride::MessageCount(1000),
        ]);
        let (controller, signal) = shutdown::channel();
        let (bench, ledger) =
            mock_benchmark_with_shutdown(spec, MockBehavior::default(), signal);

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(150)).await;
            controller.signal();
        });

        let outcome = bench.execute_publish().await;
        assert!(outcome.metrics.succeeded < 2000);
        // Both workers released their connections on the way out.
        assert_eq!(ledger.disconnects.load(Ordering::Relaxed), 2);
    }
}
