//! Connection benchmark runner
//!
//! Measures pure connection establishment: each worker connects once,
//! logs the outcome, and releases the session. Launches are staggered by
//! the configured delay to avoid a connection burst; the stagger applies
//! after every launch, including the last.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use super::metrics::{RunMetrics, RunOutcome};
use super::{Benchmark, SessionSettings};
use crate::client::{SessionClient, SessionFactory};

impl<F: SessionFactory + 'static> Benchmark<F> {
    /// Run the connection benchmark, blocking until every launched worker
    /// has finished.
    pub async fn run_connections(&self) {
        let outcome = self.execute_connections().await;
        info!(
            clients = self.spec.clients,
            successful = outcome.metrics.succeeded,
            failed = outcome.metrics.failed,
            elapsedSec = outcome.elapsed.as_secs_f64(),
            "finished connection benchmark"
        );
    }

    pub(crate) async fn execute_connections(&self) -> RunOutcome {
        let metrics = Arc::new(RunMetrics::new());
        info!(
            clients = self.spec.clients,
            delay_ms = self.spec.delay_ms,
            "started connection benchmark"
        );

        let mut workers = Vec::with_capacity(self.spec.clients as usize);
        let mut launcher = self.shutdown.clone();
        for index in 0..self.spec.clients {
            if launcher.is_signaled() {
                warn!(
                    launched = workers.len(),
                    "shutdown signaled, not launching remaining workers"
                );
                break;
            }
            let factory = Arc::clone(&self.factory);
            let settings = self.spec.session(index);
            let metrics = Arc::clone(&metrics);
            workers.push(tokio::spawn(async move {
                connect_worker(factory, settings, metrics).await;
            }));
            launcher
                .sleep(Duration::from_millis(self.spec.delay_ms))
                .await;
        }

        // Completion barrier: the summary is emitted only after every
        // launched worker has returned.
        for worker in workers {
            let _ = worker.await;
        }

        RunOutcome {
            metrics: metrics.snapshot(),
            elapsed: metrics.elapsed(),
        }
    }
}

async fn connect_worker<F: SessionFactory>(
    factory: Arc<F>,
    settings: SessionSettings,
    metrics: Arc<RunMetrics>,
) {
    let mut client = factory.create(&settings);
    match client.connect().await {
        Ok(()) => {
            metrics.record_succeeded(1);
            info!(client_id = %settings.client_id, "connected");
        }
        Err(err) => {
            metrics.record_failed(1);
            error!(
                client_id = %settings.client_id,
                error = %err,
                state = "failed",
                "couldn't establish client"
            );
        }
    }
    client.disconnect().await;
}
