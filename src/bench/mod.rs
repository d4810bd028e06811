//! Benchmark orchestration
//!
//! This module provides the benchmark execution engine:
//! - BenchmarkSpec: validated, immutable run specification
//! - RunMetrics: atomic counters shared by a run's workers
//! - Benchmark: the three runner entry points (connections, publish,
//!   subscribe), each spawning one task per simulated client

pub mod conn;
pub mod metrics;
pub mod publish;
pub mod spec;
pub mod subscribe;

pub use metrics::{throughput, MetricsSnapshot, RunMetrics, RunOutcome};
pub use spec::{BenchmarkSpec, QosLevel, SessionSettings, SpecOverride};

use std::sync::Arc;

use crate::client::SessionFactory;
use crate::shutdown::ShutdownSignal;

/// A configured benchmark, ready to run one of the three modes.
///
/// Each `run_*` entry point blocks the caller until every launched worker
/// has finished and the summary event has been emitted.
pub struct Benchmark<F: SessionFactory> {
    spec: Arc<BenchmarkSpec>,
    factory: Arc<F>,
    shutdown: ShutdownSignal,
}

impl<F: SessionFactory + 'static> Benchmark<F> {
    /// Benchmark without an external shutdown coordinator.
    pub fn new(spec: BenchmarkSpec, factory: F) -> Self {
        Self::with_shutdown(spec, factory, ShutdownSignal::disabled())
    }

    /// Benchmark wired to a caller-owned shutdown signal. Workers observe
    /// the signal at their suspension points and wind down cooperatively.
    pub fn with_shutdown(spec: BenchmarkSpec, factory: F, shutdown: ShutdownSignal) -> Self {
        Self {
            spec: Arc::new(spec),
            factory: Arc::new(factory),
            shutdown,
        }
    }

    pub fn spec(&self) -> &BenchmarkSpec {
        &self.spec
    }
}

#[cfg(test)]
pub(crate) mod testkit {
    use super::*;
    use crate::client::mock::{MockBehavior, MockFactory, MockLedger};
    use crate::config::BaseConfig;

    pub fn build_spec(overrides: Vec<SpecOverride>) -> BenchmarkSpec {
        BenchmarkSpec::build(&BaseConfig::default(), overrides).unwrap()
    }

    pub fn mock_benchmark(
        spec: BenchmarkSpec,
        behavior: MockBehavior,
    ) -> (Benchmark<MockFactory>, Arc<MockLedger>) {
        let factory = MockFactory::new(behavior);
        let ledger = Arc::clone(&factory.ledger);
        (Benchmark::new(spec, factory), ledger)
    }

    pub fn mock_benchmark_with_shutdown(
        spec: BenchmarkSpec,
        behavior: MockBehavior,
        shutdown: ShutdownSignal,
    ) -> (Benchmark<MockFactory>, Arc<MockLedger>) {
        let factory = MockFactory::new(behavior);
        let ledger = Arc::clone(&factory.ledger);
        (Benchmark::with_shutdown(spec, factory, shutdown), ledger)
    }
}
