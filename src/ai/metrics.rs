//! Pipeline Metrics Collection
//!
//! Aggregates model usage (calls, tokens, latency, cost) for one pipeline,
//! summed over every run it has made.
//! Counters are atomics so a collector can be shared behind an `Arc` and read
//! while the run is still in progress.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Instant;

use crate::ai::provider::LlmResponse;
use crate::types::StepId;

// =============================================================================
// Metrics Collector
// =============================================================================

pub struct MetricsCollector {
    pipeline_id: String,
    start_time: Instant,
    api_calls: AtomicU32,
    failures: AtomicU32,
    input_tokens: AtomicU64,
    output_tokens: AtomicU64,
    total_latency_ms: AtomicU64,
    /// Stored as microdollars so it fits an atomic
    total_cost_micros: AtomicU64,
    stages: RwLock<Vec<StageMetrics>>,
}

/// Usage of a single completed stage
#[derive(Debug, Clone, PartialEq)]
pub struct StageMetrics {
    pub step: StepId,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub duration_ms: u64,
    pub cost_usd: f64,
}

#[derive(Debug, Clone)]
pub struct MetricsSummary {
    pub pipeline_id: String,
    pub total_duration_ms: u64,
    pub api_calls: u32,
    pub failures: u32,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
    pub avg_latency_ms: f64,
    pub total_cost_usd: f64,
    pub stages: Vec<StageMetrics>,
}

impl MetricsCollector {
    pub fn new(pipeline_id: impl Into<String>) -> Self {
        Self {
            pipeline_id: pipeline_id.into(),
            start_time: Instant::now(),
            api_calls: AtomicU32::new(0),
            failures: AtomicU32::new(0),
            input_tokens: AtomicU64::new(0),
            output_tokens: AtomicU64::new(0),
            total_latency_ms: AtomicU64::new(0),
            total_cost_micros: AtomicU64::new(0),
            stages: RwLock::new(Vec::new()),
        }
    }

    /// Record a successful model call
    pub fn record_response(&self, response: &LlmResponse) {
        self.api_calls.fetch_add(1, Ordering::Relaxed);
        self.input_tokens
            .fetch_add(u64::from(response.usage.input_tokens), Ordering::Relaxed);
        self.output_tokens
            .fetch_add(u64::from(response.usage.output_tokens), Ordering::Relaxed);
        self.total_latency_ms
            .fetch_add(response.timing.total_ms, Ordering::Relaxed);

        let cost_micros = (response.cost_usd * 1_000_000.0) as u64;
        self.total_cost_micros
            .fetch_add(cost_micros, Ordering::Relaxed);
    }

    /// Record a completed stage along with its response usage
    pub fn record_stage(&self, step: StepId, response: &LlmResponse) {
        self.record_response(response);

        let mut stages = self.stages.write().unwrap_or_else(|poisoned| {
            tracing::error!("Metrics stages RwLock poisoned, recovering");
            poisoned.into_inner()
        });
        stages.push(StageMetrics {
            step,
            input_tokens: u64::from(response.usage.input_tokens),
            output_tokens: u64::from(response.usage.output_tokens),
            duration_ms: response.timing.total_ms,
            cost_usd: response.cost_usd,
        });
    }

    /// Record a call that ended in an error or was cancelled
    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSummary {
        let api_calls = self.api_calls.load(Ordering::Relaxed);
        let input_tokens = self.input_tokens.load(Ordering::Relaxed);
        let output_tokens = self.output_tokens.load(Ordering::Relaxed);
        let total_latency = self.total_latency_ms.load(Ordering::Relaxed);

        let avg_latency_ms = if api_calls > 0 {
            total_latency as f64 / f64::from(api_calls)
        } else {
            0.0
        };

        let stages = self
            .stages
            .read()
            .unwrap_or_else(|poisoned| {
                tracing::error!("Metrics stages RwLock poisoned on read, recovering");
                poisoned.into_inner()
            })
            .clone();

        MetricsSummary {
            pipeline_id: self.pipeline_id.clone(),
            total_duration_ms: self.start_time.elapsed().as_millis() as u64,
            api_calls,
            failures: self.failures.load(Ordering::Relaxed),
            input_tokens,
            output_tokens,
            total_tokens: input_tokens + output_tokens,
            avg_latency_ms,
            total_cost_usd: self.total_cost_micros.load(Ordering::Relaxed) as f64 / 1_000_000.0,
            stages,
        }
    }
}

impl MetricsSummary {
    pub fn display(&self) -> String {
        format!(
            "Pipeline: {}\n\
             Duration: {:.1}s\n\
             Model Calls: {} ({} failed)\n\
             Tokens: {} (input: {}, output: {})\n\
             Avg Latency: {:.0}ms\n\
             Estimated Cost: ${:.4}",
            self.pipeline_id,
            self.total_duration_ms as f64 / 1000.0,
            self.api_calls,
            self.failures,
            self.total_tokens,
            self.input_tokens,
            self.output_tokens,
            self.avg_latency_ms,
            self.total_cost_usd
        )
    }
}

pub type SharedMetrics = Arc<MetricsCollector>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::{ResponseMetadata, ResponseTiming, TokenUsage};

    fn response(input: u32, output: u32, ms: u64, cost: f64) -> LlmResponse {
        let mut response = LlmResponse::with_metrics(
            "{}".to_string(),
            TokenUsage::new(input, output),
            ResponseTiming { total_ms: ms },
            ResponseMetadata::default(),
        );
        response.cost_usd = cost;
        response
    }

    #[test]
    fn test_record_stage() {
        let metrics = MetricsCollector::new("pipeline-1");
        metrics.record_stage(StepId::Understanding, &response(100, 50, 500, 0.0125));
        metrics.record_stage(StepId::Architecture, &response(10, 5, 100, 0.0));

        let summary = metrics.snapshot();
        assert_eq!(summary.api_calls, 2);
        assert_eq!(summary.total_tokens, 165);
        assert_eq!(summary.avg_latency_ms, 300.0);
        assert!((summary.total_cost_usd - 0.0125).abs() < 0.0001);
        assert_eq!(summary.stages.len(), 2);
        assert_eq!(summary.stages[0].step, StepId::Understanding);
        assert_eq!(summary.stages[1].input_tokens, 10);
    }

    #[test]
    fn test_failures_counted_separately() {
        let metrics = MetricsCollector::new("pipeline-2");
        metrics.record_failure();
        let summary = metrics.snapshot();
        assert_eq!(summary.api_calls, 0);
        assert_eq!(summary.failures, 1);
        assert_eq!(summary.avg_latency_ms, 0.0);
    }

    #[test]
    fn test_concurrent_recording() {
        use std::thread;

        let metrics = Arc::new(MetricsCollector::new("concurrent"));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let m = Arc::clone(&metrics);
                thread::spawn(move || {
                    for _ in 0..50 {
                        m.record_response(&response(10, 5, 20, 0.001));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let summary = metrics.snapshot();
        assert_eq!(summary.api_calls, 400);
        assert_eq!(summary.input_tokens, 4000);
        assert!((summary.total_cost_usd - 0.4).abs() < 0.001);
    }

    #[test]
    fn test_summary_display() {
        let metrics = MetricsCollector::new("display-run");
        metrics.record_response(&response(1000, 500, 1000, 0.05));
        let display = metrics.snapshot().display();
        assert!(display.contains("display-run"));
        assert!(display.contains("1500"));
        assert!(display.contains("(0 failed)"));
    }
}
