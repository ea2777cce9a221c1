use crate::domain::model::{Outcome, RequestOutcome};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::sync::mpsc;

const MAX_PREALLOCATED_OUTCOMES: usize = 65_536;

#[derive(Debug, Clone, Default)]
pub struct ResultAggregator {
    total_requests: usize,
    status_counts: BTreeMap<u16, usize>,
    failed: usize,
    total_duration: Duration,
    outcomes: Vec<RequestOutcome>,
}

/// Latency figures over requests that produced a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LatencyStats {
    pub average_ms: u64,
    pub min_ms: Option<u64>,
    pub max_ms: Option<u64>,
    pub p50_ms: Option<u64>,
    pub p90_ms: Option<u64>,
    pub p99_ms: Option<u64>,
}

impl ResultAggregator {
    pub fn new(total_requests: usize) -> Self {
        Self {
            total_requests,
            outcomes: Vec::with_capacity(total_requests.min(MAX_PREALLOCATED_OUTCOMES)),
            ..Default::default()
        }
    }

    /// Drains `receiver` until `total_requests` outcomes arrived or every
    /// sender is gone.
    pub async fn collect(mut self, mut receiver: mpsc::Receiver<RequestOutcome>) -> Self {
        while self.processed() < self.total_requests {
            match receiver.recv().await {
                Some(outcome) => self.record(outcome),
                None => {
                    tracing::warn!(
                        "Result channel closed after {} of {} requests",
                        self.processed(),
                        self.total_requests
                    );
                    break;
                }
            }
        }
        self
    }

    pub fn record(&mut self, outcome: RequestOutcome) {
        match outcome.outcome {
            Outcome::Status(code) => *self.status_counts.entry(code).or_insert(0) += 1,
            Outcome::Failed(_) => self.failed += 1,
        }
        self.total_duration += outcome.duration;
        self.outcomes.push(outcome);
    }

    pub fn processed(&self) -> usize {
        self.outcomes.len()
    }

    pub fn total_requests(&self) -> usize {
        self.total_requests
    }

    pub fn status_counts(&self) -> &BTreeMap<u16, usize> {
        &self.status_counts
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Summed duration of every request, failures included as zero.
    pub fn total_duration(&self) -> Duration {
        self.total_duration
    }

    /// Average over the planned request count; failed requests weigh in
    /// with zero duration.
    pub fn average_response_ms(&self) -> u64 {
        if self.total_requests == 0 {
            return 0;
        }
        (self.total_duration.as_millis() / self.total_requests as u128) as u64
    }

    pub fn latency_stats(&self) -> LatencyStats {
        let mut samples: Vec<u64> = self
            .outcomes
            .iter()
            .filter(|o| o.status_code().is_some())
            .map(|o| o.duration.as_millis() as u64)
            .collect();
        samples.sort_unstable();

        LatencyStats {
            average_ms: self.average_response_ms(),
            min_ms: samples.first().copied(),
            max_ms: samples.last().copied(),
            p50_ms: percentile(&samples, 50.0),
            p90_ms: percentile(&samples, 90.0),
            p99_ms: percentile(&samples, 99.0),
        }
    }

    /// Outcomes ordered by request number.
    pub fn into_outcomes(mut self) -> Vec<RequestOutcome> {
        self.outcomes.sort_by_key(|o| o.request_number);
        self.outcomes
    }
}

/// Nearest-rank percentile over pre-sorted samples.
pub fn percentile(sorted: &[u64], pct: f64) -> Option<u64> {
    if sorted.is_empty() {
        return None;
    }
    let rank = ((pct / 100.0) * sorted.len() as f64).ceil() as usize;
    let index = rank.clamp(1, sorted.len()) - 1;
    Some(sorted[index])
}
