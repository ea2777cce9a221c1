use crate::core::aggregator::ResultAggregator;
use crate::core::report::StressReport;
use crate::domain::model::{RequestOutcome, StressPlan};
use crate::domain::ports::RequestSender;
use crate::utils::error::{Result, StressError};
use crate::utils::monitor::SystemMonitor;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::{JoinError, JoinSet};
use tokio::time::Instant;

pub struct StressEngine<S: RequestSender + 'static> {
    sender: Arc<S>,
    plan: Arc<StressPlan>,
    monitor: SystemMonitor,
    quiet: bool,
}

impl<S: RequestSender + 'static> StressEngine<S> {
    pub fn new(sender: S, plan: StressPlan) -> Self {
        Self {
            sender: Arc::new(sender),
            plan: Arc::new(plan),
            monitor: SystemMonitor::default(),
            quiet: false,
        }
    }

    pub fn new_with_monitoring(sender: S, plan: StressPlan, monitor_enabled: bool) -> Self {
        Self {
            monitor: SystemMonitor::new(monitor_enabled),
            ..Self::new(sender, plan)
        }
    }

    /// Suppresses the per-request progress lines on stdout.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub async fn run(&self) -> Result<StressReport> {
        let plan = &self.plan;
        println!("{}", banner(plan));
        tracing::info!(
            url = %plan.url,
            method = %plan.method,
            total_requests = plan.total_requests,
            concurrency = plan.concurrency,
            "Starting stress test"
        );
        self.monitor.log_stats("Start");

        let started_at = chrono::Utc::now();
        let start = Instant::now();

        // more slots than requests never get used
        let slots = plan
            .concurrency
            .min(plan.total_requests)
            .clamp(1, Semaphore::MAX_PERMITS);
        let (tx, rx) =
            mpsc::channel::<RequestOutcome>(slots.saturating_mul(2).min(MAX_CHANNEL_CAPACITY));
        let collector = tokio::spawn(ResultAggregator::new(plan.total_requests).collect(rx));

        let semaphore = Arc::new(Semaphore::new(slots));
        let mut workers = JoinSet::new();

        for request_number in 1..=plan.total_requests {
            // reap finished workers while waiting so a failure stops dispatch
            let permit = loop {
                tokio::select! {
                    biased;
                    Some(joined) = workers.join_next(), if !workers.is_empty() => {
                        if let Err(e) = joined {
                            workers.abort_all();
                            collector.abort();
                            return Err(worker_failed(e));
                        }
                    }
                    acquired = semaphore.clone().acquire_owned() => {
                        break acquired.map_err(|e| StressError::ExecutionError {
                            message: format!("concurrency limiter closed: {}", e),
                        })?;
                    }
                }
            };

            let sender = Arc::clone(&self.sender);
            let plan = Arc::clone(&self.plan);
            let tx = tx.clone();
            let quiet = self.quiet;

            workers.spawn(async move {
                let outcome = execute_request(sender.as_ref(), &plan, request_number, quiet).await;
                if tx.send(outcome).await.is_err() {
                    tracing::warn!("Collector stopped before request {} reported", request_number);
                }

                if !plan.interval.is_zero() {
                    tokio::time::sleep(plan.interval).await;
                }
                drop(permit);
            });
        }
        drop(tx);
        tracing::debug!("All {} requests dispatched", plan.total_requests);
        self.monitor.log_stats("Dispatch complete");

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                workers.abort_all();
                collector.abort();
                return Err(worker_failed(e));
            }
        }

        let aggregator = collector.await.map_err(|e| StressError::ExecutionError {
            message: format!("result collector failed: {}", e),
        })?;

        let total_duration = start.elapsed();
        let report = StressReport::new(plan, started_at, aggregator, total_duration);

        tracing::info!(
            processed = report.outcomes.len(),
            failed = report.failed_requests,
            total_duration_ms = report.total_duration_ms,
            "Stress test finished"
        );
        self.monitor.log_final_stats();

        Ok(report)
    }
}

const MAX_CHANNEL_CAPACITY: usize = 1024;

fn worker_failed(e: JoinError) -> StressError {
    tracing::error!("Worker task failed: {}", e);
    StressError::ExecutionError {
        message: e.to_string(),
    }
}

pub fn banner(plan: &StressPlan) -> String {
    format!(
        "Starting stress test...\nURL: {}, Method: {}, Request(s): {}, Concurrency: {}",
        plan.url, plan.method, plan.total_requests, plan.concurrency
    )
}

pub fn progress_line(request_number: usize, status: u16, duration: Duration) -> String {
    format!(
        "Request {}: Status Code: {} ({}ms)",
        request_number,
        status,
        duration.as_millis()
    )
}

async fn execute_request<S: RequestSender + ?Sized>(
    sender: &S,
    plan: &StressPlan,
    request_number: usize,
    quiet: bool,
) -> RequestOutcome {
    let request_start = Instant::now();
    match sender.send(plan).await {
        Ok(status) => {
            let outcome = RequestOutcome::status(request_number, status, request_start.elapsed());
            if !quiet {
                println!("{}", progress_line(request_number, status, outcome.duration));
            }
            outcome
        }
        Err(e) => {
            tracing::debug!("Request {} failed: {:?}", request_number, e);
            if !quiet {
                eprintln!("Request {}: {}", request_number, e);
            }
            RequestOutcome::failed(request_number, e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{HttpMethod, Outcome};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn plan(total_requests: usize, concurrency: usize) -> StressPlan {
        StressPlan {
            url: "http://stress.test".to_string(),
            method: HttpMethod::Get,
            total_requests,
            concurrency,
            interval: Duration::ZERO,
            body: String::new(),
            headers: vec![],
            timeout: None,
        }
    }

    /// Answers with a fixed status after a delay, tracking peak concurrency.
    #[derive(Default)]
    struct CountingSender {
        delay: Duration,
        in_flight: AtomicUsize,
        peak: Arc<AtomicUsize>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl RequestSender for CountingSender {
        async fn send(&self, _plan: &StressPlan) -> Result<u16> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if call % 4 == 0 {
                Err(StressError::IoError(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "simulated transport failure",
                )))
            } else {
                Ok(200)
            }
        }
    }

    struct PanickingSender;

    #[async_trait]
    impl RequestSender for PanickingSender {
        async fn send(&self, _plan: &StressPlan) -> Result<u16> {
            panic!("sender exploded");
        }
    }

    /// Panics on its first call and answers 200 afterwards.
    #[derive(Default)]
    struct FirstCallPanics {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl RequestSender for FirstCallPanics {
        async fn send(&self, _plan: &StressPlan) -> Result<u16> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("first request exploded");
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok(200)
        }
    }

    #[tokio::test]
    async fn test_records_every_request() {
        let sender = CountingSender {
            delay: Duration::from_millis(5),
            ..Default::default()
        };
        let calls = Arc::clone(&sender.calls);
        let engine = StressEngine::new(sender, plan(8, 3)).quiet(true);

        let report = engine.run().await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 8);
        assert_eq!(report.outcomes.len(), 8);
        assert_eq!(report.status_counts.get(&200), Some(&6));
        assert_eq!(report.failed_requests, 2);

        let numbers: Vec<usize> = report.outcomes.iter().map(|o| o.request_number).collect();
        assert_eq!(numbers, (1..=8).collect::<Vec<_>>());
        assert!(report
            .outcomes
            .iter()
            .filter(|o| matches!(o.outcome, Outcome::Failed(_)))
            .all(|o| o.duration.is_zero()));
    }

    #[tokio::test]
    async fn test_never_exceeds_concurrency() {
        let sender = CountingSender {
            delay: Duration::from_millis(20),
            ..Default::default()
        };
        let peak = Arc::clone(&sender.peak);
        let engine = StressEngine::new(sender, plan(12, 3)).quiet(true);

        engine.run().await.unwrap();

        let peak = peak.load(Ordering::SeqCst);
        assert!(peak <= 3, "peak concurrency was {}", peak);
        assert!(peak > 1, "requests never overlapped");
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_holds_the_slot() {
        let mut plan = plan(3, 1);
        plan.interval = Duration::from_secs(2);
        let engine = StressEngine::new(CountingSender::default(), plan).quiet(true);

        let report = engine.run().await.unwrap();

        // one slot, so the three pauses run back to back
        assert!(report.total_duration_ms >= 6000);
        assert_eq!(report.outcomes.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_overlaps_across_slots() {
        let mut plan = plan(4, 4);
        plan.interval = Duration::from_secs(1);
        let engine = StressEngine::new(CountingSender::default(), plan).quiet(true);

        let report = engine.run().await.unwrap();

        assert!(report.total_duration_ms >= 1000);
        assert!(report.total_duration_ms < 2000);
    }

    #[tokio::test]
    async fn test_worker_panic_aborts_run() {
        let engine = StressEngine::new(PanickingSender, plan(3, 2)).quiet(true);

        let err = engine.run().await.unwrap_err();
        assert!(matches!(err, StressError::ExecutionError { .. }));
        assert_eq!(err.exit_code(), 3);
    }

    #[tokio::test]
    async fn test_worker_panic_stops_dispatch() {
        let sender = FirstCallPanics::default();
        let calls = Arc::clone(&sender.calls);
        let engine = StressEngine::new(sender, plan(50, 1)).quiet(true);

        let err = engine.run().await.unwrap_err();

        assert!(matches!(err, StressError::ExecutionError { .. }));
        let calls = calls.load(Ordering::SeqCst);
        assert!(calls <= 2, "{} requests were sent after the failure", calls - 1);
    }

    #[tokio::test]
    async fn test_oversized_concurrency_is_clamped() {
        let sender = CountingSender::default();
        let peak = Arc::clone(&sender.peak);
        let engine = StressEngine::new(sender, plan(3, 1usize << 62)).quiet(true);

        let report = engine.run().await.unwrap();

        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(report.concurrency, 1usize << 62);
        assert!(peak.load(Ordering::SeqCst) <= 3);
    }

    #[test]
    fn test_banner_text() {
        assert_eq!(
            banner(&plan(100, 2)),
            "Starting stress test...\nURL: http://stress.test, Method: GET, Request(s): 100, Concurrency: 2"
        );
    }

    #[test]
    fn test_progress_line_text() {
        assert_eq!(
            progress_line(7, 503, Duration::from_micros(12_900)),
            "Request 7: Status Code: 503 (12ms)"
        );
    }
}
