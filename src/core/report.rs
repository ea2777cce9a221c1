use crate::core::aggregator::ResultAggregator;
use crate::domain::model::{Outcome, RequestOutcome, StressPlan};
use crate::domain::ports::Storage;
use crate::utils::error::{Result, StressError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Debug, Clone, Serialize)]
pub struct StressReport {
    pub url: String,
    pub method: String,
    pub total_requests: usize,
    pub concurrency: usize,
    pub started_at: DateTime<Utc>,
    pub status_counts: BTreeMap<u16, usize>,
    pub failed_requests: usize,
    pub average_response_ms: u64,
    pub min_response_ms: Option<u64>,
    pub max_response_ms: Option<u64>,
    pub p50_response_ms: Option<u64>,
    pub p90_response_ms: Option<u64>,
    pub p99_response_ms: Option<u64>,
    pub total_duration_ms: u64,
    pub requests_per_second: f64,
    #[serde(skip)]
    pub outcomes: Vec<RequestOutcome>,
}

#[derive(Serialize)]
struct CsvRow<'a> {
    request_number: usize,
    status: Option<u16>,
    duration_ms: u64,
    error: Option<&'a str>,
}

impl StressReport {
    pub fn new(
        plan: &StressPlan,
        started_at: DateTime<Utc>,
        aggregator: ResultAggregator,
        total_duration: Duration,
    ) -> Self {
        let stats = aggregator.latency_stats();
        let status_counts = aggregator.status_counts().clone();
        let failed_requests = aggregator.failed();
        let processed = aggregator.processed();

        let secs = total_duration.as_secs_f64();
        let requests_per_second = if secs > 0.0 {
            processed as f64 / secs
        } else {
            0.0
        };

        Self {
            url: plan.url.clone(),
            method: plan.method.to_string(),
            total_requests: plan.total_requests,
            concurrency: plan.concurrency,
            started_at,
            status_counts,
            failed_requests,
            average_response_ms: stats.average_ms,
            min_response_ms: stats.min_ms,
            max_response_ms: stats.max_ms,
            p50_response_ms: stats.p50_ms,
            p90_response_ms: stats.p90_ms,
            p99_response_ms: stats.p99_ms,
            total_duration_ms: total_duration.as_millis() as u64,
            requests_per_second,
            outcomes: aggregator.into_outcomes(),
        }
    }

    pub fn successful_requests(&self) -> usize {
        self.status_counts
            .iter()
            .filter(|(code, _)| (200..400).contains(*code))
            .map(|(_, count)| count)
            .sum()
    }

    pub fn render_summary(&self) -> String {
        let mut lines = vec![
            "\n--- Summary Report ---".to_string(),
            format!("Total requests: {}", self.total_requests),
        ];
        lines.extend(
            self.status_counts
                .iter()
                .map(|(code, count)| format!("Status: {}, Counter:{}", code, count)),
        );
        if self.failed_requests > 0 {
            lines.push(format!("Status: failed, Counter:{}", self.failed_requests));
        }
        lines.push(format!("Average response time: {}(ms)", self.average_response_ms));
        if let (Some(min), Some(max)) = (self.min_response_ms, self.max_response_ms) {
            lines.push(format!("Min/Max response time: {}/{}(ms)", min, max));
        }
        if let (Some(p50), Some(p90), Some(p99)) =
            (self.p50_response_ms, self.p90_response_ms, self.p99_response_ms)
        {
            lines.push(format!("p50/p90/p99: {}/{}/{}(ms)", p50, p90, p99));
        }
        lines.push(format!("Throughput: {:.2} req/s", self.requests_per_second));
        lines.push(format!("Total Duration: {}(ms)", self.total_duration_ms));
        lines.join("\n")
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_csv(&self) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for outcome in &self.outcomes {
            let (status, error) = match &outcome.outcome {
                Outcome::Status(code) => (Some(*code), None),
                Outcome::Failed(message) => (None, Some(message.as_str())),
            };
            writer.serialize(CsvRow {
                request_number: outcome.request_number,
                status,
                duration_ms: outcome.duration.as_millis() as u64,
                error,
            })?;
        }
        writer
            .into_inner()
            .map_err(|e| StressError::IoError(e.into_error()))
    }

    pub async fn export_json<S: Storage>(&self, storage: &S, name: &str) -> Result<()> {
        tracing::debug!("Writing JSON report to {}", name);
        storage.write_file(name, self.to_json()?.as_bytes()).await
    }

    pub async fn export_csv<S: Storage>(&self, storage: &S, name: &str) -> Result<()> {
        tracing::debug!("Writing {} request rows to {}", self.outcomes.len(), name);
        storage.write_file(name, &self.to_csv()?).await
    }
}
