use crate::adapters::http::HttpSender;
use crate::adapters::storage::LocalStorage;
use crate::core::engine::StressEngine;
use crate::core::report::StressReport;
use crate::domain::model::StressPlan;
use crate::domain::ports::{RequestSender, Storage};
use crate::utils::error::Result;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub monitor: bool,
    pub quiet: bool,
    pub output_dir: String,
    pub json_report: Option<String>,
    pub csv_report: Option<String>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            monitor: false,
            quiet: false,
            output_dir: crate::config::toml_config::default_output_dir(),
            json_report: None,
            csv_report: None,
        }
    }
}

pub async fn run_plan(plan: StressPlan, options: &RunOptions) -> Result<StressReport> {
    run_plan_with(HttpSender::new(), plan, options).await
}

pub async fn run_plan_with<S: RequestSender + 'static>(
    sender: S,
    plan: StressPlan,
    options: &RunOptions,
) -> Result<StressReport> {
    let engine =
        StressEngine::new_with_monitoring(sender, plan, options.monitor).quiet(options.quiet);
    let report = engine.run().await?;

    println!("{}", report.render_summary());

    let storage = LocalStorage::new(&options.output_dir);
    write_reports(&report, &storage, options).await?;

    Ok(report)
}

pub async fn write_reports<S: Storage>(
    report: &StressReport,
    storage: &S,
    options: &RunOptions,
) -> Result<()> {
    if let Some(name) = &options.json_report {
        report.export_json(storage, name).await?;
        tracing::info!("📁 JSON report saved to {}/{}", options.output_dir, name);
    }
    if let Some(name) = &options.csv_report {
        report.export_csv(storage, name).await?;
        tracing::info!("📁 CSV report saved to {}/{}", options.output_dir, name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::HttpMethod;
    use async_trait::async_trait;
    use std::time::Duration;
    use tempfile::TempDir;

    struct AlwaysOk;

    #[async_trait]
    impl RequestSender for AlwaysOk {
        async fn send(&self, _plan: &StressPlan) -> Result<u16> {
            Ok(200)
        }
    }

    fn plan() -> StressPlan {
        StressPlan {
            url: "http://stress.test".to_string(),
            method: HttpMethod::Head,
            total_requests: 4,
            concurrency: 2,
            interval: Duration::ZERO,
            body: String::new(),
            headers: vec![],
            timeout: None,
        }
    }

    #[tokio::test]
    async fn test_run_writes_requested_reports() {
        let temp_dir = TempDir::new().unwrap();
        let options = RunOptions {
            quiet: true,
            output_dir: temp_dir.path().to_string_lossy().into_owned(),
            json_report: Some("summary.json".to_string()),
            csv_report: Some("requests.csv".to_string()),
            ..Default::default()
        };

        let report = run_plan_with(AlwaysOk, plan(), &options).await.unwrap();

        assert_eq!(report.status_counts.get(&200), Some(&4));
        assert!(temp_dir.path().join("summary.json").exists());
        let csv = std::fs::read_to_string(temp_dir.path().join("requests.csv")).unwrap();
        assert_eq!(csv.lines().count(), 5);
    }

    #[tokio::test]
    async fn test_run_without_reports_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let options = RunOptions {
            quiet: true,
            output_dir: temp_dir.path().join("out").to_string_lossy().into_owned(),
            ..Default::default()
        };

        run_plan_with(AlwaysOk, plan(), &options).await.unwrap();

        assert!(!temp_dir.path().join("out").exists());
    }
}
