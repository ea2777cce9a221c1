use clap::Parser;
use http_stress::config::cli::LogFormat;
use http_stress::utils::{logger, validation::Validate};
use http_stress::{run_plan, CliConfig, RunOptions, StressPlan};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    match config.log_format {
        LogFormat::Text => logger::init_cli_logger(config.verbose),
        LogFormat::Json => logger::init_json_logger(config.verbose),
    }

    tracing::info!("Starting http-stress CLI");
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let plan = StressPlan::from_config(&config)?;

    if config.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let options = RunOptions {
        monitor: config.monitor,
        quiet: config.quiet,
        output_dir: config.output_dir.clone(),
        json_report: config.json_report.clone(),
        csv_report: config.csv_report.clone(),
    };

    match run_plan(plan, &options).await {
        Ok(report) => {
            tracing::info!(
                "✅ Stress test completed: {} responses, {} failed",
                report.outcomes.len() - report.failed_requests,
                report.failed_requests
            );
        }
        Err(e) => {
            tracing::error!(
                "❌ Stress test failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let exit_code = e.exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
