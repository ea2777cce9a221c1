use anyhow::Context;
use clap::Parser;
use http_stress::utils::{logger, validation::Validate};
use http_stress::{run_plan, RunOptions, StressPlan, TomlPlan};

#[derive(Parser)]
#[command(name = "toml-stress")]
#[command(about = "HTTP stress tool driven by a TOML plan file")]
struct Args {
    /// Path to TOML plan file
    #[arg(short, long, default_value = "stress-plan.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from the plan
    #[arg(long)]
    monitor: Option<bool>,

    /// Override load.total_requests
    #[arg(short = 'n', long)]
    requests: Option<usize>,

    /// Override load.concurrency
    #[arg(long)]
    concurrency: Option<usize>,

    /// Only print the summary
    #[arg(short, long)]
    quiet: bool,

    /// Show the resolved plan without sending anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logger::init_cli_logger(args.verbose);

    tracing::info!("🚀 Starting TOML-based stress test");
    tracing::info!("📁 Loading plan from: {}", args.config);

    let mut config = match TomlPlan::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load plan file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if let Some(requests) = args.requests {
        config.load.total_requests = requests;
        tracing::info!("🔧 total_requests overridden to: {}", requests);
    }
    if let Some(concurrency) = args.concurrency {
        config.load.concurrency = concurrency;
        tracing::info!("🔧 concurrency overridden to: {}", concurrency);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Plan validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let plan = StressPlan::from_config(&config)
        .with_context(|| format!("building plan '{}'", config.name()))?;

    tracing::info!("✅ Plan loaded and validated successfully");
    display_plan_summary(&config, &plan);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - no requests will be sent");
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let options = RunOptions {
        monitor: monitor_enabled,
        quiet: args.quiet,
        output_dir: config.output_dir(),
        json_report: config.json_report().map(str::to_string),
        csv_report: config.csv_report().map(str::to_string),
    };

    if let Err(e) = run_plan(plan, &options).await {
        tracing::error!(
            "❌ Stress test failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        let exit_code = e.exit_code();
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

fn display_plan_summary(config: &TomlPlan, plan: &StressPlan) {
    println!("📋 Plan: {}", config.name());
    if let Some(description) = &config.plan.description {
        println!("   {}", description);
    }
    println!("🎯 Target: {} {}", plan.method, plan.url);
    println!(
        "⚙️  Requests: {}, Concurrency: {}, Interval: {}s",
        plan.total_requests,
        plan.concurrency,
        plan.interval.as_secs()
    );
    if let Some(timeout) = plan.timeout {
        println!("⏱️  Timeout: {}s", timeout.as_secs());
    }
    for (name, value) in &plan.headers {
        println!("   {}: {}", name, value);
    }
    if plan.has_body() {
        println!("📦 Body: {} bytes", plan.body.len());
    }
}
