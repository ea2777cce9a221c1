use crate::config::with_default_user_agent;
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, parse_header, Validate};
use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "http-stress", version)]
#[command(about = "Fire a fixed number of HTTP requests at one URL with bounded concurrency")]
pub struct CliConfig {
    #[arg(long, default_value = "http://example.com")]
    pub url: String,

    #[arg(short = 'X', long, default_value = "GET", help = "GET, HEAD, PATCH, POST, PUT or DELETE")]
    pub method: String,

    #[arg(short = 'n', long = "requests", default_value_t = 100)]
    pub total_requests: usize,

    #[arg(short = 'c', long, default_value_t = 2, help = "Requests in flight at once")]
    pub concurrency: usize,

    #[arg(
        long = "interval",
        default_value_t = 0,
        allow_negative_numbers = true,
        help = "Seconds each worker waits after its request before freeing its slot"
    )]
    pub interval_seconds: i64,

    #[arg(short = 'd', long, default_value = "", help = "Request body; empty sends none")]
    pub body: String,

    #[arg(
        short = 'H',
        long = "header",
        value_parser = parse_header,
        help = "Extra header as 'Name: value' (repeatable)"
    )]
    pub headers: Vec<(String, String)>,

    #[arg(long = "timeout", help = "Per-request timeout in seconds")]
    pub timeout_seconds: Option<u64>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[arg(long, help = "Log CPU and memory of this process during the run")]
    pub monitor: bool,

    #[arg(short, long, help = "Only print the summary")]
    pub quiet: bool,

    #[arg(long, default_value = "./stress-output")]
    pub output_dir: String,

    #[arg(long, help = "Write the summary as JSON to this file under --output-dir")]
    pub json_report: Option<String>,

    #[arg(long, help = "Write one CSV row per request to this file under --output-dir")]
    pub csv_report: Option<String>,
}

impl ConfigProvider for CliConfig {
    fn url(&self) -> &str {
        &self.url
    }

    fn method(&self) -> &str {
        &self.method
    }

    fn total_requests(&self) -> usize {
        self.total_requests
    }

    fn concurrency(&self) -> usize {
        self.concurrency
    }

    fn interval_seconds(&self) -> i64 {
        self.interval_seconds
    }

    fn body(&self) -> &str {
        &self.body
    }

    fn headers(&self) -> Vec<(String, String)> {
        with_default_user_agent(self.headers.clone())
    }

    fn timeout_seconds(&self) -> Option<u64> {
        self.timeout_seconds
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        crate::domain::model::StressPlan::from_config(self)?;
        validation::validate_path("output_dir", &self.output_dir)?;
        if let Some(name) = &self.json_report {
            validation::validate_path("json_report", name)?;
        }
        if let Some(name) = &self.csv_report {
            validation::validate_path("csv_report", name)?;
        }
        Ok(())
    }
}
