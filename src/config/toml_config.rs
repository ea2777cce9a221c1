use crate::config::with_default_user_agent;
use crate::core::ConfigProvider;
use crate::utils::error::{Result, StressError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlPlan {
    pub plan: PlanInfo,
    pub target: TargetConfig,
    #[serde(default)]
    pub load: LoadConfig,
    pub output: Option<OutputConfig>,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanInfo {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    pub url: String,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    #[serde(default = "default_total_requests")]
    pub total_requests: usize,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default)]
    pub interval_seconds: i64,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub directory: String,
    pub json_report: Option<String>,
    pub csv_report: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

fn default_method() -> String {
    "GET".to_string()
}

fn default_total_requests() -> usize {
    100
}

fn default_concurrency() -> usize {
    2
}

pub fn default_output_dir() -> String {
    "./stress-output".to_string()
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            total_requests: default_total_requests(),
            concurrency: default_concurrency(),
            interval_seconds: 0,
            timeout_seconds: None,
        }
    }
}

impl TomlPlan {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| StressError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables stay as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| StressError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| {
                tracing::warn!("Environment variable {} is not set", var_name);
                format!("${{{}}}", var_name)
            })
        });

        Ok(result.into_owned())
    }

    pub fn name(&self) -> &str {
        &self.plan.name
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn output_dir(&self) -> String {
        self.output
            .as_ref()
            .map(|o| o.directory.clone())
            .unwrap_or_else(default_output_dir)
    }

    pub fn json_report(&self) -> Option<&str> {
        self.output.as_ref().and_then(|o| o.json_report.as_deref())
    }

    pub fn csv_report(&self) -> Option<&str> {
        self.output.as_ref().and_then(|o| o.csv_report.as_deref())
    }
}

impl ConfigProvider for TomlPlan {
    fn url(&self) -> &str {
        &self.target.url
    }

    fn method(&self) -> &str {
        &self.target.method
    }

    fn total_requests(&self) -> usize {
        self.load.total_requests
    }

    fn concurrency(&self) -> usize {
        self.load.concurrency
    }

    fn interval_seconds(&self) -> i64 {
        self.load.interval_seconds
    }

    fn body(&self) -> &str {
        &self.target.body
    }

    fn headers(&self) -> Vec<(String, String)> {
        with_default_user_agent(
            self.target
                .headers
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }

    fn timeout_seconds(&self) -> Option<u64> {
        self.load.timeout_seconds
    }
}

impl Validate for TomlPlan {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("plan.name", &self.plan.name)?;
        crate::domain::model::StressPlan::from_config(self)?;
        if let Some(output) = &self.output {
            validation::validate_path("output.directory", &output.directory)?;
        }
        Ok(())
    }
}
