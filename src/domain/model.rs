use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, StressError};
use crate::utils::validation;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const ALLOWED_METHODS: &str = "GET, HEAD, PATCH, POST, PUT, DELETE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Head,
    Patch,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = StressError;

    fn from_str(s: &str) -> Result<Self> {
        validation::validate_non_empty_string("method", s)?;

        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "HEAD" => Ok(HttpMethod::Head),
            "PATCH" => Ok(HttpMethod::Patch),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            _ => Err(StressError::InvalidConfigValueError {
                field: "method".to_string(),
                value: s.to_string(),
                reason: format!(
                    "invalid HTTP method: {}. Allowed methods are: {}",
                    s, ALLOWED_METHODS
                ),
            }),
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Head => reqwest::Method::HEAD,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A validated description of one stress run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StressPlan {
    pub url: String,
    pub method: HttpMethod,
    pub total_requests: usize,
    pub concurrency: usize,
    /// Pause taken after each request before its slot is released.
    pub interval: Duration,
    /// Empty means the request is sent without a body.
    pub body: String,
    pub headers: Vec<(String, String)>,
    pub timeout: Option<Duration>,
}

impl StressPlan {
    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        validation::validate_url("url", config.url())?;
        let method = config.method().parse::<HttpMethod>()?;
        validation::validate_positive_number("total_requests", config.total_requests())?;
        validation::validate_positive_number("concurrency", config.concurrency())?;
        validation::validate_non_negative("interval_seconds", config.interval_seconds())?;

        let timeout = match config.timeout_seconds() {
            Some(secs) => {
                validation::validate_positive_number("timeout_seconds", secs as usize)?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        let headers = config.headers();
        for (name, _) in &headers {
            validation::validate_non_empty_string("headers", name)?;
        }

        Ok(Self {
            url: config.url().trim().to_string(),
            method,
            total_requests: config.total_requests(),
            concurrency: config.concurrency(),
            interval: Duration::from_secs(config.interval_seconds() as u64),
            body: config.body().to_string(),
            headers,
            timeout,
        })
    }

    pub fn has_body(&self) -> bool {
        !self.body.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Status(u16),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOutcome {
    pub request_number: usize,
    pub outcome: Outcome,
    /// Zero for failed requests.
    pub duration: Duration,
}

impl RequestOutcome {
    pub fn status(request_number: usize, code: u16, duration: Duration) -> Self {
        Self {
            request_number,
            outcome: Outcome::Status(code),
            duration,
        }
    }

    pub fn failed(request_number: usize, error: impl Into<String>) -> Self {
        Self {
            request_number,
            outcome: Outcome::Failed(error.into()),
            duration: Duration::ZERO,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self.outcome {
            Outcome::Status(code) => Some(code),
            Outcome::Failed(_) => None,
        }
    }
}
