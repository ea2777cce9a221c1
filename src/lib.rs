pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{http::HttpSender, storage::LocalStorage};
pub use app::{run_plan, RunOptions};
#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::toml_config::TomlPlan;
pub use crate::core::{engine::StressEngine, report::StressReport};
pub use domain::model::{HttpMethod, StressPlan};
pub use utils::error::{Result, StressError};
