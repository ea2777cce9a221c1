#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;

pub const DEFAULT_USER_AGENT: &str = concat!("http-stress/", env!("CARGO_PKG_VERSION"));

/// Adds a `User-Agent` header unless one is already present.
pub fn with_default_user_agent(mut headers: Vec<(String, String)>) -> Vec<(String, String)> {
    let has_agent = headers
        .iter()
        .any(|(name, _)| name.eq_ignore_ascii_case("user-agent"));
    if !has_agent {
        headers.insert(0, ("User-Agent".to_string(), DEFAULT_USER_AGENT.to_string()));
    }
    headers
}
