//! CLI configuration loading and merging.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use stratus_client::RestClient;
use stratus_core::{ClientConfig, PlatformContext};

const DEFAULT_CONFIG_FILE: &str = "stratus.toml";

/// Values given on the command line.
#[derive(Debug, Default)]
pub struct Overrides {
    pub project: Option<String>,
    pub location: Option<String>,
}

/// Load and merge configuration.
///
/// Configuration precedence:
/// 1. CLI arguments
/// 2. Environment variables (`STRATUS_*`)
/// 3. Config file (`--config`, else ./stratus.toml)
/// 4. Defaults
pub fn load_config(path: Option<&Path>, overrides: &Overrides) -> Result<ClientConfig> {
    let config = match path {
        Some(path) => ClientConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            ClientConfig::load_from_file(Path::new(DEFAULT_CONFIG_FILE))
                .context("Failed to load ./stratus.toml")?
        }
        None => ClientConfig::default(),
    };

    let mut config = config.apply_env();
    if let Some(project) = &overrides.project {
        config.project.clone_from(project);
    }
    if let Some(location) = &overrides.location {
        config.location.clone_from(location);
    }
    Ok(config)
}

/// Validates `config` and builds a context backed by the REST client.
pub fn connect(config: ClientConfig) -> Result<PlatformContext> {
    config.validate().context("Invalid configuration (set --project or STRATUS_PROJECT)")?;
    let client = RestClient::new(&config.base_url(), config.access_token.clone(), config.request_timeout())
        .context("Failed to build HTTP client")?;
    Ok(PlatformContext::new(config, Arc::new(client)))
}
