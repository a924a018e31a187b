//! Client configuration.
//!
//! A `ClientConfig` is built once (from a TOML file, the environment, or
//! code) and passed explicitly to every resource wrapper through
//! [`PlatformContext`](crate::context::PlatformContext).

use crate::error::{SdkError, SdkResult};
use crate::resource_name::location_path;
use crate::storage::StorageUri;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// REST API version to call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiVersion {
    #[default]
    V1,
    V1beta1,
}

impl ApiVersion {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V1 => "v1",
            Self::V1beta1 => "v1beta1",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Project to create resources in.
    #[serde(default)]
    pub project: String,

    #[serde(default = "default_location")]
    pub location: String,

    /// Regional endpoint host; derived from `location` when unset.
    #[serde(default)]
    pub api_endpoint: Option<String>,

    #[serde(default)]
    pub api_version: ApiVersion,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// KMS key applied to created resources.
    #[serde(default)]
    pub encryption_spec_key_name: Option<String>,

    /// `gs://` bucket used for staging artifacts.
    #[serde(default)]
    pub staging_bucket: Option<String>,

    /// OAuth bearer token sent with every request.
    #[serde(default, skip_serializing)]
    pub access_token: Option<String>,
}

fn default_location() -> String {
    "us-central1".to_string()
}

const fn default_request_timeout_secs() -> u64 {
    300
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            project: String::new(),
            location: default_location(),
            api_endpoint: None,
            api_version: ApiVersion::default(),
            request_timeout_secs: default_request_timeout_secs(),
            encryption_spec_key_name: None,
            staging_bucket: None,
            access_token: None,
        }
    }
}

impl ClientConfig {
    #[must_use]
    pub fn new(project: impl Into<String>, location: impl Into<String>) -> Self {
        Self { project: project.into(), location: location.into(), ..Self::default() }
    }

    #[must_use]
    pub fn with_api_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.api_endpoint = Some(endpoint.into());
        self
    }

    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_encryption_key(mut self, key: impl Into<String>) -> Self {
        self.encryption_spec_key_name = Some(key.into());
        self
    }

    /// Load configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> SdkResult<Self> {
        if !path.exists() {
            return Err(SdkError::Config(format!("configuration file not found: {}", path.display())));
        }
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Overrides fields from `STRATUS_*` environment variables.
    #[must_use]
    pub fn apply_env(self) -> Self {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    fn apply_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(project) = lookup("STRATUS_PROJECT") {
            self.project = project;
        }
        if let Some(location) = lookup("STRATUS_LOCATION") {
            self.location = location;
        }
        if let Some(endpoint) = lookup("STRATUS_API_ENDPOINT") {
            self.api_endpoint = Some(endpoint);
        }
        if let Some(token) = lookup("STRATUS_ACCESS_TOKEN") {
            self.access_token = Some(token);
        }
        self
    }

    pub fn validate(&self) -> SdkResult<()> {
        if self.project.trim().is_empty() {
            return Err(SdkError::Config("project is required".to_string()));
        }
        if self.location.trim().is_empty() {
            return Err(SdkError::Config("location is required".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(SdkError::Config("request_timeout_secs must be >= 1".to_string()));
        }
        if let Some(bucket) = &self.staging_bucket {
            match StorageUri::parse(bucket) {
                Ok(StorageUri::Gcs { .. }) => {}
                _ => {
                    return Err(SdkError::Config(format!(
                        "staging_bucket must be a gs:// uri, got {bucket}"
                    )))
                }
            }
        }
        Ok(())
    }

    /// Regional endpoint host, e.g. `us-central1-aiplatform.googleapis.com`.
    #[must_use]
    pub fn endpoint(&self) -> String {
        self.api_endpoint
            .clone()
            .unwrap_or_else(|| format!("{}-aiplatform.googleapis.com", self.location))
    }

    /// Root of the REST surface, e.g. `https://us-central1-aiplatform.googleapis.com/v1`.
    ///
    /// An endpoint that already carries a scheme is used as-is.
    #[must_use]
    pub fn base_url(&self) -> String {
        let endpoint = self.endpoint();
        let endpoint = endpoint.trim_end_matches('/');
        if endpoint.contains("://") {
            format!("{endpoint}/{}", self.api_version.as_str())
        } else {
            format!("https://{endpoint}/{}", self.api_version.as_str())
        }
    }

    /// Parent used by create and list calls.
    #[must_use]
    pub fn location_path(&self) -> String {
        location_path(&self.project, &self.location)
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
