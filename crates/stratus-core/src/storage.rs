//! Storage URI parsing.
//!
//! URIs are forwarded to the service untouched; local code only needs the
//! bucket (for `gs://`) or the table coordinates (for `bq://`).

use crate::error::{SdkError, SdkResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static GCS_URI: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^gs://([^/]+)(?:/(.*))?$").expect("valid gcs regex"));

static BQ_URI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^bq://([^.:/]+)[.:]([^./]+)\.([^./]+)$").expect("valid bigquery regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageUri {
    /// `gs://bucket[/path]`
    Gcs { bucket: String, path: String },
    /// `bq://project.dataset.table` or `bq://project:dataset.table`
    BigQuery { project: String, dataset: String, table: String },
}

impl StorageUri {
    pub fn parse(uri: &str) -> SdkResult<Self> {
        if let Some(caps) = GCS_URI.captures(uri) {
            return Ok(Self::Gcs {
                bucket: caps[1].to_string(),
                path: caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default(),
            });
        }
        if let Some(caps) = BQ_URI.captures(uri) {
            return Ok(Self::BigQuery {
                project: caps[1].to_string(),
                dataset: caps[2].to_string(),
                table: caps[3].to_string(),
            });
        }
        Err(SdkError::InvalidUri(uri.to_string()))
    }

    #[must_use]
    pub fn bucket(&self) -> Option<&str> {
        match self {
            Self::Gcs { bucket, .. } => Some(bucket),
            Self::BigQuery { .. } => None,
        }
    }
}

impl fmt::Display for StorageUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gcs { bucket, path } if path.is_empty() => write!(f, "gs://{bucket}"),
            Self::Gcs { bucket, path } => write!(f, "gs://{bucket}/{path}"),
            Self::BigQuery { project, dataset, table } => write!(f, "bq://{project}.{dataset}.{table}"),
        }
    }
}

/// Bucket name of a `gs://` log directory, `None` for local paths.
#[must_use]
pub fn source_bucket(logdir: &str) -> Option<String> {
    GCS_URI.captures(logdir).map(|caps| caps[1].to_string())
}
