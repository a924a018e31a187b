//! Managed datasets.

use crate::context::PlatformContext;
use crate::error::{SdkError, SdkResult};
use crate::operation::OperationHandle;
use crate::resource_name::ResourceName;
use std::collections::HashMap;
use std::time::Duration;
use stratus_abstraction::{Dataset, EncryptionSpec, GcsSource, ImportDataConfig, InputConfig};
use tracing::{debug, info};

const METADATA_SCHEMA_PREFIX: &str = "gs://google-cloud-platform/schema/dataset/metadata";
const IOFORMAT_SCHEMA_PREFIX: &str = "gs://google-cloud-platform/schema/dataset/ioformat";

/// Default wait for dataset create/delete operations.
pub const DEFAULT_DATASET_TIMEOUT: Duration = Duration::from_secs(300);
/// Default wait for import operations.
pub const DEFAULT_IMPORT_TIMEOUT: Duration = Duration::from_secs(1800);

/// Kind of dataset to create; decides the metadata schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSpec {
    Image,
    Text,
    Video,
    Tabular(InputConfig),
    TimeSeries(InputConfig),
    /// Any other metadata schema, forwarded as-is.
    Custom { metadata_schema_uri: String },
}

impl DatasetSpec {
    #[must_use]
    pub fn metadata_schema_uri(&self) -> String {
        match self {
            Self::Image => format!("{METADATA_SCHEMA_PREFIX}/image_1.0.0.yaml"),
            Self::Text => format!("{METADATA_SCHEMA_PREFIX}/text_1.0.0.yaml"),
            Self::Video => format!("{METADATA_SCHEMA_PREFIX}/video_1.0.0.yaml"),
            Self::Tabular(_) => format!("{METADATA_SCHEMA_PREFIX}/tabular_1.0.0.yaml"),
            Self::TimeSeries(_) => format!("{METADATA_SCHEMA_PREFIX}/time_series_1.0.0.yaml"),
            Self::Custom { metadata_schema_uri } => metadata_schema_uri.clone(),
        }
    }

    fn metadata(&self) -> serde_json::Value {
        match self {
            Self::Tabular(input) | Self::TimeSeries(input) => {
                serde_json::json!({ "inputConfig": input })
            }
            _ => serde_json::Value::Null,
        }
    }
}

/// Import formats understood by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    ImageBoundingBox,
    ImageClassificationSingleLabel,
    TextClassificationSingleLabel,
    TextExtraction,
    TextSentiment,
    VideoClassification,
    VideoActionRecognition,
}

impl ImportFormat {
    #[must_use]
    pub fn schema_uri(self) -> String {
        let file = match self {
            Self::ImageBoundingBox => "image_bounding_box_io_format_1.0.0.yaml",
            Self::ImageClassificationSingleLabel => "image_classification_single_label_io_format_1.0.0.yaml",
            Self::TextClassificationSingleLabel => "text_classification_single_label_io_format_1.0.0.yaml",
            Self::TextExtraction => "text_extraction_io_format_1.0.0.yaml",
            Self::TextSentiment => "text_sentiment_io_format_1.0.0.yaml",
            Self::VideoClassification => "video_classification_io_format_1.0.0.yaml",
            Self::VideoActionRecognition => "video_action_recognition_io_format_1.0.0.yaml",
        };
        format!("{IOFORMAT_SCHEMA_PREFIX}/{file}")
    }

    /// One import config reading `uris` in this format.
    #[must_use]
    pub fn import_config(self, uris: &[&str]) -> ImportDataConfig {
        ImportDataConfig {
            gcs_source: GcsSource { uris: uris.iter().map(|u| (*u).to_string()).collect() },
            import_schema_uri: self.schema_uri(),
            data_item_labels: HashMap::new(),
        }
    }
}

/// A dataset on the platform.
#[derive(Debug, Clone)]
pub struct DatasetResource {
    ctx: PlatformContext,
    name: ResourceName,
    resource: Dataset,
}

impl DatasetResource {
    /// Creates a dataset and waits for the create operation.
    pub async fn create(
        ctx: &PlatformContext,
        display_name: &str,
        spec: &DatasetSpec,
        labels: HashMap<String, String>,
        timeout: Duration,
    ) -> SdkResult<Self> {
        if display_name.trim().is_empty() {
            return Err(SdkError::Precondition("dataset display_name is required".to_string()));
        }

        let request = Dataset {
            display_name: display_name.to_string(),
            metadata_schema_uri: spec.metadata_schema_uri(),
            metadata: spec.metadata(),
            labels,
            encryption_spec: ctx
                .config()
                .encryption_spec_key_name
                .clone()
                .map(|kms_key_name| EncryptionSpec { kms_key_name }),
            ..Dataset::default()
        };

        let parent = ctx.config().location_path();
        info!(parent = %parent, display_name = %display_name, "Creating Dataset");
        let operation = ctx.datasets.create_dataset(&parent, &request).await?;
        let created: Dataset =
            OperationHandle::new(operation, ctx.operations.clone()).result_as(timeout).await?;
        info!(dataset = %created.name, "Dataset created");

        Self::from_resource(ctx, created)
    }

    pub async fn get(ctx: &PlatformContext, name: &str) -> SdkResult<Self> {
        let parsed = ResourceName::parse(name)?;
        debug!(dataset = %parsed, "Fetching Dataset");
        let resource = ctx.datasets.get_dataset(name).await?;
        Ok(Self { ctx: ctx.clone(), name: parsed, resource })
    }

    /// Lists datasets in the configured location.
    pub async fn list(ctx: &PlatformContext, filter: Option<&str>) -> SdkResult<Vec<Self>> {
        let parent = ctx.config().location_path();
        let datasets = ctx.datasets.list_datasets(&parent, filter).await?;
        datasets.into_iter().map(|d| Self::from_resource(ctx, d)).collect()
    }

    fn from_resource(ctx: &PlatformContext, resource: Dataset) -> SdkResult<Self> {
        let name = ResourceName::parse(&resource.name)?;
        Ok(Self { ctx: ctx.clone(), name, resource })
    }

    #[must_use]
    pub const fn resource_name(&self) -> &ResourceName {
        &self.name
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.resource.display_name
    }

    #[must_use]
    pub fn metadata_schema_uri(&self) -> &str {
        &self.resource.metadata_schema_uri
    }

    /// Last fetched representation; may be stale.
    #[must_use]
    pub const fn snapshot(&self) -> &Dataset {
        &self.resource
    }

    pub async fn refresh(&mut self) -> SdkResult<&Dataset> {
        self.resource = self.ctx.datasets.get_dataset(&self.name.to_string()).await?;
        Ok(&self.resource)
    }

    /// Imports data items and waits for the import to finish.
    pub async fn import_data(
        &mut self,
        import_configs: &[ImportDataConfig],
        timeout: Duration,
    ) -> SdkResult<()> {
        if import_configs.is_empty() {
            return Err(SdkError::Precondition("at least one import config is required".to_string()));
        }
        if let Some(config) = import_configs.iter().find(|c| c.gcs_source.uris.is_empty()) {
            return Err(SdkError::Precondition(format!(
                "import config for {} has no source uris",
                config.import_schema_uri
            )));
        }

        let name = self.name.to_string();
        info!(dataset = %name, configs = import_configs.len(), "Importing data");
        let operation = self.ctx.datasets.import_data(&name, import_configs).await?;
        OperationHandle::new(operation, self.ctx.operations.clone()).result(timeout).await?;
        info!(dataset = %name, "Data imported");

        self.refresh().await?;
        Ok(())
    }

    /// Deletes the dataset and waits for the delete operation.
    pub async fn delete(self, timeout: Duration) -> SdkResult<()> {
        let name = self.name.to_string();
        info!(dataset = %name, "Deleting Dataset");
        let operation = self.ctx.datasets.delete_dataset(&name).await?;
        OperationHandle::new(operation, self.ctx.operations.clone()).result(timeout).await?;
        info!(dataset = %name, "Dataset deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tabular_spec_metadata() {
        let spec = DatasetSpec::Tabular(InputConfig::BigquerySource {
            uri: "bq://bigquery-public-data.ml_datasets.iris".to_string(),
        });
        assert_eq!(
            spec.metadata_schema_uri(),
            "gs://google-cloud-platform/schema/dataset/metadata/tabular_1.0.0.yaml"
        );
        assert_eq!(
            spec.metadata(),
            serde_json::json!({"inputConfig": {"bigquerySource": {"uri": "bq://bigquery-public-data.ml_datasets.iris"}}})
        );
    }

    #[test]
    fn test_unstructured_specs_carry_no_metadata() {
        assert!(DatasetSpec::Image.metadata().is_null());
        let custom = DatasetSpec::Custom { metadata_schema_uri: "gs://x/y.yaml".to_string() };
        assert_eq!(custom.metadata_schema_uri(), "gs://x/y.yaml");
    }

    #[test]
    fn test_import_config_uses_ioformat_schema() {
        let config = ImportFormat::ImageBoundingBox.import_config(&["gs://bucket/boxes.csv"]);
        assert_eq!(
            config.import_schema_uri,
            "gs://google-cloud-platform/schema/dataset/ioformat/image_bounding_box_io_format_1.0.0.yaml"
        );
        assert_eq!(config.gcs_source.uris, vec!["gs://bucket/boxes.csv".to_string()]);
    }
}
