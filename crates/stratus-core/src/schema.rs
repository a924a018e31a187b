//! Training task definition schema URIs.

macro_rules! training_schema {
    ($file:literal) => {
        concat!("gs://google-cloud-platform/schema/trainingjob/definition/", $file)
    };
}

pub const CUSTOM_TASK: &str = training_schema!("custom_task_1.0.0.yaml");
pub const CUSTOM_PYTHON_PACKAGE_TASK: &str = training_schema!("custom_python_package_task_1.0.0.yaml");
pub const CUSTOM_CONTAINER_TASK: &str = training_schema!("custom_container_task_1.0.0.yaml");

pub const AUTOML_TABULAR: &str = training_schema!("automl_tabular_1.0.0.yaml");
pub const AUTOML_FORECASTING: &str = training_schema!("automl_time_series_forecasting_1.0.0.yaml");
pub const AUTOML_FORECASTING_SEQ2SEQ: &str =
    training_schema!("seq2seq_plus_time_series_forecasting_1.0.0.yaml");

pub const AUTOML_IMAGE_CLASSIFICATION: &str = training_schema!("automl_image_classification_1.0.0.yaml");
pub const AUTOML_IMAGE_OBJECT_DETECTION: &str = training_schema!("automl_image_object_detection_1.0.0.yaml");
pub const AUTOML_IMAGE_SEGMENTATION: &str = training_schema!("automl_image_segmentation_1.0.0.yaml");

pub const AUTOML_TEXT_CLASSIFICATION: &str = training_schema!("automl_text_classification_1.0.0.yaml");
pub const AUTOML_TEXT_EXTRACTION: &str = training_schema!("automl_text_extraction_1.0.0.yaml");
pub const AUTOML_TEXT_SENTIMENT: &str = training_schema!("automl_text_sentiment_1.0.0.yaml");

pub const AUTOML_VIDEO_CLASSIFICATION: &str = training_schema!("automl_video_classification_1.0.0.yaml");
pub const AUTOML_VIDEO_ACTION_RECOGNITION: &str =
    training_schema!("automl_video_action_recognition_1.0.0.yaml");
pub const AUTOML_VIDEO_OBJECT_TRACKING: &str = training_schema!("automl_video_object_tracking_1.0.0.yaml");
