//! HTTP mapping tests for `RestClient` against a local mock server.

use std::time::Duration;
use stratus_abstraction::{
    DatasetService, OperationsService, PipelineService, PipelineState, ServiceError,
    TensorboardService, TensorboardTimeSeries,
};
use stratus_client::RestClient;

fn client(server: &mockito::Server) -> RestClient {
    RestClient::new(&format!("{}/v1", server.url()), Some("token-123".to_string()), Duration::from_secs(5))
        .unwrap()
}

#[tokio::test]
async fn test_get_pipeline_sends_bearer_token() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/v1/projects/p/locations/l/trainingPipelines/7")
        .match_header("authorization", "Bearer token-123")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "name": "projects/p/locations/l/trainingPipelines/7",
                "displayName": "train",
                "trainingTaskDefinition": "gs://schema/custom.yaml",
                "state": "PIPELINE_STATE_RUNNING"
            }"#,
        )
        .create_async()
        .await;

    let pipeline = client(&server)
        .get_training_pipeline("projects/p/locations/l/trainingPipelines/7")
        .await
        .unwrap();

    assert_eq!(pipeline.state, PipelineState::Running);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_error_body_maps_to_canonical_status() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/projects/p/locations/l/trainingPipelines/7:cancel")
        .with_status(400)
        .with_body(r#"{"error": {"code": 400, "message": "already finished", "status": "FAILED_PRECONDITION"}}"#)
        .create_async()
        .await;

    let err = client(&server)
        .cancel_training_pipeline("projects/p/locations/l/trainingPipelines/7")
        .await
        .unwrap_err();

    assert_eq!(err, ServiceError::FailedPrecondition("already finished".to_string()));
}

#[tokio::test]
async fn test_missing_resource_is_not_found() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/v1/projects/p/locations/l/operations/1")
        .with_status(404)
        .with_body("not here")
        .create_async()
        .await;

    let err = client(&server).get_operation("projects/p/locations/l/operations/1").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_list_follows_page_tokens() {
    let mut server = mockito::Server::new_async().await;
    let first = server
        .mock("GET", "/v1/projects/p/locations/l/datasets")
        .match_query(mockito::Matcher::Regex("^pageSize=100$".into()))
        .with_status(200)
        .with_body(r#"{"datasets": [{"name": "projects/p/locations/l/datasets/1", "displayName": "a", "metadataSchemaUri": "s"}], "nextPageToken": "next"}"#)
        .create_async()
        .await;
    let second = server
        .mock("GET", "/v1/projects/p/locations/l/datasets")
        .match_query(mockito::Matcher::UrlEncoded("pageToken".into(), "next".into()))
        .with_status(200)
        .with_body(r#"{"datasets": [{"name": "projects/p/locations/l/datasets/2", "displayName": "b", "metadataSchemaUri": "s"}]}"#)
        .create_async()
        .await;

    let datasets = client(&server).list_datasets("projects/p/locations/l", None).await.unwrap();

    assert_eq!(datasets.len(), 2);
    assert_eq!(datasets[1].display_name, "b");
    first.assert_async().await;
    second.assert_async().await;
}

#[tokio::test]
async fn test_import_uses_custom_verb() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/projects/p/locations/l/datasets/1:import")
        .match_body(mockito::Matcher::PartialJsonString(
            r#"{"importConfigs": [{"gcsSource": {"uris": ["gs://b/f.csv"]}, "importSchemaUri": "gs://schema/io.yaml"}]}"#
                .to_string(),
        ))
        .with_status(200)
        .with_body(r#"{"name": "projects/p/locations/l/operations/9"}"#)
        .create_async()
        .await;

    let config = stratus_abstraction::ImportDataConfig {
        gcs_source: stratus_abstraction::GcsSource { uris: vec!["gs://b/f.csv".to_string()] },
        import_schema_uri: "gs://schema/io.yaml".to_string(),
        data_item_labels: Default::default(),
    };
    let operation = client(&server).import_data("projects/p/locations/l/datasets/1", &[config]).await.unwrap();

    assert_eq!(operation.name, "projects/p/locations/l/operations/9");
    assert!(!operation.done);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_batch_create_time_series_unwraps_response() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/projects/p/locations/l/tensorboards/1/experiments/e:batchCreate")
        .with_status(200)
        .with_body(
            r#"{"tensorboardTimeSeries": [
                {"name": "projects/p/locations/l/tensorboards/1/experiments/e/runs/r/timeSeries/5", "displayName": "loss", "valueType": "SCALAR"}
            ]}"#,
        )
        .create_async()
        .await;

    let requests = vec![stratus_abstraction::CreateTensorboardTimeSeriesRequest {
        parent: "projects/p/locations/l/tensorboards/1/experiments/e/runs/r".to_string(),
        tensorboard_time_series: TensorboardTimeSeries { display_name: "loss".to_string(), ..Default::default() },
    }];
    let created = client(&server)
        .batch_create_tensorboard_time_series("projects/p/locations/l/tensorboards/1/experiments/e", &requests)
        .await
        .unwrap();

    assert_eq!(created.len(), 1);
    assert_eq!(created[0].display_name, "loss");
}
