//! End-to-end dataset lifecycle against the in-memory platform.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use stratus_client::MockPlatform;
use stratus_core::{ClientConfig, DatasetResource, DatasetSpec, ImportFormat, PlatformContext, SdkError};

fn context(platform: &Arc<MockPlatform>) -> PlatformContext {
    PlatformContext::new(ClientConfig::new("p", "us-central1"), platform.clone())
}

#[tokio::test(start_paused = true)]
async fn test_create_import_delete() {
    let platform = Arc::new(MockPlatform::new().with_operation_lookups(3));
    let ctx = context(&platform);

    // Create waits on its operation
    let mut dataset = DatasetResource::create(
        &ctx,
        "flowers",
        &DatasetSpec::Image,
        HashMap::new(),
        Duration::from_secs(60),
    )
    .await
    .unwrap();

    assert_eq!(dataset.display_name(), "flowers");
    assert_eq!(dataset.resource_name().project(), "p");
    assert!(dataset.metadata_schema_uri().ends_with("image_1.0.0.yaml"));
    assert_eq!(platform.calls().await.get("get_operation"), 3);

    // Import, then the dataset is re-fetched
    let config = ImportFormat::ImageClassificationSingleLabel.import_config(&["gs://bucket/flowers.csv"]);
    dataset.import_data(&[config], Duration::from_secs(60)).await.unwrap();

    let name = dataset.resource_name().to_string();
    let imports = platform.imports(&name).await;
    assert_eq!(imports.len(), 1);
    assert_eq!(imports[0].gcs_source.uris, vec!["gs://bucket/flowers.csv".to_string()]);
    assert_eq!(platform.calls().await.get("get_dataset"), 1);

    // Listed, then deleted
    let listed = DatasetResource::list(&ctx, Some("display_name = \"flowers\"")).await.unwrap();
    assert_eq!(listed.len(), 1);

    dataset.delete(Duration::from_secs(60)).await.unwrap();
    assert_eq!(platform.dataset_count().await, 0);

    let err = DatasetResource::get(&ctx, &name).await.unwrap_err();
    assert!(err.service_error().is_some_and(|e| e.is_not_found()));
}

#[tokio::test]
async fn test_import_preconditions_fail_before_remote_calls() {
    let platform = Arc::new(MockPlatform::new().with_operation_lookups(0));
    let ctx = context(&platform);
    let mut dataset =
        DatasetResource::create(&ctx, "text", &DatasetSpec::Text, HashMap::new(), Duration::from_secs(5))
            .await
            .unwrap();

    let before = platform.calls().await.total();
    assert!(matches!(
        dataset.import_data(&[], Duration::from_secs(5)).await,
        Err(SdkError::Precondition(_))
    ));
    let empty = ImportFormat::TextSentiment.import_config(&[]);
    assert!(matches!(
        dataset.import_data(&[empty], Duration::from_secs(5)).await,
        Err(SdkError::Precondition(_))
    ));
    assert_eq!(platform.calls().await.total(), before);
}

#[tokio::test(start_paused = true)]
async fn test_slow_operation_times_out_with_last_state() {
    let platform = Arc::new(MockPlatform::new().with_operation_lookups(1000));
    let ctx = context(&platform);

    let err = DatasetResource::create(&ctx, "slow", &DatasetSpec::Video, HashMap::new(), Duration::from_secs(5))
        .await
        .unwrap_err();

    match err {
        SdkError::Timeout { last_state, .. } => assert_eq!(last_state, "OPERATION_RUNNING"),
        other => panic!("expected Timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn test_encryption_key_is_applied() {
    let platform = Arc::new(MockPlatform::new().with_operation_lookups(0));
    let config = ClientConfig::new("p", "us-central1").with_encryption_key("projects/p/locations/us-central1/keyRings/r/cryptoKeys/k");
    let ctx = PlatformContext::new(config, platform.clone());

    let dataset =
        DatasetResource::create(&ctx, "secure", &DatasetSpec::Text, HashMap::new(), Duration::from_secs(5))
            .await
            .unwrap();

    let spec = dataset.snapshot().encryption_spec.as_ref().unwrap();
    assert!(spec.kms_key_name.ends_with("cryptoKeys/k"));
}
