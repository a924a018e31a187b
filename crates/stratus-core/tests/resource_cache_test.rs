//! Integration tests for tensorboard run and time series name caches.

use std::collections::HashMap;
use std::sync::Arc;
use stratus_abstraction::{Tensorboard, TensorboardTimeSeries, ValueType};
use stratus_client::MockPlatform;
use stratus_core::tensorboard::{blob_storage_location, run_id};
use stratus_core::{
    ClientConfig, ExperimentResourceManager, PlatformContext, RunTimeSeriesManager, SdkError,
};

const EXPERIMENT: &str = "projects/p/locations/l/tensorboards/1/experiments/exp";

fn scalar() -> TensorboardTimeSeries {
    TensorboardTimeSeries { value_type: ValueType::Scalar, plugin_name: "scalars".to_string(), ..Default::default() }
}

fn manager(platform: &Arc<MockPlatform>) -> ExperimentResourceManager {
    ExperimentResourceManager::new(EXPERIMENT, platform.clone()).unwrap()
}

#[tokio::test]
async fn test_run_is_created_once() {
    let platform = Arc::new(MockPlatform::new());
    let manager = manager(&platform);

    let first = manager.get_run_resource_name("Train").await.unwrap();
    let second = manager.get_run_resource_name("Train").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first, format!("{EXPERIMENT}/runs/{}", run_id("Train")));
    let calls = platform.calls().await;
    assert_eq!(calls.get("create_tensorboard_run"), 1);
    assert_eq!(calls.get("get_tensorboard_run"), 1);
}

#[tokio::test]
async fn test_existing_run_is_reused() {
    let platform = Arc::new(MockPlatform::new());
    platform
        .insert_tensorboard_run(stratus_abstraction::TensorboardRun {
            name: format!("{EXPERIMENT}/runs/eval"),
            display_name: "eval".to_string(),
            ..Default::default()
        })
        .await;

    let name = manager(&platform).get_run_resource_name("eval").await.unwrap();

    assert_eq!(name, format!("{EXPERIMENT}/runs/eval"));
    assert_eq!(platform.calls().await.get("create_tensorboard_run"), 0);
}

#[tokio::test]
async fn test_time_series_is_created_once_per_key() {
    let platform = Arc::new(MockPlatform::new());
    let manager = manager(&platform);

    let loss = manager.get_time_series_resource_name("train", "loss", scalar).await.unwrap();
    let again = manager.get_time_series_resource_name("train", "loss", scalar).await.unwrap();
    let accuracy = manager.get_time_series_resource_name("train", "accuracy", scalar).await.unwrap();

    assert_eq!(loss, again);
    assert_ne!(loss, accuracy);
    assert!(loss.starts_with(&format!("{EXPERIMENT}/runs/train/timeSeries/")));
    assert_eq!(platform.calls().await.get("create_tensorboard_time_series"), 2);
    assert_eq!(platform.time_series_count().await, 2);
}

#[tokio::test]
async fn test_invalid_argument_names_the_tag() {
    let platform = Arc::new(MockPlatform::new());
    platform.reject_time_series_tag("bad/tag").await;

    let err = manager(&platform).get_time_series_resource_name("train", "bad/tag", scalar).await.unwrap_err();

    assert!(matches!(err, SdkError::TimeSeriesNotFound { ref display_name, .. } if display_name == "bad/tag"));
    assert_eq!(err.to_string(), "Could not find time series resource with display name: bad/tag");
}

#[tokio::test]
async fn test_batch_create_runs_in_chunks() {
    let platform = Arc::new(MockPlatform::new());
    let manager = manager(&platform).with_batch_sizes(3, 3);

    let mut names: Vec<String> = (0..7).map(|i| format!("run-{i}")).collect();
    names.push("run-0".to_string());

    let created = manager.batch_create_runs(&names).await.unwrap();

    assert_eq!(created.len(), 7);
    assert_eq!(platform.calls().await.get("batch_create_tensorboard_runs"), 3);
    assert_eq!(platform.run_count().await, 7);

    // Cached runs are not created again
    manager.batch_create_runs(&names).await.unwrap();
    assert_eq!(platform.calls().await.get("batch_create_tensorboard_runs"), 3);
    assert_eq!(
        manager.get_run_resource_name("run-4").await.unwrap(),
        created["run-4"]
    );
    assert_eq!(platform.calls().await.get("get_tensorboard_run"), 7);
}

#[tokio::test]
async fn test_batch_create_runs_reuses_existing_runs() {
    let platform = Arc::new(MockPlatform::new());
    let existing = format!("{EXPERIMENT}/runs/train");
    platform
        .insert_tensorboard_run(stratus_abstraction::TensorboardRun {
            name: existing.clone(),
            display_name: "train".to_string(),
            ..Default::default()
        })
        .await;
    let manager = manager(&platform);

    let runs = manager.batch_create_runs(&["train".to_string(), "eval".to_string()]).await.unwrap();

    assert_eq!(runs.len(), 2);
    assert_eq!(runs["train"], existing);
    assert_eq!(runs["eval"], format!("{EXPERIMENT}/runs/eval"));
    assert_eq!(platform.run_count().await, 2);
    let calls = platform.calls().await;
    assert_eq!(calls.get("batch_create_tensorboard_runs"), 1);
    assert_eq!(calls.get("get_tensorboard_run"), 2);
}

#[tokio::test]
async fn test_batch_create_time_series_maps_back_to_keys() {
    let platform = Arc::new(MockPlatform::new());
    let manager = manager(&platform).with_batch_sizes(1000, 2);
    let runs = vec!["a".to_string(), "b".to_string()];
    manager.batch_create_runs(&runs).await.unwrap();

    let mut entries = HashMap::new();
    for run in &runs {
        for tag in ["loss", "accuracy"] {
            entries.insert((run.clone(), tag.to_string()), scalar());
        }
    }
    entries.insert(("a".to_string(), "lr".to_string()), scalar());

    let created = manager.batch_create_time_series(entries).await.unwrap();

    assert_eq!(created.len(), 5);
    assert_eq!(platform.calls().await.get("batch_create_tensorboard_time_series"), 3);

    // Lookups now hit the cache
    let name = manager.get_time_series_resource_name("b", "accuracy", scalar).await.unwrap();
    assert!(name.starts_with(&format!("{EXPERIMENT}/runs/b/timeSeries/")));
    assert_eq!(platform.calls().await.get("create_tensorboard_time_series"), 0);
    assert_eq!(platform.calls().await.get("list_tensorboard_time_series"), 0);
}

#[tokio::test]
async fn test_batch_time_series_is_keyed_by_tag() {
    let platform = Arc::new(MockPlatform::new());
    let manager = manager(&platform);
    manager.batch_create_runs(&["a".to_string()]).await.unwrap();

    let mut entries = HashMap::new();
    entries.insert(
        ("a".to_string(), "loss".to_string()),
        TensorboardTimeSeries { display_name: "train/loss".to_string(), ..scalar() },
    );
    let created = manager.batch_create_time_series(entries).await.unwrap();
    assert_eq!(created[0].display_name, "loss");

    let name = manager.get_time_series_resource_name("a", "loss", scalar).await.unwrap();

    assert_eq!(name, created[0].name);
    assert_eq!(platform.time_series_count().await, 1);
    let calls = platform.calls().await;
    assert_eq!(calls.get("batch_create_tensorboard_time_series"), 1);
    assert_eq!(calls.get("create_tensorboard_time_series"), 0);
}

#[tokio::test]
async fn test_batch_time_series_requires_known_runs() {
    let platform = Arc::new(MockPlatform::new());
    let mut entries = HashMap::new();
    entries.insert(("ghost".to_string(), "loss".to_string()), scalar());

    let err = manager(&platform).batch_create_time_series(entries).await.unwrap_err();

    assert!(matches!(err, SdkError::Precondition(_)));
    assert_eq!(platform.calls().await.total(), 0);
}

#[tokio::test]
async fn test_run_time_series_manager_reuses_existing() {
    let platform = Arc::new(MockPlatform::new());
    let run = manager(&platform).get_run_resource_name("train").await.unwrap();
    let series = RunTimeSeriesManager::new(run.clone(), platform.clone());

    let created = series.get_or_create("loss", scalar).await.unwrap();
    assert_eq!(created.display_name, "loss");

    // A fresh manager finds the series by display name
    let fresh = RunTimeSeriesManager::new(run, platform.clone());
    let found = fresh.get_or_create("loss", scalar).await.unwrap();
    assert_eq!(found.name, created.name);
    assert_eq!(platform.calls().await.get("create_tensorboard_time_series"), 1);
}

#[tokio::test]
async fn test_blob_storage_location() {
    let platform = Arc::new(MockPlatform::new());
    platform
        .insert_tensorboard(Tensorboard {
            name: "projects/p/locations/l/tensorboards/1".to_string(),
            blob_storage_path_prefix: "tb-bucket/tensorboard-1".to_string(),
            ..Default::default()
        })
        .await;
    platform
        .insert_tensorboard(Tensorboard { name: "projects/p/locations/l/tensorboards/old".to_string(), ..Default::default() })
        .await;
    let ctx = PlatformContext::new(ClientConfig::new("p", "l"), platform.clone());

    let (bucket, folder) = blob_storage_location(&ctx, "projects/p/locations/l/tensorboards/1").await.unwrap();
    assert_eq!(bucket, "tb-bucket");
    assert_eq!(folder, "tensorboard-1/");

    let obsolete = blob_storage_location(&ctx, "projects/p/locations/l/tensorboards/old").await.unwrap_err();
    assert!(matches!(obsolete, SdkError::Precondition(_)));

    let missing = blob_storage_location(&ctx, "projects/p/locations/l/tensorboards/none").await.unwrap_err();
    assert!(missing.service_error().is_some_and(|e| e.is_not_found()));
}

#[test]
fn test_manager_requires_experiment_name() {
    let platform = Arc::new(MockPlatform::new());
    assert!(ExperimentResourceManager::new("projects/p/locations/l/tensorboards/1", platform).is_err());
}
