//! Dataset command implementation.

use crate::commands::types::{DatasetCommand, DatasetKind, ImportKind};
use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;
use stratus_core::{DatasetResource, DatasetSpec, ImportFormat, PlatformContext};

pub async fn execute(ctx: &PlatformContext, command: DatasetCommand) -> Result<()> {
    match command {
        DatasetCommand::Create { display_name, kind, timeout } => create(ctx, &display_name, kind, timeout).await,
        DatasetCommand::Import { name, format, uris, timeout } => import(ctx, &name, format, &uris, timeout).await,
        DatasetCommand::List { display_name, json } => list(ctx, display_name.as_deref(), json).await,
        DatasetCommand::Delete { name, timeout } => delete(ctx, &name, timeout).await,
    }
}

const fn spec_for(kind: DatasetKind) -> DatasetSpec {
    match kind {
        DatasetKind::Image => DatasetSpec::Image,
        DatasetKind::Text => DatasetSpec::Text,
        DatasetKind::Video => DatasetSpec::Video,
    }
}

const fn format_for(kind: ImportKind) -> ImportFormat {
    match kind {
        ImportKind::ImageBoundingBox => ImportFormat::ImageBoundingBox,
        ImportKind::ImageClassification => ImportFormat::ImageClassificationSingleLabel,
        ImportKind::TextClassification => ImportFormat::TextClassificationSingleLabel,
        ImportKind::TextExtraction => ImportFormat::TextExtraction,
        ImportKind::TextSentiment => ImportFormat::TextSentiment,
        ImportKind::VideoClassification => ImportFormat::VideoClassification,
        ImportKind::VideoActionRecognition => ImportFormat::VideoActionRecognition,
    }
}

async fn create(ctx: &PlatformContext, display_name: &str, kind: DatasetKind, timeout: u64) -> Result<()> {
    let dataset = DatasetResource::create(
        ctx,
        display_name,
        &spec_for(kind),
        HashMap::new(),
        Duration::from_secs(timeout),
    )
    .await
    .context("Failed to create dataset")?;

    println!("{} {}", "Created".green(), dataset.resource_name());
    Ok(())
}

async fn import(
    ctx: &PlatformContext,
    name: &str,
    format: ImportKind,
    uris: &[String],
    timeout: u64,
) -> Result<()> {
    let mut dataset = DatasetResource::get(ctx, name).await.context("Failed to fetch dataset")?;
    let uris: Vec<&str> = uris.iter().map(String::as_str).collect();
    let config = format_for(format).import_config(&uris);

    dataset
        .import_data(&[config], Duration::from_secs(timeout))
        .await
        .with_context(|| format!("Failed to import into {name}"))?;

    println!("{} {} file(s) into {}", "Imported".green(), uris.len(), dataset.resource_name());
    Ok(())
}

async fn list(ctx: &PlatformContext, display_name: Option<&str>, json_output: bool) -> Result<()> {
    let filter = display_name.map(|name| format!("display_name = \"{name}\""));
    let datasets = DatasetResource::list(ctx, filter.as_deref()).await.context("Failed to list datasets")?;

    if json_output {
        let out: Vec<_> = datasets
            .iter()
            .map(|d| {
                json!({
                    "name": d.resource_name().to_string(),
                    "display_name": d.display_name(),
                    "metadata_schema_uri": d.metadata_schema_uri(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!("{}", format!("Datasets ({})", datasets.len()).bold().cyan());
    println!();
    if datasets.is_empty() {
        println!("  {}", "No datasets found.".dimmed());
        return Ok(());
    }
    for d in &datasets {
        println!("{:<32} {}", d.display_name().cyan(), d.resource_name().to_string().dimmed());
    }
    println!();
    Ok(())
}

async fn delete(ctx: &PlatformContext, name: &str, timeout: u64) -> Result<()> {
    let dataset = DatasetResource::get(ctx, name).await.context("Failed to fetch dataset")?;
    dataset.delete(Duration::from_secs(timeout)).await.context("Failed to delete dataset")?;
    println!("{} {name}", "Deleted".green());
    Ok(())
}
