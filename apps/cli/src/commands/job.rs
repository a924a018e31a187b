//! Training pipeline command implementation.

use crate::commands::types::JobCommand;
use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use stratus_core::{
    cancel_and_delete, wait_for_job_state, PlatformContext, PollConfig, RateLimiter, SchemaRegistry,
    TrainingJob, WaitPolicy,
};
use tokio::sync::Mutex;

pub async fn execute(ctx: &PlatformContext, command: JobCommand) -> Result<()> {
    match command {
        JobCommand::Get { name, json } => get(ctx, &name, json).await,
        JobCommand::Wait { name, poll_interval } => wait(ctx, &name, poll_interval).await,
        JobCommand::Watch { name, states, interval, timeout } => {
            watch(ctx, &name, &states, interval, timeout).await
        }
        JobCommand::Cancel { name, delete, timeout } => cancel(ctx, &name, delete, timeout).await,
    }
}

async fn get(ctx: &PlatformContext, name: &str, json_output: bool) -> Result<()> {
    let registry = SchemaRegistry::with_defaults();
    let typed = TrainingJob::get_typed(ctx, &registry, name)
        .await
        .with_context(|| format!("Failed to fetch training pipeline {name}"))?;
    let job = typed.job();

    if json_output {
        let out = json!({
            "name": job.resource_name().to_string(),
            "display_name": job.snapshot().display_name,
            "type": typed.type_name(),
            "state": job.state().as_str(),
            "model": job.model_name(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("{}", job.snapshot().display_name.bold().cyan());
    println!("  Name:  {}", job.resource_name());
    println!("  Type:  {}", typed.type_name());
    println!("  State: {}", job.state());
    if let Some(model) = job.model_name() {
        println!("  Model: {}", model.green());
    }
    Ok(())
}

async fn wait(ctx: &PlatformContext, name: &str, poll_interval: u64) -> Result<()> {
    let registry = SchemaRegistry::with_defaults();
    let mut typed = TrainingJob::get_typed(ctx, &registry, name).await?;
    let policy = WaitPolicy { poll_interval: Duration::from_secs(poll_interval.max(1)), ..WaitPolicy::default() };

    let completed = typed.wait(&policy).await.with_context(|| format!("{name} did not succeed"))?;

    println!("{} {} ({})", "Completed".green(), completed.resource_name, completed.state);
    if let Some(model) = completed.model {
        println!("  Model: {}", model.to_string().green());
    }
    Ok(())
}

async fn watch(ctx: &PlatformContext, name: &str, states: &[String], interval: u64, timeout: u64) -> Result<()> {
    let expected: Vec<&str> = states.iter().map(String::as_str).collect();
    let config = PollConfig::expecting(&expected)
        .with_interval(Duration::from_secs(interval.max(1)))
        .with_timeout(Duration::from_secs(timeout));

    // At most one request per second however short the poll interval is
    let limiter = Arc::new(Mutex::new(RateLimiter::new(Duration::from_secs(1))));
    let pipelines = ctx.pipelines.clone();
    let pipeline = wait_for_job_state(
        |name| {
            let pipelines = pipelines.clone();
            let limiter = limiter.clone();
            async move {
                limiter.lock().await.tick().await;
                pipelines.get_training_pipeline(&name).await
            }
        },
        name,
        &config,
    )
    .await?;

    println!("{} {} reached {}", "Done".green(), pipeline.name, pipeline.state);
    Ok(())
}

async fn cancel(ctx: &PlatformContext, name: &str, delete: bool, timeout: u64) -> Result<()> {
    let job = TrainingJob::get(ctx, name).await.context("Failed to fetch training pipeline")?;

    if delete {
        cancel_and_delete(&job, Duration::from_secs(timeout)).await?;
        println!("{} {name}", "Cancelled and deleted".green());
    } else {
        job.cancel().await?;
        println!("{} {name}", "Cancellation requested for".yellow());
    }
    Ok(())
}
