//! Tuning command implementation.

use crate::commands::types::TuningCommand;
use anyhow::{Context, Result};
use colored::Colorize;
use std::time::Duration;
use stratus_core::abstraction::SupervisedTuningSpec;
use stratus_core::{CompletedJob, PlatformContext, TuningJob, TuningJobSpec, TuningSpec, WaitPolicy};

pub async fn execute(ctx: &PlatformContext, command: TuningCommand) -> Result<()> {
    match command {
        TuningCommand::Create { base_model, training_data, validation_data, display_name, wait } => {
            let tuning = TuningSpec::Supervised(SupervisedTuningSpec {
                training_dataset_uri: training_data,
                validation_dataset_uri: validation_data,
                hyper_parameters: None,
            });
            let mut spec = TuningJobSpec::new(base_model, tuning);
            spec.tuned_model_display_name = display_name;
            create(ctx, &spec, wait).await
        }
        TuningCommand::Wait { name, poll_interval } => {
            let mut job = TuningJob::get(ctx, &name).await.context("Failed to fetch tuning job")?;
            let completed = job.wait(&policy(poll_interval)).await?;
            print_completed(&job, &completed);
            Ok(())
        }
    }
}

fn policy(poll_interval: u64) -> WaitPolicy {
    WaitPolicy { poll_interval: Duration::from_secs(poll_interval.max(1)), ..WaitPolicy::default() }
}

async fn create(ctx: &PlatformContext, spec: &TuningJobSpec, wait: bool) -> Result<()> {
    let mut job = TuningJob::create(ctx, spec).await.context("Failed to create tuning job")?;
    println!("{} {}", "Created".green(), job.resource_name());
    println!("  Dashboard: {}", job.dashboard_url());

    if wait {
        let completed = job.wait(&policy(60)).await?;
        print_completed(&job, &completed);
    }
    Ok(())
}

fn print_completed(job: &TuningJob, completed: &CompletedJob) {
    println!("{} {} ({})", "Completed".green(), completed.resource_name, completed.state);
    if let Some(model) = job.tuned_model_name() {
        println!("  Tuned model: {}", model.green());
    }
    if let Some(endpoint) = job.tuned_model_endpoint_name() {
        println!("  Endpoint:    {}", endpoint.green());
    }
}
