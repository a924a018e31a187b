//! Tensorboard command implementation.

use crate::commands::types::TensorboardCommand;
use anyhow::{Context, Result};
use colored::Colorize;
use stratus_core::{blob_storage_location, ExperimentResourceManager, PlatformContext};

pub async fn execute(ctx: &PlatformContext, command: TensorboardCommand) -> Result<()> {
    match command {
        TensorboardCommand::Location { name } => {
            let (bucket, folder) = blob_storage_location(ctx, &name).await?;
            println!("gs://{bucket}/{folder}");
            Ok(())
        }
        TensorboardCommand::Runs { experiment, runs } => {
            let manager = ExperimentResourceManager::new(&experiment, ctx.tensorboards.clone())
                .context("Invalid experiment name")?;
            let resolved = manager.batch_create_runs(&runs).await?;

            for run in &runs {
                if let Some(resource) = resolved.get(run) {
                    println!("{:<24} {}", run.cyan(), resource.dimmed());
                }
            }
            Ok(())
        }
    }
}
