//! Command type definitions shared between main.rs and the command modules.

use clap::{Subcommand, ValueEnum};

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetKind {
    Image,
    Text,
    Video,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    ImageBoundingBox,
    ImageClassification,
    TextClassification,
    TextExtraction,
    TextSentiment,
    VideoClassification,
    VideoActionRecognition,
}

#[derive(Subcommand, Debug, Clone)]
pub enum DatasetCommand {
    /// Create a dataset and wait for it
    Create {
        /// Display name
        display_name: String,

        /// Kind of data items
        #[arg(long, value_enum)]
        kind: DatasetKind,

        /// Seconds to wait for the create operation
        #[arg(long, default_value_t = 600)]
        timeout: u64,
    },

    /// Import data items from Cloud Storage
    Import {
        /// Dataset resource name
        name: String,

        /// Format of the source files
        #[arg(long, value_enum)]
        format: ImportKind,

        /// gs:// source files
        #[arg(required = true)]
        uris: Vec<String>,

        /// Seconds to wait for the import operation
        #[arg(long, default_value_t = 3600)]
        timeout: u64,
    },

    /// List datasets in the location
    List {
        /// Only datasets with this display name
        #[arg(long)]
        display_name: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a dataset
    Delete {
        /// Dataset resource name
        name: String,

        #[arg(long, default_value_t = 600)]
        timeout: u64,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum JobCommand {
    /// Show a training pipeline and the wrapper its schema selects
    Get {
        /// Training pipeline resource name
        name: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Block until a training pipeline completes
    Wait {
        name: String,

        /// Seconds between status checks
        #[arg(long, default_value_t = 30)]
        poll_interval: u64,
    },

    /// Wait for a pipeline to reach one of the given states
    Watch {
        name: String,

        /// Target state, or a substring of one (repeatable)
        #[arg(long = "state", required = true)]
        states: Vec<String>,

        /// Seconds between status checks
        #[arg(long, default_value_t = 10)]
        interval: u64,

        /// Give up after this many seconds
        #[arg(long, default_value_t = 3600)]
        timeout: u64,
    },

    /// Cancel a training pipeline
    Cancel {
        name: String,

        /// Delete the pipeline after cancelling it
        #[arg(long)]
        delete: bool,

        #[arg(long, default_value_t = 600)]
        timeout: u64,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum TuningCommand {
    /// Start a supervised tuning job
    Create {
        /// Base model to tune
        #[arg(long)]
        base_model: String,

        /// gs:// JSONL training data
        #[arg(long)]
        training_data: String,

        /// gs:// JSONL validation data
        #[arg(long)]
        validation_data: Option<String>,

        /// Display name of the tuned model
        #[arg(long)]
        display_name: Option<String>,

        /// Wait for the job to finish
        #[arg(long)]
        wait: bool,
    },

    /// Block until a tuning job completes
    Wait {
        name: String,

        #[arg(long, default_value_t = 60)]
        poll_interval: u64,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum TensorboardCommand {
    /// Print the bucket and folder a tensorboard stores blobs in
    Location {
        /// Tensorboard resource name
        name: String,
    },

    /// Resolve (creating as needed) runs in an experiment
    Runs {
        /// Experiment resource name
        experiment: String,

        /// Run display names
        #[arg(required = true)]
        runs: Vec<String>,
    },
}
