use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::features::MIN_COMPLETE_BARS;
use crate::labeler::DEFAULT_HORIZON;

/// Configuration for the volatility forecaster
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Path to OHLCV history (CSV with Date,Open,High,Low,Close,Volume)
    pub data_file: PathBuf,

    /// Path to the saved model (JSON)
    #[serde(default = "default_model_file")]
    pub model_file: PathBuf,

    /// Bars of trailing history used for a prediction
    #[serde(default = "default_window")]
    pub window: usize,

    /// Bars ahead used to label training targets
    #[serde(default = "default_horizon")]
    pub horizon: usize,

    /// Where `dataset` writes the labeled feature table
    #[serde(default = "default_dataset_file")]
    pub dataset_file: PathBuf,

    /// Where `predict` writes its response; stdout when absent
    #[serde(default)]
    pub output_file: Option<PathBuf>,
}

fn default_model_file() -> PathBuf {
    PathBuf::from("model.json")
}

fn default_window() -> usize {
    100
}

fn default_horizon() -> usize {
    DEFAULT_HORIZON
}

fn default_dataset_file() -> PathBuf {
    PathBuf::from("features.csv")
}

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "volcast")]
#[command(about = "Forecast the direction of 20-day realized volatility from daily OHLCV bars")]
pub struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Market data file
    #[arg(short, long, global = true)]
    pub data_file: Option<PathBuf>,

    /// Saved model file
    #[arg(short, long, global = true)]
    pub model_file: Option<PathBuf>,

    /// Bars of history used for prediction
    #[arg(long, global = true)]
    pub window: Option<usize>,

    /// Label horizon in bars
    #[arg(long, global = true)]
    pub horizon: Option<usize>,

    /// Output file
    #[arg(short, long, global = true)]
    pub output_file: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Predict from the most recent bars of the data file
    Predict,
    /// Run a JSON event file through the request handler
    Invoke {
        /// Event with a `data` array of bars
        event_file: PathBuf,
    },
    /// Export the labeled feature table for training
    Dataset,
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Create configuration from command-line arguments
    pub fn from_args(args: &Args) -> Result<Self> {
        let data_file = match (&args.data_file, &args.command) {
            (Some(path), _) => path.clone(),
            // events carry their own bars
            (None, Command::Invoke { .. }) => PathBuf::new(),
            (None, _) => anyhow::bail!("data_file is required"),
        };

        Ok(Config {
            data_file,
            model_file: default_model_file(),
            window: default_window(),
            horizon: default_horizon(),
            dataset_file: default_dataset_file(),
            output_file: None,
        })
    }

    /// Build the configuration for `args`: the file (if any) first, then
    /// explicit flags on top.
    pub fn resolve(args: &Args) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::from_args(args)?,
        };

        if let Some(data_file) = &args.data_file {
            config.data_file = data_file.clone();
        }
        if let Some(model_file) = &args.model_file {
            config.model_file = model_file.clone();
        }
        if let Some(window) = args.window {
            config.window = window;
        }
        if let Some(horizon) = args.horizon {
            config.horizon = horizon;
        }
        if let Some(output_file) = &args.output_file {
            match args.command {
                Command::Dataset => config.dataset_file = output_file.clone(),
                _ => config.output_file = Some(output_file.clone()),
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse the command line and load configuration
    pub fn load() -> Result<(Self, Args)> {
        let args = Args::parse();
        let config = Self::resolve(&args)?;
        Ok((config, args))
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.window < MIN_COMPLETE_BARS {
            anyhow::bail!(
                "window must be at least {} bars, got {}",
                MIN_COMPLETE_BARS,
                self.window
            );
        }

        if self.horizon == 0 {
            anyhow::bail!("horizon must be greater than 0");
        }

        Ok(())
    }
}
