use anyhow::{Context, Result};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;
use volcast::*;

fn main() -> Result<()> {
    let (config, args) = Config::load()?;

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match &args.command {
        Command::Predict => predict(&config),
        Command::Invoke { event_file } => invoke(&config, event_file),
        Command::Dataset => dataset(&config),
    }
}

fn engine(config: &Config) -> InferenceEngine {
    InferenceEngine::new(
        Box::new(LocalModelSource::new(&config.model_file).with_horizon(config.horizon)),
        ModelCache::new(),
    )
}

/// Predict from the last `window` bars of the data file.
fn predict(config: &Config) -> Result<()> {
    info!(path = %config.data_file.display(), "loading market data");
    let series = load_price_series(&config.data_file)?.tail(config.window);

    let response = match engine(config).predict_series(&series) {
        Ok(result) => Response::ok(&result),
        Err(e) => Response::from_error(&e),
    };
    emit(config, &response)?;

    if !response.is_success() {
        anyhow::bail!("prediction failed with status {}", response.status_code);
    }
    Ok(())
}

/// Feed a JSON event through the request handler.
fn invoke(config: &Config, event_file: &std::path::Path) -> Result<()> {
    let content = std::fs::read_to_string(event_file)
        .with_context(|| format!("Failed to read event file: {}", event_file.display()))?;
    let event: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse event file: {}", event_file.display()))?;

    let handler = PredictionHandler::new(engine(config));
    let response = handler.handle_event(&event);
    emit(config, &response)
}

/// Export every labeled, complete feature row for training.
fn dataset(config: &Config) -> Result<()> {
    info!(path = %config.data_file.display(), "loading market data");
    let series = load_price_series(&config.data_file)?;
    let table = assemble(&series);

    let training = TrainingSet::build(&table, config.horizon)?;
    if training.n_cases == 0 {
        anyhow::bail!(
            "no labeled rows: {} bars is too short for horizon {}",
            series.len(),
            config.horizon
        );
    }
    training.write_csv(&config.dataset_file)?;

    info!(
        cases = training.n_cases,
        increase = training.n_increase(),
        decrease = training.n_decrease(),
        "dataset written to {}",
        config.dataset_file.display()
    );
    Ok(())
}

fn emit(config: &Config, response: &Response) -> Result<()> {
    let json = serde_json::to_string_pretty(response)?;
    match &config.output_file {
        Some(path) => {
            write_file(path, json.as_bytes())
                .with_context(|| format!("Failed to write output file: {}", path.display()))?;
            info!(path = %path.display(), status = response.status_code, "response written");
        }
        None => println!("{json}"),
    }
    Ok(())
}
