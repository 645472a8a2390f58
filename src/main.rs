use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use log::info;

use wastesort::dataset::{self, DEFAULT_SEED, DEFAULT_TRAIN_FRACTION};
use wastesort::{
    AppState, BackendRelay, BuiltinModel, ClassificationPipeline, EngineMode, InferenceEngine,
    LocalEngine, RemoteEngine, RuntimeConfig, ServiceConfig,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum EngineArg {
    /// In-process ONNX model
    Local,
    /// Hosted inference provider (requires WASTESORT_API_TOKEN)
    Remote,
}

impl From<EngineArg> for EngineMode {
    fn from(arg: EngineArg) -> Self {
        match arg {
            EngineArg::Local => EngineMode::Local,
            EngineArg::Remote => EngineMode::Remote,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Run the classification HTTP service
    Serve {
        #[arg(long, value_enum, default_value_t = EngineArg::Local)]
        engine: EngineArg,
        /// Use an ONNX model file instead of the cached builtin
        #[arg(long)]
        model_path: Option<PathBuf>,
    },
    /// Classify a single image and print the enriched result
    Predict {
        image: PathBuf,
        #[arg(long)]
        model_path: Option<PathBuf>,
    },
    /// Evaluate accuracy on the reproducible test split of a corpus
    Eval {
        data_dir: PathBuf,
        #[arg(long)]
        model_path: Option<PathBuf>,
        #[arg(long, default_value_t = DEFAULT_TRAIN_FRACTION)]
        train_fraction: f64,
        #[arg(long, default_value_t = DEFAULT_SEED)]
        seed: u64,
    },
}

async fn build_local_engine(model_path: Option<PathBuf>) -> anyhow::Result<LocalEngine> {
    let runtime = RuntimeConfig::default();
    let engine = match model_path {
        Some(path) => {
            let model = BuiltinModel::WasteVit;
            LocalEngine::from_file(
                &path,
                model.characteristics(),
                model.get_model_info().name.to_string(),
                &runtime,
            )?
        }
        None => LocalEngine::builtin(&runtime).await?,
    };
    Ok(engine)
}

async fn build_engine(
    mode: EngineMode,
    config: &ServiceConfig,
    model_path: Option<PathBuf>,
) -> anyhow::Result<Arc<dyn InferenceEngine>> {
    match mode {
        EngineMode::Local => Ok(Arc::new(build_local_engine(model_path).await?)),
        EngineMode::Remote => {
            let token = config
                .provider_token
                .clone()
                .context("remote engine requires a provider token")?;
            Ok(Arc::new(RemoteEngine::new(config.provider_url.clone(), token)?))
        }
    }
}

async fn serve(engine_arg: EngineArg, model_path: Option<PathBuf>) -> anyhow::Result<()> {
    let mode = EngineMode::from(engine_arg);
    let config = ServiceConfig::from_env(mode)?;
    wastesort::taxonomy::validate().map_err(anyhow::Error::msg)?;

    let engine = build_engine(mode, &config, model_path).await?;
    let pipeline = ClassificationPipeline::new(engine);
    let relay = BackendRelay::new(config.backend_url.clone())
        .context("building backend relay client")?;

    info!("Starting Waste Classification API");
    info!("Engine mode: {}", mode.as_str());
    info!("Backend URL: {}", config.backend_url);
    info!("Listening on port {}", config.port);

    let state = AppState::new(pipeline, relay, config);
    wastesort::server::rocket(state)
        .launch()
        .await
        .context("server failed")?;
    Ok(())
}

async fn predict(image: PathBuf, model_path: Option<PathBuf>) -> anyhow::Result<()> {
    let engine = build_local_engine(model_path).await?;
    let pipeline = ClassificationPipeline::new(Arc::new(engine));

    let filename = image
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("image")
        .to_string();
    let bytes = std::fs::read(&image).with_context(|| format!("reading {}", image.display()))?;
    let result = pipeline.classify(&bytes, &filename).await?;

    let mut report = serde_json::to_value(result.info())?;
    report["confidence"] = serde_json::Value::String(result.formatted_confidence());
    report["image_path"] = serde_json::Value::String(image.display().to_string());
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn eval(
    data_dir: PathBuf,
    model_path: Option<PathBuf>,
    train_fraction: f64,
    seed: u64,
) -> anyhow::Result<()> {
    let engine = build_local_engine(model_path).await?;
    let pipeline = ClassificationPipeline::new(Arc::new(engine));

    info!("Loading test set from {}", data_dir.display());
    let records = dataset::load_corpus(&data_dir)?;
    let split = dataset::partition(records, train_fraction, seed)?;

    let mut correct = 0usize;
    let total = split.test.len();
    for record in &split.test {
        let filename = record
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("image")
            .to_string();
        let bytes = std::fs::read(&record.path)?;
        let result = pipeline.classify(&bytes, &filename).await?;
        if result.class == record.label {
            correct += 1;
        }
    }

    let accuracy = if total > 0 {
        correct as f64 / total as f64
    } else {
        0.0
    };
    info!("Test set accuracy: {:.4} ({}/{})", accuracy, correct, total);
    println!("{:.4}", accuracy);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    wastesort::init_logger();
    let cli = Cli::parse();

    match cli.command {
        Command::Serve { engine, model_path } => serve(engine, model_path).await,
        Command::Predict { image, model_path } => predict(image, model_path).await,
        Command::Eval {
            data_dir,
            model_path,
            train_fraction,
            seed,
        } => eval(data_dir, model_path, train_fraction, seed).await,
    }
}
