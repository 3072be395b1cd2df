//! Anton - command-line driver
//!
//! Batch input and output are CSV when the path ends in `.csv`, JSONL
//! otherwise, and may differ. Training accepts survey records in either
//! format.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};

use anton_scoring::constants;
use anton_scoring::logic::batch::{input_from_row, BatchMode};
use anton_scoring::logic::dataset::{
    export_logs, is_csv, load_raw_records, read_csv_rows, read_jsonl_rows, write_csv_rows,
    write_jsonl_rows, CsvTable, JsonlScoreSink, ScoreSink,
};
use anton_scoring::logic::features::feature_index;
use anton_scoring::{
    EngineConfig, EngineError, FeatureEngineer, ModelArtifact, ModelTrainer, ScoringEngine,
};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "anton", version)]
#[command(about = "Behavioral credit scoring for thin-file borrowers")]
struct Cli {
    /// Engine config file (JSON); defaults plus ANTON_* overrides otherwise
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit a model on labeled survey records and save the artifact
    Train {
        /// Survey records (.jsonl or .csv)
        records: PathBuf,
        /// Where to write the artifact
        artifact: PathBuf,
    },

    /// Score one JSON object of named features
    Score {
        artifact: PathBuf,
        /// e.g. '{"digital_score": 2, "income_weight": 0.75}'
        input: String,
        /// Append a score log record under this directory
        #[arg(long)]
        log: Option<PathBuf>,
    },

    /// Score every row of a file, appending the score columns
    Batch {
        artifact: PathBuf,
        input: PathBuf,
        output: PathBuf,
        /// Require all five feature columns on every row
        #[arg(long)]
        strict: bool,
        /// Append a score log record per row under this directory
        #[arg(long)]
        log: Option<PathBuf>,
    },

    /// Merge rotated score logs into one JSONL file
    Export {
        output: PathBuf,
        /// Log directory; defaults to the data directory's `scores/`
        #[arg(long)]
        log: Option<PathBuf>,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::from_env(),
    };

    log::info!("{} v{}", constants::APP_NAME, constants::APP_VERSION);

    match cli.command {
        Commands::Train { records, artifact } => train(&config, &records, &artifact),
        Commands::Score {
            artifact,
            input,
            log,
        } => score(&config, &artifact, &input, log.as_deref()),
        Commands::Batch {
            artifact,
            input,
            output,
            strict,
            log,
        } => {
            let mode = if strict {
                BatchMode::Strict
            } else {
                BatchMode::Adaptive
            };
            batch(&config, &artifact, &input, &output, mode, log.as_deref())
        }
        Commands::Export { output, log } => {
            let log_dir = log.unwrap_or_else(constants::get_log_dir);
            let merged = export_logs(&log_dir, &output)?;
            println!("merged {} log files", merged);
            Ok(())
        }
    }
}

fn train(config: &EngineConfig, records: &Path, artifact_path: &Path) -> CliResult<()> {
    let records = load_raw_records(records)?;
    let engineer = FeatureEngineer::new(config.engineer.clone());
    let artifact = ModelTrainer::new(config.trainer.clone()).fit_records(&engineer, &records)?;
    artifact.save(artifact_path)?;

    println!("{}", serde_json::to_string_pretty(&artifact.metrics)?);
    Ok(())
}

fn load_engine(config: &EngineConfig, artifact_path: &Path) -> CliResult<ScoringEngine> {
    let engine = ScoringEngine::from_config(config);
    engine
        .scorer()
        .attach(Arc::new(ModelArtifact::load(artifact_path)?))?;
    Ok(engine)
}

fn open_sink(log_dir: Option<&Path>) -> CliResult<Option<JsonlScoreSink>> {
    Ok(match log_dir {
        Some(dir) => Some(JsonlScoreSink::new(dir.to_path_buf())?),
        None => None,
    })
}

fn score(
    config: &EngineConfig,
    artifact_path: &Path,
    object: &str,
    log_dir: Option<&Path>,
) -> CliResult<()> {
    let engine = load_engine(config, artifact_path)?;
    let row = match serde_json::from_str(object)? {
        serde_json::Value::Object(row) => row,
        _ => return Err("score input must be a JSON object".into()),
    };

    // a single request may not carry columns the model doesn't know
    if let Some(unknown) = row.keys().find(|k| feature_index(k).is_none()) {
        return Err(Box::new(EngineError::SchemaMismatch(format!(
            "unknown feature `{}`",
            unknown
        ))));
    }

    let input = input_from_row(0, &row, BatchMode::Adaptive)?;
    let result = match open_sink(log_dir)? {
        Some(sink) => engine.evaluate_logged(&input, &sink)?,
        None => engine.evaluate(&input)?,
    };

    println!("{}", serde_json::to_string_pretty(&result.to_response())?);
    Ok(())
}

fn batch(
    config: &EngineConfig,
    artifact_path: &Path,
    input: &Path,
    output: &Path,
    mode: BatchMode,
    log_dir: Option<&Path>,
) -> CliResult<()> {
    let engine = load_engine(config, artifact_path)?;
    let sink = open_sink(log_dir)?;

    let table = if is_csv(input) {
        read_csv_rows(input)?
    } else {
        CsvTable::from_rows(read_jsonl_rows(input)?)
    };
    let scored = engine.score_table(&table, mode, sink.as_ref().map(|s| s as &dyn ScoreSink))?;

    if is_csv(output) {
        write_csv_rows(output, &scored)?;
    } else {
        write_jsonl_rows(output, &scored.rows)?;
    }

    println!("scored {} rows into {}", scored.len(), output.display());
    Ok(())
}
