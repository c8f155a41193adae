use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use orion_error::ErrorCode;
use rg_config::{EngineConfig, RunMode, load_rule_file};
use rg_core::{Artifact, Bindings, Engine, EngineError, build_engine};
use rg_lang::Value;

use crate::tracing_init::init_tracing;

/// Exit code when at least one rule failed.
pub const EXIT_RULE_FAILED: i32 = 4;

pub struct RunArgs {
    pub rule_file: PathBuf,
    pub input: String,
    pub concurrent: bool,
    pub max_concurrency: Option<usize>,
    pub config: Option<PathBuf>,
}

/// Build and run the rule file once. Artifacts go to stdout as JSON lines,
/// rule failures to stderr. Returns the process exit code.
pub fn run(args: RunArgs) -> Result<i32> {
    let config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let _guard = init_tracing(&config.logging)?;

    let definition = load_rule_file(&args.rule_file)?;
    let bindings = parse_bindings(&args.input)?;
    let engine = build_engine(&definition).inspect_err(log_engine_error)?;

    let mode = if args.concurrent {
        RunMode::Concurrent
    } else {
        config.runtime.mode
    };
    let max_concurrency = args
        .max_concurrency
        .unwrap_or(config.runtime.max_concurrency);
    rg_info!(
        sys,
        file = %args.rule_file.display(),
        rules = engine.node_count(),
        ?mode,
        "rule set loaded"
    );

    let errors = execute(&engine, &bindings, mode, max_concurrency)?;

    for artifact in engine.artifacts() {
        println!("{}", artifact_json(&artifact));
    }
    for error in &errors {
        eprintln!("{error}");
    }
    Ok(if errors.is_empty() { 0 } else { EXIT_RULE_FAILED })
}

fn execute(
    engine: &Engine,
    bindings: &Bindings,
    mode: RunMode,
    max_concurrency: usize,
) -> Result<Vec<String>> {
    let errors = match mode {
        RunMode::Sequential => engine.run(bindings),
        RunMode::Concurrent => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .context("failed to start tokio runtime")?;
            runtime.block_on(engine.run_concurrent(bindings, max_concurrency))
        }
    };
    Ok(errors.inspect_err(log_engine_error)?)
}

/// Each top-level key of a JSON object becomes one binding.
pub fn parse_bindings(input: &str) -> Result<Bindings> {
    let json: serde_json::Value =
        serde_json::from_str(input).context("--input is not valid JSON")?;
    let serde_json::Value::Object(map) = json else {
        bail!("--input must be a JSON object");
    };
    let mut bindings = Bindings::new();
    for (name, value) in map {
        bindings.insert(name, Value::from_json(value))?;
    }
    Ok(bindings)
}

pub fn artifact_json(artifact: &Artifact) -> serde_json::Value {
    serde_json::json!({
        "id": artifact.id,
        "value": artifact.value.as_ref().map(Value::to_json),
    })
}

fn log_engine_error(e: &EngineError) {
    rg_error!(sys, code = e.error_code(), error = %e, "engine error");
}
