use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result, bail};
use clap::{Parser, Subcommand};

use toolflow_chain::ChainExecutor;
use toolflow_config::{ChainConfig, load_plan};
use toolflow_invoker::Context;
use toolflow_plan::SharedState;

mod builtins;

/// Toolflow - run declarative plans of tool invocations
#[derive(Parser)]
#[command(name = "toolflow")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Log filter used when RUST_LOG is not set
  #[arg(long, global = true, default_value = "info")]
  log_level: String,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Check a plan file against the builtin tools without running it
  Validate {
    /// Path to the plan file (JSON)
    plan_file: PathBuf,
  },

  /// Run a plan file and print the chain result as JSON
  Run {
    /// Path to the plan file (JSON)
    plan_file: PathBuf,

    /// Initial shared state, as a JSON object
    #[arg(long)]
    state: Option<String>,

    /// Correlation id for this run (default: random)
    #[arg(long)]
    correlation_id: Option<String>,

    /// Path to an executor config file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,
  },

  /// List the builtin tools
  Tools,
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  init_logging(&cli.log_level)?;

  match cli.command {
    Some(Commands::Validate { plan_file }) => {
      let rt = tokio::runtime::Runtime::new()?;
      rt.block_on(validate(&plan_file))?;
    }
    Some(Commands::Run {
      plan_file,
      state,
      correlation_id,
      config,
    }) => {
      let rt = tokio::runtime::Runtime::new()?;
      let success = rt.block_on(run(&plan_file, state, correlation_id, config))?;
      if !success {
        std::process::exit(1);
      }
    }
    Some(Commands::Tools) => {
      for name in builtins::registry().tool_names() {
        println!("{}", name);
      }
    }
    None => {
      println!("toolflow - use --help to see available commands");
    }
  }

  Ok(())
}

/// Logs go to stderr so stdout stays machine readable.
fn init_logging(level: &str) -> Result<()> {
  let filter = tracing_subscriber::EnvFilter::try_from_default_env()
    .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
    .context("failed to create log filter")?;

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .compact()
    .init();

  Ok(())
}

fn executor(config: ChainConfig) -> ChainExecutor {
  ChainExecutor::new(Arc::new(builtins::registry())).with_config(config)
}

async fn validate(plan_file: &Path) -> Result<()> {
  let plan = load_plan(plan_file)
    .await
    .with_context(|| format!("failed to load plan: {}", plan_file.display()))?;

  executor(ChainConfig::default())
    .validate(&plan)
    .with_context(|| format!("invalid plan: {}", plan_file.display()))?;

  eprintln!(
    "Plan is valid: {} steps, strategy {}",
    plan.steps.len(),
    plan.strategy
  );
  Ok(())
}

async fn run(
  plan_file: &Path,
  state: Option<String>,
  correlation_id: Option<String>,
  config: Option<PathBuf>,
) -> Result<bool> {
  let plan = load_plan(plan_file)
    .await
    .with_context(|| format!("failed to load plan: {}", plan_file.display()))?;

  let config = match config {
    Some(path) => {
      let content = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
      serde_json::from_str::<ChainConfig>(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?
    }
    None => ChainConfig::default(),
  };

  let executor = executor(config);
  executor
    .validate(&plan)
    .with_context(|| format!("invalid plan: {}", plan_file.display()))?;

  let ctx = match correlation_id {
    Some(id) => Context::with_correlation_id(id),
    None => Context::new(),
  };
  let ctx = match state {
    Some(state) => ctx.with_state(parse_state(&state)?),
    None => ctx,
  };

  let result = executor.execute_chain(&plan, &ctx).await;
  println!("{}", serde_json::to_string_pretty(&result)?);

  Ok(result.success)
}

fn parse_state(raw: &str) -> Result<SharedState> {
  match serde_json::from_str::<serde_json::Value>(raw).context("--state must be valid JSON")? {
    serde_json::Value::Object(state) => Ok(state),
    other => bail!("--state must be a JSON object, got {}", other),
  }
}
