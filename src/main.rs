use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use petriflow_engine::{Engine, EngineConfig, FlowRegistry, Handlers, LoaderError};
use petriflow_net::{Process, Variables, variables_from_json};
use petriflow_resolver::load_file;

/// Petriflow - A Petri net workflow engine
#[derive(Parser)]
#[command(name = "petriflow")]
#[command(version, about, long_about = None)]
struct Cli {
  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Compile a process definition and print the resulting net
  Inspect {
    /// Path to the process file (YAML or JSON)
    process_file: PathBuf,
  },

  /// Start a flow and run it until it completes or times out
  Run {
    /// Path to the process file (YAML or JSON)
    process_file: PathBuf,

    /// Start data as a JSON object (read from stdin when omitted)
    #[arg(long)]
    data: Option<String>,

    /// Owner recorded on the flow
    #[arg(long, default_value = "cli")]
    owner: String,

    /// Seconds to wait for completion
    #[arg(long, default_value_t = 30.0)]
    timeout: f64,
  },
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(io::stderr)
    .init();

  let cli = Cli::parse();

  match cli.command {
    Some(Commands::Inspect { process_file }) => inspect(&process_file)?,
    Some(Commands::Run {
      process_file,
      data,
      owner,
      timeout,
    }) => {
      let rt = tokio::runtime::Runtime::new()?;
      rt.block_on(run(process_file, data, owner, timeout))?;
    }
    None => {
      println!("petriflow - use --help to see available commands");
    }
  }

  Ok(())
}

fn inspect(process_file: &Path) -> Result<()> {
  let process = load_file(process_file)
    .with_context(|| format!("failed to load process file: {}", process_file.display()))?;

  eprintln!(
    "Loaded process: {} ({} places, {} transitions)",
    process.name(),
    process.places(),
    process.transition_count()
  );
  println!("{}", serde_json::to_string_pretty(&process)?);
  Ok(())
}

async fn run(process_file: PathBuf, data: Option<String>, owner: String, timeout: f64) -> Result<()> {
  let process = load_file(&process_file)
    .with_context(|| format!("failed to load process file: {}", process_file.display()))?;
  eprintln!("Loaded process: {}", process.name());

  let payload: serde_json::Value = match data {
    Some(text) => serde_json::from_str(&text).context("failed to parse --data JSON")?,
    None => read_payload_from_stdin()?,
  };
  let start_data = variables_from_json(payload).context("invalid start data")?;

  let cancel = CancellationToken::new();
  let registry = FlowRegistry::new();
  let definitions_dir = process_file
    .parent()
    .map(Path::to_path_buf)
    .unwrap_or_default();

  let handlers = cli_handlers(&registry, cancel.clone(), definitions_dir);
  let engine =
    Engine::new(EngineConfig::default(), handlers).context("failed to create flow engine")?;

  let flow = engine.create_flow(Arc::new(process), owner);
  let enabled = flow
    .start(start_data)
    .await
    .context("failed to start flow")?;
  info!(flow_id = %flow.id(), enabled = ?enabled, "flow running");

  let snapshot = flow.snapshot().await;
  let idle = snapshot.in_progress.is_empty() && snapshot.running_sub_processes.is_empty();
  if !snapshot.completed && idle {
    eprintln!("Flow is waiting on user transitions: {:?}", snapshot.user_transitions);
  } else if !snapshot.completed {
    let limit = Duration::try_from_secs_f64(timeout).unwrap_or(Duration::from_secs(30));
    tokio::select! {
      _ = cancel.cancelled() => {
        eprintln!("Flow completed");
      }
      _ = tokio::signal::ctrl_c() => {
        warn!(flow_id = %flow.id(), "interrupted");
      }
      _ = tokio::time::sleep(limit) => {
        warn!(flow_id = %flow.id(), timeout_secs = timeout, "timed out waiting for flow");
      }
    }
  }

  let snapshot = flow.snapshot().await;
  println!("{}", serde_json::to_string_pretty(&snapshot)?);
  Ok(())
}

/// Hooks for unattended runs: messages are accepted as sent, system tasks
/// complete immediately with no data and subprocess definitions are read
/// from files next to the main definition.
fn cli_handlers(registry: &FlowRegistry, cancel: CancellationToken, dir: PathBuf) -> Handlers {
  let tasks = registry.clone();

  Handlers::new()
    .with_registry(registry)
    .on_send_message(|flow, transition| {
      info!(flow_id = %flow.id(), transition, "message sent");
      true
    })
    .on_system_task(move |flow, token, transition| {
      let Some(handle) = tasks.get(flow.id()) else {
        return false;
      };
      info!(flow_id = %flow.id(), transition, token = %token, "completing system task");
      tokio::spawn(async move {
        if let Err(e) = handle.fire_system_task(token, Variables::new()).await {
          warn!(flow_id = %handle.id(), token = %token, error = %e, "system task failed");
        }
      });
      true
    })
    .on_process_completed(move |flow| {
      info!(flow_id = %flow.id(), "process completed");
      cancel.cancel();
    })
    .process_loader(move |name| load_sibling(&dir, name))
}

fn load_sibling(dir: &Path, name: &str) -> Result<Arc<Process>, LoaderError> {
  for extension in ["yaml", "yml", "json"] {
    let path = dir.join(format!("{}.{}", name, extension));
    if path.exists() {
      return Ok(Arc::new(load_file(&path)?));
    }
  }
  Err(format!("no definition found for subprocess '{}' in {}", name, dir.display()).into())
}

fn read_payload_from_stdin() -> Result<serde_json::Value> {
  use std::io::IsTerminal;

  if io::stdin().is_terminal() {
    Ok(serde_json::json!({}))
  } else {
    let mut input = String::new();
    io::stdin()
      .read_to_string(&mut input)
      .context("failed to read start data from stdin")?;

    if input.trim().is_empty() {
      Ok(serde_json::json!({}))
    } else {
      serde_json::from_str(&input).context("failed to parse start data JSON from stdin")
    }
  }
}
