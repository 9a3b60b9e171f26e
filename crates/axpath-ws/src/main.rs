/*!
`axpath-ws`: serve accessibility-tree queries over WebSocket.

Uses the live UI Automation tree on Windows, or a JSON snapshot anywhere
with `--snapshot`. `--dump` captures the tree to a snapshot and exits.
*/

use axpath::platform::{MemoryTree, Provider};
use axpath::serialize::DEFAULT_CONTAINER_TAG;
use axpath::Inspector;
use axpath_ws::{start_server, WebSocketState, DEFAULT_WS_PORT};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
  name = "axpath-ws",
  version,
  about = "XPath-style accessibility-tree queries over WebSocket"
)]
struct Cli {
  /// Port to listen on (127.0.0.1)
  #[arg(long, default_value_t = DEFAULT_WS_PORT)]
  port: u16,

  /// Serve a tree snapshot (JSON) instead of the live desktop
  #[arg(long)]
  snapshot: Option<PathBuf>,

  /// Retry budget for each read, in milliseconds
  #[arg(long, default_value_t = 5000)]
  deadline_ms: u64,

  /// Tag of the element wrapping serialized output
  #[arg(long, default_value = DEFAULT_CONTAINER_TAG)]
  container_tag: String,

  /// Capture the tree to this JSON file and exit
  #[arg(long)]
  dump: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
  let cli = Cli::parse();

  match cli.snapshot.clone() {
    Some(path) => match MemoryTree::load(&path) {
      Ok(tree) => {
        log::info!("[main] loaded {} nodes from {}", tree.node_count(), path.display());
        run(tree, cli).await
      }
      Err(e) => {
        log::error!("[main] cannot load snapshot {}: {e}", path.display());
        ExitCode::FAILURE
      }
    },
    None => live(cli).await,
  }
}

#[cfg(target_os = "windows")]
async fn live(cli: Cli) -> ExitCode {
  match axpath::platform::UiaProvider::new() {
    Ok(provider) => run(provider, cli).await,
    Err(e) => {
      log::error!("[main] {e}");
      ExitCode::FAILURE
    }
  }
}

#[cfg(not(target_os = "windows"))]
async fn live(_cli: Cli) -> ExitCode {
  log::error!("[main] no live accessibility provider on this platform, pass --snapshot <file.json>");
  ExitCode::FAILURE
}

async fn run<P: Provider + Send + 'static>(provider: P, cli: Cli) -> ExitCode {
  let inspector = Inspector::builder(provider)
    .deadline_ms(cli.deadline_ms)
    .container_tag(cli.container_tag)
    .build();

  if let Some(path) = cli.dump {
    let dumped = inspector.snapshot().and_then(|tree| {
      tree.save(&path)?;
      Ok(tree.node_count())
    });
    return match dumped {
      Ok(count) => {
        log::info!("[main] wrote {count} nodes to {}", path.display());
        ExitCode::SUCCESS
      }
      Err(e) => {
        log::error!("[main] dump failed: {e}");
        ExitCode::FAILURE
      }
    };
  }

  match start_server(WebSocketState::with_port(inspector, cli.port)).await {
    Ok(()) => ExitCode::SUCCESS,
    Err(_) => ExitCode::FAILURE,
  }
}
