//! Todo API server binary.
//!
//! Loads configuration, installs logging and serves the API until Ctrl-C.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use todo_store::config::{ServerConfig, StoreBackend};
use todo_store::{http, logging};

/// Serve the todo REST API.
#[derive(Parser, Debug)]
#[command(name = "todo-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// YAML config file (defaults to ./todo-server.yaml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// Store file path
    #[arg(short, long)]
    store: Option<PathBuf>,

    /// Store backend: json, sqlite or memory
    #[arg(long)]
    backend: Option<StoreBackend>,

    /// Origin allowed by CORS
    #[arg(long)]
    allowed_origin: Option<String>,
}

impl Args {
    fn apply(self, config: &mut ServerConfig) {
        if let Some(bind) = self.bind {
            config.bind = bind;
        }
        if let Some(store) = self.store {
            config.store.path = Some(store);
        }
        if let Some(backend) = self.backend {
            config.store.backend = backend;
        }
        if let Some(origin) = self.allowed_origin {
            config.allowed_origin = origin;
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> todo_store::Result<()> {
    let args = Args::parse();
    let mut config = ServerConfig::load(args.config.as_deref())?;
    args.apply(&mut config);
    logging::init(&config.log)?;
    tracing::info!(
        version = todo_store::VERSION,
        backend = %config.store.backend,
        store = %config.store.resolved_path().display(),
        "starting todo server"
    );
    http::serve(&config).await
}
