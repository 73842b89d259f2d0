//! graphfs server binary
//!
//! Serves the file gateway over a Unix socket.
//!
//! ## Usage
//!
//! ```bash
//! graphfs-server --root ~/graphs
//! graphfs-server --config ./graphfs.ron --socket /tmp/graphfs.sock
//! ```

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use graphfs_kernel::{FileGateway, GatewayConfig};
use graphfs_server::{Server, default_socket_path};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn print_usage() {
    eprintln!(
        r#"graphfs-server - root-scoped file gateway over a Unix socket

USAGE:
    graphfs-server [OPTIONS]

OPTIONS:
    --config <FILE>               Config file (default: {config})
    --root <DIR>                  Directory all operations are confined to
    --socket <PATH>               Socket path (default: {socket})
    --help, -h                    Show this help

PROTOCOL:
    One JSON request per line, one JSON reply per line:
    {{"id":1,"op":"read_file","path":"pages/a.md"}}
"#,
        config = GatewayConfig::default_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "none".to_string()),
        socket = default_socket_path().display()
    );
}

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    root: Option<PathBuf>,
    socket: Option<PathBuf>,
    help: bool,
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut parsed = Args::default();
    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--help" | "-h" => {
                parsed.help = true;
                i += 1;
            }
            "--config" | "--root" | "--socket" => {
                let Some(value) = args.get(i + 1) else {
                    return Err(format!("{flag} requires a value"));
                };
                let path: PathBuf = shellexpand::tilde(value).as_ref().into();
                match flag {
                    "--config" => parsed.config = Some(path),
                    "--root" => parsed.root = Some(path),
                    _ => parsed.socket = Some(path),
                }
                i += 2;
            }
            other => return Err(format!("Unknown option: {other}")),
        }
    }
    Ok(parsed)
}

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let argv: Vec<String> = env::args().skip(1).collect();
    let args = match parse_args(&argv) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    if args.help {
        print_usage();
        return ExitCode::SUCCESS;
    }

    if let Err(e) = run(args).await {
        tracing::error!("Server error: {e:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn run(args: Args) -> anyhow::Result<()> {
    let mut config =
        GatewayConfig::load_or_default(args.config.as_deref()).context("loading config")?;
    if let Some(root) = args.root {
        config.root = root;
    }
    if let Some(socket) = args.socket {
        config.socket = Some(socket);
    }

    let gateway = FileGateway::from_config(&config).context("building gateway")?;
    tracing::info!(root = %gateway.scope().root().display(), "Starting graphfs server");

    let socket = config.socket.clone().unwrap_or_else(default_socket_path);
    let server = Arc::new(Server::new(Arc::new(gateway)));
    server.run(socket).await
}
