//! staticd binary: CLI options, logging setup and server bootstrap.

use clap::Parser;
use staticd::config::{self, ServerConfig};
use staticd::server::Server;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process;
use std::sync::Mutex;
use tracing::{error, info};

/// Minimal static file HTTP server
#[derive(Parser, Debug)]
#[command(name = "staticd", version, about)]
struct Opts {
    /// Host or address to listen on
    #[arg(long, default_value = config::DEFAULT_HOST, env = "STATICD_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = config::DEFAULT_PORT, env = "STATICD_PORT")]
    port: u16,

    /// Number of worker threads accepting connections
    #[arg(short, long, default_value_t = config::DEFAULT_WORKERS, env = "STATICD_WORKERS")]
    workers: usize,

    /// Directory to serve files from
    #[arg(short = 'r', long, default_value = config::DEFAULT_DOC_ROOT, env = "STATICD_ROOT")]
    doc_root: PathBuf,

    /// Append logs to this file instead of stderr
    #[arg(short, long, env = "STATICD_LOG")]
    log: Option<PathBuf>,
}

fn main() {
    let opts = Opts::parse();

    if let Err(err) = init_logging(opts.log.as_deref()) {
        eprintln!("staticd: cannot open log file: {}", err);
        process::exit(1);
    }

    let config = ServerConfig {
        host: opts.host,
        port: opts.port,
        workers: opts.workers,
        doc_root: opts.doc_root,
        ..ServerConfig::default()
    };

    let server = match Server::bind(config) {
        Ok(server) => server,
        Err(err) => {
            error!("cannot start: {}", err);
            process::exit(1);
        }
    };

    match server.local_addr() {
        Ok(addr) => info!("serving on http://{}", addr),
        Err(err) => {
            error!("cannot start: {}", err);
            process::exit(1);
        }
    }

    server.install_signal_handlers();

    if let Err(err) = server.run() {
        error!("server failed: {}", err);
        process::exit(1);
    }
}

/// Log to stderr, or append to a file when `--log` is given
fn init_logging(log: Option<&std::path::Path>) -> std::io::Result<()> {
    match log {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::fmt()
                .with_max_level(tracing::Level::INFO)
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_max_level(tracing::Level::INFO)
                .with_target(false)
                .init();
        }
    }
    Ok(())
}
