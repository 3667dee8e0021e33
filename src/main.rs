use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use quizdeck::{ApiClient, TestStore, DEFAULT_BASE_URL};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Base URL of the quiz backend API
    #[arg(long, env = "QUIZDECK_API_URL", default_value = DEFAULT_BASE_URL)]
    api_url: String,

    /// Directory for diagnostic log files
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // The TUI owns stdout, so logs go to a file.
    let file_appender = tracing_appender::rolling::daily(&args.log_dir, "quizdeck.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();

    tracing::info!(api_url = %args.api_url, "starting quizdeck");
    let store = TestStore::new(ApiClient::new(&args.api_url));

    if let Err(e) = quizdeck::run(store).await {
        eprintln!("Error running quizdeck: {e}");
        std::process::exit(1);
    }
}
