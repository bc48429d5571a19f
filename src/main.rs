use anyhow::{Context, Result};
use clap::Parser;
use pdfqa::config::Config;
use pdfqa::session::Session;
use pdfqa::ui::ChatState;
use pdfqa::ui::server::run_server;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pdfqa", version, about = "Chat with a PDF using local Ollama models")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(long, default_value = "config.json")]
    config: String,

    /// Address to serve the chat page on (overrides the config file).
    #[arg(long)]
    bind: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    tracing::info!("Starting pdfqa...");

    // 1. Load config
    let mut config = Config::load(&cli.config)?;
    if let Some(bind) = cli.bind {
        config.bind = bind;
    }
    config.validate().context("invalid configuration")?;

    // 2. Init model clients (blocking clients, built outside the runtime)
    let (embedder, model) = Session::ollama_models(&config)?;

    // 3. Init chat session
    let chat = ChatState::new(config, embedder, model).context("failed to start session")?;

    // 4. Start Server
    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    runtime.block_on(run_server(chat))
}
