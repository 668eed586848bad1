mod chat_cmd;
mod docs_cmd;
mod sessions_cmd;
mod terminal_output;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use zeorag_app::Shell;
use zeorag_client::HttpBackend;
use zeorag_core::RagBackend;
use zeorag_logging::{init_logger, redact_sensitive_data, LogTarget};

use docs_cmd::DocCommands;
use sessions_cmd::SessionCommands;

#[derive(Parser)]
#[command(name = "zeorag")]
#[command(about = "ZeoRAG client: chat with your papers")]
#[command(version)]
struct Cli {
    /// Backend base URL, overriding the config file and ZEORAG_API_URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Path to the config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Also log to stderr (ignored by the UI)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the terminal UI (default)
    Ui,
    /// Manage chat sessions
    Sessions {
        #[command(subcommand)]
        cmd: SessionCommands,
    },
    /// Manage indexed papers
    Docs {
        #[command(subcommand)]
        cmd: DocCommands,
    },
    /// Ask one question and stream the answer
    Ask {
        /// Session name the question belongs to
        #[arg(short, long)]
        session: String,
        /// The question
        #[arg(required = true)]
        question: Vec<String>,
    },
    /// Chat with a session from the terminal
    Chat {
        /// Session name; an unknown name starts a new session
        #[arg(short, long)]
        session: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = zeorag_config::load(cli.config.as_deref()).await?;
    if let Some(url) = cli.api_url {
        config = config.with_api_url(url);
    }

    let command = cli.command.unwrap_or(Commands::Ui);

    // The UI owns the terminal, so it never logs to the console.
    let target = match &command {
        Commands::Ui => LogTarget::file_or_silent(config.log_dir.clone()),
        _ if cli.verbose => LogTarget::console_and(config.log_dir.clone()),
        _ => LogTarget::file_or_silent(config.log_dir.clone()),
    };
    init_logger(target, &config.log_level);
    zeorag_config::check(&config)?;

    info!(
        api_url = %redact_sensitive_data(config.base_url()),
        timeout_secs = config.request_timeout_secs,
        "Starting ZeoRAG client"
    );
    let backend: Arc<dyn RagBackend> = Arc::new(HttpBackend::new(&config)?);

    match command {
        Commands::Ui => zeorag_tui::run(Shell::new(backend)).await?,
        Commands::Sessions { cmd } => sessions_cmd::run(cmd, backend.as_ref()).await?,
        Commands::Docs { cmd } => docs_cmd::run(cmd, backend.as_ref()).await?,
        Commands::Ask { session, question } => {
            chat_cmd::ask(backend.as_ref(), &session, &question.join(" ")).await?
        }
        Commands::Chat { session } => chat_cmd::chat(backend.as_ref(), &session).await?,
    }

    Ok(())
}
