mod chat_cmd;
mod console;
mod render_cmd;
mod serve_cmd;
mod status_cmd;
mod terminal;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{debug, error, warn};

use llamachat_config::{config_dir, config_file_path, load_and_prepare};
use markdown::RevealDelays;

use render_cmd::RenderFormat;

#[derive(Parser)]
#[command(name = "llamachat")]
#[command(about = "LlamaChat: Llama chat gateway and terminal client")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ~/.llamachat/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the chat gateway server
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Chat with a running gateway from the terminal
    Chat {
        /// API root of the gateway, e.g. http://localhost:5000/api
        #[arg(short, long)]
        url: Option<String>,
    },
    /// Render a markdown reply (from FILE or stdin)
    Render {
        #[arg(short, long, value_enum, default_value_t = RenderFormat::Text)]
        format: RenderFormat,
        file: Option<PathBuf>,
    },
    /// Show the status of a running gateway
    Status {
        #[arg(short, long)]
        url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let path = cli
        .config
        .unwrap_or_else(|| config_file_path(&config_dir()));
    let (config, report) = load_and_prepare(&path).await?;

    logging::init_logger(
        config.logging.level(),
        config.logging.dir.as_deref().map(Path::new),
    );

    // Provider warnings only matter to the server.
    let serving = matches!(cli.command, Commands::Serve { .. });
    for warning in &report.warnings {
        if serving {
            warn!(path = %warning.path, "{}", warning.message);
        } else {
            debug!(path = %warning.path, "{}", warning.message);
        }
    }
    if !report.is_valid() {
        for err in &report.errors {
            error!(path = %err.path, "{}", err.message);
        }
        anyhow::bail!("Invalid configuration in {}", path.display());
    }

    match cli.command {
        Commands::Serve { port } => serve_cmd::run(&config, port).await?,
        Commands::Chat { url } => {
            let url = url.unwrap_or_else(|| config.client.api_url().to_string());
            let (text, span, container) = config.reveal.delays_ms();
            chat_cmd::run(&url, RevealDelays::from_millis(text, span, container)).await?;
        }
        Commands::Render { format, file } => render_cmd::run(format, file).await?,
        Commands::Status { url } => {
            let url = url.unwrap_or_else(|| config.client.api_url().to_string());
            status_cmd::run(&url).await?;
        }
    }

    Ok(())
}
