use clap::Parser;
use clap::Subcommand;
use guidechat::config::AppConfig;
use guidechat::Result;
use tracing::info;

#[derive(Parser)]
#[command(name = "guidechat")]
#[command(about = "Retrieval-augmented chatbot over an indexed guideline corpus")]
#[command(version)]
struct Cli {
    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the chat web server
    Serve {
        /// Bind host (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Bind port (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        guidechat::logging::init_logging("debug")?;
    } else {
        guidechat::logging::init_logging("info")?;
    }

    // Load configuration
    let mut config = AppConfig::load()?;
    info!("Configuration loaded successfully");

    // Execute the requested command; bare invocation serves
    match cli.command.unwrap_or(Commands::Serve {
        host: None,
        port: None,
    }) {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            guidechat::api::serve(&config).await?;
        }
        Commands::Config => {
            print_config(&config);
        }
    }

    Ok(())
}

fn print_config(config: &AppConfig) {
    println!("📋 guidechat Configuration:");
    println!();

    println!("🌐 Server:");
    println!("  Bind address: {}", config.bind_address());
    println!();

    println!("📝 Logging:");
    println!("  Level: {}", config.logging.level);
    println!("  Backtrace: {}", config.logging.backtrace);
    println!();

    println!("🧠 Embeddings:");
    println!("  Provider: {}", config.embeddings.provider);
    println!("  Endpoint: {}", config.embeddings.endpoint);
    println!("  Model: {}", config.embedding_model());
    println!("  Query prefix: {:?}", config.query_prefix());
    println!(
        "  API key: {}",
        mask_secret(config.embeddings.api_key.as_deref().unwrap_or(""))
    );
    println!();

    println!("🔍 Vector index:");
    println!("  Endpoint: {}", config.vector_index.endpoint);
    println!("  Top-K: {}", config.top_k());
    println!("  API key: {}", mask_secret(&config.vector_index.api_key));
    println!();

    println!("🤖 LLM:");
    println!("  Endpoint: {}", config.llm.endpoint);
    println!("  Model: {}", config.llm_model());
    println!("  API key: {}", mask_secret(&config.llm.api_key));
    println!();

    println!("🔐 Session:");
    println!(
        "  Secret: {}",
        if config.session.secret_key.is_some() {
            "configured"
        } else {
            "generated per process start"
        }
    );
    println!("  Idle timeout: {}s", config.session_timeout_secs());
    println!();

    println!("🧾 Audit:");
    println!("  Enabled: {}", config.audit_enabled());
    println!("  Spreadsheet: {}", config.audit.spreadsheet_id);
    println!("  Worksheet: {}", config.audit.worksheet);
}

/// Mask a secret for terminal output
fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        "(not set)".to_string()
    } else {
        "***".to_string()
    }
}
