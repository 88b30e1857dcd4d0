use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use huddle_core::IceServerConfig;
use huddle_server::HuddleConfig;
use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "huddle", version, about = "WebRTC signaling and room server")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the signaling server.
    Serve(ServeArgs),
    /// Print the effective configuration as TOML and exit.
    Config(ServeArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// TOML config file. Flags override values from it.
    #[arg(short, long, env = "HUDDLE_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, env = "HUDDLE_BIND")]
    bind: Option<SocketAddr>,

    /// STUN server url; repeat or comma-separate for several.
    #[arg(long = "stun", env = "HUDDLE_STUN", value_delimiter = ',')]
    stun: Vec<String>,

    #[arg(long, env = "TURN_URL")]
    turn_url: Option<String>,

    #[arg(long, env = "TURN_USERNAME")]
    turn_username: Option<String>,

    #[arg(long, env = "TURN_CREDENTIAL")]
    turn_credential: Option<String>,

    /// Only allow joining rooms created through the HTTP API.
    #[arg(long)]
    no_auto_create: bool,

    /// Echo chat messages back to their sender.
    #[arg(long)]
    echo_chat: bool,

    /// Used when RUST_LOG is not set.
    #[arg(long, env = "HUDDLE_LOG", default_value = "info")]
    log_level: String,
}

fn load_config(args: &ServeArgs) -> Result<HuddleConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            toml::from_str::<HuddleConfig>(&raw)
                .with_context(|| format!("Invalid config file {}", path.display()))?
        }
        None => HuddleConfig::default(),
    };

    if let Some(bind) = args.bind {
        config.bind = bind;
    }

    let mut ice_servers: Vec<IceServerConfig> =
        args.stun.iter().map(IceServerConfig::stun).collect();
    if let Some(turn_url) = &args.turn_url {
        ice_servers.push(IceServerConfig {
            urls: vec![turn_url.clone()],
            username: args.turn_username.clone(),
            credential: args.turn_credential.clone(),
        });
    }
    if !ice_servers.is_empty() {
        config.ice_servers = ice_servers;
    }

    if args.no_auto_create {
        config.auto_create_rooms = false;
    }
    if args.echo_chat {
        config.echo_chat = true;
    }

    config.validate()?;
    Ok(config)
}

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .with_context(|| format!("Invalid log level `{}`", level))?;

    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown requested");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => {
            init_logging(&args.log_level)?;
            let config = load_config(&args)?;

            info!("Initializing signaling server...");
            huddle_server::serve(config, shutdown_signal()).await?;
        }
        Commands::Config(args) => {
            let config = load_config(&args)?;
            let rendered = toml::to_string_pretty(&config).context("Failed to render config")?;
            println!("{}", rendered);
        }
    }

    Ok(())
}
