use clap::{Parser, Subcommand};
use lib::config::Config;
use lib::forwarder::{Forwarder, ForwarderConfig};
use lib::registry::RegistryClient;

#[derive(Parser)]
#[command(name = "facta-agent")]
#[command(about = "Facta AI agent bridge", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Run the agent bridge: register with the registry and serve the agent
    /// endpoint. Configuration comes from the environment (FACTA_BACKEND_URL,
    /// PORT, ENABLE_TUNNEL, PUBLIC_URL, AGENT_ID, REGISTRY_URL).
    Run {
        /// Listen port (default from PORT or 7000)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Forward a single claim to the backend and print the reply (local testing).
    Check {
        /// Claim text to fact-check
        claim: String,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("facta-agent {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Run { port }) => {
            if let Err(e) = run_bridge(port).await {
                log::error!("run failed: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Check { claim }) => {
            if let Err(e) = run_check(&claim).await {
                log::error!("check failed: {}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

async fn run_bridge(port: Option<u16>) -> anyhow::Result<()> {
    let mut config = Config::from_env()?;
    if let Some(p) = port {
        config.port = p;
    }

    let public_url = config.resolve_public_url();
    if config.enable_tunnel && config.public_url.is_none() {
        log::warn!(
            "ENABLE_TUNNEL is set but no PUBLIC_URL is configured; \
             the tunnel provider must announce {} itself",
            public_url
        );
    }

    let registry = RegistryClient::new(config.registry_url.clone());
    match registry.register(&config.agent_id, &public_url).await {
        Ok(()) => log::info!(
            "registered agent '{}' at {} with {}",
            config.agent_id,
            public_url,
            config.registry_url
        ),
        Err(e) => log::warn!("registry registration failed (continuing): {}", e),
    }

    log::info!(
        "agent '{}' ready on port {} (backend: {})",
        config.agent_id,
        config.port,
        config.backend_url
    );
    lib::agent::run_agent(config).await
}

async fn run_check(claim: &str) -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let forwarder = Forwarder::new(ForwarderConfig::new(config.backend_url))?;
    let reply = forwarder.handle(claim, "cli").await;
    println!("{}", reply.content);
    Ok(())
}
