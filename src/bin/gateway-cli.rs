use std::path::PathBuf;

use clap::{Parser, Subcommand};

use tenant_gateway::config::loader::load_config;
use tenant_gateway::config::GatewayConfig;
use tenant_gateway::routing::{RawRequest, RoutingEngine, Scheme};

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Offline tools for the tenant gateway", long_about = None)]
struct Cli {
    /// TOML configuration file (defaults when omitted).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show how a request would be routed
    Explain {
        /// Absolute URL, e.g. https://car.example.com/fa/dashboard
        #[arg(long, conflicts_with_all = ["host", "path", "query"])]
        url: Option<String>,

        /// Host header
        #[arg(long)]
        host: Option<String>,

        #[arg(long, default_value = "/")]
        path: String,

        #[arg(long)]
        query: Option<String>,

        #[arg(long, default_value = "http")]
        scheme: String,
    },
    /// Load and validate a configuration file
    CheckConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Explain {
            url,
            host,
            path,
            query,
            scheme,
        } => {
            let config = match &cli.config {
                Some(path) => load_config(path)?,
                None => GatewayConfig::default(),
            };
            let engine = RoutingEngine::from_config(&config.routing);

            let raw = match url {
                Some(url) => RawRequest::from_url(&url)
                    .ok_or_else(|| format!("not an absolute http(s) url: {url}"))?,
                None => {
                    let scheme = Scheme::parse(&scheme)
                        .ok_or_else(|| format!("unsupported scheme: {scheme}"))?;
                    RawRequest::new(host.unwrap_or_default(), path, query.as_deref(), scheme)
                }
            };

            let evaluation = engine.evaluate(&raw);
            println!("{}", serde_json::to_string_pretty(&evaluation)?);
        }
        Commands::CheckConfig => {
            let path = cli.config.ok_or("--config is required for check-config")?;
            match load_config(&path) {
                Ok(_) => println!("{}: ok", path.display()),
                Err(e) => {
                    eprintln!("{}: {}", path.display(), e);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
