//! Tenant gateway.
//!
//! Front door for a multi-tenant web application: maps hostnames to
//! tenants, normalizes locale-prefixed paths and forwards to the renderer.
//!
//! # Architecture Overview
//!
//! ```text
//!                          ┌──────────────────────────────────────────────┐
//!                          │                TENANT GATEWAY                 │
//!     Client Request       │  ┌────────┐   ┌──────────────────────────┐   │
//!     ─────────────────────┼─▶│  http  │──▶│         routing          │   │
//!                          │  │ server │   │ host → tenant → locale   │   │
//!                          │  └────────┘   │     → decision rules     │   │
//!                          │                └────────────┬─────────────┘   │
//!                          │        ┌────────────────────┼──────────┐      │
//!                          │        ▼                    ▼          ▼      │
//!     ◀────────────────────┼── redirect            manifest   forward ───┼──▶ Renderer
//!                          │  (301/302)            (static)  (pass/      │
//!                          │                                  rewrite)   │
//!                          │  config · observability · lifecycle         │
//!                          └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use tenant_gateway::lifecycle::startup::{self, StartupOptions};

#[derive(Parser)]
#[command(name = "tenant-gateway")]
#[command(about = "Host and locale routing front door for multi-tenant sites", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long, env = "TENANT_GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Reload the configuration file when it changes.
    #[arg(short, long)]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    startup::run(StartupOptions {
        config_path: cli.config,
        watch: cli.watch,
    })
    .await?;

    Ok(())
}
