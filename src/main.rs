// ABOUTME: Entry point for the gpurent CLI application.
// ABOUTME: Parses arguments and dispatches to marketplace and session handlers.

mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use gpurent::config::Settings;
use gpurent::error::Result;
use gpurent::market::{CandidateFilters, HttpMarketClient, MarketClient, RentalGuard};
use gpurent::session::{ConnectSpec, RusshTransport, SessionManager};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let result = run(cli).await;

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings = Settings::from_env();

    match cli.command {
        Commands::Candidates {
            cluster,
            min_gpus,
            json,
        } => {
            let client = market_client(&settings)?;
            let filters = CandidateFilters { cluster, min_gpus };
            let candidates = client.list_candidates(&filters).await?;

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&candidates).expect("candidates serialize")
                );
            } else {
                for c in &candidates {
                    println!(
                        "{}/{}  {} of {} GPU(s) free",
                        c.cluster,
                        c.node_id,
                        c.gpu_available(),
                        c.gpu_total
                    );
                }
            }
            Ok(())
        }
        Commands::Rent {
            cluster,
            node,
            gpus,
        } => {
            let client = market_client(&settings)?;
            let guard = RentalGuard::new(client);

            println!("  → Checking capacity on {}/{}...", cluster, node);
            let rental = guard.rent(&cluster, &node, gpus).await?;

            println!("  ✓ Rental {} created ({})", rental.id, rental.status);
            if let Some(conn) = &rental.connection {
                println!(
                    "  → Instance reachable at {} (user: {})",
                    conn.host,
                    conn.username.as_deref().unwrap_or("root")
                );
            }
            Ok(())
        }
        Commands::Run {
            host,
            user,
            password,
            key,
            port,
            timeout_ms,
            command,
        } => {
            let manager = SessionManager::new(RusshTransport, settings);

            println!("  → Connecting to {}...", host);
            let mut spec = ConnectSpec::new(&host, &user)
                .port(port)
                .timeout(Duration::from_millis(timeout_ms));
            if let Some(password) = password {
                spec = spec.password(password);
            }
            if let Some(key) = key {
                spec = spec.key_path(key);
            }
            manager.connect(spec).await?;

            // Disconnect regardless of the command outcome so the session
            // never outlives the call.
            let outcome = manager.execute(&command).await;
            manager.disconnect().await;

            let result = outcome?;
            print!("{}", result.stdout);
            Ok(())
        }
    }
}

fn market_client(settings: &Settings) -> Result<HttpMarketClient> {
    Ok(HttpMarketClient::new(
        settings.market_url()?,
        settings.market_api_key()?,
    ))
}
