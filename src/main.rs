//! Marketplace shell driver
//!
//! Runs the client shell headless. Intents are read from the command line, or
//! from stdin one per line when none are given, and every resulting screen is
//! written to stdout as a JSON line.

use anyhow::{Context, Result};
use clap::Parser;
use marketplace_shell::{App, Intent, Screen, ShellConfig};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "marketplace-shell", version, about = "Headless marketplace client shell")]
struct Cli {
    /// Path to a JSON configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Intents to apply in order, e.g. "login cliente@demo.com demo123"
    #[arg(value_name = "INTENT")]
    intents: Vec<String>,
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn print_screen(screen: &Screen) -> Result<()> {
    println!("{}", serde_json::to_string(screen)?);
    Ok(())
}

async fn read_stdin(tx: mpsc::UnboundedSender<String>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }
        if tx.send(line).is_err() {
            break;
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ShellConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ShellConfig::default(),
    };
    init_tracing(&config.log_filter);

    let app = App::new(&config);
    print_screen(&app.screen())?;
    app.start();
    print_screen(&app.screen())?;

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let reader = if cli.intents.is_empty() {
        Some(tokio::spawn(read_stdin(tx)))
    } else {
        for line in cli.intents {
            tx.send(line).context("intent channel closed")?;
        }
        drop(tx);
        None
    };

    while let Some(line) = rx.recv().await {
        let applied = line
            .parse::<Intent>()
            .and_then(|intent| app.handle(intent));
        if let Err(err) = applied {
            tracing::warn!(intent = %line, error = %err, "intent rejected");
            continue;
        }
        print_screen(&app.screen())?;
    }

    if let Some(reader) = reader {
        reader.await.context("stdin reader panicked")??;
    }

    tracing::info!(route = %app.router().current_route(), "session finished");
    Ok(())
}
