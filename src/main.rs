//! seccampdb CLI entry point.

use std::io::BufRead;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

use seccampdb::{Config, Database};

/// seccampdb - in-memory key-value store with durable transactions
#[derive(Parser, Debug)]
#[command(name = "seccampdb")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Recover and serve TCP sessions. Type `exit` on stdin to shut down.
    Serve {
        /// Path to a JSON configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:54321")]
        addr: String,
    },

    /// Recover, print all visible key/value pairs, and shut down
    Dump {
        /// Path to a JSON configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli.command) {
        error!(error = %e, "fatal");
        process::exit(1);
    }
}

fn run(command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Serve { config, addr } => {
            let config = load_config(config)?;
            let db = Arc::new(Database::open(&config)?);

            // Admin console: `exit` checkpoints and leaves cleanly.
            let admin_db = Arc::clone(&db);
            std::thread::spawn(move || {
                let stdin = std::io::stdin();
                for line in stdin.lock().lines() {
                    let Ok(line) = line else { break };
                    if line.trim() == "exit" {
                        match admin_db.shutdown() {
                            Ok(()) => process::exit(0),
                            Err(e) => {
                                error!(error = %e, "shutdown failed");
                                process::exit(1);
                            }
                        }
                    }
                }
            });

            seccampdb::server::serve(db, &addr)?;
            Ok(())
        }
        Command::Dump { config } => {
            let config = load_config(config)?;
            let db = Database::open(&config)?;
            for (key, value) in db.dump() {
                println!("{key} {value}");
            }
            db.shutdown()?;
            Ok(())
        }
    }
}

fn load_config(path: Option<PathBuf>) -> Result<Config, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(Config::load(&path)?),
        None => Ok(Config::default()),
    }
}
