use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use mail_digest::auth::{GMAIL_READONLY_SCOPE, TokenManager};
use mail_digest::config::{Config, load_config, load_config_from};
use mail_digest::pipeline::{RunStatus, run_once};
use mail_digest::terminal::{OutsideDashboard, run_tui};

#[derive(Parser)]
#[command(name = "mail_digest")]
#[command(about = "Daily AI summary of unread Gmail", long_about = None)]
struct Cli {
    /// Use this config.toml instead of the one in the user config dir
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive dashboard (default)
    Tui,

    /// Generate one report, print it and exit
    Report {
        /// Override max_results from the config
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Make sure a usable Gmail credential is stored, running consent if needed
    Login,
}

fn load(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(p) => load_config_from(p),
        None => load_config(),
    }
    .map_err(|e| anyhow!("Configuration error: {e}"))
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let mut cfg = load(cli.config.as_ref())?;

    match cli.cmd.unwrap_or(Command::Tui) {
        Command::Tui => {
            let token_mgr = TokenManager::from_config(&cfg)?;
            // consent up front, before the screen is taken over
            token_mgr.obtain_credential(&[GMAIL_READONLY_SCOPE])?;
            let token_mgr =
                token_mgr.wrap_flow(|flow| Box::new(OutsideDashboard::new(flow)));
            run_tui(&mut || run_once(&cfg, &token_mgr))
        }

        Command::Report { limit } => {
            if limit.is_some() {
                cfg.max_results = limit;
            }
            let token_mgr = TokenManager::from_config(&cfg)?;
            let generated = run_once(&cfg, &token_mgr)?;

            println!("{}", generated.outcome.report);
            if let RunStatus::RetrievalFailed(reason) = &generated.outcome.status {
                eprintln!("Warning: mailbox could not be read: {reason}");
            }
            if generated.outcome.skipped > 0 {
                eprintln!(
                    "Warning: {} message(s) skipped (undecodable body)",
                    generated.outcome.skipped
                );
            }
            println!("Report saved to {}", generated.path.display());
            Ok(())
        }

        Command::Login => {
            let token_mgr = TokenManager::from_config(&cfg)?;
            let credential = token_mgr.obtain_credential(&[GMAIL_READONLY_SCOPE])?;
            match credential.expiry {
                Some(exp) => println!("Credential stored; access token valid until {exp}"),
                None => println!("Credential stored"),
            }
            Ok(())
        }
    }
}
