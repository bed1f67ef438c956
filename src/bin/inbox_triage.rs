use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{error, info};
use std::io::{self, Read};

use inbox_triage::auth::{token_manager::TokenManager, token_store};
use inbox_triage::config::load_config;
use inbox_triage::extract::load_inbox;
use inbox_triage::gmail::GmailClient;
use inbox_triage::triage::Triage;
use inbox_triage::triage::browser::SystemBrowser;

#[derive(Parser)]
#[command(name = "inbox_triage")]
#[command(about = "Walk the latest message of every inbox thread and triage it", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Triage the inbox (default)
    Triage,

    /// Store the OAuth client secret in keyring
    SetClientSecret {
        #[arg(long)]
        client_id: String,
    },

    /// Forget cached and stored tokens for the configured account
    Logout,
}

fn triage() -> Result<()> {
    let cfg = load_config().context("Configuration error")?;
    let tokens = TokenManager::from_config(&cfg)?;

    info!("Contacting Gmail...");
    let gmail = GmailClient::new(cfg.user_id(), tokens).context("Unable to get Gmail client")?;

    let Some(store) = load_inbox(&gmail)? else {
        println!("No messages found.");
        return Ok(());
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut session = Triage::new(&gmail, SystemBrowser, stdin.lock(), stdout.lock());
    let outcome = session.run(&store)?;
    info!("Session ended: {outcome:?}");
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    match cli.cmd.unwrap_or(Command::Triage) {
        Command::Triage => triage(),

        Command::SetClientSecret { client_id } => {
            eprintln!("Paste client secret (end with Ctrl-D):");
            let mut secret = String::new();
            io::stdin().read_to_string(&mut secret)?;
            token_store::save_client_secret(&client_id, secret.trim())?;
            println!("Saved client secret for client_id {client_id}");
            Ok(())
        }

        Command::Logout => {
            let cfg = load_config().context("Configuration error")?;
            TokenManager::from_config(&cfg)?.logout()
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run(Cli::parse()) {
        error!("{e:#}");
        std::process::exit(1);
    }
}
