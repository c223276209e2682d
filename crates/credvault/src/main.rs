// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! credvault - local credential vault.
//!
//! Binary entry point: parses the command line, loads configuration, opens the
//! vault and dispatches to the subcommand.

mod check;
mod stats;

use clap::{Parser, Subcommand};
use credvault_core::{BackendKind, CredentialRecord, Login, RoleTag, VaultError};
use credvault_vault::VaultManager;
use credvault_vault::prompt::read_secret;
use secrecy::ExposeSecret;

/// credvault - remembered login and per-role login history.
#[derive(Parser, Debug)]
#[command(name = "credvault", version, about, long_about = None)]
struct Cli {
    /// Config file to use instead of the standard search path.
    #[arg(long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Operate on this backend instead of the configured one.
    #[arg(long, global = true)]
    backend: Option<BackendKind>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Remember a login (password from CREDVAULT_SECRET or a prompt).
    Save {
        identifier: String,
        #[arg(long, default_value = "student")]
        role: RoleTag,
    },
    /// Show the remembered login.
    Show {
        /// Print the secret too.
        #[arg(long)]
        reveal: bool,
    },
    /// Forget the remembered login.
    Forget {
        /// Also clear every role's history.
        #[arg(long)]
        all: bool,
    },
    /// Manage login history.
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
    /// Make another backend active, optionally copying the vault's data to it.
    Switch {
        #[arg(long)]
        to: BackendKind,
        #[arg(long)]
        migrate: bool,
    },
    /// Upgrade stale-format records on the active backend.
    Migrate,
    /// Probe both backends and sweep the active one for unreadable data.
    Check {
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
    /// Show what the active backend holds.
    Stats {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug)]
enum HistoryAction {
    /// List a role's history, newest first.
    List {
        #[arg(long, default_value = "student")]
        role: RoleTag,
    },
    /// Record a successful login.
    Add {
        identifier: String,
        #[arg(long, default_value = "student")]
        role: RoleTag,
    },
    /// Remove one identifier from a role's history.
    Remove {
        identifier: String,
        #[arg(long, default_value = "student")]
        role: RoleTag,
    },
    /// Remove a role's whole history.
    Clear {
        #[arg(long, default_value = "student")]
        role: RoleTag,
    },
    /// Drop entries older than the expiry window.
    Prune {
        /// Override `vault.history_expiry_days`.
        #[arg(long)]
        days: Option<u32>,
    },
}

fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => credvault_config::load_and_validate_path(path),
        None => credvault_config::load_and_validate(),
    };
    let mut config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            credvault_config::render_errors(&errors);
            std::process::exit(1);
        }
    };
    if let Some(backend) = cli.backend {
        config.vault.encryption = backend == BackendKind::Encrypted;
    }

    init_tracing(&config.log.level);

    if let Err(e) = run(cli.command, &config) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(command: Commands, config: &credvault_config::CredvaultConfig) -> Result<(), VaultError> {
    let mut vault = VaultManager::from_config(config)?;
    vault.open()?;

    match command {
        Commands::Save { identifier, role } => {
            let secret = read_secret(&identifier)?;
            let record = CredentialRecord::new(identifier, secret.expose_secret(), role);
            vault.save_credentials(&record)?;
            vault.add_history(&Login::new(record.identifier.clone(), secret.expose_secret()), role)?;
            println!("saved {}", credvault_vault::display_label(&record.identifier, role));
        }
        Commands::Show { reveal } => match vault.get_credentials() {
            Ok(record) => {
                println!("identifier: {}", record.identifier);
                println!("role:       {}", record.role);
                println!("saved at:   {}", record.saved_at.to_rfc3339());
                if reveal {
                    println!("secret:     {}", record.secret.expose_secret());
                }
            }
            Err(e) if e.is_not_found() => println!("no remembered login"),
            Err(e) => return Err(e),
        },
        Commands::Forget { all } => {
            if all {
                vault.clear_all()?;
                println!("vault cleared");
            } else {
                vault.clear_credentials()?;
                println!("remembered login forgotten");
            }
        }
        Commands::History { action } => run_history(&vault, action, config.vault.history_expiry_days)?,
        Commands::Switch { to, migrate } => {
            let from = vault.current_mode();
            vault.switch_backend(to, migrate)?;
            if from == to {
                println!("{to} backend already active");
            } else {
                println!("switched {from} -> {to}{}", if migrate { " (data copied)" } else { "" });
                println!(
                    "set `vault.encryption = {}` in credvault.toml to keep using it",
                    to == BackendKind::Encrypted
                );
            }
        }
        Commands::Migrate => {
            let report = vault.migrate()?;
            for name in &report.migrated {
                println!("migrated {name}");
            }
            for name in &report.dropped {
                println!("dropped  {name}");
            }
            for warning in &report.warnings {
                eprintln!("warning: {warning}");
            }
            if report.is_noop() {
                println!("nothing to migrate");
            }
        }
        Commands::Check { plain } => check::run_check(&vault, plain)?,
        Commands::Stats { json } => stats::run_stats(&vault, json)?,
    }
    Ok(())
}

fn run_history(vault: &VaultManager, action: HistoryAction, expiry_days: u32) -> Result<(), VaultError> {
    match action {
        HistoryAction::List { role } => {
            let items = vault.get_history(role)?;
            if items.is_empty() {
                println!("no {role} history");
            }
            for item in items {
                println!(
                    "{:<20} {}",
                    item.display_label,
                    item.last_access_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        HistoryAction::Add { identifier, role } => {
            let secret = read_secret(&identifier)?;
            vault.add_history(&Login::new(identifier, secret.expose_secret()), role)?;
        }
        HistoryAction::Remove { identifier, role } => vault.remove_history(&identifier, role)?,
        HistoryAction::Clear { role } => vault.clear_history(role)?,
        HistoryAction::Prune { days } => {
            let pruned = vault.prune_expired(days.unwrap_or(expiry_days))?;
            println!("pruned {pruned} expired entries");
        }
    }
    Ok(())
}

/// Install the global tracing subscriber. `RUST_LOG` wins over the config level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("credvault={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
