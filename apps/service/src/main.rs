mod admin;
mod cli;
mod config;
mod database;
mod monitoring;
mod notify;

use anyhow::Context;
use clap::Parser;
use std::io;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::debug;

use admin::{AdminMenu, Outcome};
use cli::{Cli, Command};
use config::Config;
use database::EntryStore;
use monitoring::{MonitorLoop, PingProber};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    logger::init_tracing(cli.verbose);

    let mut config = Config::from_config(cli.config.as_deref()).context("failed to load configuration")?;
    config.apply_env_overrides();
    if let Some(store) = cli.store.clone() {
        config.store.path = store;
    }
    debug!(
        store = %config.store.path.display(),
        interval_secs = config.monitor.interval_seconds,
        notifier = config.notifier.is_some(),
        "Configuration loaded"
    );

    let command = cli.command.unwrap_or(Command::Menu);
    if command == Command::Config {
        println!("{config}");
        return Ok(ExitCode::SUCCESS);
    }

    let store = EntryStore::new(&config.store.path);
    let notifier = notify::from_config(config.notifier.as_ref()).context("failed to set up notifier")?;
    let prober = Arc::new(PingProber::new(config.monitor.probe_timeout()));
    let monitor = MonitorLoop::new(prober, notifier, config.monitor.interval());

    let mut menu = AdminMenu::new(store, monitor, io::stdin().lock(), io::stdout());
    match command.admin_command() {
        None => {
            menu.run().await?;
            Ok(ExitCode::SUCCESS)
        }
        Some(admin_command) => match menu.dispatch(admin_command).await? {
            Outcome::Rejected => Ok(ExitCode::FAILURE),
            Outcome::Continue | Outcome::Exit => Ok(ExitCode::SUCCESS),
        },
    }
}
