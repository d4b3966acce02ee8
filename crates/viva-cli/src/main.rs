//! viva - command-line client for the viva study service.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use viva_core::{ClientConfig, IdentityPrompt, NotificationBus, VivaContext};

mod cli;
mod commands;
mod error;

use cli::Cli;
use error::CliError;

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter()))
        .init();

    let notifications = Arc::new(NotificationBus::new());
    let mut toasts = notifications.subscribe();

    let result = build_context(&cli, Arc::clone(&notifications))
        .and_then(|ctx| commands::run(&ctx, cli.command));

    while let Ok(toast) = toasts.try_recv() {
        eprintln!("[{}] {}", toast.kind, toast.message);
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            print_error(&err);
            ExitCode::FAILURE
        }
    }
}

fn build_context(cli: &Cli, notifications: Arc<NotificationBus>) -> Result<VivaContext, CliError> {
    let mut config = ClientConfig::default();
    if let Some(url) = &cli.api_url {
        config = config.with_base_url(url)?;
    }
    if let Some(dir) = &cli.data_dir {
        config = config.with_data_dir(dir);
    }
    if let Some(secs) = cli.timeout {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    log::debug!("Using backend {} and data dir {}", config.base_url, config.data_dir.display());

    let prompt: Arc<dyn IdentityPrompt> = Arc::new(|| {
        eprintln!("Your session has ended. Run `viva login --google-token <ID_TOKEN>` to sign in again.");
    });

    Ok(VivaContext::builder()
        .config(config)
        .notifications(notifications)
        .identity_prompt(prompt)
        .build()?)
}

fn print_error(err: &CliError) {
    eprintln!("error: {err}");
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        eprintln!("  caused by: {cause}");
        source = cause.source();
    }
}
