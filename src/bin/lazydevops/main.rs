mod display;

use std::{io::Write, process::ExitCode};

use anyhow::{Context, Result};
use chrono::Utc;
use lazydevops::{
    AzureDevOps, Config, PAT_ENV_VAR, USAGE_HINT, UsageError, build_report, parse_args,
};

use display::display_report;

fn handle_clap_help_version(clap_err: &clap::Error) -> ! {
    use clap::error::ErrorKind;
    match clap_err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            print!("{clap_err}");
            std::process::exit(0);
        }
        _ => {
            eprint!("{clap_err}");
            std::process::exit(2);
        }
    }
}

fn fail_usage(message: &dyn std::fmt::Display) -> ! {
    eprintln!("Error: {message}");
    eprintln!("\n{USAGE_HINT}");
    std::process::exit(2);
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

async fn run(config: &Config) -> Result<()> {
    let service = AzureDevOps::new(config).context("Failed to create Azure DevOps client")?;
    let rows = build_report(&service).await?;

    let mut stdout = std::io::stdout().lock();
    if rows.is_empty() {
        writeln!(stdout, "No active pull requests found.")?;
        return Ok(());
    }

    display_report(&rows, config.max_title_width, Utc::now(), &mut stdout)?;
    stdout.flush()?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_tracing();

    let token = std::env::var(PAT_ENV_VAR).ok();
    let config = match parse_args(std::env::args_os(), token) {
        Ok(config) => config,
        Err(err) => {
            if let Some(clap_err) = err.downcast_ref::<clap::Error>() {
                handle_clap_help_version(clap_err);
            } else if let Some(usage_err) = err.downcast_ref::<UsageError>() {
                fail_usage(usage_err);
            } else {
                fail_usage(&err);
            }
        }
    };

    match run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
