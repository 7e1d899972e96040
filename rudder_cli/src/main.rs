//! `rudder` binary: load config, initialise logging, dispatch a command.

mod cli;
mod commands;
mod error_fmt;
mod publish;

use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::WrapErr;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use crate::commands::RunOpts;
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

fn main() {
    if let Err(e) = color_eyre::install() {
        eprintln!("failed to install error hooks: {e}");
    }
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(err) = real_main(cli) {
        if JSON_MODE.get().copied().unwrap_or(false) {
            println!("{}", format_error_json(&err));
        } else {
            eprintln!("{}", humanize(&err));
        }
        std::process::exit(exit_code_for_error(&err));
    }
}

fn real_main(cli: Cli) -> eyre::Result<()> {
    // `solve` is pure arithmetic and needs no config file.
    if let Commands::Solve { x1, y1, x2, y2 } = cli.cmd {
        init_tracing(cli.json, &cli.log_level, &rudder_config::Logging::default())?;
        return commands::solve(x1, y1, x2, y2, cli.json);
    }

    let text = fs::read_to_string(&cli.config)
        .wrap_err_with(|| format!("read config {}", cli.config.display()))?;
    let mut cfg = rudder_config::load_toml(&text).wrap_err("parse config TOML")?;
    if let Some(path) = &cli.calibration {
        cfg.calibration = rudder_config::load_calibration_csv(path)?;
    }
    init_tracing(cli.json, &cli.log_level, &cfg.logging)?;
    cfg.validate().wrap_err("invalid configuration")?;
    tracing::debug!(config = %cli.config.display(), "configuration loaded");

    match cli.cmd {
        Commands::Run {
            samples,
            interval_ms,
            sweep,
        } => {
            let shutdown = Arc::new(AtomicBool::new(false));
            let flag = shutdown.clone();
            if let Err(e) = ctrlc::set_handler(move || {
                flag.store(true, Ordering::Relaxed);
            }) {
                tracing::warn!(error = %e, "failed to install Ctrl-C handler");
            }
            let opts = RunOpts {
                samples,
                interval_ms,
                sweep,
            };
            commands::run(&cfg, opts, cli.json, shutdown).map(|_| ())
        }
        Commands::Convert { volts } => commands::convert(&cfg, volts, cli.json),
        Commands::SelfCheck => commands::self_check(&cfg, cli.json),
        Commands::Solve { .. } => Ok(()),
    }
}

/// Console logs go to stderr so stdout carries only data. `RUST_LOG`
/// overrides `--log-level`; `[logging].file` adds a JSON file sink.
fn init_tracing(json: bool, cli_level: &str, logging: &rudder_config::Logging) -> eyre::Result<()> {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli_level));
    let console = if json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_filter(console_filter)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(console_filter)
            .boxed()
    };

    let file = match logging.file.as_deref() {
        Some(path) => {
            let path = std::path::Path::new(path);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| std::path::Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| eyre::eyre!("logging.file has no file name: {}", path.display()))?;
            let appender = match logging.rotation.as_deref().map(str::to_ascii_lowercase).as_deref() {
                Some("daily") => tracing_appender::rolling::daily(dir, name),
                Some("hourly") => tracing_appender::rolling::hourly(dir, name),
                _ => tracing_appender::rolling::never(dir, name),
            };
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            let level = logging.level.as_deref().unwrap_or("info");
            Some(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(writer)
                    .with_filter(EnvFilter::new(level)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| eyre::eyre!("init logging: {e}"))
}
