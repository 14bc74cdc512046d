mod cli;
mod devices;
mod error_fmt;
mod logging;
mod rt;
mod run;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::WrapErr;

use crate::cli::{Cli, Commands, JSON_MODE, RtLock};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};
use crate::rt::RtOptions;
use crate::run::{RunOptions, run_loop, summary_json, summary_text};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    if let Err(e) = color_eyre::install() {
        eprintln!("warning: color-eyre not installed: {e}");
    }

    match real_main(cli) {
        Ok(()) => {}
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "exiting with error");
            if JSON_MODE.get().copied().unwrap_or(false) {
                eprintln!("{}", format_error_json(&err));
            } else {
                eprintln!("{}", humanize(&err));
            }
            std::process::exit(exit_code_for_error(&err));
        }
    }
}

fn load_config(path: &Path) -> eyre::Result<ranger_config::Config> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("reading config file {}", path.display()))?;
    let cfg = ranger_config::load_toml(&text)
        .wrap_err_with(|| format!("parsing config file {}", path.display()))?;
    cfg.validate().wrap_err("invalid configuration")?;
    Ok(cfg)
}

fn real_main(cli: Cli) -> eyre::Result<()> {
    let cfg = load_config(&cli.config)?;
    logging::init(cli.json, &cli.log_level, &cfg.logging)?;
    tracing::debug!(config = %cli.config.display(), "config loaded");

    match cli.cmd {
        Commands::SelfCheck => {
            let latch = Arc::new(ranger_core::ToggleLatch::new());
            let assembled = devices::assemble(&cfg, &latch)?;
            tracing::info!(state = %assembled.controller.state(), "self-check passed");
            if cli.json {
                println!("{}", serde_json::json!({ "status": "ok" }));
            } else {
                println!("ok");
            }
            Ok(())
        }
        Commands::Run {
            period_ms,
            max_iterations,
            engage,
            stats,
            rt,
            rt_prio,
            rt_lock,
            rt_cpu,
        } => {
            let shutdown = Arc::new(AtomicBool::new(false));
            let flag = Arc::clone(&shutdown);
            ctrlc::set_handler(move || flag.store(true, Ordering::Release))
                .wrap_err("installing ctrl-c handler")?;

            let opts = RunOptions {
                period_ms,
                max_iterations,
                engage,
                stats,
                rt: RtOptions {
                    enabled: rt,
                    prio: rt_prio,
                    lock: rt_lock.unwrap_or_else(RtLock::os_default),
                    cpu: rt_cpu,
                },
            };
            let summary = run_loop(&cfg, opts, shutdown)?;
            if cli.json {
                println!("{}", summary_json(&summary));
            } else {
                println!("{}", summary_text(&summary));
            }
            Ok(())
        }
    }
}
