mod cli;
mod error_fmt;
mod logging;
mod run;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::WrapErr;
use ph_core::ControllerCfg;
use ph_core::error::PhError;

use crate::cli::{Cli, Commands, DEFAULT_CONFIG, JSON_MODE};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    let _ = color_eyre::install();

    if let Err(e) = real_main(cli) {
        let json = JSON_MODE.get().copied().unwrap_or(false);
        if json {
            println!("{}", error_fmt::format_error_json(&e));
        } else {
            eprintln!("{}", error_fmt::humanize(&e));
            tracing::debug!(error = ?e, "command failed");
        }
        std::process::exit(error_fmt::exit_code_for_error(&e));
    }
}

fn config_error(e: eyre::Report) -> eyre::Report {
    eyre::Report::new(PhError::Config(format!("{e:#}")))
}

fn load_config(cli: &Cli) -> eyre::Result<ph_config::Config> {
    let path = match cli.config.as_deref() {
        Some(p) => Some(p),
        None => Some(Path::new(DEFAULT_CONFIG)).filter(|p| p.exists()),
    };

    let mut cfg = match path {
        Some(p) => {
            let text = std::fs::read_to_string(p)
                .wrap_err_with(|| format!("read config {}", p.display()))
                .map_err(config_error)?;
            ph_config::load_toml(&text)
                .map_err(|e| eyre::eyre!("parse {}: {e}", p.display()))
                .map_err(config_error)?
        }
        None => ph_config::Config::default(),
    };

    if let Some(csv) = cli.calibration.as_deref() {
        cfg.calibration.points = ph_config::load_calibration_csv(csv).map_err(config_error)?;
    }

    cfg.validate().map_err(config_error)?;
    Ok(cfg)
}

fn real_main(cli: Cli) -> eyre::Result<()> {
    let cfg = load_config(&cli)?;
    logging::init(cli.log_level.as_deref(), cli.json, &cfg.logging)?;
    let controller_cfg = ControllerCfg::try_from(&cfg)?;

    match cli.cmd {
        Commands::Run { cycles } => {
            let shutdown = Arc::new(AtomicBool::new(false));
            {
                let flag = shutdown.clone();
                ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
                    .wrap_err("install Ctrl-C handler")?;
            }
            let hw = run::make_hardware(&cfg)?;
            run::run_loop(&controller_cfg, hw, cycles, cli.json, shutdown)?;
        }
        Commands::Calibration => run::calibration(&controller_cfg),
        Commands::SelfCheck => {
            let hw = run::make_hardware(&cfg)?;
            run::self_check(&controller_cfg, hw)?;
        }
    }
    Ok(())
}
