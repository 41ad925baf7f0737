mod cli;
mod config;
mod demo;
mod error;
mod logging;
mod runner;

use std::process::ExitCode;

use clap::Parser;
use crossbeam_channel::{bounded, unbounded};
use padwatch::{Platform, Session};

use crate::cli::{Backend, Cli, Command};
use crate::config::DaemonConfig;
use crate::error::DaemonError;

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = logging::setup(cli.verbose, cli.no_color) {
        eprintln!("{}", DaemonError::from(e));
        return ExitCode::FAILURE;
    }

    match execute(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn execute(command: Command) -> Result<(), DaemonError> {
    match command {
        Command::Run { config, backend } => {
            let mut config = DaemonConfig::load(config.as_deref())?;
            if let Some(backend) = backend {
                config.backend = backend;
            }
            run(&config)
        }
        Command::List { config, backend } => {
            let config = DaemonConfig::load(config.as_deref())?;
            let backend = backend.unwrap_or(config.backend);
            let platform = open_platform(backend)?;
            let mut session = Session::with_config(platform, config.session);
            runner::list(&mut session)
        }
    }
}

fn run(config: &DaemonConfig) -> Result<(), DaemonError> {
    // Handle Ctrl+C to exit cleanly
    let (stop_tx, stop_rx) = unbounded::<()>();
    ctrlc::set_handler(move || {
        let _ = stop_tx.send(());
    })?;

    match config.backend {
        Backend::Virtual => {
            let platform = demo::platform();
            let (script_stop_tx, script_stop_rx) = bounded::<()>(0);
            let script = demo::spawn_script(platform.clone(), script_stop_rx);
            let mut session = Session::with_config(platform, config.session.clone());
            let result = runner::run(&mut session, config, &stop_rx);
            drop(script_stop_tx);
            if script.join().is_err() {
                print_error!("demo script thread panicked");
            }
            result
        }
        Backend::Sdl => {
            let platform = open_platform(Backend::Sdl)?;
            let mut session = Session::with_config(platform, config.session.clone());
            runner::run(&mut session, config, &stop_rx)
        }
    }
}

fn open_platform(backend: Backend) -> Result<Box<dyn Platform>, DaemonError> {
    match backend {
        Backend::Virtual => Ok(Box::new(demo::platform())),
        #[cfg(feature = "sdl2-backend")]
        Backend::Sdl => Ok(Box::new(padwatch::SdlPlatform::new()?)),
        #[cfg(not(feature = "sdl2-backend"))]
        Backend::Sdl => Err(DaemonError::BackendUnavailable("sdl")),
    }
}
