use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Where device listings and readings come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Backend {
    /// Scripted in-memory pad, for trying the daemon without hardware.
    Virtual,
    /// SDL2 joysticks (requires the `sdl2-backend` feature).
    Sdl,
}

#[derive(Debug, Subcommand, PartialEq)]
pub(crate) enum Command {
    /// Poll devices in the foreground and print every event.
    Run {
        /// Path to a yaml config file
        #[clap(short, long)]
        config: Option<PathBuf>,
        /// Overrides the backend from the config
        #[clap(short, long)]
        backend: Option<Backend>,
    },
    /// Detect devices once and print them.
    List {
        /// Path to a yaml config file
        #[clap(short, long)]
        config: Option<PathBuf>,
        /// Overrides the backend from the config
        #[clap(short, long)]
        backend: Option<Backend>,
    },
}

/// Watch gamepads and joysticks and report their events.
#[derive(Parser)]
#[command(version, about, long_about = None)]
pub(crate) struct Cli {
    /// Turn debugging information on
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// The command to run
    #[clap(subcommand)]
    pub command: Command,
}
