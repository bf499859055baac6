use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// 🤖 CrossCore ADB automation: OCR and template driven game tasks
#[derive(Debug, Parser)]
#[command(name = "crosscore-adb-run", version, about)]
pub struct Cli {
    /// Device serial to connect to (default: last used, then first ready)
    #[arg(short, long, global = true)]
    pub device: Option<String>,

    /// ADB implementation
    #[arg(long = "impl", value_enum, default_value = "rust", global = true)]
    pub adb_impl: AdbImpl,

    /// Path to a JSON config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AdbImpl {
    /// Talk to the ADB server directly
    Rust,
    /// Spawn the `adb` binary (requires the Android platform tools)
    Shell,
}

impl AdbImpl {
    pub fn use_rust(self) -> bool {
        self == AdbImpl::Rust
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List connected devices
    Devices,

    /// List the available tasks
    Tasks,

    /// Run tasks once, in order
    Run {
        /// Task names, e.g. `start task`
        #[arg(value_name = "TASK", required_unless_present = "all")]
        tasks: Vec<String>,

        /// Run every task
        #[arg(long, conflicts_with = "tasks")]
        all: bool,
    },

    /// Re-run tasks every N minutes until Ctrl-C
    Schedule {
        /// Interval in minutes
        #[arg(short, long, allow_negative_numbers = true)]
        every: i64,

        /// Task to include (repeatable)
        #[arg(short, long = "task", value_name = "TASK")]
        tasks: Vec<String>,
    },

    /// Log every text recognized on the current screen
    Dump,

    /// Save a screenshot
    Screenshot {
        #[arg(default_value = "cli-screenshot.png")]
        path: PathBuf,
    },
}
