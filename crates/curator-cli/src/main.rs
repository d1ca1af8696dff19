use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use commands::{config, daemon, journal, run, AppContext};
use curator_config::PathManager;
use std::path::PathBuf;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "curator")]
#[command(about = "Curator - Age out finished downloads and pick up new recommendations")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Configuration file (defaults to <base>/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Base directory for config, data and logs
    #[arg(long, global = true, value_name = "DIR")]
    base_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TaskName {
    Cleanup,
    Acquisition,
    Report,
}

impl TaskName {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskName::Cleanup => curator_core::CLEANUP_TASK,
            TaskName::Acquisition => curator_core::ACQUISITION_TASK,
            TaskName::Report => curator_core::REPORT_TASK,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum JournalName {
    Cleanup,
    Acquisition,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one task immediately
    #[command(long_about = "Run a single task once and print its summary. Cleanup only deletes when `confirm_delete = true`; otherwise it previews what it would delete.")]
    Run {
        #[arg(value_enum)]
        task: TaskName,
    },
    /// Run enabled tasks on their cron schedules
    #[command(long_about = "Start the internal scheduler. Every enabled task is registered with its configured cron expression (or its built-in default). Tasks flagged `run_once` run immediately and the flag is cleared in the config file.")]
    Daemon {
        /// Write logs to the daily-rotated log file instead of stderr
        #[arg(long, action = ArgAction::SetTrue)]
        log_file: bool,
    },
    /// Show or clear a task journal
    Journal {
        #[arg(value_enum)]
        task: JournalName,

        /// Number of entries to show, most recent first
        #[arg(long, short = 'n')]
        limit: Option<usize>,

        /// Remove all entries
        #[arg(long, action = ArgAction::SetTrue)]
        clear: bool,

        /// Do not ask for confirmation when clearing
        #[arg(long, short = 'y', action = ArgAction::SetTrue)]
        yes: bool,
    },
    /// Inspect or create the configuration
    Config {
        #[command(subcommand)]
        cmd: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration (masks API keys)
    Show {
        /// Show API keys unmasked
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },
    /// Interactive configuration wizard
    Init,
    /// Check the configuration file and print each task's schedule
    Validate,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let paths = match &cli.base_dir {
        Some(dir) => PathManager::with_base(dir),
        None => PathManager::default(),
    };

    let log_file = match &cli.command {
        Commands::Daemon { log_file: true } => Some(paths.daemon_log_file()),
        _ => None,
    };
    logging::init_logging_with_file(cli.verbose, cli.quiet, log_file)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);
    let config_path = cli.config.unwrap_or_else(|| paths.config_file());

    match cli.command {
        Commands::Run { task } => {
            let ctx = AppContext::load(paths, config_path, &output)?;
            run::run_task(task, &ctx, &output).await
        }
        Commands::Daemon { .. } => {
            let ctx = AppContext::load(paths, config_path, &output)?;
            daemon::run_daemon(ctx, &output).await
        }
        Commands::Journal { task, limit, clear, yes } => {
            let ctx = AppContext::load(paths, config_path, &output)?;
            journal::run_journal(task, limit, clear, yes, &ctx, &output).await
        }
        Commands::Config { cmd } => {
            let cmd = cmd.unwrap_or(ConfigCommands::Show { full: false });
            config::run_config(cmd, paths, config_path, &output).await
        }
    }
}
