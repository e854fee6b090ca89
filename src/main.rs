use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use hdtd::commands::{record, run, sessions, status, stop};
use hdtd::config::Config;
use hdtd::daemon::protocol::RecordAction;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hdtd")]
#[command(about = "Disk activity recording daemon", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the daemon in the foreground
    Run,

    /// Show recording state and the disk alias mapping
    Status,

    /// List recorded sessions, or the frames of one session
    Sessions {
        /// Session identifier (epoch seconds)
        session_id: Option<String>,
    },

    /// Start or stop recording
    Record {
        #[arg(value_enum)]
        action: Action,
    },

    /// Shut down a running daemon
    Stop,
}

#[derive(Clone, Copy, ValueEnum)]
enum Action {
    Start,
    Stop,
}

impl From<Action> for RecordAction {
    fn from(action: Action) -> Self {
        match action {
            Action::Start => RecordAction::Start,
            Action::Stop => RecordAction::Stop,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Run => run::execute(config),
        Commands::Status => status::execute(&config),
        Commands::Sessions { session_id } => sessions::execute(&config, session_id),
        Commands::Record { action } => record::execute(&config, action.into()),
        Commands::Stop => stop::execute(&config),
    }
}
