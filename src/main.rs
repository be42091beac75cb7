use clap::Parser;
use copilot_telemetry::api_client::CopilotApiClient;
use copilot_telemetry::credentials::GhSessionProvider;
use copilot_telemetry::error::RecorderError;
use copilot_telemetry::paths::LOG_DIR_ENV;
use copilot_telemetry::recorder::{DailyRecorder, RunOutcome, SkipReason, Trigger};
use copilot_telemetry::store::FileStateStore;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "copilot-telemetry")]
#[command(about = "Records daily GitHub Copilot quota usage to an append-only JSONL log")]
#[command(version)]
struct Cli {
    /// Host lifecycle event behind this run (manual runs always record)
    #[arg(long, value_enum, default_value_t = Trigger::Manual)]
    trigger: Trigger,

    /// Log directory; empty means the home directory, a leading `~` is
    /// expanded against it
    #[arg(long)]
    log_dir: Option<String>,
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    match record(cli) {
        Ok(RunOutcome::Recorded { log_path, .. }) => {
            println!("Copilot telemetry written to {}", log_path.display());
        }
        Ok(RunOutcome::Skipped(SkipReason::AlreadyRanToday)) => {
            tracing::debug!("skipped: already recorded today");
        }
        Ok(RunOutcome::Skipped(SkipReason::FocusThrottled)) => {
            tracing::debug!("skipped: focus run inside cooldown window");
        }
        Err(err) => {
            // Surfaced once and swallowed; the next trigger is the retry
            // mechanism.
            tracing::error!("recording failed: {}", err);
            eprintln!("Copilot Telemetry Logger failed to record usage: {}", err);
        }
    }
}

fn record(cli: Cli) -> Result<RunOutcome, RecorderError> {
    let log_dir = cli.log_dir.or_else(|| std::env::var(LOG_DIR_ENV).ok());

    let store = FileStateStore::open_default().map_err(RecorderError::filesystem)?;
    let mut recorder = DailyRecorder::new(store, GhSessionProvider, CopilotApiClient, log_dir);
    recorder.run(cli.trigger)
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
