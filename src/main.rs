use clap::error::ErrorKind;
use clap::Parser;
use ipa_import::utils::{logger, validation::Validate};
use ipa_import::{
    CliConfig, ConfirmMode, IpaCli, LineAnswers, Reconciler, RunOutcome, SyncError, SyncSettings,
};
use std::process::ExitCode;

const EXIT_FAILURE: u8 = 1;
const EXIT_ABORTED: u8 = 2;
const EXIT_PARTIAL: u8 = 3;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let config = match CliConfig::try_parse() {
        Ok(config) => config,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(EXIT_FAILURE),
            };
        }
    };

    logger::init_cli_logger(config.verbose, config.log_json);
    tracing::debug!("CLI config: {:?}", config);

    match run(&config).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("Import failed: {} (Category: {:?})", e, e.category());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

async fn run(config: &CliConfig) -> Result<ExitCode, SyncError> {
    config.validate()?;

    let settings = match &config.config {
        Some(path) => {
            tracing::info!("Loading settings from {}", path.display());
            SyncSettings::from_file(path)?
        }
        None => SyncSettings::default(),
    };
    settings.validate()?;

    let mode = if config.dry_run {
        ConfirmMode::DryRun
    } else if config.yes {
        ConfirmMode::AutoAccept
    } else {
        ConfirmMode::Interactive
    };

    let client = IpaCli::new(settings.ipa_binary.clone());
    let reconciler = Reconciler::new(client, settings);

    let mut answers = LineAnswers::stdin();
    let mut out = std::io::stdout();

    let outcome = reconciler
        .run(&config.csv_file, mode, &mut answers, &mut out)
        .await?;

    let code = match outcome {
        RunOutcome::NoChanges | RunOutcome::DryRun => ExitCode::SUCCESS,
        RunOutcome::Aborted => ExitCode::from(EXIT_ABORTED),
        RunOutcome::Committed(report) => {
            if config.strict && report.has_failures() {
                ExitCode::from(EXIT_PARTIAL)
            } else {
                ExitCode::SUCCESS
            }
        }
    };
    Ok(code)
}
