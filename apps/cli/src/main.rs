//! `keyturn`: one rotation pass for the calling IAM identity

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use keyturn_credential::prelude::*;

mod cli;
mod config;

use cli::Cli;
use config::{Resolved, SecondarySink};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match init_logging(&cli) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("keyturn: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("keyturn: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) -> keyturn_log::LogResult<keyturn_log::LoggerGuard> {
    let mut config = keyturn_log::Config::from_env()?;
    if let Some(level) = cli.log_level() {
        config = config.with_level(level);
    }
    keyturn_log::LoggerBuilder::from_config(config)
        .service("keyturn")
        .build()
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let settings = config::load(cli).context("failed to load settings")?;
    tracing::debug!(?settings, "settings loaded");

    let Resolved {
        policy,
        store,
        file,
        secondary,
    } = settings.resolve().context("invalid settings")?;

    let store = IamKeyStore::new(store).await?;
    let current = store
        .current_access_key_id()
        .await
        .context("failed to resolve the access key this process runs with")?;
    tracing::info!(current = %current, region = %store.config().region, "starting rotation");

    let secondary: Arc<dyn CredentialSink> = match secondary {
        SecondarySink::CircleCi(config) => Arc::new(CircleCiSink::new(config)?),
        SecondarySink::Profile(config) => Arc::new(ProfileSink::new(config)?),
    };
    let sinks: Vec<Arc<dyn CredentialSink>> =
        vec![Arc::new(FileSink::from_config(file)?), secondary];

    let rotator = Rotator::builder()
        .store(Arc::new(store))
        .sinks(sinks)
        .policy(policy)
        .build();

    let report = rotator.run(&current).await?;

    tracing::info!(
        deleted = report.deleted.len(),
        created = ?report.created.as_ref().map(ToString::to_string),
        persisted_to = ?report.persisted_to,
        stage = %report.stage,
        "rotation finished"
    );

    Ok(())
}
