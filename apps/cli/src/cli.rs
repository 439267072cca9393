use std::path::PathBuf;

use clap::{ArgAction, Parser};
use serde::Serialize;

/// Command-line flags
///
/// Every setting is optional here so unset flags do not shadow the config
/// file or the environment. Serializing the struct yields only the flags that
/// were given.
#[derive(Debug, Default, Parser, Serialize)]
#[command(name = "keyturn", version)]
#[command(about = "Rotate the AWS IAM access keys of the calling identity")]
pub struct Cli {
    /// TOML file with settings (flags and KEYTURN_* variables take precedence)
    #[arg(long, value_name = "FILE")]
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Keys older than this many days are replaced
    #[arg(long, alias = "maxDaysAllowed", value_name = "DAYS")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_age_days: Option<u32>,

    /// Number of valid keys to keep, the current one included
    #[arg(long, alias = "maxKeysAllowed", value_name = "COUNT")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_key_count: Option<usize>,

    /// AWS region to talk to IAM in
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Shared config profile for AWS credentials, also the profile rewritten
    /// with the new key
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    /// IAM endpoint override (LocalStack and similar)
    #[arg(long, value_name = "URL")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,

    /// File the new key is written to
    #[arg(long, value_name = "PATH")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<PathBuf>,

    /// CircleCI API token; when set the new key goes to a CircleCI context
    /// instead of the local AWS profile
    #[arg(
        long,
        alias = "circleci",
        env = "KEYTURN_CIRCLECI_TOKEN",
        hide_env_values = true
    )]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circleci_token: Option<String>,

    /// CircleCI context receiving the new key
    #[arg(long, value_name = "ID")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circleci_context_id: Option<String>,

    /// CircleCI API origin
    #[arg(long, value_name = "URL", hide = true)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circleci_base_url: Option<String>,

    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    #[serde(skip)]
    pub verbose: u8,
}

impl Cli {
    /// Filter directive implied by `-v`, if any
    pub fn log_level(&self) -> Option<&'static str> {
        match self.verbose {
            0 => None,
            1 => Some("debug"),
            _ => Some("trace"),
        }
    }
}
