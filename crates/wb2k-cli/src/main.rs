//! `wb2k` binary: welcome new folks to #general.

use clap::{ArgAction, Parser};
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use wb2k_runtime::{run_welcome_loop, CappedExponentialBackoff, RuntimeConfig, SlackSession};

const VERBOSITY_CEILING: u8 = 11;

#[derive(Debug, Parser)]
#[command(name = "wb2k", about = "Welcome new folks to #general.", version)]
struct Cli {
    #[arg(
        short,
        long,
        env = "WB2K_CHANNEL",
        default_value = "general",
        value_name = "CHANNEL",
        help = "The channel to welcome users to"
    )]
    channel: String,

    #[arg(
        short,
        long,
        env = "WB2K_MESSAGE",
        default_value = "Welcome, {user}! :wave:",
        value_name = "MESSAGE",
        help = "The message to use when welcoming users. If present {user} will be replaced by a user mention"
    )]
    message: String,

    #[arg(short, long, action = ArgAction::Count, help = "It goes to 11.")]
    verbose: u8,

    #[arg(
        short,
        long,
        env = "WB2K_RETRIES",
        default_value_t = 8,
        value_name = "MAX_RETRIES",
        help = "The maximum number of times to attempt to reconnect on websocket connection errors"
    )]
    retries: u32,
}

/// Bad flag or environment values, reported before any connection attempt.
#[derive(Debug, Error)]
enum ConfigurationError {
    #[error("It doesn't go beyond 11")]
    VerbosityCeiling,
    #[error("WB2K_TOKEN envvar undefined")]
    MissingToken,
}

fn level_for_verbosity(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

fn init_tracing(verbose: u8) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(level_for_verbosity(verbose).into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn check_verbosity(verbose: u8) -> Result<(), ConfigurationError> {
    if verbose > VERBOSITY_CEILING {
        return Err(ConfigurationError::VerbosityCeiling);
    }
    Ok(())
}

fn api_token_from(value: Option<String>) -> Result<String, ConfigurationError> {
    value
        .filter(|token| !token.trim().is_empty())
        .ok_or(ConfigurationError::MissingToken)
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    check_verbosity(cli.verbose)?;
    init_tracing(cli.verbose);

    let token = api_token_from(std::env::var("WB2K_TOKEN").ok())?;
    let mut session = SlackSession::new(token)?;
    let config = RuntimeConfig::new(cli.channel, cli.message, cli.retries);
    let backoff = CappedExponentialBackoff::default();

    run_welcome_loop(&mut session, &config, &backoff).await?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli).await {
        eprintln!("fatal: {error}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use tracing::level_filters::LevelFilter;

    use super::{
        api_token_from, check_verbosity, level_for_verbosity, Cli, ConfigurationError,
        VERBOSITY_CEILING,
    };

    #[test]
    fn unit_defaults_match_the_documented_flags() {
        let cli = Cli::try_parse_from(["wb2k"]).expect("defaults parse");
        assert_eq!(cli.channel, "general");
        assert_eq!(cli.message, "Welcome, {user}! :wave:");
        assert_eq!(cli.verbose, 0);
        assert_eq!(cli.retries, 8);
    }

    #[test]
    fn unit_verbosity_counts_and_maps_to_levels() {
        let cli = Cli::try_parse_from(["wb2k", "-vvv"]).expect("counts parse");
        assert_eq!(cli.verbose, 3);
        assert_eq!(level_for_verbosity(0), LevelFilter::INFO);
        assert_eq!(level_for_verbosity(1), LevelFilter::DEBUG);
        assert_eq!(level_for_verbosity(2), LevelFilter::TRACE);
        assert_eq!(level_for_verbosity(VERBOSITY_CEILING), LevelFilter::TRACE);
    }

    #[test]
    fn unit_flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "wb2k", "-c", "lounge", "-m", "hi {user}", "-r", "0",
        ])
        .expect("flags parse");
        assert_eq!(cli.channel, "lounge");
        assert_eq!(cli.message, "hi {user}");
        assert_eq!(cli.retries, 0);
    }

    #[test]
    fn unit_verbosity_above_the_ceiling_is_a_configuration_error() {
        assert!(check_verbosity(VERBOSITY_CEILING).is_ok());
        let error = check_verbosity(VERBOSITY_CEILING + 1).expect_err("ceiling");
        assert!(matches!(error, ConfigurationError::VerbosityCeiling));
        assert_eq!(error.to_string(), "It doesn't go beyond 11");
    }

    #[test]
    fn unit_missing_or_blank_token_is_a_configuration_error() {
        let error = api_token_from(None).expect_err("unset");
        assert!(matches!(error, ConfigurationError::MissingToken));

        let error = api_token_from(Some("   ".to_string())).expect_err("blank");
        assert!(matches!(error, ConfigurationError::MissingToken));
        assert_eq!(error.to_string(), "WB2K_TOKEN envvar undefined");

        let token = api_token_from(Some("xoxb-test".to_string())).expect("token");
        assert_eq!(token, "xoxb-test");
    }
}
