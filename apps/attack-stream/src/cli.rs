use clap::{Args, Parser};
use std::path::PathBuf;

use crate::session::MalformedFramePolicy;
use crate::telemetry::logging::{LogConfig, LogLevel};
use crate::transport::DEFAULT_URL;

#[derive(Parser, Debug)]
#[command(
    name = "attack-stream",
    about = "Stream live intrusion-detection predictions for an attack type",
    author,
    version
)]
pub struct Cli {
    #[arg(
        long,
        short = 'a',
        env = "ATTACK_STREAM_ATTACK",
        required_unless_present = "list_attacks",
        help = "Attack type to replay, sent to the backend unmodified (see --list-attacks)"
    )]
    pub attack: Option<String>,

    #[arg(
        long,
        env = "ATTACK_STREAM_URL",
        default_value = DEFAULT_URL,
        help = "WebSocket endpoint of the prediction backend"
    )]
    pub url: String,

    #[arg(
        long,
        value_enum,
        env = "ATTACK_STREAM_MALFORMED",
        default_value_t = MalformedFramePolicy::Surface,
        help = "How to handle inbound frames that are not JSON objects"
    )]
    pub malformed: MalformedFramePolicy,

    #[arg(
        long = "list-attacks",
        action = clap::ArgAction::SetTrue,
        help = "Print the attack types the reference backend understands and exit"
    )]
    pub list_attacks: bool,

    #[arg(
        long,
        action = clap::ArgAction::SetTrue,
        help = "Print a JSON summary of the session to stderr when it ends"
    )]
    pub summary: bool,

    #[command(flatten)]
    pub logging: LoggingArgs,
}

#[derive(Args, Debug, Clone)]
pub struct LoggingArgs {
    #[arg(
        long = "log-level",
        value_enum,
        env = "ATTACK_STREAM_LOG_LEVEL",
        default_value_t = LogLevel::Warn,
        help = "Minimum log level (error, warn, info, debug, trace)"
    )]
    pub level: LogLevel,

    #[arg(
        long = "log-file",
        value_name = "PATH",
        env = "ATTACK_STREAM_LOG_FILE",
        help = "Write logs to the specified file instead of stderr"
    )]
    pub file: Option<PathBuf>,
}

impl LoggingArgs {
    pub fn to_config(&self) -> LogConfig {
        LogConfig {
            level: self.level,
            file: self.file.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_timeout::timeout]
    fn defaults_to_reference_endpoint() {
        let cli = Cli::try_parse_from(["attack-stream", "--attack", "DoS"]).unwrap();
        assert_eq!(cli.attack.as_deref(), Some("DoS"));
        assert_eq!(cli.url, DEFAULT_URL);
        assert_eq!(cli.malformed, MalformedFramePolicy::Surface);
        assert_eq!(cli.logging.level, LogLevel::Warn);
    }

    #[test_timeout::timeout]
    fn list_attacks_does_not_need_an_attack() {
        let cli = Cli::try_parse_from(["attack-stream", "--list-attacks"]).unwrap();
        assert!(cli.list_attacks);
        assert!(cli.attack.is_none());
    }

    #[test_timeout::timeout]
    fn parses_overrides() {
        let cli = Cli::try_parse_from([
            "attack-stream",
            "-a",
            "Fuzzy",
            "--url",
            "ws://10.0.0.2:9000/ws",
            "--malformed",
            "ignore",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.url, "ws://10.0.0.2:9000/ws");
        assert_eq!(cli.malformed, MalformedFramePolicy::Ignore);
        assert_eq!(cli.logging.level, LogLevel::Debug);
    }
}
