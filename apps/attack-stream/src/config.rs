use crate::cli::Cli;
use crate::error::CliError;
use crate::session::SessionConfig;
use crate::transport::Endpoint;

/// Everything one CLI invocation needs to run a session.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: Endpoint,
    pub attack: String,
    pub session: SessionConfig,
}

impl TryFrom<&Cli> for ClientConfig {
    type Error = CliError;

    fn try_from(cli: &Cli) -> Result<Self, Self::Error> {
        let attack = cli.attack.clone().ok_or(CliError::MissingAttack)?;
        Ok(Self {
            endpoint: Endpoint::parse(&cli.url)?,
            attack,
            session: SessionConfig {
                malformed: cli.malformed,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test_timeout::timeout]
    fn keeps_attack_verbatim() {
        let cli = parse(&["attack-stream", "--attack", " DoS "]);
        let config = ClientConfig::try_from(&cli).unwrap();
        assert_eq!(config.attack, " DoS ");
        assert_eq!(config.endpoint, Endpoint::default());
    }

    #[test_timeout::timeout]
    fn blank_attack_is_left_to_the_backend() {
        let cli = parse(&["attack-stream", "--attack", "  "]);
        let config = ClientConfig::try_from(&cli).unwrap();
        assert_eq!(config.attack, "  ");
    }

    #[test_timeout::timeout]
    fn rejects_bad_url() {
        let cli = parse(&["attack-stream", "--attack", "DoS", "--url", "ftp://host/ws"]);
        assert!(matches!(
            ClientConfig::try_from(&cli),
            Err(CliError::Endpoint(_))
        ));
    }

    #[test_timeout::timeout]
    fn missing_attack_with_list_flag() {
        let cli = parse(&["attack-stream", "--list-attacks"]);
        assert!(matches!(
            ClientConfig::try_from(&cli),
            Err(CliError::MissingAttack)
        ));
    }
}
