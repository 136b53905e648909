use std::process::ExitCode;

use anyhow::Context;
use attack_stream_core::cli::Cli;
use attack_stream_core::config::ClientConfig;
use attack_stream_core::protocol::KNOWN_ATTACKS;
use attack_stream_core::session::launch;
use attack_stream_core::sink::TerminalSink;
use attack_stream_core::telemetry::logging;
use clap::Parser;
use tracing::info;

const EXIT_NO_FINAL: u8 = 3;
const EXIT_USAGE: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("❌ {err:#}");
            ExitCode::from(EXIT_USAGE)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    if cli.list_attacks {
        for attack in KNOWN_ATTACKS {
            println!("{attack}");
        }
        return Ok(ExitCode::SUCCESS);
    }

    logging::init(&cli.logging.to_config()).context("failed to set up logging")?;
    let config = ClientConfig::try_from(&cli).context("invalid arguments")?;
    info!(
        endpoint = %config.endpoint,
        attack = %config.attack,
        "starting attack stream"
    );

    let mut sink = TerminalSink::stdout();
    let report = launch(&config.endpoint, config.attack, &mut sink, config.session).await;
    info!(
        frames = report.frames,
        interim = report.interim_updates,
        finals = report.final_updates,
        "session finished"
    );

    if cli.summary {
        eprintln!("{}", report.to_json());
    }

    if report.received_final() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_NO_FINAL))
    }
}
