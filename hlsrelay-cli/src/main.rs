//! HLS Relay CLI - Command-line interface
//!
//! Runs the relay server or performs one-off discovery against an origin.

mod commands;

use std::path::PathBuf;

use clap::Parser;
use hlsrelay_core::tracing_setup::{CliLogLevel, init_tracing};

#[derive(Parser)]
#[command(name = "hlsrelay")]
#[command(about = "Relays a live HLS stream by discovering segments on its origin")]
#[command(version)]
struct Cli {
    /// Console log level
    #[arg(long, value_enum, default_value_t = CliLogLevel::Info, global = true)]
    log_level: CliLogLevel,

    /// Directory for the full debug log
    #[arg(long, global = true)]
    logs_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: commands::Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_tracing_level(), cli.logs_dir.as_deref())?;

    commands::handle_command(cli.command).await
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;
    use crate::commands::Commands;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_autostart_requires_current_id() {
        assert!(Cli::try_parse_from(["hlsrelay", "serve", "--autostart"]).is_err());

        let cli = Cli::try_parse_from(["hlsrelay", "serve", "--current-id", "100", "--autostart"])
            .unwrap();
        match cli.command {
            Commands::Serve {
                current_id,
                autostart,
                ..
            } => {
                assert_eq!(current_id.map(|id| id.value()), Some(100));
                assert!(autostart);
            }
            Commands::Probe { .. } => panic!("expected serve command"),
        }
    }

    #[test]
    fn test_invalid_current_id_is_rejected_at_parse_time() {
        for bad in ["abc", "0", "-3"] {
            assert!(
                Cli::try_parse_from(["hlsrelay", "serve", "--current-id", bad]).is_err(),
                "expected {bad} to be rejected"
            );
        }
    }
}
