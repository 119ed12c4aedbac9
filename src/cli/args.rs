use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// Command line arguments for Devterm
#[derive(Parser, Debug)]
#[command(
    name = "devterm",
    version = env!("CARGO_PKG_VERSION"),
    about = "Line-oriented TCP admin terminal for embedded devices",
    long_about = "Connects to a device over TCP, sends each line typed at the prompt newline-terminated and prints the reply."
)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress logging
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Command to execute (defaults to `connect`)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open an interactive session with a device
    Connect(ConnectArgs),
    /// Run a local echo peer for trying out the terminal
    Echo {
        /// Bind address
        #[arg(short, long, default_value = "127.0.0.1:7777")]
        bind: String,
    },
    /// Configuration management commands
    Config(ConfigArgs),
    /// Display version information
    Version,
}

/// Overrides applied on top of the loaded configuration
#[derive(ClapArgs, Debug, Default)]
pub struct ConnectArgs {
    /// Device host
    #[arg(long)]
    pub host: Option<String>,
    /// Device port
    #[arg(short, long)]
    pub port: Option<u16>,
    /// Maximum reply size read per command
    #[arg(short, long)]
    pub buffer_size: Option<usize>,
    /// Replace invalid UTF-8 in replies instead of aborting
    #[arg(long)]
    pub lossy: bool,
}

/// Configuration management arguments
#[derive(ClapArgs, Debug)]
pub struct ConfigArgs {
    /// Configuration subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Configuration management subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show effective configuration
    Show,
    /// Create default configuration
    Init {
        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Write the global configuration instead of the project one
        #[arg(short, long)]
        global: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_means_connect() {
        let args = Args::try_parse_from(["devterm"]).unwrap();
        assert!(args.command.is_none());
    }

    #[test]
    fn test_connect_overrides() {
        let args = Args::try_parse_from([
            "devterm", "-v", "connect", "--host", "10.0.0.5", "-p", "8000", "-b", "512", "--lossy",
        ])
        .unwrap();

        assert!(args.verbose);
        match args.command {
            Some(Command::Connect(connect)) => {
                assert_eq!(connect.host.as_deref(), Some("10.0.0.5"));
                assert_eq!(connect.port, Some(8000));
                assert_eq!(connect.buffer_size, Some(512));
                assert!(connect.lossy);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_port_rejected() {
        assert!(Args::try_parse_from(["devterm", "connect", "-p", "70000"]).is_err());
    }
}
