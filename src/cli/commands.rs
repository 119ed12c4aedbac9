use crate::cli::args::{Args, Command, ConfigCommand, ConnectArgs};
use crate::core::session::Session;
use crate::domain::config::{DecodeMode, DevtermConfig, GlobalConfig};
use crate::domain::error::{DevtermError, DevtermResult};
use crate::infrastructure::config::ConfigManager;
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::tcp::{self, EchoServer};
use std::path::Path;
use tokio::io::BufReader;
use tracing::info;

/// Execute CLI command
///
/// Configuration files are only read by the commands that use them, so
/// `version` and `config init` keep working next to a broken config file.
pub async fn execute_command(args: Args) -> DevtermResult<()> {
    let Args {
        verbose,
        quiet,
        config: config_path,
        command,
    } = args;

    match command {
        None => {
            let config = load_config(config_path.as_deref())?;
            setup_logging(&config.global, verbose, quiet)?;
            execute_connect(ConnectArgs::default(), config).await
        }
        Some(Command::Connect(connect_args)) => {
            let config = load_config(config_path.as_deref())?;
            setup_logging(&config.global, verbose, quiet)?;
            execute_connect(connect_args, config).await
        }
        Some(Command::Echo { bind }) => {
            setup_logging(&GlobalConfig::default(), verbose, quiet)?;
            execute_echo(&bind).await
        }
        Some(Command::Config(config_args)) => {
            execute_config_command(config_args.command, config_path.as_deref())
        }
        Some(Command::Version) => {
            println!("devterm {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn load_config(config_path: Option<&Path>) -> DevtermResult<DevtermConfig> {
    match config_path {
        Some(path) => ConfigManager::load_config_from_path(path),
        None => ConfigManager::new()?.load_config(),
    }
}

fn setup_logging(global: &GlobalConfig, verbose: bool, quiet: bool) -> DevtermResult<()> {
    if quiet {
        return Ok(());
    }
    init_logging(&global.log_level, verbose)
}

/// Fold command line overrides into the loaded configuration
pub fn apply_overrides(mut config: DevtermConfig, args: ConnectArgs) -> DevtermConfig {
    if let Some(host) = args.host {
        config.endpoint.host = host;
    }
    if let Some(port) = args.port {
        config.endpoint.port = port;
    }
    if let Some(buffer_size) = args.buffer_size {
        config.session.buffer_size = buffer_size;
    }
    if args.lossy {
        config.session.decode = DecodeMode::Lossy;
    }
    config
}

async fn execute_connect(args: ConnectArgs, config: DevtermConfig) -> DevtermResult<()> {
    let config = apply_overrides(config, args);
    config.session.validate()?;

    let stream = tcp::connect(&config.endpoint).await?;
    let mut session = Session::new(stream, config.session)?;

    let stats = session
        .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await?;

    info!(
        "Session with {} ended after {:.1?}: {}",
        config.endpoint,
        stats.uptime(),
        stats
    );
    Ok(())
}

async fn execute_echo(bind: &str) -> DevtermResult<()> {
    let mut server = EchoServer::new(bind).await?;
    server.start()?;
    println!("Echo server listening on {} (Ctrl-C to stop)", server.get_bind_addr());

    tokio::signal::ctrl_c().await?;
    server.stop().await
}

fn execute_config_command(command: ConfigCommand, config_path: Option<&Path>) -> DevtermResult<()> {
    match command {
        ConfigCommand::Show => {
            let config = load_config(config_path)?;
            let content = toml::to_string_pretty(&config).map_err(|e| DevtermError::Config {
                message: format!("Failed to serialize config: {}", e),
            })?;
            print!("{}", content);
            Ok(())
        }
        ConfigCommand::Init { output, global } => {
            let path = match (output, global) {
                (Some(path), _) => path,
                (None, true) => ConfigManager::new()?.get_global_config_path_ref().clone(),
                (None, false) => ConfigManager::project_config_path_in(&std::env::current_dir()?),
            };

            ConfigManager::init_config(&path)?;
            println!("Configuration written to {}", path.display());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_replace_only_given_values() {
        let args = ConnectArgs {
            host: Some("192.168.4.1".to_string()),
            port: None,
            buffer_size: Some(1024),
            lossy: false,
        };

        let config = apply_overrides(DevtermConfig::default(), args);

        assert_eq!(config.endpoint.host, "192.168.4.1");
        assert_eq!(config.endpoint.port, 7777);
        assert_eq!(config.session.buffer_size, 1024);
        assert_eq!(config.session.decode, DecodeMode::Strict);
    }

    #[test]
    fn test_lossy_flag_switches_decode_mode() {
        let args = ConnectArgs {
            lossy: true,
            ..ConnectArgs::default()
        };

        let config = apply_overrides(DevtermConfig::default(), args);
        assert_eq!(config.session.decode, DecodeMode::Lossy);
    }
}
