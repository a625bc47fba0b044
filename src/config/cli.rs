use crate::config::CatalogConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "thundermonit")]
#[command(about = "Monitored-services catalog served over a typed query API")]
pub struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Override the listen host from config
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Override the listen port from config
    #[arg(long, global = true)]
    pub port: Option<u16>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Start the query server (default)
    Serve,
    /// Show build and version
    Version,
    /// Generate and write the schema file on disk
    Schema {
        #[arg(short, long, default_value = "schema.json")]
        output: PathBuf,
    },
}

impl Cli {
    /// Applies command-line overrides on top of the loaded file config.
    pub fn apply_overrides(&self, config: &mut CatalogConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_none() {
        let cli = Cli::parse_from(["thundermonit"]);
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_schema_subcommand_and_overrides() {
        let cli = Cli::parse_from([
            "thundermonit",
            "schema",
            "--output",
            "out.json",
            "--port",
            "9000",
        ]);

        match &cli.command {
            Some(Command::Schema { output }) => assert_eq!(output, &PathBuf::from("out.json")),
            other => panic!("unexpected command: {other:?}"),
        }

        let mut config = CatalogConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
    }
}
