//! Command-line flags for the API server.
//!
//! Flags override the matching environment variables, which in turn override the defaults in
//! [`ServerConfig`].

use clap::Parser;

use cuidame_config::ServerConfig;

#[derive(Debug, Parser)]
#[command(name = "cuidame")]
#[command(about = "CuidaMe API server", long_about = None)]
pub struct Cli {
    /// Interface to bind
    #[arg(long, env = "HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short = 'p', long, env = "PORT")]
    pub port: Option<u16>,

    /// Start without applying pending migrations
    #[arg(long, env = "SKIP_MIGRATIONS")]
    pub skip_migrations: bool,
}

impl Cli {
    pub fn server_config(&self) -> ServerConfig {
        let mut config = ServerConfig::from_env();
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let cli =
            Cli::try_parse_from(["cuidame", "--host", "127.0.0.1", "--port", "8080"]).unwrap();
        let config = cli.server_config();
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert!(!cli.skip_migrations);
    }

    #[test]
    fn test_skip_migrations_flag() {
        let cli = Cli::try_parse_from(["cuidame", "--skip-migrations"]).unwrap();
        assert!(cli.skip_migrations);
    }

    #[test]
    fn test_rejects_invalid_port() {
        assert!(Cli::try_parse_from(["cuidame", "--port", "not-a-port"]).is_err());
    }
}
