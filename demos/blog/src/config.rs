//! Command line and environment configuration for the blog demo

use clap::{Parser, Subcommand};
use netmera_sdk::ClientConfig;

/// Minimal blog on the Netmera content API
#[derive(Parser, Debug, Clone)]
#[command(name = "netmera-blog")]
#[command(about = "Post and read blog entries stored on Netmera")]
pub struct Args {
    /// Application API key
    #[arg(long, env = "NETMERA_API_KEY")]
    pub api_key: String,

    /// Backend origin
    #[arg(long, env = "NETMERA_URL", default_value = "http://netmera.com")]
    pub url: String,

    /// Request timeout in seconds
    #[arg(long, env = "NETMERA_TIMEOUT_SECS", default_value = "30")]
    pub timeout_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Publish a new entry
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        text: String,
    },
    /// List entries, newest first
    List {
        #[arg(long, default_value = "10")]
        max: i64,
    },
    /// Free-text search over entries
    Search { text: String },
}

impl Args {
    pub fn validate(&self) -> Result<(), String> {
        if self.api_key.trim().is_empty() {
            return Err("NETMERA_API_KEY must not be empty".to_string());
        }
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err("NETMERA_URL must be an http(s) URL".to_string());
        }
        Ok(())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.url.clone(),
            api_key: self.api_key.clone(),
            timeout_secs: self.timeout_secs,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_add_command() {
        let args = parse(&["netmera-blog", "--api-key", "k", "add", "--title", "T", "--text", "X"]);
        assert!(matches!(args.command, Command::Add { ref title, .. } if title == "T"));
        assert!(args.validate().is_ok());
        assert_eq!(args.client_config().base_url, "http://netmera.com");
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let args = parse(&["netmera-blog", "--api-key", "k", "--url", "netmera.com", "list"]);
        assert!(args.validate().is_err());
    }
}
