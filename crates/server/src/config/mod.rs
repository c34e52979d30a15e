use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;

use crate::consts;

/// Command line surface of the relay.
#[derive(Debug, Parser)]
#[command(name = "relay-server", about = "Split login/game proxy")]
pub struct Args {
    /// Listen address for the login proxy
    #[arg(long, default_value = consts::DEFAULT_LOGIN_ADDR)]
    pub login: String,

    /// Listen address for the game proxy
    #[arg(long, default_value = consts::DEFAULT_GAME_ADDR)]
    pub game: String,

    /// Game proxy address advertised to clients
    #[arg(long, default_value = consts::DEFAULT_PUBLIC_ADDR)]
    pub public: String,

    /// Upstream login server address
    #[arg(long)]
    pub server: String,

    /// Force admin mode on the client
    #[arg(long)]
    pub admin: bool,

    /// Automatically talk to every NPC
    #[arg(long)]
    pub npc: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

/// Validated runtime configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub login_addr: SocketAddr,
    pub game_addr: SocketAddr,
    pub public_host: String,
    pub public_port: String,
    pub server_addr: String,
    pub server_port: String,
    pub force_admin: bool,
    pub talk_to_every_npc: bool,
    pub debug: bool,
}

impl RelayConfig {
    pub fn from_args(args: &Args) -> Result<Self> {
        let login_addr = args
            .login
            .parse()
            .with_context(|| format!("invalid login listen address: {}", args.login))?;
        let game_addr = args
            .game
            .parse()
            .with_context(|| format!("invalid game listen address: {}", args.game))?;
        let (public_host, public_port) = split_host_port(&args.public)
            .with_context(|| format!("invalid public address: {}", args.public))?;
        let (_, server_port) = split_host_port(&args.server)
            .with_context(|| format!("invalid server address: {}", args.server))?;
        Ok(RelayConfig {
            login_addr,
            game_addr,
            public_host,
            public_port,
            server_addr: args.server.clone(),
            server_port,
            force_admin: args.admin,
            talk_to_every_npc: args.npc,
            debug: args.debug,
        })
    }
}

fn split_host_port(addr: &str) -> Result<(String, String)> {
    let (host, port) = addr
        .rsplit_once(':')
        .context("expected host:port")?;
    if host.is_empty() || port.is_empty() {
        anyhow::bail!("expected host:port");
    }
    Ok((host.to_string(), port.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args =
            Args::try_parse_from(["relay-server", "--server", "login.example.com:443"]).unwrap();
        let config = RelayConfig::from_args(&args).unwrap();
        assert_eq!(config.login_addr, "0.0.0.0:5555".parse().unwrap());
        assert_eq!(config.game_addr, "0.0.0.0:5556".parse().unwrap());
        assert_eq!(config.public_host, "127.0.0.1");
        assert_eq!(config.public_port, "5556");
        assert_eq!(config.server_addr, "login.example.com:443");
        assert_eq!(config.server_port, "443");
        assert!(!config.force_admin);
        assert!(!config.talk_to_every_npc);
        assert!(!config.debug);
    }

    #[test]
    fn test_server_flag_is_required() {
        assert!(Args::try_parse_from(["relay-server"]).is_err());
    }

    #[test]
    fn test_flags_are_honored() {
        let args = Args::try_parse_from([
            "relay-server",
            "--server",
            "login.example.com:443",
            "--public",
            "198.51.100.4:6000",
            "--admin",
            "--npc",
            "--debug",
        ])
        .unwrap();
        let config = RelayConfig::from_args(&args).unwrap();
        assert_eq!(config.public_host, "198.51.100.4");
        assert_eq!(config.public_port, "6000");
        assert!(config.force_admin);
        assert!(config.talk_to_every_npc);
        assert!(config.debug);
    }

    #[test]
    fn test_bad_addresses_are_rejected() {
        let args = Args::try_parse_from([
            "relay-server",
            "--server",
            "no-port-here",
        ])
        .unwrap();
        assert!(RelayConfig::from_args(&args).is_err());

        let args = Args::try_parse_from([
            "relay-server",
            "--server",
            "login.example.com:443",
            "--login",
            "not-an-address",
        ])
        .unwrap();
        assert!(RelayConfig::from_args(&args).is_err());
    }
}
