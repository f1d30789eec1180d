use std::time::Duration;

use clap::{Parser, Subcommand};
use spotify_remote_core::config::{ClientConfig, DEFAULT_REQUEST_TIMEOUT_SECS};
use spotify_remote_core::api::locator::{DEFAULT_PORT_END, DEFAULT_PORT_START};

/// spotify-remote - A simple CLI to control the Spotify desktop client.
#[derive(Parser, Debug)]
#[command(name = "spotify-remote", version, about)]
pub struct Args {
    /// First port to look for the client on
    #[arg(long, env = "SPOTIFY_REMOTE_PORT_START", default_value_t = DEFAULT_PORT_START)]
    pub port_start: u16,

    /// Last port to look for the client on (inclusive)
    #[arg(long, env = "SPOTIFY_REMOTE_PORT_END", default_value_t = DEFAULT_PORT_END)]
    pub port_end: u16,

    /// Request timeout in seconds
    #[arg(long, env = "SPOTIFY_REMOTE_TIMEOUT", default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub timeout: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Play a Spotify URI
    Play {
        uri: String,
    },
    /// Pause playback
    Pause,
    /// Resume playback
    Unpause,
    /// Pause if playing, resume otherwise
    TogglePlayback,
    /// Show the current track
    Status {
        /// Print the raw status JSON
        #[arg(long)]
        json: bool,

        /// Wait up to this many seconds for a player event first
        #[arg(long, value_name = "SECS")]
        wait: Option<u32>,
    },
    /// Show the client version
    Version,
    /// Bring the desktop client to the front
    Open,
}

impl Args {
    /// Apply the command-line overrides on top of `base`
    pub fn client_config(&self, base: ClientConfig) -> ClientConfig {
        ClientConfig {
            port_start: self.port_start,
            port_end: self.port_end,
            request_timeout: Duration::from_secs(self.timeout),
            ..base
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_subcommands() {
        let args = Args::try_parse_from(["spotify-remote", "play", "spotify:track:x"]).expect("parse");
        assert_eq!(args.command, Command::Play { uri: "spotify:track:x".to_string() });

        let args = Args::try_parse_from(["spotify-remote", "toggle-playback"]).expect("parse");
        assert_eq!(args.command, Command::TogglePlayback);

        let args = Args::try_parse_from(["spotify-remote", "status", "--wait", "10"]).expect("parse");
        assert_eq!(args.command, Command::Status { json: false, wait: Some(10) });

        assert!(Args::try_parse_from(["spotify-remote", "play"]).is_err());
        assert!(Args::try_parse_from(["spotify-remote"]).is_err());
    }

    #[test]
    fn test_port_overrides() {
        let args = Args::try_parse_from([
            "spotify-remote",
            "--port-start",
            "5000",
            "--port-end",
            "5002",
            "--timeout",
            "3",
            "pause",
        ])
        .expect("parse");

        let config = args.client_config(ClientConfig::default());
        assert_eq!(config.port_start, 5000);
        assert_eq!(config.port_end, 5002);
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert_eq!(config.origin, ClientConfig::default().origin);
    }
}
