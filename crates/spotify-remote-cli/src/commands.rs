//! Command dispatch.
//!
//! Each subcommand maps onto one or two client calls; output goes to the
//! given writer so it can be checked in tests.

use std::io::Write;

use anyhow::Result;
use spotify_remote_core::api::{DEFAULT_RETURN_ON, RETURN_IMMEDIATELY};
use spotify_remote_core::models::Status;
use spotify_remote_core::RemoteClient;
use tracing::debug;

use crate::cli::Command;
use crate::format::{format_track, format_version};

pub async fn run<W: Write>(client: &RemoteClient, command: &Command, out: &mut W) -> Result<()> {
    match command {
        Command::Play { uri } => {
            client.play(uri).await?;
        }
        Command::Pause => {
            client.pause(true).await?;
        }
        Command::Unpause => {
            client.unpause().await?;
        }
        Command::TogglePlayback => {
            let status = Status::from_result(&client.current_status().await?);
            debug!(playing = status.is_playing(), "Toggling playback");
            if status.is_playing() {
                client.pause(true).await?;
            } else {
                client.unpause().await?;
            }
        }
        Command::Status { json, wait } => {
            let return_after = wait.map(i64::from).unwrap_or(RETURN_IMMEDIATELY);
            let result = client.status(return_after, DEFAULT_RETURN_ON).await?;

            if *json {
                writeln!(out, "{}", serde_json::to_string_pretty(&result)?)?;
            } else {
                for line in format_track(&Status::from_result(&result)) {
                    writeln!(out, "{}", line)?;
                }
            }
        }
        Command::Version => {
            let version = client.version().await?;
            writeln!(out, "{}", format_version(&version))?;
        }
        Command::Open => {
            client.open_client().await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use spotify_remote_core::CredentialStore;

    use spotify_remote_test_support::{client_config, FakeSpotify, StubServer};

    async fn connect(server: &StubServer, dir: &tempfile::TempDir) -> RemoteClient {
        let path = dir.path().join("spotify-remote.oauth");
        let mut client = RemoteClient::connect(client_config(server, path.clone()))
            .await
            .expect("connect");
        client
            .handshake(&CredentialStore::new(path))
            .await
            .expect("handshake");
        client
    }

    async fn run_to_string(client: &RemoteClient, command: Command) -> String {
        let mut out = Vec::new();
        run(client, &command, &mut out).await.expect("command");
        String::from_utf8(out).expect("utf8")
    }

    #[tokio::test]
    async fn test_status_prints_track() {
        let server = FakeSpotify::new("issued-token")
            .with_status(json!({
                "playing": true,
                "track": {
                    "artist_resource": {"name": "A", "uri": "u1"},
                    "album_resource": {"name": "B", "uri": "u2"},
                    "track_resource": {"name": "C", "uri": "u3"}
                }
            }))
            .serve()
            .await;
        let dir = tempfile::tempdir().expect("tempdir");
        let client = connect(&server, &dir).await;

        let output = run_to_string(&client, Command::Status { json: false, wait: None }).await;
        assert_eq!(output, "Artist: A [u1]\nAlbum: B [u2]\nTitle: C [u3]\n");
    }

    #[tokio::test]
    async fn test_status_without_track() {
        let server = FakeSpotify::new("issued-token").serve().await;
        let dir = tempfile::tempdir().expect("tempdir");
        let client = connect(&server, &dir).await;

        let output = run_to_string(&client, Command::Status { json: false, wait: None }).await;
        assert_eq!(output, "No track info available\n");
    }

    #[tokio::test]
    async fn test_status_json_and_wait() {
        let server = FakeSpotify::new("issued-token")
            .with_status(json!({"playing": true}))
            .serve()
            .await;
        let dir = tempfile::tempdir().expect("tempdir");
        let client = connect(&server, &dir).await;

        let output = run_to_string(&client, Command::Status { json: true, wait: Some(2) }).await;
        let printed: serde_json::Value = serde_json::from_str(&output).expect("json output");
        assert_eq!(printed, json!({"playing": true}));

        let last = server
            .requests_to("/remote/status.json")
            .pop()
            .expect("status request");
        assert_eq!(last.param("returnafter"), Some("2"));
    }

    #[tokio::test]
    async fn test_toggle_pauses_when_playing() {
        let server = FakeSpotify::new("issued-token")
            .with_status(json!({"playing": true}))
            .serve()
            .await;
        let dir = tempfile::tempdir().expect("tempdir");
        let client = connect(&server, &dir).await;

        run_to_string(&client, Command::TogglePlayback).await;

        let pauses = server.requests_to("/remote/pause.json");
        assert_eq!(pauses.len(), 1);
        assert_eq!(pauses[0].param("pause"), Some("true"));
    }

    #[tokio::test]
    async fn test_toggle_unpauses_when_stopped() {
        for status in [json!({"playing": false}), json!({})] {
            let server = FakeSpotify::new("issued-token")
                .with_status(status)
                .serve()
                .await;
            let dir = tempfile::tempdir().expect("tempdir");
            let client = connect(&server, &dir).await;

            run_to_string(&client, Command::TogglePlayback).await;

            let pauses = server.requests_to("/remote/pause.json");
            assert_eq!(pauses.len(), 1);
            assert_eq!(pauses[0].param("pause"), Some("false"));
        }
    }

    #[tokio::test]
    async fn test_status_with_off_type_fields() {
        let status = json!({"playing": true, "repeat": "off", "volume": null, "client_version": 1});
        let server = FakeSpotify::new("issued-token")
            .with_status(status)
            .serve()
            .await;
        let dir = tempfile::tempdir().expect("tempdir");
        let client = connect(&server, &dir).await;

        run_to_string(&client, Command::TogglePlayback).await;
        let pauses = server.requests_to("/remote/pause.json");
        assert_eq!(pauses.len(), 1);
        assert_eq!(pauses[0].param("pause"), Some("true"));

        let output = run_to_string(&client, Command::Status { json: false, wait: None }).await;
        assert_eq!(output, "No track info available\n");
    }

    #[tokio::test]
    async fn test_toggle_treats_numeric_playing_as_truthy() {
        for (playing, pause) in [(json!(1), "true"), (json!(0), "false")] {
            let server = FakeSpotify::new("issued-token")
                .with_status(json!({ "playing": playing }))
                .serve()
                .await;
            let dir = tempfile::tempdir().expect("tempdir");
            let client = connect(&server, &dir).await;

            run_to_string(&client, Command::TogglePlayback).await;

            let pauses = server.requests_to("/remote/pause.json");
            assert_eq!(pauses.len(), 1);
            assert_eq!(pauses[0].param("pause"), Some(pause));
        }
    }

    #[tokio::test]
    async fn test_play_and_version() {
        let server = FakeSpotify::new("issued-token").serve().await;
        let dir = tempfile::tempdir().expect("tempdir");
        let client = connect(&server, &dir).await;

        let output = run_to_string(&client, Command::Play { uri: "spotify:album:x".to_string() }).await;
        assert!(output.is_empty());
        assert_eq!(server.requests_to("/remote/play.json")[0].param("uri"), Some("spotify:album:x"));

        let output = run_to_string(&client, Command::Version).await;
        assert_eq!(output, "Version: 9 (client 1.0.0.0)\n");
    }

    #[tokio::test]
    async fn test_service_error_propagates() {
        let server = FakeSpotify::new("issued-token").serve().await;
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("spotify-remote.oauth");
        // Connected but never authenticated
        let client = RemoteClient::connect(client_config(&server, path))
            .await
            .expect("connect");

        let mut out = Vec::new();
        let err = run(&client, &Command::Pause, &mut out).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid OAuthToken");
    }
}
