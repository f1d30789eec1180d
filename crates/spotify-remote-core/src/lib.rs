//! Core library for spotify-remote.
//!
//! Finds the desktop client's local control interface, performs the token
//! handshake and exposes the playback commands.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{RemoteClient, RemoteError};
pub use auth::CredentialStore;
pub use config::ClientConfig;
