//! Authentication against the local service.
//!
//! This module provides:
//! - `Session`: the bearer and anti-forgery tokens for the current process
//! - `CredentialStore`: the on-disk cache of the bearer token
//!
//! The handshake itself is `RemoteClient::handshake`, defined in `session`.

pub mod credentials;
pub mod session;

pub use credentials::CredentialStore;
pub use session::Session;
