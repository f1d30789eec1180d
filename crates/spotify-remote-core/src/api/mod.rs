//! Client for the desktop client's embedded HTTP control interface.
//!
//! The service listens on a loopback port within a small range, answers
//! every endpoint with JSON, and reports failures through an `error`
//! envelope inside otherwise successful responses.

pub mod client;
pub mod error;
pub mod locator;

pub use client::{Call, CommandResult, RemoteClient, DEFAULT_RETURN_ON, RETURN_IMMEDIATELY};
pub use error::RemoteError;
pub use locator::PortLocator;
