//! API client for the desktop client's local control interface.
//!
//! `RemoteClient::connect` finds the port the service listens on, and
//! `handshake` (see `auth::session`) obtains the tokens needed by the
//! authenticated remote-control endpoints.

use std::time::Duration;

use reqwest::{header, Client};
use serde_json::Value;
use tracing::{debug, info};

use crate::auth::Session;
use crate::config::ClientConfig;

use super::locator::PortLocator;
use super::RemoteError;

// ============================================================================
// Constants
// ============================================================================

pub(crate) const CSRF_PATH: &str = "/simplecsrf/token.json";
pub(crate) const STATUS_PATH: &str = "/remote/status.json";
const PAUSE_PATH: &str = "/remote/pause.json";
const PLAY_PATH: &str = "/remote/play.json";
const OPEN_PATH: &str = "/remote/open.json";
const VERSION_PATH: &str = "/service/version.json";

/// Events a long-polling status request returns early on.
pub const DEFAULT_RETURN_ON: &[&str] = &["login", "logout", "play", "pause", "error", "ap"];

/// `returnafter` value asking the service to answer immediately.
pub const RETURN_IMMEDIATELY: i64 = -1;

/// Raw decoded response body of an endpoint call.
pub type CommandResult = Value;

/// A single GET against the local service.
#[derive(Debug, Clone)]
pub struct Call {
    path: &'static str,
    origin: bool,
    authenticated: bool,
    raise_error: bool,
    long_poll: Option<Duration>,
    params: Vec<(&'static str, String)>,
}

impl Call {
    pub fn new(path: &'static str) -> Self {
        Self {
            path,
            origin: false,
            authenticated: false,
            raise_error: true,
            long_poll: None,
            params: Vec::new(),
        }
    }

    /// Attach the session's `oauth` and `csrf` tokens
    pub fn authenticated(mut self) -> Self {
        self.authenticated = true;
        self
    }

    /// Send the configured `Origin` header
    pub fn with_origin(mut self) -> Self {
        self.origin = true;
        self
    }

    /// Return an error envelope in the result instead of failing
    pub fn suppress_errors(mut self) -> Self {
        self.raise_error = false;
        self
    }

    /// Extend the request timeout by the time the service may hold the request
    pub fn long_poll(mut self, wait: Duration) -> Self {
        self.long_poll = Some(wait);
        self
    }

    pub fn param(mut self, key: &'static str, value: impl ToString) -> Self {
        self.params.push((key, value.to_string()));
        self
    }
}

/// Client bound to the port found at connect time.
pub struct RemoteClient {
    client: Client,
    config: ClientConfig,
    port: u16,
    pub(crate) session: Session,
}

impl RemoteClient {
    /// Locate the service and return a client bound to its port.
    ///
    /// Each port in the configured range is tried with the version request;
    /// the first one that accepts a connection is kept for the lifetime of
    /// the client. An answer that is not JSON fails the connect rather than
    /// moving on.
    pub async fn connect(config: ClientConfig) -> Result<Self, RemoteError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        let locator = PortLocator::new(config.port_start, config.port_end);

        // Any JSON answer proves the port, error envelope or not
        let discovery = Self::version_call().suppress_errors();
        let session = Session::default();
        let (http, cfg, call, session_ref) = (&client, &config, &discovery, &session);
        let (port, version) = locator
            .locate(move |port| Self::execute(http, cfg, session_ref, port, call))
            .await?;

        info!(port, version = %version, "Connected to client");

        Ok(Self {
            client,
            config,
            port,
            session,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Issue a call against the bound port.
    pub async fn send(&self, call: &Call) -> Result<CommandResult, RemoteError> {
        Self::execute(&self.client, &self.config, &self.session, self.port, call).await
    }

    async fn execute(
        client: &Client,
        config: &ClientConfig,
        session: &Session,
        port: u16,
        call: &Call,
    ) -> Result<CommandResult, RemoteError> {
        let url = config.url(port, call.path);
        let mut request = client.get(&url).query(&call.params);

        if call.authenticated {
            request = request.query(&session.auth_params());
        }
        if call.origin {
            request = request.header(header::ORIGIN, config.origin.as_str());
        }
        if let Some(wait) = call.long_poll {
            request = request.timeout(config.request_timeout + wait);
        }

        debug!(url = %url, authenticated = call.authenticated, "GET");

        let response = request
            .send()
            .await
            .map_err(|e| RemoteError::from_transport(e, port))?;
        let body = response.text().await?;

        Self::decode(&body, call.raise_error)
    }

    /// Parse a response body and surface its error envelope.
    ///
    /// Invalid JSON is always an error, even when `raise_error` is off.
    pub(crate) fn decode(body: &str, raise_error: bool) -> Result<CommandResult, RemoteError> {
        let value: Value =
            serde_json::from_str(body).map_err(|e| RemoteError::Decode(e.to_string()))?;

        if raise_error {
            if let Some(error) = value.get("error").filter(|e| is_truthy(e)) {
                debug!(error = %error, "Service returned an error");
                return Err(RemoteError::from_envelope(error));
            }
        }

        Ok(value)
    }

    /// GET an absolute URL outside the local service, e.g. the token endpoint.
    pub(crate) async fn fetch_external(&self, url: &str) -> Result<CommandResult, RemoteError> {
        debug!(url = %url, "GET");
        let response = self.client.get(url).send().await?;
        let body = response.text().await?;
        Self::decode(&body, false)
    }

    // ===== Remote Control Methods =====

    fn version_call() -> Call {
        Call::new(VERSION_PATH).param("service", "remote")
    }

    /// Query the service version
    pub async fn version(&self) -> Result<CommandResult, RemoteError> {
        self.send(&Self::version_call()).await
    }

    /// Current player status, answered immediately
    pub async fn current_status(&self) -> Result<CommandResult, RemoteError> {
        self.status(RETURN_IMMEDIATELY, DEFAULT_RETURN_ON).await
    }

    /// Player status, optionally long-polling.
    ///
    /// With `return_after` > 0 the service holds the request for up to that
    /// many seconds, returning early on any of the `return_on` events.
    pub async fn status(
        &self,
        return_after: i64,
        return_on: &[&str],
    ) -> Result<CommandResult, RemoteError> {
        let mut call = Call::new(STATUS_PATH)
            .authenticated()
            .param("returnafter", return_after)
            .param("returnon", return_on.join(","));

        if let Ok(wait) = u64::try_from(return_after) {
            if wait > 0 {
                call = call.long_poll(Duration::from_secs(wait));
            }
        }

        self.send(&call).await
    }

    /// Set the paused state
    pub async fn pause(&self, pause: bool) -> Result<CommandResult, RemoteError> {
        let call = Call::new(PAUSE_PATH).authenticated().param("pause", pause);
        self.send(&call).await
    }

    pub async fn unpause(&self) -> Result<CommandResult, RemoteError> {
        self.pause(false).await
    }

    /// Play a URI, using it as its own playback context
    pub async fn play(&self, uri: &str) -> Result<CommandResult, RemoteError> {
        let call = Call::new(PLAY_PATH)
            .authenticated()
            .param("uri", uri)
            .param("context", uri);
        self.send(&call).await
    }

    /// Bring the desktop client to the front
    pub async fn open_client(&self) -> Result<CommandResult, RemoteError> {
        let call = Call::new(OPEN_PATH).with_origin().authenticated();
        self.send(&call).await
    }
}

/// Truthiness of a loosely typed JSON field: null, false, zero and empty
/// values are unset.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
