use tracing::{debug, info};

use crate::api::client::{Call, CSRF_PATH, STATUS_PATH};
use crate::api::{RemoteClient, RemoteError};

use super::CredentialStore;

/// Tokens attached to authenticated calls.
#[derive(Debug, Clone, Default)]
pub struct Session {
    oauth_token: Option<String>,
    csrf_token: Option<String>,
}

impl Session {
    pub fn oauth_token(&self) -> Option<&str> {
        self.oauth_token.as_deref()
    }

    pub fn csrf_token(&self) -> Option<&str> {
        self.csrf_token.as_deref()
    }

    /// Both tokens are present
    pub fn is_authenticated(&self) -> bool {
        self.oauth_token.is_some() && self.csrf_token.is_some()
    }

    pub(crate) fn auth_params(&self) -> Vec<(&'static str, &str)> {
        let mut params = Vec::with_capacity(2);
        if let Some(ref token) = self.oauth_token {
            params.push(("oauth", token.as_str()));
        }
        if let Some(ref token) = self.csrf_token {
            params.push(("csrf", token.as_str()));
        }
        params
    }
}

impl RemoteClient {
    /// Obtain the anti-forgery token and a working bearer token.
    ///
    /// A cached bearer token is tried first and checked against the service;
    /// a fresh one is only fetched (and cached) when there is none or the
    /// service rejects it.
    pub async fn handshake(&mut self, store: &CredentialStore) -> Result<(), RemoteError> {
        let csrf = self.request_csrf_token().await?;
        self.session.csrf_token = Some(csrf);

        match store.load() {
            Some(token) => {
                self.session.oauth_token = Some(token);
                if self.is_valid_oauth_token().await? {
                    debug!("Cached credential accepted");
                } else {
                    debug!("Cached credential rejected, fetching a new one");
                    self.refresh_oauth_token(store).await?;
                }
            }
            None => self.refresh_oauth_token(store).await?,
        }

        info!(port = self.port(), "Handshake complete");
        Ok(())
    }

    async fn request_csrf_token(&self) -> Result<String, RemoteError> {
        let result = self.send(&Call::new(CSRF_PATH).with_origin()).await?;
        string_field(&result, "token")
    }

    /// Any error envelope on an authenticated status call means the bearer
    /// token is no good.
    async fn is_valid_oauth_token(&self) -> Result<bool, RemoteError> {
        let call = Call::new(STATUS_PATH).authenticated().suppress_errors();
        let result = self.send(&call).await?;
        Ok(result.get("error").is_none())
    }

    async fn refresh_oauth_token(&mut self, store: &CredentialStore) -> Result<(), RemoteError> {
        let url = self.config().token_url.clone();
        let result = self.fetch_external(&url).await?;
        let token = string_field(&result, "t")?;

        store.save(&token);
        self.session.oauth_token = Some(token);
        Ok(())
    }
}

fn string_field(result: &serde_json::Value, field: &str) -> Result<String, RemoteError> {
    result
        .get(field)
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| RemoteError::missing_field(field))
}
