//! Authorize against an OAuth token endpoint using the client credentials flow.

use std::sync::RwLock;

use serde::Deserialize;
use tracing::{debug, warn};

use super::{AuthProvider, AuthorizeRequest, Token};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("reqwest: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("server: {0}")]
    Server(#[from] ServerError),
}

#[derive(Debug, thiserror::Error)]
#[error("token endpoint returned {status_code}")]
pub struct ServerError {
    pub status_code: u16,
}

fn check_status(res: &reqwest::Response) -> Result<(), ServerError> {
    let status = res.status();
    if !status.is_success() {
        return Err(ServerError {
            status_code: status.as_u16(),
        });
    }
    Ok(())
}

/// An [`AuthProvider`] backed by a token endpoint URL.
///
/// The grant never prompts, so the request's silent flag has no effect
/// here; it exists for providers with an interactive flow.
pub struct TokenEndpoint {
    client: reqwest::Client,
    token_url: String,
    client_secret: String,
    cached: RwLock<Option<Token>>,
}

impl TokenEndpoint {
    pub fn new(
        client: reqwest::Client,
        token_url: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            client,
            token_url: token_url.into(),
            client_secret: client_secret.into(),
            cached: RwLock::new(None),
        }
    }

    /// Perform the client credentials flow.
    pub async fn perform(&self, request: &AuthorizeRequest) -> Result<AuthResponse, Error> {
        let params = &[
            ("grant_type", "client_credentials"),
            ("client_id", request.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("scope", request.scopes.as_str()),
        ];
        let params =
            serde_urlencoded::to_string(params).expect("what kind of failure is possible here?");

        let req = self
            .client
            .post(&self.token_url)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(params)
            .build()?;

        let res = self.client.execute(req).await?;
        check_status(&res)?;
        let token_response = res.json().await?;
        Ok(token_response)
    }
}

#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    /// The requested access token.
    pub access_token: String,
    /// The amount of time that an access token is valid (in seconds).
    pub expires_in: u64,
}

impl From<AuthResponse> for Token {
    fn from(response: AuthResponse) -> Self {
        let AuthResponse {
            access_token,
            expires_in,
        } = response;
        Self {
            access_token,
            expires_in,
        }
    }
}

#[async_trait::async_trait]
impl AuthProvider for TokenEndpoint {
    fn is_ready(&self) -> bool {
        // Construction is all the setup this provider needs.
        true
    }

    fn cached_token(&self) -> Option<Token> {
        self.cached.read().ok().and_then(|guard| guard.clone())
    }

    async fn authorize(&self, request: AuthorizeRequest) {
        debug!(silent = request.silent, "performing the client credentials flow");
        let token = match self.perform(&request).await {
            Ok(response) => Some(response.into()),
            Err(err) => {
                // A cleared cache is how callers learn the attempt failed.
                warn!(error = %err, "token request failed");
                None
            }
        };
        if let Ok(mut cached) = self.cached.write() {
            *cached = token;
        }
    }
}
