//! Authorization logic.

pub mod endpoint;
pub mod lifecycle;

/// An access token as reported by the authorization provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The opaque bearer string presented on authenticated requests.
    pub access_token: String,
    /// The amount of time the token is valid for, in seconds.
    pub expires_in: u64,
}

/// Parameters for one authorization attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizeRequest {
    /// Space-separated scopes.
    pub scopes: String,
    pub client_id: String,
    /// When true the provider must not prompt the user, relying on an
    /// existing session instead.
    pub silent: bool,
}

/// The external collaborator that owns the token.
///
/// `authorize` completes on success and on failure alike; a failed attempt
/// is signaled by `cached_token` returning `None` right after completion.
#[async_trait::async_trait]
pub trait AuthProvider: Send + Sync {
    /// Whether the provider has finished loading and can serve requests.
    fn is_ready(&self) -> bool;

    /// The currently cached token, if any. Must not block.
    fn cached_token(&self) -> Option<Token>;

    /// Perform the authorization flow.
    async fn authorize(&self, request: AuthorizeRequest);
}

// Lets the host share one provider between the lifecycle manager and its
// HTTP layer.
#[async_trait::async_trait]
impl<P> AuthProvider for std::sync::Arc<P>
where
    P: AuthProvider + ?Sized,
{
    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }

    fn cached_token(&self) -> Option<Token> {
        (**self).cached_token()
    }

    async fn authorize(&self, request: AuthorizeRequest) {
        (**self).authorize(request).await;
    }
}
