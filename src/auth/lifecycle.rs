use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use super::{AuthProvider, AuthorizeRequest};

/// When the manager asks the provider for a fresh token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPolicy {
    /// Refresh only when a caller finds no cached token, e.g. after a 401.
    OnDemand,
    /// Additionally renew shortly before the cached token expires.
    PriorToExpiry,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Space-separated scopes passed through to the provider.
    pub scopes: String,
    pub client_id: String,
    pub refresh_policy: RefreshPolicy,
}

/// Mediates access to the provider's short-lived bearer token.
///
/// Cheap to clone; all clones share one refresh state. Callers poll
/// [`get_access_token`](Self::get_access_token) and retry on `None` rather
/// than awaiting a refresh: a request issued without a token will fail with
/// a 401 until a background refresh lands a new one.
pub struct TokenLifecycle<P> {
    inner: Arc<Inner<P>>,
}

struct Inner<P> {
    provider: P,
    config: Config,
    /// True while an authorization request is outstanding. Checked and set
    /// before any suspension point; the only mutual exclusion needed.
    auth_in_progress: AtomicBool,
    /// Sticky first-attempt flag, selects interactive vs. silent mode.
    has_authed_once: AtomicBool,
}

impl<P> Clone for TokenLifecycle<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P> TokenLifecycle<P>
where
    P: AuthProvider + 'static,
{
    pub fn new(provider: P, config: Config) -> Self {
        Self {
            inner: Arc::new(Inner {
                provider,
                config,
                auth_in_progress: AtomicBool::new(false),
                has_authed_once: AtomicBool::new(false),
            }),
        }
    }

    /// Return the cached bearer string, or `None` when the provider is not
    /// ready or holds no token. The no-token case also starts a background
    /// refresh so that a later call may succeed. Never blocks.
    pub fn get_access_token(&self) -> Option<String> {
        if !self.inner.provider.is_ready() {
            warn!("waiting for the authorization provider to finish loading");
            return None;
        }
        match self.inner.provider.cached_token() {
            Some(token) => Some(token.access_token),
            None => {
                self.refresh_access_token();
                None
            }
        }
    }

    /// Ask the provider for a new token.
    ///
    /// Uses `has_authed_once` to pick the mode, so the first request may
    /// prompt the user and every later one is silent. Does nothing while a
    /// request is already outstanding; that request's completion serves all
    /// callers.
    pub fn refresh_access_token(&self) {
        if self.inner.auth_in_progress.load(Ordering::Acquire) {
            warn!("refresh suppressed, an authorization request is already in flight");
            return;
        }
        if !self.inner.provider.is_ready() {
            warn!("refresh skipped, the authorization provider is not ready");
            return;
        }
        if self.inner.auth_in_progress.swap(true, Ordering::AcqRel) {
            // Lost the race to another caller; their request serves us too.
            return;
        }

        let request = AuthorizeRequest {
            scopes: self.inner.config.scopes.clone(),
            client_id: self.inner.config.client_id.clone(),
            silent: self.inner.has_authed_once.load(Ordering::Acquire),
        };

        info!(silent = request.silent, "requesting a new token");

        let manager = self.clone();
        tokio::spawn(async move {
            manager.inner.provider.authorize(request).await;
            manager.finish_refresh();
        });
    }

    /// Runs once the provider's authorization flow completes.
    fn finish_refresh(&self) {
        self.inner.auth_in_progress.store(false, Ordering::Release);
        self.inner.has_authed_once.store(true, Ordering::Release);

        let token = match self.inner.provider.cached_token() {
            Some(token) => token,
            None => {
                // Terminal for this attempt. The next get_access_token call
                // will start another one.
                error!("authorization completed without a token, possibly denied by the user");
                return;
            }
        };

        debug!(expires_in = token.expires_in, "authorization completed");

        if self.inner.config.refresh_policy == RefreshPolicy::PriorToExpiry {
            // Renew after 95% of the validity window. Saturate so a
            // garbage expiry from the provider cannot wrap into a
            // near-immediate renewal.
            let delay = Duration::from_millis(token.expires_in.saturating_mul(950));
            debug!(delay_ms = delay.as_millis(), "scheduling token renewal");
            let manager = self.clone();
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                manager.refresh_access_token();
            });
        }
    }
}
