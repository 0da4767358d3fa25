//! Client-side OAuth access-token lifecycle management.
//!
//! [`TokenLifecycle`] sits between an HTTP layer issuing authenticated
//! requests and an [`AuthProvider`] that owns the actual token. Callers
//! poll [`TokenLifecycle::get_access_token`]; a `None` means "retry later"
//! and kicks off a background refresh. With
//! [`RefreshPolicy::PriorToExpiry`] the manager also renews the token on
//! its own at 95% of the validity window.
//!
//! The host application wires the pieces together explicitly:
//!
//! ```no_run
//! use token_lifecycle::{Config, RefreshPolicy, TokenLifecycle};
//! use token_lifecycle::auth::endpoint::TokenEndpoint;
//!
//! let provider = TokenEndpoint::new(
//!     reqwest::Client::new(),
//!     "https://login.example.com/oauth2/v2.0/token",
//!     "s3cret",
//! );
//! let manager = TokenLifecycle::new(
//!     provider,
//!     Config {
//!         scopes: "drive.file".into(),
//!         client_id: "client-1".into(),
//!         refresh_policy: RefreshPolicy::PriorToExpiry,
//!     },
//! );
//! ```

pub mod auth;

pub use auth::lifecycle::{Config, RefreshPolicy, TokenLifecycle};
pub use auth::{AuthProvider, AuthorizeRequest, Token};
