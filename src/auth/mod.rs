//! Authentication module
//!
//! Streamkap uses a client-credentials exchange: the client id and secret
//! are POSTed to `/api/auth/access-token` and the returned bearer token is
//! attached to every API request.
//!
//! The `TokenStore` caches that token and refreshes it shortly before it
//! expires. It is shared by every resource handler in the process.

mod token_store;
mod types;

pub use token_store::TokenStore;
pub use types::{CachedToken, Credentials, REFRESH_MARGIN_SECS, TOKEN_PATH};
