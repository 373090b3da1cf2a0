//! Request extractors.
//!
//! - [`auth::AuthUser`] -- requires a valid JWT Bearer token.
//! - [`auth::MaybeAuthUser`] -- accepts anonymous callers, rejects bad tokens.
//! - [`crate::submission::ClientMeta`] -- caller address and user agent, see [`client`].

pub mod auth;
pub mod client;
