//! Client address and user-agent extraction for recorded responses.

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::header::USER_AGENT;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use crate::state::AppState;
use crate::submission::ClientMeta;

/// Reads the peer address from `ConnectInfo`, which is only present when the
/// server is run with `into_make_service_with_connect_info`. Forwarding
/// headers are honoured only when `TRUST_PROXY_HEADERS` is set.
impl FromRequestParts<AppState> for ClientMeta {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());
        Ok(resolve_client_meta(
            &parts.headers,
            peer,
            state.config.trust_proxy_headers,
        ))
    }
}

/// Pick the caller's address and user agent.
///
/// With `trust_proxy_headers`, the first hop of `X-Forwarded-For` wins over
/// `X-Real-IP`, and the socket peer is the fallback. Without it, only the
/// socket peer counts.
pub fn resolve_client_meta(
    headers: &HeaderMap,
    peer: Option<IpAddr>,
    trust_proxy_headers: bool,
) -> ClientMeta {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    let forwarded = if trust_proxy_headers {
        header("x-forwarded-for")
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .or_else(|| header("x-real-ip"))
            .map(str::to_string)
    } else {
        None
    };
    let ip_address = forwarded.or_else(|| peer.map(|ip| ip.to_string()));

    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    ClientMeta {
        ip_address,
        user_agent,
    }
}
