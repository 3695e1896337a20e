//! Edge protection for the API routes
//!
//! Three rules run before any handler:
//! - shield: rejects request targets carrying common attack signatures
//! - bot detection: rejects automated clients by User-Agent, optionally
//!   letting search engine crawlers through
//! - rate limiting: per-client request cap, backed by `tower_governor`
//!
//! In `DRY_RUN` mode shield and bot decisions are logged but not enforced.

use crate::config::{ProtectionConfig, ProtectionMode, RateLimitConfig};
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::State,
    http::{
        header::{CONTENT_LENGTH, CONTENT_TYPE, USER_AGENT},
        HeaderMap, Request, StatusCode, Uri,
    },
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};
use once_cell::sync::Lazy;
use regex_lite::Regex;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_governor::{
    governor::GovernorConfigBuilder,
    key_extractor::{KeyExtractor, PeerIpKeyExtractor, SmartIpKeyExtractor},
    GovernorError, GovernorLayer,
};
use tracing::{debug, info, warn};

static SHIELD_PATTERNS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(\.\./|\.\.%2f|%2e%2e|<script|%3cscript|union(\s|%20|\+)+select|/etc/passwd|;\s*drop(\s|%20)+table)",
    )
    .expect("shield pattern is valid")
});

static SEARCH_ENGINES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(googlebot|bingbot|duckduckbot|baiduspider|yandexbot|slurp|applebot)")
        .expect("search engine pattern is valid")
});

static AUTOMATED_CLIENTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(curl|wget|python-requests|python-urllib|aiohttp|go-http-client|java/|okhttp|libwww-perl|httpclient|axios|node-fetch|scrapy|headlesschrome|phantomjs|bot|crawler|spider)",
    )
    .expect("automated client pattern is valid")
});

/// Kind of client inferred from the User-Agent header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientKind {
    Browser,
    SearchEngine,
    Automated,
}

pub fn classify_user_agent(user_agent: Option<&str>) -> ClientKind {
    match user_agent.map(str::trim) {
        None | Some("") => ClientKind::Automated,
        Some(ua) if SEARCH_ENGINES.is_match(ua) => ClientKind::SearchEngine,
        Some(ua) if AUTOMATED_CLIENTS.is_match(ua) => ClientKind::Automated,
        Some(_) => ClientKind::Browser,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    Shield,
    Bot,
}

impl DenyReason {
    pub fn message(&self) -> &'static str {
        match self {
            DenyReason::Shield => "Request blocked by security policy",
            DenyReason::Bot => "Automated requests are not allowed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

/// Shield and bot rules, evaluated per request
#[derive(Debug, Clone)]
pub struct EdgeProtection {
    pub mode: ProtectionMode,
    pub allow_search_engines: bool,
}

impl EdgeProtection {
    pub fn new(config: &ProtectionConfig) -> Self {
        Self {
            mode: config.mode,
            allow_search_engines: config.allow_search_engines,
        }
    }

    pub fn inspect(&self, uri: &Uri, headers: &HeaderMap) -> Decision {
        let target = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
        if SHIELD_PATTERNS.is_match(target) {
            return Decision::Deny(DenyReason::Shield);
        }

        let user_agent = headers.get(USER_AGENT).and_then(|v| v.to_str().ok());
        match classify_user_agent(user_agent) {
            ClientKind::Browser => Decision::Allow,
            ClientKind::SearchEngine if self.allow_search_engines => Decision::Allow,
            ClientKind::SearchEngine | ClientKind::Automated => Decision::Deny(DenyReason::Bot),
        }
    }
}

/// Middleware applying the shield and bot rules
pub async fn edge_protection(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let protection = state.protection();

    if let Decision::Deny(reason) = protection.inspect(request.uri(), request.headers()) {
        match protection.mode {
            ProtectionMode::Live => {
                warn!(
                    reason = ?reason,
                    method = %request.method(),
                    path = %request.uri().path(),
                    "Request blocked"
                );
                return Err(ApiError::Forbidden(reason.message().to_string()));
            }
            ProtectionMode::DryRun => {
                info!(
                    reason = ?reason,
                    path = %request.uri().path(),
                    "Request would have been blocked (dry run)"
                );
            }
        }
    }

    Ok(next.run(request).await)
}

/// Milliseconds between replenished requests, `None` if the limit is empty
fn replenish_interval_ms(config: &RateLimitConfig) -> Option<u64> {
    let per_request = config
        .window_secs
        .checked_mul(1000)?
        .checked_div(u64::from(config.max_requests))?;
    Some(per_request.max(1))
}

/// Rate-limit key: the client IP.
///
/// Forwarding headers are client-controlled unless a proxy rewrites them, so
/// they are only read when `trust_proxy_headers` is set. Otherwise the key is
/// the peer address from connect info.
#[derive(Debug, Clone, Copy)]
pub struct ClientIpKeyExtractor {
    pub trust_proxy_headers: bool,
}

impl KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        if self.trust_proxy_headers {
            SmartIpKeyExtractor.extract(req)
        } else {
            PeerIpKeyExtractor.extract(req)
        }
    }
}

/// Re-emit a throttled response in the JSON error envelope, keeping the
/// limiter's retry headers
async fn rate_limited_as_json(response: Response) -> Response {
    if response.status() != StatusCode::TOO_MANY_REQUESTS {
        return response;
    }

    let (parts, _) = response.into_parts();
    warn!("Request rate limited");

    let mut limited =
        ApiError::TooManyRequests("Too many requests, slow down".to_string()).into_response();
    for (name, value) in parts.headers.iter() {
        if *name != CONTENT_TYPE && *name != CONTENT_LENGTH {
            limited.headers_mut().insert(name.clone(), value.clone());
        }
    }
    limited
}

/// Wrap `router` in a per-client rate limit.
///
/// Clients are keyed by peer address, so the server must be started with
/// connect info. An unusable configuration leaves the router unlimited.
pub fn with_rate_limit<S>(router: Router<S>, config: &RateLimitConfig) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let key_extractor = ClientIpKeyExtractor {
        trust_proxy_headers: config.trust_proxy_headers,
    };
    let governor = replenish_interval_ms(config).and_then(|per_ms| {
        GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(config.max_requests)
            .key_extractor(key_extractor)
            .finish()
    });

    let Some(governor) = governor else {
        warn!(
            window_secs = config.window_secs,
            max_requests = config.max_requests,
            "Invalid rate limit configuration, rate limiting disabled"
        );
        return router;
    };
    let governor = Arc::new(governor);

    // Forget idle clients periodically
    let limiter = governor.limiter().clone();
    let window = Duration::from_secs(config.window_secs.clamp(1, 3600));
    if let Ok(handle) = tokio::runtime::Handle::try_current() {
        handle.spawn(async move {
            let mut ticker = tokio::time::interval(window * 30);
            loop {
                ticker.tick().await;
                limiter.retain_recent();
                debug!(clients = limiter.len(), "Rate limiter storage pruned");
            }
        });
    }

    router
        .layer(GovernorLayer { config: governor })
        .layer(middleware::map_response(rate_limited_as_json))
}
