//! Gateway Authentication Module
//!
//! The admission middleware runs in front of every route:
//! resolve policy, charge each rate-limit group, check the route's guard,
//! then attach a [`Principal`] for the handler. The first failure answers
//! the request.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use statusgate_core::{Claims, GateError};
use statusgate_logging::{AccessEvent, AccessLogger};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{ceil_secs, ApiError};
use crate::policy::{self, Guard};
use crate::rate_limit::Admission;
use crate::server::GatewayState;

pub const API_KEY_HEADER: &str = "x-api-key";

const RATE_LIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
const RATE_LIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
const RATE_LIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

/// Who the admission layer let through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    Anonymous,
    ApiKey,
    Session(Claims),
}

impl Principal {
    fn describe(&self) -> Option<String> {
        match self {
            Principal::Anonymous => None,
            Principal::ApiKey => Some("api_key".into()),
            Principal::Session(claims) => Some(format!("{}:{}", claims.role, claims.username)),
        }
    }
}

/// Per-request id shared by the audit events and handler logs.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Rate-limit identity for a request: the peer IP, or the last
/// `X-Forwarded-For` hop when the proxy is trusted. The trusted proxy
/// appends that hop itself; earlier entries are client-supplied.
pub fn caller_key(headers: &HeaderMap, peer: Option<SocketAddr>, trust_proxy: bool) -> String {
    if trust_proxy {
        let forwarded = headers
            .get_all("x-forwarded-for")
            .iter()
            .filter_map(|v| v.to_str().ok())
            .last()
            .and_then(|v| v.rsplit(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(hop) = forwarded {
            return hop.to_string();
        }
    }
    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// What the `Authorization` header offers a session route.
#[derive(Debug, PartialEq, Eq)]
enum SessionCredential<'a> {
    Missing,
    Bearer(&'a str),
    /// Another scheme, or a header that is not visible ASCII.
    Unsupported,
}

fn session_credential(headers: &HeaderMap) -> SessionCredential<'_> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return SessionCredential::Missing;
    };
    let Ok(value) = value.to_str() else {
        return SessionCredential::Unsupported;
    };
    let value = value.trim();
    if value.is_empty() {
        return SessionCredential::Missing;
    }
    let (scheme, token) = value.split_once(' ').unwrap_or((value, ""));
    if !scheme.eq_ignore_ascii_case("bearer") {
        return SessionCredential::Unsupported;
    }
    match token.trim() {
        "" => SessionCredential::Missing,
        token => SessionCredential::Bearer(token),
    }
}

fn check_guard(state: &GatewayState, guard: Guard, headers: &HeaderMap) -> Result<Principal, &'static str> {
    match guard {
        Guard::Public => Ok(Principal::Anonymous),
        Guard::ApiKey => {
            let presented = headers
                .get(API_KEY_HEADER)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default();
            if state.credentials.is_valid_api_key(presented) {
                Ok(Principal::ApiKey)
            } else {
                Err("Invalid API key")
            }
        }
        Guard::SessionToken => match session_credential(headers) {
            SessionCredential::Missing => Err("No token provided"),
            SessionCredential::Unsupported => Err("Invalid token"),
            SessionCredential::Bearer(token) => state
                .tokens
                .verify(token, Utc::now())
                .map(Principal::Session)
                .map_err(|e| {
                    debug!(error = %e, "Session token rejected");
                    "Invalid token"
                }),
        },
    }
}

struct Quota {
    limit: u32,
    remaining: u32,
    reset_in: Duration,
}

impl Quota {
    fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(RATE_LIMIT_LIMIT, HeaderValue::from(self.limit));
        headers.insert(RATE_LIMIT_REMAINING, HeaderValue::from(self.remaining));
        headers.insert(RATE_LIMIT_RESET, HeaderValue::from(ceil_secs(self.reset_in)));
    }
}

/// Admission middleware, mounted with `middleware::from_fn_with_state`.
pub async fn admission_layer(
    State(state): State<GatewayState>,
    mut req: Request,
    next: Next,
) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let path = req.uri().path().to_string();
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let caller = caller_key(req.headers(), peer, state.routing.trust_proxy);
    let route = policy::resolve(&path, &state.routing);

    let now = Instant::now();
    let mut quota = None;
    for group in route.groups {
        match state.limiter.admit(&caller, *group, now).await {
            Admission::Admitted {
                limit,
                remaining,
                reset_in,
            } => {
                quota = Some(Quota {
                    limit,
                    remaining,
                    reset_in,
                })
            }
            Admission::Rejected { retry_after, .. } => {
                AccessLogger::log(
                    &request_id,
                    AccessEvent::RateLimited {
                        caller,
                        path,
                        group: group.as_str().into(),
                        retry_after_secs: ceil_secs(retry_after),
                    },
                );
                return ApiError::from(GateError::AdmissionDenied {
                    message: group.rejection_message().into(),
                    retry_after,
                })
                .into_response();
            }
        }
    }

    let principal = match check_guard(&state, route.guard, req.headers()) {
        Ok(principal) => principal,
        Err(reason) => {
            AccessLogger::log(
                &request_id,
                AccessEvent::Unauthorized {
                    caller,
                    path,
                    reason: reason.into(),
                },
            );
            return ApiError::from(GateError::AuthenticationFailure(reason.into())).into_response();
        }
    };

    AccessLogger::log(
        &request_id,
        AccessEvent::Admitted {
            caller,
            method: req.method().to_string(),
            path,
            principal: principal.describe(),
        },
    );

    req.extensions_mut().insert(principal);
    req.extensions_mut().insert(RequestId(request_id));

    let mut response = next.run(req).await;
    if let Some(quota) = quota {
        quota.apply(response.headers_mut());
    }
    response
}

/// Extractor for routes behind [`Guard::SessionToken`].
pub struct RequireSession(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for RequireSession
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Principal>() {
            Some(Principal::Session(claims)) => Ok(RequireSession(claims.clone())),
            _ => {
                warn!("Session route reached without a verified session");
                Err(GateError::AuthenticationFailure("No token provided".into()).into())
            }
        }
    }
}
