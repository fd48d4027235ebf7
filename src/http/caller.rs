//! Caller identification
//!
//! Authentication happens upstream; an authenticated request carries the
//! user id in `X-User-Id`. Anything else is a guest, keyed by address.

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use std::convert::Infallible;
use std::net::SocketAddr;

use crate::errors::ApiError;
use crate::state::AppState;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Who is making a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    User(String),
    /// Client IP address, or "unknown"
    Guest(String),
}

impl Caller {
    /// Key used to own jobs
    pub fn owner_key(&self) -> String {
        match self {
            Self::User(id) => format!("user:{}", id),
            Self::Guest(ip) => format!("guest:{}", ip),
        }
    }

    pub fn is_guest(&self) -> bool {
        matches!(self, Self::Guest(_))
    }

    /// Count a guest request against the usage limit; users always pass
    pub fn admit(&self, state: &AppState) -> Result<(), ApiError> {
        match self {
            Self::User(_) => Ok(()),
            Self::Guest(ip) => state.guests.check_and_record(ip).map(|_| ()),
        }
    }

    /// Require a signed-in user
    pub fn require_user(&self, action: &str) -> Result<&str, ApiError> {
        match self {
            Self::User(id) => Ok(id.as_str()),
            Self::Guest(_) => Err(ApiError::Authentication(format!("Sign in to {}", action))),
        }
    }
}

fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty());
        if let Some(id) = user_id {
            return Ok(Self::User(id.to_string()));
        }

        let ip = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .or_else(|| forwarded_for(&parts.headers))
            .unwrap_or_else(|| "unknown".to_string());
        Ok(Self::Guest(ip))
    }
}
