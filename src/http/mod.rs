//! HTTP server module
//!
//! This module handles HTTP request routing and handling:
//! - Axum router for the `/api/v1` endpoints
//! - Caller identification (user header or guest address)
//! - Transcript registration and subtitle handlers
//! - Read-only configuration endpoints
//! - Request logging and CORS middleware

pub mod analyses;
pub mod caller;
pub mod config;
pub mod routes;
pub mod subtitles;

pub use caller::Caller;
pub use routes::create_router;
