//! Access-control and response-normalization layer for axum services.
//!
//! Every request passes through the same stack: CORS (answers preflight on
//! its own), error envelope normalization, HTTP plumbing, panic capture,
//! response wrapping and finally the per-route access guard that delegates
//! bearer verification to a remote identity service.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod response;
pub mod security;
pub mod services;
pub mod state;
pub mod validation;
