//! # Tasklist API Server Library
//!
//! HTTP layer of the Tasklist service: configuration, router, handlers and
//! the mapping from domain errors to HTTP responses.
//!
//! ## Modules
//!
//! - `app`: Application state, store selection and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: JSON body extractor with API-shaped rejections
//! - `routes`: API route handlers
//! - `telemetry`: Tracing subscriber setup

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod telemetry;
