//! HTTP client for the Dossier assistant service.
//!
//! Implements the [`dossier_core::api::ChatApi`] contract over HTTP/JSON,
//! with configuration resolved from the environment.

mod config;
mod http;

pub use config::{ClientConfig, DEFAULT_API_URL};
pub use http::HttpChatApi;
