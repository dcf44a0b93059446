//! HTTP collaborators for resource nodes
//!
//! This module provides:
//! - The [`Transport`] contract every node talks through
//! - [`HttpTransport`], a blocking reqwest-based implementation
//! - [`Credentials`] and their header encoding

pub mod auth;
pub mod client;
pub mod transport;

pub use auth::Credentials;
pub use client::{HttpTransport, HttpTransportConfig};
pub use transport::{Transport, TransportRequest, TransportResponse};

// Re-export commonly used types
pub use reqwest::header::{HeaderMap, HeaderValue};
pub use reqwest::{Method, StatusCode};
