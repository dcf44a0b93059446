//! Transport contract used by resource nodes
//!
//! A node never talks to the network itself: it hands a [`TransportRequest`]
//! to its [`Transport`] and gets a [`TransportResponse`] back. The default
//! implementation is [`HttpTransport`](crate::http::HttpTransport); tests and
//! embedders can plug in their own.

use crate::error::Result;
use crate::http::Credentials;
use reqwest::header::{HeaderMap, LOCATION};
use reqwest::Method;
use std::fmt;

/// One outgoing request
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    /// Absolute URL including the query string
    pub url: String,
    pub body: Option<Vec<u8>>,
    pub headers: HeaderMap,
}

/// One response as seen by the node layer
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// The `Location` header, if present and readable
    pub fn location(&self) -> Option<&str> {
        self.headers.get(LOCATION).and_then(|v| v.to_str().ok())
    }

    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }
}

/// The single blocking round trip behind every verb
pub trait Transport: Send + Sync + fmt::Debug {
    /// Perform one request and return the response, whatever its status
    ///
    /// Only failures to obtain a response at all are errors here; status
    /// codes are interpreted by the caller.
    fn request(&self, request: TransportRequest) -> Result<TransportResponse>;

    /// Configure authentication before first use
    fn add_credentials(&mut self, credentials: &Credentials) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_location_header() {
        let mut response = TransportResponse::new(201, Vec::new());
        assert_eq!(response.location(), None);

        response
            .headers
            .insert(LOCATION, HeaderValue::from_static("/items/42"));
        assert_eq!(response.location(), Some("/items/42"));
    }

    #[test]
    fn test_success_range() {
        assert!(TransportResponse::new(200, "").is_success());
        assert!(TransportResponse::new(299, "").is_success());
        assert!(!TransportResponse::new(199, "").is_success());
        assert!(!TransportResponse::new(304, "").is_success());
    }
}
