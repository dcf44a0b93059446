//! Error types for the burrow core library
//!
//! Every fallible operation in the crate returns [`Result`]. Hard failures
//! (configuration, 4xx/5xx responses, codec failures, transport failures)
//! are surfaced through [`Error`]; soft failures are not errors at all and
//! show up as `None`/`false` return values on the verb methods.

use crate::http::TransportResponse;
use std::fmt;
use thiserror::Error;

/// Boxed error source carried by several variants
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for burrow operations
#[derive(Error, Debug)]
pub enum Error {
    /// A required setting is missing or invalid
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// The server answered with a status in 400..=499
    #[error("Client Error {}: {}", .0.status, .0.url)]
    Client(Box<HttpFailure>),

    /// The server answered with a status in 500..=599
    #[error("Server Error {}: {}", .0.status, .0.url)]
    Server(Box<HttpFailure>),

    /// Encoding or decoding a body failed, or the format has no codec
    #[error("Serialization error ({format}): {message}")]
    Serialization {
        format: String,
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// The transport could not complete the round trip
    #[error("HTTP request error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Names starting with `_` are not addresses
    #[error("Reserved name cannot be used as a resource: {name}")]
    ReservedName { name: String },

    /// A `.` or `..` path component would address a node other than the child
    #[error("Path segment '{segment}' cannot contain '.' or '..' components")]
    DotSegment { segment: String },

    /// A URL override could not be resolved against the current address
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// A 201 Created response did not say where the new resource lives
    #[error("Created response from {url} carried no Location header")]
    MissingLocation { url: String },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// A 4xx or 5xx response, kept whole so callers can inspect it
#[derive(Debug, Clone)]
pub struct HttpFailure {
    /// HTTP status code
    pub status: u16,
    /// The request URL, query string included
    pub url: String,
    /// The full response as returned by the transport
    pub response: TransportResponse,
}

impl HttpFailure {
    /// Raw response body
    pub fn body(&self) -> &[u8] {
        &self.response.body
    }

    /// Response body as text, lossily decoded
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.response.body).into_owned()
    }
}

impl fmt::Display for HttpFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status, self.url)
    }
}

impl Error {
    /// Create a configuration error without a source
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a serialization error for `format`
    pub fn serialization(
        format: impl Into<String>,
        message: impl Into<String>,
        source: Option<BoxError>,
    ) -> Self {
        Self::Serialization {
            format: format.into(),
            message: message.into(),
            source,
        }
    }

    /// HTTP status for client and server errors
    pub fn status(&self) -> Option<u16> {
        self.http_failure().map(|failure| failure.status)
    }

    /// The failed response for client and server errors
    pub fn http_failure(&self) -> Option<&HttpFailure> {
        match self {
            Error::Client(failure) | Error::Server(failure) => Some(failure),
            _ => None,
        }
    }

    /// Whether the caller sent a bad request (4xx)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::Client(_))
    }

    /// Whether the server failed (5xx)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::Server(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderMap;

    fn failure(status: u16) -> HttpFailure {
        HttpFailure {
            status,
            url: "https://api.example.com/items/1".to_string(),
            response: TransportResponse {
                status,
                headers: HeaderMap::new(),
                body: b"nope".to_vec(),
            },
        }
    }

    #[test]
    fn test_error_display() {
        let err = Error::Client(Box::new(failure(404)));
        assert_eq!(
            err.to_string(),
            "Client Error 404: https://api.example.com/items/1"
        );

        let err = Error::Server(Box::new(failure(503)));
        assert_eq!(
            err.to_string(),
            "Server Error 503: https://api.example.com/items/1"
        );

        let err = Error::configuration("base_url is required");
        assert_eq!(err.to_string(), "Configuration error: base_url is required");
    }

    #[test]
    fn test_status_accessors() {
        let err = Error::Client(Box::new(failure(409)));
        assert_eq!(err.status(), Some(409));
        assert!(err.is_client_error());
        assert!(!err.is_server_error());
        assert_eq!(err.http_failure().unwrap().body_text(), "nope");

        let err = Error::MissingLocation {
            url: "https://api.example.com/".to_string(),
        };
        assert_eq!(err.status(), None);
    }
}
