//! Blocking HTTP transport built on reqwest
//!
//! Connection handling, TLS and redirects are all reqwest's business; this
//! module only wires configuration and credentials into it.

use crate::address;
use crate::error::{Error, Result};
use crate::http::{Credentials, Transport, TransportRequest, TransportResponse};
use reqwest::blocking::Client as ReqwestClient;
use reqwest::redirect::Policy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the HTTP transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpTransportConfig {
    /// Total time allowed for one request, in seconds
    pub timeout_secs: u64,
    /// Time allowed to establish a connection, in seconds
    pub connect_timeout_secs: u64,
    /// Whether to validate TLS certificates
    pub validate_tls: bool,
    /// Follow 3xx responses instead of returning them
    pub follow_redirects: bool,
    /// Value of the `user-agent` header
    pub user_agent: String,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
            validate_tls: true,
            follow_redirects: true,
            user_agent: format!("burrow/{}", crate::VERSION),
        }
    }
}

impl HttpTransportConfig {
    /// Validate timeout configuration
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(Error::configuration("Request timeout cannot be zero"));
        }
        if self.connect_timeout_secs == 0 {
            return Err(Error::configuration("Connect timeout cannot be zero"));
        }
        if self.timeout_secs < self.connect_timeout_secs {
            return Err(Error::configuration(
                "Request timeout should be >= connect timeout",
            ));
        }
        Ok(())
    }
}

/// Default [`Transport`]: one reqwest blocking client plus optional credentials
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: ReqwestClient,
    credentials: Option<Credentials>,
}

impl HttpTransport {
    /// Create a transport with the given configuration
    pub fn new(config: HttpTransportConfig) -> Result<Self> {
        config.validate()?;

        let redirect = if config.follow_redirects {
            Policy::default()
        } else {
            Policy::none()
        };

        let client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .danger_accept_invalid_certs(!config.validate_tls)
            .redirect(redirect)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| Error::Transport {
                message: format!("Failed to create HTTP client: {}", e),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            credentials: None,
        })
    }

    /// Create with default configuration
    pub fn with_default_config() -> Result<Self> {
        Self::new(HttpTransportConfig::default())
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }
}

impl Transport for HttpTransport {
    fn request(&self, request: TransportRequest) -> Result<TransportResponse> {
        let TransportRequest {
            method,
            url,
            body,
            mut headers,
        } = request;

        if let Some(credentials) = &self.credentials {
            credentials.apply(&mut headers)?;
        }

        let mut builder = self.client.request(method.clone(), url.as_str()).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send().map_err(|e| {
            let kind = if e.is_timeout() {
                "timed out"
            } else if e.is_connect() {
                "could not connect"
            } else {
                "failed"
            };
            Error::Transport {
                message: format!("{} {} {}", method, address::redacted(&url), kind),
                source: Some(Box::new(e)),
            }
        })?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().map_err(|e| Error::Transport {
            message: format!("Failed to read response body from {}", address::redacted(&url)),
            source: Some(Box::new(e)),
        })?;

        Ok(TransportResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }

    fn add_credentials(&mut self, credentials: &Credentials) -> Result<()> {
        self.credentials = Some(credentials.expand_env()?);
        Ok(())
    }
}
