//! Credentials handed to the transport
//!
//! Supports three schemes:
//! - HTTP basic authentication
//! - Bearer tokens
//! - A single custom header (API keys and the like)
//!
//! Every value may reference environment variables with `${ENV:VAR}`;
//! placeholders are expanded when the credentials are added to a transport.

use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

static ENV_PATTERN: OnceLock<Regex> = OnceLock::new();

fn env_pattern() -> &'static Regex {
    ENV_PATTERN.get_or_init(|| Regex::new(r"\$\{ENV:([^}]+)\}").expect("Valid regex pattern"))
}

/// Opaque credential bundle attached to a node
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scheme", rename_all = "snake_case")]
pub enum Credentials {
    /// `Authorization: Basic ...`
    Basic {
        username: String,
        #[serde(default)]
        password: Option<String>,
    },
    /// `Authorization: Bearer <token>`
    Bearer { token: String },
    /// An arbitrary header, e.g. `x-api-key`
    Header { name: String, value: String },
}

impl Credentials {
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: Some(password.into()),
        }
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer {
            token: token.into(),
        }
    }

    pub fn header(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Header {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Scheme name as it appears in configuration
    pub fn scheme(&self) -> &'static str {
        match self {
            Self::Basic { .. } => "basic",
            Self::Bearer { .. } => "bearer",
            Self::Header { .. } => "header",
        }
    }

    /// Copy with every `${ENV:VAR}` placeholder replaced
    pub fn expand_env(&self) -> Result<Self> {
        Ok(match self {
            Self::Basic { username, password } => Self::Basic {
                username: expand_env_vars(username)?,
                password: password.as_deref().map(expand_env_vars).transpose()?,
            },
            Self::Bearer { token } => Self::Bearer {
                token: expand_env_vars(token)?,
            },
            Self::Header { name, value } => Self::Header {
                name: expand_env_vars(name)?,
                value: expand_env_vars(value)?,
            },
        })
    }

    /// Add the authentication header for these credentials
    pub fn apply(&self, headers: &mut HeaderMap) -> Result<()> {
        let (name, value) = match self {
            Self::Basic { username, password } => {
                let encoded = basic_token(username, password.as_deref());
                (AUTHORIZATION, format!("Basic {}", encoded))
            }
            Self::Bearer { token } => (AUTHORIZATION, format!("Bearer {}", token)),
            Self::Header { name, value } => {
                let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                    Error::Configuration {
                        message: format!("Invalid credential header name '{}'", name),
                        source: Some(Box::new(e)),
                    }
                })?;
                (name, value.clone())
            }
        };

        let mut value = HeaderValue::from_str(&value).map_err(|e| Error::Configuration {
            message: format!("Invalid {} credential value", self.scheme()),
            source: Some(Box::new(e)),
        })?;
        value.set_sensitive(true);
        headers.insert(name, value);
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"***")
                .finish(),
            Self::Bearer { .. } => f.debug_struct("Bearer").field("token", &"***").finish(),
            Self::Header { name, .. } => f
                .debug_struct("Header")
                .field("name", name)
                .field("value", &"***")
                .finish(),
        }
    }
}

/// Expand environment variables in the format ${ENV:VAR_NAME}
pub fn expand_env_vars(value: &str) -> Result<String> {
    let mut result = value.to_string();

    for cap in env_pattern().captures_iter(value) {
        let var_name = &cap[1];
        let env_value = std::env::var(var_name).map_err(|_| {
            Error::configuration(format!("Environment variable {} not found", var_name))
        })?;

        let pattern = format!("${{ENV:{}}}", var_name);
        result = result.replace(&pattern, &env_value);
    }

    Ok(result)
}

fn basic_token(username: &str, password: Option<&str>) -> String {
    STANDARD.encode(format!("{}:{}", username, password.unwrap_or_default()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_header() {
        let mut headers = HeaderMap::new();
        Credentials::bearer("test-key-123").apply(&mut headers).unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer test-key-123");
        assert!(headers.get(AUTHORIZATION).unwrap().is_sensitive());
    }

    #[test]
    fn test_basic_header() {
        let mut headers = HeaderMap::new();
        Credentials::basic("Aladdin", "open sesame")
            .apply(&mut headers)
            .unwrap();
        assert_eq!(
            headers.get(AUTHORIZATION).unwrap(),
            "Basic QWxhZGRpbjpvcGVuIHNlc2FtZQ=="
        );
    }

    #[test]
    fn test_custom_header() {
        let mut headers = HeaderMap::new();
        Credentials::header("x-api-key", "k-456")
            .apply(&mut headers)
            .unwrap();
        assert_eq!(headers.get("x-api-key").unwrap(), "k-456");
    }

    #[test]
    fn test_invalid_header_name() {
        let mut headers = HeaderMap::new();
        let err = Credentials::header("bad header", "v")
            .apply(&mut headers)
            .unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn test_env_expansion() {
        let original = std::env::var("BURROW_TEST_TOKEN").ok();
        std::env::set_var("BURROW_TEST_TOKEN", "from-env");

        let creds = Credentials::bearer("${ENV:BURROW_TEST_TOKEN}")
            .expand_env()
            .unwrap();
        assert_eq!(creds, Credentials::bearer("from-env"));

        match original {
            Some(value) => std::env::set_var("BURROW_TEST_TOKEN", value),
            None => std::env::remove_var("BURROW_TEST_TOKEN"),
        }
    }

    #[test]
    fn test_missing_env_var() {
        let err = expand_env_vars("Bearer ${ENV:BURROW_TEST_SURELY_MISSING}").unwrap_err();
        assert!(err.to_string().contains("BURROW_TEST_SURELY_MISSING"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let rendered = format!("{:?}", Credentials::basic("bob", "hunter2"));
        assert!(rendered.contains("bob"));
        assert!(!rendered.contains("hunter2"));

        let rendered = format!("{:?}", Credentials::bearer("sk-secret"));
        assert!(!rendered.contains("sk-secret"));
    }

    #[test]
    fn test_serde_shape() {
        let creds: Credentials =
            serde_json::from_str(r#"{"scheme": "basic", "username": "bob"}"#).unwrap();
        assert_eq!(
            creds,
            Credentials::Basic {
                username: "bob".to_string(),
                password: None
            }
        );
    }
}
