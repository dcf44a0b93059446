//! Format codecs for request and response bodies
//!
//! A node's `format` setting selects one of the built-in codecs:
//!
//! | format | content type       |
//! |--------|--------------------|
//! | `json` | `application/json` |
//! | `yaml` | `text/yaml`        |

use crate::error::{Error, Result};
use serde_json::Value;

/// Encode/decode contract for one body format
pub trait Codec: Send + Sync {
    /// Format name as used in settings
    fn format(&self) -> &'static str;

    /// Value for the `content-type` request header
    fn content_type(&self) -> &'static str;

    /// Encode a value into a request body
    fn dumps(&self, value: &Value) -> Result<Vec<u8>>;

    /// Decode a response body
    fn loads(&self, bytes: &[u8]) -> Result<Value>;
}

/// JSON codec backed by `serde_json`
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn format(&self) -> &'static str {
        "json"
    }

    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn dumps(&self, value: &Value) -> Result<Vec<u8>> {
        serde_json::to_vec(value).map_err(|e| {
            Error::serialization(self.format(), format!("Failed to encode body: {}", e), Some(Box::new(e)))
        })
    }

    fn loads(&self, bytes: &[u8]) -> Result<Value> {
        serde_json::from_slice(bytes).map_err(|e| {
            Error::serialization(self.format(), format!("Failed to decode body: {}", e), Some(Box::new(e)))
        })
    }
}

/// YAML codec backed by `serde_yaml`
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlCodec;

impl Codec for YamlCodec {
    fn format(&self) -> &'static str {
        "yaml"
    }

    fn content_type(&self) -> &'static str {
        "text/yaml"
    }

    fn dumps(&self, value: &Value) -> Result<Vec<u8>> {
        serde_yaml::to_string(value)
            .map(String::into_bytes)
            .map_err(|e| {
                Error::serialization(self.format(), format!("Failed to encode body: {}", e), Some(Box::new(e)))
            })
    }

    fn loads(&self, bytes: &[u8]) -> Result<Value> {
        serde_yaml::from_slice(bytes).map_err(|e| {
            Error::serialization(self.format(), format!("Failed to decode body: {}", e), Some(Box::new(e)))
        })
    }
}

static JSON: JsonCodec = JsonCodec;
static YAML: YamlCodec = YamlCodec;

/// Codec lookup by format name
#[derive(Clone, Copy)]
pub struct Serializer {
    codec: &'static dyn Codec,
}

impl Serializer {
    /// Names of every available format
    pub const FORMATS: &'static [&'static str] = &["json", "yaml"];

    /// Select the codec registered for `format`
    pub fn for_format(format: &str) -> Result<Self> {
        let codec: &'static dyn Codec = match format {
            "json" => &JSON,
            "yaml" => &YAML,
            other => {
                return Err(Error::serialization(
                    other,
                    format!(
                        "No codec available for format '{}' (available: {})",
                        other,
                        Self::FORMATS.join(", ")
                    ),
                    None,
                ))
            }
        };
        Ok(Self { codec })
    }

    pub fn format(&self) -> &'static str {
        self.codec.format()
    }

    pub fn content_type(&self) -> &'static str {
        self.codec.content_type()
    }

    pub fn dumps(&self, value: &Value) -> Result<Vec<u8>> {
        self.codec.dumps(value)
    }

    pub fn loads(&self, bytes: &[u8]) -> Result<Value> {
        self.codec.loads(bytes)
    }
}

impl std::fmt::Debug for Serializer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Serializer")
            .field("format", &self.format())
            .finish()
    }
}
