//! Resource nodes
//!
//! A [`Resource`] is one addressable location in a remote API. Navigation
//! never mutates a node: [`Resource::child`], [`Resource::call`] and friends
//! return new nodes whose configuration is copied from the parent and
//! selectively overridden. Verb methods perform exactly one blocking round
//! trip through the node's transport and translate the status code:
//!
//! | status      | `get`            | `post`                  | `put` / `delete` |
//! |-------------|------------------|-------------------------|------------------|
//! | 200         | decoded body     | raw body                | `true`           |
//! | 201         | raw body         | `get` on `Location`     | `true`           |
//! | other 2xx   | raw body         | raw body                | `true`           |
//! | 400..=499   | `Error::Client`  | `Error::Client`         | `Error::Client`  |
//! | 500..=599   | `Error::Server`  | `Error::Server`         | `Error::Server`  |
//! | anything else | `None`         | `None`                  | `false`          |

use crate::address::{self, check_segment, url_join};
use crate::config::{Settings, RESERVED_PREFIX};
use crate::error::{Error, HttpFailure, Result};
use crate::http::{Credentials, Transport, TransportRequest, TransportResponse};
use crate::serialize::Serializer;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};
use url::Url;

/// Validated configuration held by a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeConfig {
    pub base_url: Url,
    pub format: String,
    pub authentication: Option<Credentials>,
}

impl NodeConfig {
    /// Validate resolved settings; `base_url` must be present and hierarchical
    pub fn from_settings(settings: Settings) -> Result<Self> {
        let raw = settings
            .base_url
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| Error::configuration("base_url is required"))?;

        let base_url = Url::parse(raw.trim()).map_err(|e| Error::Configuration {
            message: format!("Invalid base_url '{}': {}", raw, e),
            source: Some(Box::new(e)),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(Error::configuration(format!(
                "base_url '{}' cannot have path segments",
                raw
            )));
        }

        Ok(Self {
            base_url,
            format: settings.format,
            authentication: settings.authentication,
        })
    }

    /// The same configuration as a plain settings record
    pub fn settings(&self) -> Settings {
        Settings {
            base_url: Some(self.base_url.to_string()),
            format: self.format.clone(),
            authentication: self.authentication.clone(),
        }
    }
}

/// Arguments of [`Resource::call`]; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Call {
    /// Appended to the address as one more path segment
    pub id: Option<String>,
    /// Codec override for the returned node
    pub format: Option<String>,
    /// Replaces the address wholesale; applied after `id`
    pub url_override: Option<String>,
}

impl Call {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl fmt::Display) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn url_override(mut self, url: impl Into<String>) -> Self {
        self.url_override = Some(url.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.format.is_none() && self.url_override.is_none()
    }
}

/// Query string parameters for a verb call, kept in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one parameter
    pub fn param(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.push(key, value);
        self
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl fmt::Display) {
        self.pairs.push((key.into(), value.to_string()));
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// `application/x-www-form-urlencoded` rendering, empty when there are no pairs
    pub fn encode(&self) -> Result<String> {
        serde_urlencoded::to_string(&self.pairs).map_err(|e| {
            Error::serialization(
                "urlencoded",
                format!("Failed to encode query: {}", e),
                Some(Box::new(e)),
            )
        })
    }
}

impl<K, V> FromIterator<(K, V)> for Query
where
    K: Into<String>,
    V: fmt::Display,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut query = Query::new();
        for (key, value) in iter {
            query.push(key, value);
        }
        query
    }
}

/// Successful response body
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Body decoded with the node's codec (GET answered with 200)
    Decoded(Value),
    /// Body passed through untouched (any other 2xx)
    Raw(Vec<u8>),
}

impl Payload {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Payload::Decoded(value) => Some(value),
            Payload::Raw(_) => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Payload::Decoded(value) => Some(value),
            Payload::Raw(_) => None,
        }
    }

    pub fn as_raw(&self) -> Option<&[u8]> {
        match self {
            Payload::Raw(bytes) => Some(bytes),
            Payload::Decoded(_) => None,
        }
    }

    /// Convert a decoded body into a typed value
    pub fn deserialize<T: DeserializeOwned>(self) -> Result<T> {
        match self {
            Payload::Decoded(value) => serde_json::from_value(value).map_err(|e| {
                Error::serialization(
                    "value",
                    format!("Decoded body does not match the requested type: {}", e),
                    Some(Box::new(e)),
                )
            }),
            Payload::Raw(_) => Err(Error::serialization(
                "raw",
                "Body was not decoded; only 200 responses to GET are decoded",
                None,
            )),
        }
    }
}

struct Node {
    config: NodeConfig,
    transport: Arc<dyn Transport>,
}

/// One addressable location in a remote API
///
/// Cloning a `Resource` yields another handle to the same node; use
/// [`Resource::duplicate`] for an independent copy.
#[derive(Clone)]
pub struct Resource {
    inner: Arc<Node>,
}

impl Resource {
    pub(crate) fn new(config: NodeConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            inner: Arc::new(Node { config, transport }),
        }
    }

    /// A new node sharing this node's transport
    fn derive(&self, config: NodeConfig) -> Self {
        trace!(url = %address::redacted(config.base_url.as_str()), format = %config.format, "derived resource");
        Self::new(config, Arc::clone(&self.inner.transport))
    }

    pub fn config(&self) -> &NodeConfig {
        &self.inner.config
    }

    pub fn settings(&self) -> Settings {
        self.inner.config.settings()
    }

    pub fn base_url(&self) -> &Url {
        &self.inner.config.base_url
    }

    pub fn url(&self) -> &str {
        self.inner.config.base_url.as_str()
    }

    pub fn format(&self) -> &str {
        &self.inner.config.format
    }

    pub fn authentication(&self) -> Option<&Credentials> {
        self.inner.config.authentication.as_ref()
    }

    /// Whether both handles point at the very same node
    pub fn ptr_eq(a: &Resource, b: &Resource) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    /// The child address `name` below this node
    ///
    /// Names starting with `_` are reserved and never name an address.
    pub fn child(&self, name: &str) -> Result<Resource> {
        if name.starts_with(RESERVED_PREFIX) {
            return Err(Error::ReservedName {
                name: name.to_string(),
            });
        }
        check_segment(name)?;

        let mut config = self.inner.config.clone();
        config.base_url = url_join(&config.base_url, [name]);
        Ok(self.derive(config))
    }

    /// Navigate several child names at once
    pub fn path<I, S>(&self, names: I) -> Result<Resource>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .try_fold(self.clone(), |node, name| node.child(name.as_ref()))
    }

    /// A differently configured node, or this very node when `call` is empty
    pub fn call(&self, call: Call) -> Result<Resource> {
        if call.is_empty() {
            return Ok(self.clone());
        }

        let mut config = self.inner.config.clone();

        if let Some(id) = &call.id {
            check_segment(id)?;
            config.base_url = url_join(&config.base_url, [id]);
        }

        if let Some(format) = call.format {
            config.format = format;
        }

        if let Some(target) = &call.url_override {
            config.base_url = self.resolve(target)?;
        }

        Ok(self.derive(config))
    }

    /// `collection.id(42)` addresses one member of a collection
    pub fn id(&self, id: impl fmt::Display) -> Result<Resource> {
        let id = id.to_string();
        check_segment(&id)?;

        let mut config = self.inner.config.clone();
        config.base_url = url_join(&config.base_url, [id]);
        Ok(self.derive(config))
    }

    /// The same address with another codec
    pub fn with_format(&self, format: impl Into<String>) -> Resource {
        let mut config = self.inner.config.clone();
        config.format = format.into();
        self.derive(config)
    }

    /// The node at `url`, absolute or relative to this node's address
    pub fn at(&self, url: &str) -> Result<Resource> {
        self.call(Call::new().url_override(url))
    }

    /// An independent node with identical configuration
    pub fn duplicate(&self) -> Resource {
        self.derive(self.inner.config.clone())
    }

    fn resolve(&self, target: &str) -> Result<Url> {
        self.base_url().join(target).map_err(|source| Error::InvalidUrl {
            url: target.to_string(),
            source,
        })
    }

    /// Codec for this node's format
    pub fn serializer(&self) -> Result<Serializer> {
        Serializer::for_format(&self.inner.config.format)
    }

    pub fn get(&self) -> Result<Option<Payload>> {
        self.get_with(&Query::new())
    }

    /// GET this address; 200 decodes, other 2xx pass the body through
    pub fn get_with(&self, query: &Query) -> Result<Option<Payload>> {
        let serializer = self.serializer()?;
        let response = self.request(Method::GET, None, query, &serializer)?;

        match response.status {
            200 => Ok(Some(Payload::Decoded(serializer.loads(&response.body)?))),
            201..=299 => Ok(Some(Payload::Raw(response.body))),
            status => {
                self.soft_failure(&Method::GET, status);
                Ok(None)
            }
        }
    }

    pub fn post<D: Serialize + ?Sized>(&self, data: &D) -> Result<Option<Payload>> {
        self.post_with(data, &Query::new())
    }

    /// POST `data`; a 201 is followed to its `Location` and fetched
    pub fn post_with<D: Serialize + ?Sized>(
        &self,
        data: &D,
        query: &Query,
    ) -> Result<Option<Payload>> {
        let serializer = self.serializer()?;
        let body = encode_body(&serializer, data)?;
        let response = self.request(Method::POST, Some(body), query, &serializer)?;

        match response.status {
            201 => {
                let location = response.location().ok_or_else(|| Error::MissingLocation {
                    url: self.url().to_string(),
                })?;
                debug!(location = %location, "following created resource");
                self.at(location)?.get_with(query)
            }
            200..=299 => Ok(Some(Payload::Raw(response.body))),
            status => {
                self.soft_failure(&Method::POST, status);
                Ok(None)
            }
        }
    }

    pub fn put<D: Serialize + ?Sized>(&self, data: &D) -> Result<bool> {
        self.put_with(data, &Query::new())
    }

    /// PUT `data`; any 2xx counts as applied
    pub fn put_with<D: Serialize + ?Sized>(&self, data: &D, query: &Query) -> Result<bool> {
        let serializer = self.serializer()?;
        let body = encode_body(&serializer, data)?;
        let response = self.request(Method::PUT, Some(body), query, &serializer)?;
        Ok(self.applied(&Method::PUT, &response))
    }

    pub fn delete(&self) -> Result<bool> {
        self.delete_with(&Query::new())
    }

    /// DELETE this address; any 2xx counts as applied
    pub fn delete_with(&self, query: &Query) -> Result<bool> {
        let serializer = self.serializer()?;
        let response = self.request(Method::DELETE, None, query, &serializer)?;
        Ok(self.applied(&Method::DELETE, &response))
    }

    fn applied(&self, method: &Method, response: &TransportResponse) -> bool {
        if response.is_success() {
            true
        } else {
            self.soft_failure(method, response.status);
            false
        }
    }

    fn soft_failure(&self, method: &Method, status: u16) {
        warn!(
            method = %method,
            url = %address::redacted(self.url()),
            status,
            "response was neither success nor error"
        );
    }

    fn request(
        &self,
        method: Method,
        body: Option<Vec<u8>>,
        query: &Query,
        serializer: &Serializer,
    ) -> Result<TransportResponse> {
        let url = address::with_query(self.base_url(), &query.encode()?);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(serializer.content_type()));

        debug!(
            method = %method,
            url = %address::redacted(&url),
            format = serializer.format(),
            body_bytes = body.as_ref().map_or(0, Vec::len),
            "sending request"
        );

        let response = self.inner.transport.request(TransportRequest {
            method: method.clone(),
            url: url.clone(),
            body,
            headers,
        })?;

        debug!(
            method = %method,
            url = %address::redacted(&url),
            status = response.status,
            "received response"
        );

        match response.status {
            400..=499 => Err(Error::Client(Box::new(HttpFailure {
                status: response.status,
                url,
                response,
            }))),
            500..=599 => Err(Error::Server(Box::new(HttpFailure {
                status: response.status,
                url,
                response,
            }))),
            _ => Ok(response),
        }
    }
}

fn encode_body<D: Serialize + ?Sized>(serializer: &Serializer, data: &D) -> Result<Vec<u8>> {
    let value = serde_json::to_value(data).map_err(|e| {
        Error::serialization(
            serializer.format(),
            format!("Failed to convert request data: {}", e),
            Some(Box::new(e)),
        )
    })?;
    serializer.dumps(&value)
}

impl PartialEq for Resource {
    fn eq(&self, other: &Self) -> bool {
        self.inner.config == other.inner.config
    }
}

impl Eq for Resource {}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("base_url", &self.url())
            .field("format", &self.format())
            .field("authentication", &self.authentication())
            .field("transport", &self.inner.transport)
            .finish()
    }
}
