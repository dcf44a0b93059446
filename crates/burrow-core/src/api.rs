//! Root node: the entry point of a remote API

use crate::config::{self, ConfigFragment, Overrides, Resolved};
use crate::error::{Error, Result};
use crate::http::{Credentials, HttpTransport, HttpTransportConfig, Transport};
use crate::resource::{NodeConfig, Resource};
use serde_json::Value;
use std::ops::Deref;
use std::sync::Arc;

/// Root of a remote API
///
/// Dereferences to its root [`Resource`], so navigation and verbs work on
/// an `Api` directly:
///
/// ```no_run
/// use burrow_core::{Api, Result};
///
/// fn example() -> Result<()> {
///     let api = Api::new("https://api.example.com/v1/")?;
///     let user = api.child("users")?.id(42)?.get()?;
///     println!("{:?}", user);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Api {
    root: Resource,
}

impl Api {
    /// Root node at `base_url` with default settings and transport
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::builder().base_url(base_url).build()
    }

    pub fn builder() -> ApiBuilder {
        ApiBuilder::default()
    }

    pub fn root(&self) -> &Resource {
        &self.root
    }

    pub fn into_resource(self) -> Resource {
        self.root
    }
}

impl Deref for Api {
    type Target = Resource;

    fn deref(&self) -> &Resource {
        &self.root
    }
}

impl PartialEq for Api {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root
    }
}

/// Builder for [`Api`]
///
/// Settings come from, in increasing priority: the built-in defaults, every
/// fragment passed to [`ApiBuilder::defaults`] in call order, and the
/// explicit setters.
#[derive(Default)]
pub struct ApiBuilder {
    fragments: Vec<ConfigFragment>,
    overrides: Overrides,
    authentication: Option<Credentials>,
    transport: Option<Box<dyn Transport>>,
    transport_config: Option<HttpTransportConfig>,
}

impl ApiBuilder {
    /// Layer a more specific set of declared defaults
    pub fn defaults(mut self, fragment: ConfigFragment) -> Self {
        self.fragments.push(fragment);
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        self.overrides.insert("base_url", base_url);
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        let format: String = format.into();
        self.overrides.insert("format", format);
        self
    }

    pub fn authentication(mut self, credentials: Credentials) -> Self {
        self.authentication = Some(credentials);
        self
    }

    /// Override an arbitrary setting by name
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.overrides.insert(key, value);
        self
    }

    /// Use a custom transport instead of [`HttpTransport`]
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    /// Configure the default [`HttpTransport`]
    pub fn transport_config(mut self, config: HttpTransportConfig) -> Self {
        self.transport_config = Some(config);
        self
    }

    pub fn build(self) -> Result<Api> {
        let mut overrides = self.overrides;
        if let Some(credentials) = &self.authentication {
            let value = serde_json::to_value(credentials).map_err(|e| Error::Configuration {
                message: format!("Invalid credentials: {}", e),
                source: Some(Box::new(e)),
            })?;
            overrides.insert("authentication", value);
        }

        let mut fragments = Vec::with_capacity(self.fragments.len() + 1);
        fragments.push(ConfigFragment::builtin());
        fragments.extend(self.fragments);

        let Resolved {
            settings,
            passthrough,
        } = config::resolve(&fragments, overrides)?;

        if !passthrough.is_empty() {
            let keys: Vec<&str> = passthrough.keys().map(String::as_str).collect();
            return Err(Error::configuration(format!(
                "Unexpected settings: {}",
                keys.join(", ")
            )));
        }

        let config = NodeConfig::from_settings(settings)?;

        let mut transport: Box<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Box::new(HttpTransport::new(self.transport_config.unwrap_or_default())?),
        };
        if let Some(credentials) = &config.authentication {
            transport.add_credentials(credentials)?;
        }

        tracing::debug!(
            base_url = %config.base_url,
            format = %config.format,
            authenticated = config.authentication.is_some(),
            "api root configured"
        );

        Ok(Api {
            root: Resource::new(config, Arc::from(transport)),
        })
    }
}
