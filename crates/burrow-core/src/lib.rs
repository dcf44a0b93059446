//! Burrow Core - navigate HTTP resource APIs as a tree of nodes
//!
//! This crate turns a chain of navigation calls into a URL and a verb call
//! into one HTTP round trip, translating the response status into a decoded
//! payload, a pass-through body, a boolean, or a typed error.
//!
//! # Main Components
//!
//! - **Configuration**: layered defaults and overrides merged per node ([`config`])
//! - **Resource nodes**: immutable addresses with verb methods ([`Resource`])
//! - **Root node**: the validated entry point ([`Api`])
//! - **Collaborators**: codecs ([`serialize`]) and transports ([`http`])
//!
//! # Example
//!
//! ```no_run
//! use burrow_core::{Api, Query, Result};
//! use serde_json::json;
//!
//! fn example() -> Result<()> {
//!     let api = Api::new("https://api.example.com/v1/")?;
//!
//!     let notes = api.child("notes")?;
//!     let page = notes.get_with(&Query::new().param("page", 2))?;
//!     let created = notes.post(&json!({"title": "hello"}))?;
//!     let removed = notes.id(7)?.delete()?;
//!
//!     println!("{:?} {:?} {}", page, created, removed);
//!     Ok(())
//! }
//! ```

pub mod address;
pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod resource;
pub mod serialize;

// Re-export main types for convenience
pub use address::url_join;
pub use api::{Api, ApiBuilder};
pub use config::{ConfigFragment, Overrides, Settings};
pub use error::{Error, HttpFailure, Result};
pub use http::{Credentials, HttpTransport, HttpTransportConfig, Transport};
pub use resource::{Call, NodeConfig, Payload, Query, Resource};
pub use serialize::{Codec, Serializer};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
