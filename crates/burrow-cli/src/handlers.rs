//! Command handlers for CLI subcommands
//!
//! This module contains the implementation logic for each CLI subcommand.

mod completions;
mod config;

pub use completions::handle_completions;
pub use config::handle_config;

use crate::cli::{ConnectionArgs, TargetArgs, WriteArgs};
use crate::config::Config;
use crate::error::{Error, ErrorContext, Result};
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use burrow_core::{Api, Credentials, Query, Resource};
use serde_json::Value;
use std::path::Path;

/// Build the root node from the active profile and command-line overrides
pub fn build_api(connection: &ConnectionArgs, config: &Config) -> Result<Api> {
    let mut builder = Api::builder().transport_config(config.transport.clone());

    if let Some(profile) = config.profile(connection.profile.as_deref())? {
        builder = builder.defaults(profile.clone());
    }
    if let Some(base_url) = &connection.base_url {
        builder = builder.base_url(base_url.as_str());
    }
    if let Some(format) = &connection.format {
        builder = builder.format(format.as_str());
    }
    if let Some(credentials) = credentials(connection) {
        builder = builder.authentication(credentials);
    }

    Ok(builder.build()?)
}

/// Credentials given on the command line, if any
fn credentials(connection: &ConnectionArgs) -> Option<Credentials> {
    if let Some(token) = &connection.token {
        return Some(Credentials::bearer(token.as_str()));
    }
    connection.user.as_ref().map(|username| Credentials::Basic {
        username: username.clone(),
        password: connection.password.clone(),
    })
}

/// Walk from the root to the node a command addresses
fn resolve_target(api: &Api, target: &TargetArgs) -> Result<Resource> {
    let node = api.path(&target.segments)?;
    match &target.id {
        Some(id) => Ok(node.id(id)?),
        None => Ok(node),
    }
}

fn query(target: &TargetArgs) -> Query {
    target.query.iter().cloned().collect()
}

/// Parse `--data`: inline JSON or YAML, or `@path` to read a file
pub fn parse_data(raw: &str) -> Result<Value> {
    let content = match raw.strip_prefix('@') {
        Some("") => return Err(Error::invalid_args("--data @ needs a file path")),
        Some(path) => {
            let path = Path::new(path);
            if !path.exists() {
                return Err(Error::FileNotFound {
                    path: path.to_path_buf(),
                });
            }
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?
        }
        None => raw.to_string(),
    };

    serde_json::from_str(&content).or_else(|json_err| {
        serde_yaml::from_str(&content).map_err(|yaml_err| Error::InvalidData {
            message: format!("json: {}; yaml: {}", json_err, yaml_err),
        })
    })
}

/// Handle the get command
pub fn handle_get(args: TargetArgs, api: &Api, output: &mut OutputWriter) -> Result<()> {
    let node = resolve_target(api, &args)?;
    let _timer = Timer::with_details("get", node.url());
    let spinner = output.spinner(&format!("GET {}", node.url()));

    let result = node.get_with(&query(&args));
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    match result? {
        Some(payload) => output.payload(&payload),
        None => Err(no_result("GET", &node)),
    }
}

/// Handle the post command
pub fn handle_post(args: WriteArgs, api: &Api, output: &mut OutputWriter) -> Result<()> {
    let data = parse_data(&args.data)?;
    let node = resolve_target(api, &args.target)?;
    let _timer = Timer::with_details("post", node.url());
    let spinner = output.spinner(&format!("POST {}", node.url()));

    let result = node.post_with(&data, &query(&args.target));
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    match result? {
        Some(payload) => output.payload(&payload),
        None => Err(no_result("POST", &node)),
    }
}

/// Handle the put command
pub fn handle_put(args: WriteArgs, api: &Api, output: &mut OutputWriter) -> Result<()> {
    let data = parse_data(&args.data)?;
    let node = resolve_target(api, &args.target)?;
    let _timer = Timer::with_details("put", node.url());

    let applied = node.put_with(&data, &query(&args.target))?;
    report_applied("PUT", &node, applied, output)
}

/// Handle the delete command
pub fn handle_delete(args: TargetArgs, api: &Api, output: &mut OutputWriter) -> Result<()> {
    let node = resolve_target(api, &args)?;
    let _timer = Timer::with_details("delete", node.url());

    let applied = node.delete_with(&query(&args))?;
    report_applied("DELETE", &node, applied, output)
}

fn report_applied(
    method: &str,
    node: &Resource,
    applied: bool,
    output: &mut OutputWriter,
) -> Result<()> {
    output.applied(applied)?;
    if applied {
        Ok(())
    } else {
        Err(no_result(method, node))
    }
}

fn no_result(method: &str, node: &Resource) -> Error {
    Error::NoResult {
        method: method.to_string(),
        url: node.url().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burrow_core::ConfigFragment;
    use serde_json::json;
    use std::io::Write;

    fn connection() -> ConnectionArgs {
        ConnectionArgs::default()
    }

    fn config_with_profile() -> Config {
        let mut config = Config::default();
        config.profiles.insert(
            "staging".to_string(),
            ConfigFragment::new()
                .with("base_url", "https://staging.example.com/api/")
                .with("format", "yaml"),
        );
        config.default_profile = Some("staging".to_string());
        config
    }

    #[test]
    fn test_parse_inline_json_and_yaml() {
        assert_eq!(parse_data(r#"{"a": 1}"#).unwrap(), json!({"a": 1}));
        assert_eq!(parse_data("a: 1\nb: [x, y]").unwrap(), json!({"a": 1, "b": ["x", "y"]}));
    }

    #[test]
    fn test_parse_data_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"name": "widget"}"#).unwrap();

        let raw = format!("@{}", file.path().display());
        assert_eq!(parse_data(&raw).unwrap(), json!({"name": "widget"}));
    }

    #[test]
    fn test_parse_data_errors() {
        assert!(matches!(parse_data("@"), Err(Error::InvalidArgs(_))));
        assert!(matches!(
            parse_data("@/no/such/file.json"),
            Err(Error::FileNotFound { .. })
        ));
        assert!(matches!(parse_data("{unclosed: ["), Err(Error::InvalidData { .. })));
    }

    #[test]
    fn test_build_api_from_profile() {
        let api = build_api(&connection(), &config_with_profile()).unwrap();
        assert_eq!(api.url(), "https://staging.example.com/api/");
        assert_eq!(api.format(), "yaml");
    }

    #[test]
    fn test_flags_override_profile() {
        let connection = ConnectionArgs {
            base_url: Some("https://prod.example.com/".to_string()),
            format: Some("json".to_string()),
            token: Some("t0ken".to_string()),
            ..ConnectionArgs::default()
        };
        let api = build_api(&connection, &config_with_profile()).unwrap();

        assert_eq!(api.url(), "https://prod.example.com/");
        assert_eq!(api.format(), "json");
        assert_eq!(api.authentication(), Some(&Credentials::bearer("t0ken")));
    }

    #[test]
    fn test_basic_credentials_from_flags() {
        let connection = ConnectionArgs {
            base_url: Some("https://api.example.com/".to_string()),
            user: Some("bob".to_string()),
            ..ConnectionArgs::default()
        };
        let api = build_api(&connection, &Config::default()).unwrap();

        assert_eq!(
            api.authentication(),
            Some(&Credentials::Basic {
                username: "bob".to_string(),
                password: None
            })
        );
    }

    #[test]
    fn test_missing_base_url() {
        let err = build_api(&connection(), &Config::default()).unwrap_err();
        assert!(matches!(err, Error::Core(burrow_core::Error::Configuration { .. })));
        assert_eq!(err.exit_code(), 5);
    }

    #[test]
    fn test_misspelled_profile_key() {
        let mut config = Config::default();
        config.profiles.insert(
            "typo".to_string(),
            ConfigFragment::new()
                .with("base_url", "https://api.example.com/")
                .with("formt", "yaml"),
        );
        config.default_profile = Some("typo".to_string());

        let err = build_api(&connection(), &config).unwrap_err();
        assert!(matches!(err, Error::Core(burrow_core::Error::Configuration { .. })));
        assert!(err.to_string().contains("formt"));
    }

    #[test]
    fn test_unknown_profile() {
        let connection = ConnectionArgs {
            profile: Some("nope".to_string()),
            ..ConnectionArgs::default()
        };
        let err = build_api(&connection, &config_with_profile()).unwrap_err();
        assert!(matches!(err, Error::ProfileNotFound { .. }));
    }

    #[test]
    fn test_resolve_target() {
        let api = build_api(&connection(), &config_with_profile()).unwrap();
        let target = TargetArgs {
            segments: vec!["users".to_string(), "42".to_string()],
            id: Some("posts".to_string()),
            query: vec![("page".to_string(), "2".to_string())],
        };

        let node = resolve_target(&api, &target).unwrap();
        assert_eq!(node.url(), "https://staging.example.com/api/users/42/posts");
        assert_eq!(query(&target).encode().unwrap(), "page=2");

        let reserved = TargetArgs {
            segments: vec!["_private".to_string()],
            id: None,
            query: Vec::new(),
        };
        assert!(resolve_target(&api, &reserved).is_err());
    }
}
