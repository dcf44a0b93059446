//! Configuration command handlers

use crate::cli::{ConfigAction, ConfigArgs, ConfigFormat, ConfigShowArgs};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::redaction;
use crate::output::OutputWriter;

/// Handle the config command
pub fn handle_config(args: ConfigArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    match args.action {
        ConfigAction::Show(show_args) => handle_config_show(show_args, config, output),
        ConfigAction::Profiles => handle_config_profiles(config, output),
        ConfigAction::Path => handle_config_path(config, output),
    }
}

/// Handle config show subcommand
fn handle_config_show(
    args: ConfigShowArgs,
    config: &Config,
    output: &mut OutputWriter,
) -> Result<()> {
    let mut value = serde_json::to_value(config)?;
    redaction::redact_json_value(&mut value);

    let content = match args.style {
        ConfigFormat::Json => serde_json::to_string_pretty(&value)?,
        ConfigFormat::Yaml => serde_yaml::to_string(&value)?,
    };

    output.write(&content)?;
    if !content.ends_with('\n') {
        output.writeln("")?;
    }
    Ok(())
}

/// Handle config profiles subcommand
fn handle_config_profiles(config: &Config, output: &mut OutputWriter) -> Result<()> {
    if config.profiles.is_empty() {
        output.info("No profiles configured")?;
        return Ok(());
    }

    let headers = vec!["profile".to_string(), "base_url".to_string(), "default".to_string()];
    let rows: Vec<Vec<String>> = config
        .profiles
        .iter()
        .map(|(name, profile)| {
            let base_url = profile
                .get("base_url")
                .and_then(|v| v.as_str())
                .map(redaction::redact_sensitive)
                .unwrap_or_default();
            let is_default = config.default_profile.as_deref() == Some(name.as_str());
            vec![
                name.clone(),
                base_url,
                if is_default { "*".to_string() } else { String::new() },
            ]
        })
        .collect();

    output.table(&headers, &rows)
}

/// Handle config path subcommand
fn handle_config_path(config: &Config, output: &mut OutputWriter) -> Result<()> {
    match &config.source {
        Some(path) => output.writeln(&path.display().to_string()),
        None => {
            let searched: Vec<String> = Config::default_config_paths()
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            Err(Error::config(format!(
                "No configuration file found; searched {}",
                searched.join(", ")
            )))
        }
    }
}
