//! Configuration commands.
//!
//! - `config show`: Display current configuration
//! - `config set`: Set a configuration value
//! - `config get`: Print one configuration value

use owo_colors::OwoColorize;
use serde_json::json;

use super::CommandOutput;
use crate::cli::OutputOptions;
use crate::config::{CONFIG_KEYS, Config};
use crate::error::{LctxError, Result};
use crate::paths;
use crate::storage::API_KEY_ENV;

/// Show current configuration
pub fn cmd_config_show(output: OutputOptions) -> Result<()> {
    let config = Config::load()?;
    let config_path = paths::config_path()?;
    let api_key_env = std::env::var(API_KEY_ENV).is_ok_and(|v| !v.trim().is_empty());

    let json_output = json!({
        "api_url": config.api_url,
        "timeout": config.timeout,
        "page_size": config.page_size,
        "oauth": {
            "client_id": config.oauth.client_id,
            "redirect_uri": config.oauth.redirect_uri,
            "scopes": config.oauth.scopes,
        },
        "api_key_from_env": api_key_env,
        "config_file": config_path.to_string_lossy(),
    });

    let mut text = String::new();
    text.push_str(&format!("{}\n\n", "Configuration:".cyan().bold()));
    for key in CONFIG_KEYS {
        let value = match config.get(key)? {
            Some(value) => value,
            None => "not set".dimmed().to_string(),
        };
        text.push_str(&format!("{}: {}\n", key.cyan(), value));
    }
    if api_key_env {
        text.push_str(&format!("\nUsing API key from {}\n", API_KEY_ENV.cyan()));
    }
    text.push('\n');
    text.push_str(&format!(
        "{}",
        format!("Config file: {}", config_path.display()).dimmed()
    ));

    CommandOutput::new(json_output).with_text(text).print(output)
}

/// Set a configuration value
pub fn cmd_config_set(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load()?;
    config.set(key, value)?;
    config.save()?;
    println!("Set {} to {}", key.cyan(), value);
    Ok(())
}

/// Get a configuration value
pub fn cmd_config_get(key: &str) -> Result<()> {
    let config = Config::load()?;
    match config.get(key)? {
        Some(value) => {
            println!("{value}");
            Ok(())
        }
        None => Err(LctxError::Config(format!("{key} is not set"))),
    }
}
