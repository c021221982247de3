//! Named-environment configuration for the CLI.
//!
//! `--env` selects a NetBox deployment out of a JSON config file instead of
//! hardcoding URLs and tokens into shell history:
//!
//! ```json
//! {
//!   "environments": {
//!     "prod": {"url": "https://netbox.example.net", "token": "…"},
//!     "lab":  {"url": "http://10.0.0.5:8000"}
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::anyhow;
use serde::Deserialize;
use url::Url;

use crate::client::{CliError, CliResult};

const CONFIG_FILE_NAME: &str = "environments.json";

/// On-disk shape of the config file.
#[derive(Debug, Deserialize)]
pub(crate) struct ConfigFile {
    /// Environment name to connection settings.
    pub(crate) environments: BTreeMap<String, EnvironmentConfig>,
}

/// Connection settings for one named NetBox deployment.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct EnvironmentConfig {
    /// Base URL of the NetBox instance.
    pub(crate) url: String,
    /// API token; optional for read-only use.
    #[serde(default)]
    pub(crate) token: Option<String>,
}

/// Fully resolved environment selection, ready to build an `AppContext`.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedEnvironment {
    pub(crate) name: String,
    pub(crate) base_url: Url,
    pub(crate) token: Option<String>,
}

/// Resolve `--env` against the config file, applying the token override.
pub(crate) fn resolve_environment(
    explicit_path: Option<&Path>,
    name: &str,
    token_override: Option<String>,
) -> CliResult<ResolvedEnvironment> {
    let path = config_path(explicit_path)?;
    let file = load_config(&path)?;

    let selected = file.environments.get(name).ok_or_else(|| {
        let known = file
            .environments
            .keys()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        if known.is_empty() {
            CliError::validation(format!(
                "environment '{name}' not found; {} defines no environments",
                path.display()
            ))
        } else {
            CliError::validation(format!(
                "environment '{name}' not found in {} (known: {known})",
                path.display()
            ))
        }
    })?;

    let base_url = selected.url.parse::<Url>().map_err(|err| {
        CliError::validation(format!(
            "environment '{name}' has an invalid URL '{}': {err}",
            selected.url
        ))
    })?;

    let token = token_override
        .filter(|value| !value.trim().is_empty())
        .or_else(|| selected.token.clone());

    Ok(ResolvedEnvironment {
        name: name.to_string(),
        base_url,
        token,
    })
}

/// Parse a config file from disk.
pub(crate) fn load_config(path: &Path) -> CliResult<ConfigFile> {
    let contents = fs::read_to_string(path).map_err(|err| {
        CliError::validation(format!("cannot read config file {}: {err}", path.display()))
    })?;
    serde_json::from_str(&contents).map_err(|err| {
        CliError::validation(format!(
            "config file {} is not valid JSON: {err}",
            path.display()
        ))
    })
}

/// Determine which config file to read.
///
/// Order: explicit flag, `$XDG_CONFIG_HOME/nbx/`, `$HOME/.config/nbx/`.
fn config_path(explicit: Option<&Path>) -> CliResult<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Ok(base) = std::env::var("XDG_CONFIG_HOME") {
        if !base.trim().is_empty() {
            return Ok(Path::new(&base).join("nbx").join(CONFIG_FILE_NAME));
        }
    }
    if let Ok(home) = std::env::var("HOME") {
        if !home.trim().is_empty() {
            return Ok(Path::new(&home)
                .join(".config")
                .join("nbx")
                .join(CONFIG_FILE_NAME));
        }
    }
    Err(CliError::failure(anyhow!(
        "cannot locate a config file: pass --config or set XDG_CONFIG_HOME/HOME"
    )))
}
