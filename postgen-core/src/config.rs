//! postgen configuration.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{PostgenError, PostgenResult};
use crate::probe::{DEFAULT_PROFILE_URL_BASE, ProbePolicy};
use crate::render::DEFAULT_FORM_URL;

static DEFAULT_SHEET_URL: &str = "https://docs.google.com/spreadsheets/d/1LqM-N1kFa6VUkD3IKhGRZyf9KICIyi3D87Y77seEa4I/export?format=csv&id=1LqM-N1kFa6VUkD3IKhGRZyf9KICIyi3D87Y77seEa4I";
static DEFAULT_CACHE_DIR: &str = "~/.cache/postgen";
static DEFAULT_USER_AGENT: &str = concat!("postgen/", env!("CARGO_PKG_VERSION"));

/// Configuration at ~/.config/postgen/config.toml, overridable with
/// `POSTGEN_*` environment variables (`POSTGEN_PROBE__MAX_ATTEMPTS=5`).
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct PostgenConfig {
    /// CSV export of the submissions spreadsheet.
    pub sheet_url: String,

    /// Form linked from the call to action.
    pub form_url: String,

    /// Where the liveness cache, fingerprint and last post are kept.
    pub cache_dir: PathBuf,

    /// Submitter usernames are appended to this to find their profile.
    pub profile_url_base: String,

    /// Sent with the sheet download and every liveness probe.
    pub user_agent: String,

    pub probe: ProbePolicy,
}

impl Default for PostgenConfig {
    fn default() -> Self {
        PostgenConfig {
            sheet_url: DEFAULT_SHEET_URL.to_string(),
            form_url: DEFAULT_FORM_URL.to_string(),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            profile_url_base: DEFAULT_PROFILE_URL_BASE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            probe: ProbePolicy::default(),
        }
    }
}

impl PostgenConfig {
    pub fn config_path() -> PostgenResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| PostgenError::Config("Could not determine config directory".into()))?
            .join("postgen");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, writing a commented template first
    /// if nothing is there yet.
    pub fn load() -> PostgenResult<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            Self::create_default_config(&path)?;
        }

        Self::load_from(&path)
    }

    /// Load from `path`; a missing file just means defaults.
    pub fn load_from(path: &Path) -> PostgenResult<Self> {
        Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(
                Environment::with_prefix("POSTGEN")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(|e| PostgenError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| PostgenError::Config(e.to_string()))
    }

    /// `cache_dir` with `~` expanded.
    pub fn cache_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.cache_dir.to_string_lossy()).into_owned();

        PathBuf::from(full_path_str)
    }

    /// Blocking HTTP client shared by the sheet fetch and the probes.
    pub fn http_client(&self) -> PostgenResult<reqwest::blocking::Client> {
        reqwest::blocking::Client::builder()
            .user_agent(self.user_agent.clone())
            .build()
            .map_err(|e| PostgenError::Http(e.to_string()))
    }

    /// Create a config file with every option commented out.
    pub fn create_default_config(path: &Path) -> PostgenResult<()> {
        let probe = ProbePolicy::default();
        let hosts = probe
            .rate_limited_hosts
            .iter()
            .map(|h| format!("\"{h}\""))
            .collect::<Vec<_>>()
            .join(", ");
        let contents = format!(
            "\
# postgen configuration

# CSV export of the submissions spreadsheet:
# sheet_url = \"{sheet}\"

# Form linked from the top of the post:
# form_url = \"{form}\"

# Where caches and the last rendered post are kept:
# cache_dir = \"{cache}\"

# Submitter profiles are checked at this prefix + username:
# profile_url_base = \"{profile}\"

# User agent sent with the sheet download and every liveness probe:
# user_agent = \"{agent}\"

# [probe]
# max_attempts = {attempts}
# base_delay_ms = {base}
# delay_step_ms = {step}
# rate_limited_hosts = [{hosts}]
",
            sheet = DEFAULT_SHEET_URL,
            form = DEFAULT_FORM_URL,
            cache = DEFAULT_CACHE_DIR,
            profile = DEFAULT_PROFILE_URL_BASE,
            agent = DEFAULT_USER_AGENT,
            attempts = probe.max_attempts,
            base = probe.base_delay_ms,
            step = probe.delay_step_ms,
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                PostgenError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| PostgenError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = PostgenConfig::load_from(&dir.path().join("nope.toml")).unwrap();

        assert_eq!(config.probe.max_attempts, 20);
        assert_eq!(config.profile_url_base, "https://www.reddit.com/user/");
        assert_eq!(config.cache_dir, PathBuf::from("~/.cache/postgen"));
    }

    #[test]
    fn test_default_template_parses_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("postgen/config.toml");

        PostgenConfig::create_default_config(&path).unwrap();
        let config = PostgenConfig::load_from(&path).unwrap();

        assert_eq!(config.sheet_url, DEFAULT_SHEET_URL);
        assert_eq!(config.probe.rate_limited_hosts, vec!["reddit".to_string()]);
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);

        let template = std::fs::read_to_string(&path).unwrap();
        assert!(template.contains("# user_agent = "));
    }

    #[test]
    fn test_file_overrides_nested_probe_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "form_url = \"https://forms.example/x\"\n\
             cache_dir = \"/tmp/postgen-test\"\n\
             [probe]\n\
             max_attempts = 3\n",
        )
        .unwrap();

        let config = PostgenConfig::load_from(&path).unwrap();
        assert_eq!(config.form_url, "https://forms.example/x");
        assert_eq!(config.cache_path(), PathBuf::from("/tmp/postgen-test"));
        assert_eq!(config.probe.max_attempts, 3);
        assert_eq!(config.probe.base_delay_ms, 1000);
    }
}
