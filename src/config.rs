//! User configuration loading from `~/.agora/config.toml`.

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_DIR: &str = ".agora";
const CONFIG_FILE: &str = "config.toml";

const DEFAULT_CONFIG_TOML: &str = r#"# agora configuration
# Content-length limits enforced at the submission boundary.
# post_body_max is the single canonical post length; the store schema is
# sized for 4000.

[limits]
comment_body_max = 1000
post_title_max = 100
post_body_max = 4000
hashtag_max = 30
"#;

/// Application configuration loaded from disk.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub limits: Limits,
}

/// Content-length limits. Depth and page size are product invariants and
/// deliberately not configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub comment_body_max: usize,
    pub post_title_max: usize,
    pub post_body_max: usize,
    pub hashtag_max: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            comment_body_max: 1000,
            post_title_max: 100,
            post_body_max: 4000,
            hashtag_max: 30,
        }
    }
}

/// Returns the config file path and creates default config if missing.
pub fn ensure_config_file() -> Result<PathBuf> {
    let path = config_path()?;
    ensure_default_config(&path)?;
    Ok(path)
}

/// Loads configuration from `~/.agora/config.toml`, creating defaults if missing.
pub fn load_or_create() -> Result<AppConfig> {
    let path = ensure_config_file()?;
    let content = fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;

    parse(&content).with_context(|| format!("invalid configuration in {}", path.display()))
}

fn parse(content: &str) -> Result<AppConfig> {
    let raw: RawConfig = toml::from_str(content).context("failed to parse TOML")?;
    let limits = raw.limits.into_limits()?;
    Ok(AppConfig { limits })
}

fn config_path() -> Result<PathBuf> {
    let home =
        env::var_os("HOME").ok_or_else(|| anyhow!("HOME environment variable is not set"))?;
    Ok(PathBuf::from(home).join(CONFIG_DIR).join(CONFIG_FILE))
}

fn ensure_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }

    let dir = path
        .parent()
        .ok_or_else(|| anyhow!("invalid config path: {}", path.display()))?;
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;
    fs::write(path, DEFAULT_CONFIG_TOML)
        .with_context(|| format!("failed to write default config file {}", path.display()))?;
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawConfig {
    limits: RawLimits,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLimits {
    comment_body_max: Option<usize>,
    post_title_max: Option<usize>,
    post_body_max: Option<usize>,
    hashtag_max: Option<usize>,
}

impl RawLimits {
    fn into_limits(self) -> Result<Limits> {
        let defaults = Limits::default();

        Ok(Limits {
            comment_body_max: positive_or_default(
                self.comment_body_max,
                defaults.comment_body_max,
                "limits.comment_body_max",
            )?,
            post_title_max: positive_or_default(
                self.post_title_max,
                defaults.post_title_max,
                "limits.post_title_max",
            )?,
            post_body_max: positive_or_default(
                self.post_body_max,
                defaults.post_body_max,
                "limits.post_body_max",
            )?,
            hashtag_max: positive_or_default(
                self.hashtag_max,
                defaults.hashtag_max,
                "limits.hashtag_max",
            )?,
        })
    }
}

fn positive_or_default(value: Option<usize>, default: usize, field: &str) -> Result<usize> {
    match value {
        Some(0) => Err(anyhow!("`{field}` must be at least 1")),
        Some(value) => Ok(value),
        None => Ok(default),
    }
}
