use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::bugs::{BugId, BugInfo, BugStatus, StaticBugRegistry};
use crate::version::PulpVersion;

/// Connection details for the service under test.
#[derive(Clone, Serialize, Deserialize)]
pub struct PulpSection {
    /// Scheme, host and port of the API (e.g. `http://localhost:8000`).
    pub base_url: String,
    pub username: String,
    pub password: String,
    /// Service version, used by the bug gate (e.g. "3.0").
    pub version: String,
    /// Verify TLS certificates on HTTPS requests.
    #[serde(default = "default_true")]
    pub verify_tls: bool,
}

// Keeps the password out of debug logs.
impl fmt::Debug for PulpSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PulpSection")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("version", &self.version)
            .field("verify_tls", &self.verify_tls)
            .finish()
    }
}

fn default_true() -> bool {
    true
}

/// Where reference content is fetched from, bypassing the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixturesSection {
    /// Feed directory containing `PULP_MANIFEST` and the files it lists.
    pub file_feed_url: String,
    /// A file inside the feed; unit names are resolved relative to it.
    pub file_url: String,
}

/// Task polling parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskPollConfig {
    /// Delay between two polls of the same task, in seconds.
    pub poll_interval_secs: f64,
    /// Polls before a task is considered stuck.
    pub max_polls: u32,
}

impl Default for TaskPollConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 0.3,
            max_polls: 600,
        }
    }
}

impl TaskPollConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs_f64(self.poll_interval_secs.max(0.0))
    }
}

/// Entry overriding or extending the built-in bug table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BugOverride {
    pub id: BugId,
    pub status: BugStatus,
    #[serde(default)]
    pub fixed_in: Option<String>,
}

/// Configuration loaded from `~/.config/pdv/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdvConfig {
    pub pulp: PulpSection,
    pub fixtures: FixturesSection,
    /// Optional task polling policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub tasks: Option<TaskPollConfig>,
    /// Optional bug table entries applied on top of the built-in registry.
    #[serde(default)]
    pub bugs: Vec<BugOverride>,
}

const PULP_FIXTURES_BASE_URL: &str = "https://repos.fedorapeople.org/pulp/pulp/fixtures/";

impl Default for PdvConfig {
    fn default() -> Self {
        let file_feed_url = format!("{}file/", PULP_FIXTURES_BASE_URL);
        Self {
            pulp: PulpSection {
                base_url: "http://localhost:8000".to_string(),
                username: "admin".to_string(),
                password: "admin".to_string(),
                version: "3".to_string(),
                verify_tls: true,
            },
            fixtures: FixturesSection {
                file_url: format!("{}1.iso", file_feed_url),
                file_feed_url,
            },
            tasks: None,
            bugs: Vec::new(),
        }
    }
}

impl PdvConfig {
    /// Parsed service version.
    pub fn pulp_version(&self) -> Result<PulpVersion> {
        self.pulp
            .version
            .parse()
            .with_context(|| format!("invalid pulp.version {:?}", self.pulp.version))
    }

    pub fn task_poll(&self) -> TaskPollConfig {
        self.tasks.clone().unwrap_or_default()
    }

    /// Built-in bug registry with the `[[bugs]]` entries applied.
    pub fn bug_registry(&self) -> Result<StaticBugRegistry> {
        let mut registry = StaticBugRegistry::builtin();
        for entry in &self.bugs {
            let fixed_in = entry
                .fixed_in
                .as_deref()
                .map(str::parse::<PulpVersion>)
                .transpose()
                .with_context(|| format!("invalid fixed_in for bug {}", entry.id))?;
            registry.insert(
                entry.id,
                BugInfo {
                    status: entry.status,
                    fixed_in,
                },
            );
        }
        Ok(registry)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("pdv")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from an explicit file.
pub fn load_from_path(path: &Path) -> Result<PdvConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: PdvConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<PdvConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = PdvConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    load_from_path(&path)
}
