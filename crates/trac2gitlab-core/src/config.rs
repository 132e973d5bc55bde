//! Configuration for trac2gitlab
//!
//! Stored as TOML, by default in `<config dir>/trac2gitlab/config.toml`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::target::IssueState;
use crate::{Error, Result};

const CONFIG_DIR: &str = "trac2gitlab";
const CONFIG_FILE: &str = "config.toml";

/// trac2gitlab configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Target project every migrated record is attached to
    pub project_id: u64,

    /// Target schema version, selects the sink
    pub gitlab_version: String,

    /// Target username used for any unmapped source user
    pub fallback_user: String,

    /// Additional user mapping files, applied after the inline pairs
    pub usermap_files: Vec<PathBuf>,

    /// Inline source -> target username pairs
    pub usermap: BTreeMap<String, String>,

    #[serde(default)]
    pub labels: LabelTables,

    #[serde(default)]
    pub wiki: WikiConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_id: 1,
            gitlab_version: "9.0.0".to_string(),
            fallback_user: "root".to_string(),
            usermap_files: Vec::new(),
            usermap: BTreeMap::new(),
            labels: LabelTables::default(),
            wiki: WikiConfig::default(),
        }
    }
}

/// Attribute lookup tables
///
/// An entry mapped to the empty string produces no label.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelTables {
    /// Ticket priority -> label
    pub priority: BTreeMap<String, String>,

    /// Ticket resolution -> label
    pub resolution: BTreeMap<String, String>,

    /// Ticket state -> issue state
    pub state: BTreeMap<String, IssueState>,
}

impl Default for LabelTables {
    fn default() -> Self {
        let priority = [("high", "prio:high"), ("medium", ""), ("low", "prio:low")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let state = [
            ("new", IssueState::Opened),
            ("assigned", IssueState::Opened),
            ("reopened", IssueState::Reopened),
            ("closed", IssueState::Closed),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        Self {
            priority,
            resolution: BTreeMap::new(),
            state,
        }
    }
}

/// Wiki settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WikiConfig {
    /// Canonical start page of the source wiki
    pub start_page: String,

    /// Name the start page is migrated under
    pub root_page: String,

    /// Heading of the generated section listing orphaned attachments
    pub attachments_heading: String,
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self {
            start_page: "WikiStart".to_string(),
            root_page: "home".to_string(),
            attachments_heading: "Attached files".to_string(),
        }
    }
}

impl Config {
    /// Default config path under the user's config directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.fallback_user.trim().is_empty() {
            return Err(Error::Config("fallback_user must not be empty".into()));
        }
        if self.wiki.root_page.trim().is_empty() {
            return Err(Error::Config("wiki.root_page must not be empty".into()));
        }
        Ok(())
    }

    /// Generate a default config file with comments
    pub fn default_with_comments() -> String {
        r#"# trac2gitlab configuration

# Target project receiving issues, milestones and wiki pages
project_id = 1

# Target schema version (see `trac2gitlab versions`)
gitlab_version = "9.0.0"

# Target user for any source user missing from the user map
fallback_user = "root"

# Extra user mapping files (TOML, `source = "target"` per line).
# Applied in order after [usermap]; later entries win.
usermap_files = []

[usermap]
# alice = "alice.g"

[labels.priority]
# Empty string means "no label"
high = "prio:high"
medium = ""
low = "prio:low"

[labels.resolution]
# wontfix = "res:wontfix"

[labels.state]
# Unlisted states leave the issue state unset and become a state:<value> label
new = "opened"
assigned = "opened"
reopened = "reopened"
closed = "closed"

[wiki]
start_page = "WikiStart"
root_page = "home"
attachments_heading = "Attached files"
"#
        .to_string()
    }
}
