//! Source tracker data model
//!
//! Mirrors what the Trac RPC interface hands out for tickets, milestones
//! and wiki pages. The transport itself lives behind the [`Source`] trait.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::Result;

/// Changelog field name under which Trac records comments
pub const COMMENT_FIELD: &str = "comment";

/// Raw ticket attributes as reported by the source tracker
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TicketAttributes {
    /// Ticket type (defect, enhancement, task, ...). Mandatory.
    #[serde(rename = "type")]
    pub ticket_type: Option<String>,
    pub priority: String,
    pub resolution: String,
    /// One-line summary. Mandatory.
    pub summary: Option<String>,
    pub description: String,
    pub owner: String,
    pub reporter: String,
    /// Creation time
    pub time: Option<DateTime<Utc>>,
    /// Last change time
    pub changetime: Option<DateTime<Utc>>,
    /// Milestone title, empty when unscheduled
    pub milestone: String,
    pub version: String,
    /// Comma separated component list
    pub component: String,
    /// Lifecycle state (new, assigned, reopened, closed, or a custom one)
    pub status: String,
    /// Custom fields we carry but never interpret
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// One changelog row: (time, author, field, old, new, permanent)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangelogEntry {
    pub time: DateTime<Utc>,
    pub author: String,
    pub field: String,
    #[serde(default)]
    pub old: String,
    #[serde(default)]
    pub new: String,
    #[serde(default)]
    pub permanent: bool,
}

impl ChangelogEntry {
    pub fn is_comment(&self) -> bool {
        self.field == COMMENT_FIELD
    }
}

/// Attachment payload plus metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Attachment {
    /// Base64 encoded bytes
    pub content: String,
    pub size: Option<u64>,
    pub description: String,
    pub author: String,
    pub time: Option<DateTime<Utc>>,
}

impl Attachment {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            content: STANDARD.encode(bytes),
            size: Some(bytes.len() as u64),
            ..Self::default()
        }
    }

    /// Decode the payload
    pub fn decode(&self) -> std::result::Result<Vec<u8>, base64::DecodeError> {
        let compact: String = self
            .content
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        STANDARD.decode(compact)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceTicket {
    pub id: u64,
    pub attributes: TicketAttributes,
    /// Changelog in chronological order
    #[serde(default)]
    pub changelog: Vec<ChangelogEntry>,
    #[serde(default)]
    pub attachments: BTreeMap<String, Attachment>,
}

impl SourceTicket {
    pub fn new(id: u64, attributes: TicketAttributes) -> Self {
        Self {
            id,
            attributes,
            changelog: Vec::new(),
            attachments: BTreeMap::new(),
        }
    }

    /// Comment entries, in changelog order
    pub fn comments(&self) -> impl Iterator<Item = &ChangelogEntry> {
        self.changelog.iter().filter(|entry| entry.is_comment())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceMilestone {
    pub name: String,
    pub description: String,
    pub completed: bool,
    pub due: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceWikiPage {
    /// Page name, `/` separated for nested pages
    pub name: String,
    pub text: String,
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub attachments: BTreeMap<String, Attachment>,
}

fn default_version() -> u32 {
    1
}

/// Read-only access to the source tracker
///
/// Implementations own the transport (RPC, dump files, ...). Every method is
/// blocking.
pub trait Source {
    /// All tickets with their full attribute map
    fn tickets(&self) -> Result<Vec<SourceTicket>>;

    /// Ordered changelog of one ticket
    fn changelog(&self, ticket_id: u64) -> Result<Vec<ChangelogEntry>>;

    fn ticket_attachments(&self, ticket_id: u64) -> Result<BTreeMap<String, Attachment>>;

    fn milestone_names(&self) -> Result<Vec<String>>;

    fn milestone(&self, name: &str) -> Result<SourceMilestone>;

    fn wiki_page_names(&self) -> Result<Vec<String>>;

    /// Page info, body and attachments of one wiki page
    fn wiki_page(&self, name: &str) -> Result<SourceWikiPage>;
}
