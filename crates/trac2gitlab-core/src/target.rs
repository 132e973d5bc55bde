//! Target tracker records
//!
//! GitLab-shaped records ready to be handed to a [`crate::Sink`]. Numeric
//! ids are the target's own identities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Issue lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "snake_case")]
pub enum IssueState {
    Opened,
    Reopened,
    Closed,
}

impl std::str::FromStr for IssueState {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "opened" => Ok(IssueState::Opened),
            "reopened" => Ok(IssueState::Reopened),
            "closed" => Ok(IssueState::Closed),
            _ => Err(crate::Error::Config(format!("invalid issue state: {}", s))),
        }
    }
}

impl std::fmt::Display for IssueState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssueState::Opened => write!(f, "opened"),
            IssueState::Reopened => write!(f, "reopened"),
            IssueState::Closed => write!(f, "closed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneState {
    #[default]
    Active,
    Closed,
}

impl std::fmt::Display for MilestoneState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MilestoneState::Active => write!(f, "active"),
            MilestoneState::Closed => write!(f, "closed"),
        }
    }
}

/// Unordered set of `prefix:value` labels
///
/// Blank labels are dropped on insert, so the set never holds an empty entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelSet(BTreeSet<String>);

impl LabelSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a label. Returns false for blank or duplicate labels.
    pub fn insert(&mut self, label: impl Into<String>) -> bool {
        let label = label.into();
        let label = label.trim();
        if label.is_empty() {
            return false;
        }
        self.0.insert(label.to_string())
    }

    pub fn union(&mut self, other: LabelSet) {
        self.0.extend(other.0);
    }

    pub fn contains(&self, label: &str) -> bool {
        self.0.contains(label)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Labels carrying the given prefix
    pub fn with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> {
        self.iter()
            .filter(move |label| label.split_once(':').is_some_and(|(p, _)| p == prefix))
    }

    /// Comma joined encoding used by the target schema
    pub fn encode(&self) -> String {
        self.iter().collect::<Vec<_>>().join(",")
    }
}

impl<S: Into<String>> FromIterator<S> for LabelSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = LabelSet::new();
        for label in iter {
            set.insert(label);
        }
        set
    }
}

/// Issue record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetIssue {
    pub title: String,
    pub description: String,
    /// None when the source state had no mapping
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<IssueState>,
    pub labels: LabelSet,
    pub author_id: u64,
    pub assignee_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone_id: Option<u64>,
    pub project_id: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Issue as persisted by the sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedIssue {
    pub id: u64,
    /// Per-project sequence number
    pub iid: u64,
}

/// Comment on an issue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetNote {
    pub body: String,
    pub author_id: u64,
    pub updated_by_id: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetMilestone {
    pub title: String,
    pub description: String,
    pub state: MilestoneState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    pub project_id: u64,
}

/// One wiki page revision
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetWikiPage {
    pub title: String,
    pub body: String,
    /// Flattened attachment filenames
    #[serde(default)]
    pub attachments: Vec<String>,
    pub version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
    pub author_id: u64,
}
