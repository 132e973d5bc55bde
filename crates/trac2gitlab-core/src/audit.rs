//! Audit trail of a migration run
//!
//! Append-only; safe to share between writers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use uuid::Uuid;

use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Milestone,
    Issue,
    Note,
    WikiPage,
    Attachment,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Milestone => write!(f, "milestone"),
            EntityKind::Issue => write!(f, "issue"),
            EntityKind::Note => write!(f, "note"),
            EntityKind::WikiPage => write!(f, "wiki page"),
            EntityKind::Attachment => write!(f, "attachment"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Created { target_id: String },
    Skipped { reason: String },
    /// Payload could not be decoded and was replaced by a placeholder
    DecodeFailed { reason: String },
    /// Another attachment of the same page already took this filename
    Collision { filename: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub run_id: Uuid,
    pub at: DateTime<Utc>,
    pub kind: EntityKind,
    pub source_id: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

#[derive(Debug)]
pub struct AuditLog {
    run_id: Uuid,
    entries: Mutex<Vec<AuditEntry>>,
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditLog {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn record(&self, kind: EntityKind, source_id: impl Into<String>, outcome: Outcome) {
        let entry = AuditEntry {
            run_id: self.run_id,
            at: Utc::now(),
            kind,
            source_id: source_id.into(),
            outcome,
        };
        self.lock().push(entry);
    }

    pub fn created(&self, kind: EntityKind, source_id: impl Into<String>, target_id: impl ToString) {
        self.record(
            kind,
            source_id,
            Outcome::Created {
                target_id: target_id.to_string(),
            },
        );
    }

    pub fn skipped(&self, kind: EntityKind, source_id: impl Into<String>, reason: impl ToString) {
        self.record(
            kind,
            source_id,
            Outcome::Skipped {
                reason: reason.to_string(),
            },
        );
    }

    /// Snapshot of every entry so far
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Append all entries to a JSONL file
    pub fn write_jsonl(&self, path: &Path) -> Result<()> {
        let mut out = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        for entry in self.lock().iter() {
            serde_json::to_writer(&mut out, entry)?;
            writeln!(out)?;
        }
        out.flush()?;
        Ok(())
    }

    pub fn summary(&self, cancelled: bool) -> RunSummary {
        let mut summary = RunSummary {
            run_id: self.run_id,
            cancelled,
            ..RunSummary::default()
        };
        for entry in self.lock().iter() {
            match &entry.outcome {
                Outcome::Created { .. } => *summary.created.entry(entry.kind).or_insert(0) += 1,
                Outcome::Skipped { reason } => summary.skipped.push(SkippedEntity {
                    kind: entry.kind,
                    source_id: entry.source_id.clone(),
                    reason: reason.clone(),
                }),
                Outcome::DecodeFailed { .. } => summary.decode_failures += 1,
                Outcome::Collision { filename } => summary.skipped.push(SkippedEntity {
                    kind: entry.kind,
                    source_id: entry.source_id.clone(),
                    reason: format!("filename collision on {}", filename),
                }),
            }
        }
        summary
    }

    // A panic while holding the lock cannot leave a half-written entry, so a
    // poisoned lock is still usable.
    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<AuditEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedEntity {
    pub kind: EntityKind,
    pub source_id: String,
    pub reason: String,
}

/// End-of-run summary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub created: BTreeMap<EntityKind, usize>,
    pub skipped: Vec<SkippedEntity>,
    pub decode_failures: usize,
    pub cancelled: bool,
}

impl RunSummary {
    pub fn created(&self, kind: EntityKind) -> usize {
        self.created.get(&kind).copied().unwrap_or(0)
    }

    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.decode_failures == 0 && !self.cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_summary_counts() {
        let log = AuditLog::new();
        log.created(EntityKind::Milestone, "1.0", 1);
        log.created(EntityKind::Issue, "#1", 1);
        log.created(EntityKind::Issue, "#2", 2);
        log.skipped(EntityKind::Issue, "#3", "missing type");
        log.record(
            EntityKind::Attachment,
            "WikiStart/a.png",
            Outcome::DecodeFailed {
                reason: "bad".into(),
            },
        );

        let summary = log.summary(false);
        assert_eq!(summary.created(EntityKind::Issue), 2);
        assert_eq!(summary.created(EntityKind::Milestone), 1);
        assert_eq!(summary.created(EntityKind::Note), 0);
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].source_id, "#3");
        assert_eq!(summary.decode_failures, 1);
        assert!(!summary.is_clean());
    }

    #[test]
    fn test_concurrent_writers() {
        let log = Arc::new(AuditLog::new());
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let log = Arc::clone(&log);
                std::thread::spawn(move || {
                    for i in 0..25 {
                        log.created(EntityKind::Note, format!("{}-{}", t, i), i);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(log.len(), 100);
    }

    #[test]
    fn test_write_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        let log = AuditLog::new();
        log.created(EntityKind::Issue, "#1", 5);
        log.skipped(EntityKind::WikiPage, "Broken", "rejected");
        log.write_jsonl(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let rows: Vec<serde_json::Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["outcome"], "created");
        assert_eq!(rows[0]["target_id"], "5");
        assert_eq!(rows[1]["kind"], "wiki_page");
        assert_eq!(rows[1]["run_id"], log.run_id().to_string());
    }
}
