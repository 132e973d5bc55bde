//! Reference resolution
//!
//! Turns source usernames and milestone titles into target ids and binds
//! every record to the run's project.

use std::collections::HashMap;

use crate::mapper::{IssueDraft, NoteDraft};
use crate::sink::Sink;
use crate::target::{TargetIssue, TargetNote};
use crate::usermap::UserMap;
use crate::{Error, Result};

pub struct Resolver {
    usermap: UserMap,
    project_id: u64,
    /// target username -> id
    identities: HashMap<String, u64>,
    fallback_id: Option<u64>,
    /// milestone title -> id, filled as milestones are migrated
    milestones: HashMap<String, u64>,
}

impl Resolver {
    pub fn new(usermap: UserMap, project_id: u64) -> Self {
        Self {
            usermap,
            project_id,
            identities: HashMap::new(),
            fallback_id: None,
            milestones: HashMap::new(),
        }
    }

    pub fn project_id(&self) -> u64 {
        self.project_id
    }

    pub fn usermap(&self) -> &UserMap {
        &self.usermap
    }

    /// Identity of the fallback user. Failing here is fatal for the run.
    pub fn fallback(&mut self, sink: &dyn Sink) -> Result<u64> {
        if let Some(id) = self.fallback_id {
            return Ok(id);
        }
        let fallback = self.usermap.fallback().to_string();
        let id = sink
            .find_user(&fallback)?
            .ok_or(Error::ReferenceResolution(fallback))?;
        self.fallback_id = Some(id);
        Ok(id)
    }

    /// Target identity for a source username
    ///
    /// Unmapped users, and mapped users missing from the target, resolve to
    /// the fallback identity.
    pub fn user(&mut self, sink: &dyn Sink, source: &str) -> Result<u64> {
        let source = source.trim();
        if source.is_empty() {
            return self.fallback(sink);
        }

        let Some(target) = self.usermap.get(source).map(str::to_string) else {
            tracing::debug!("no mapping for '{}', using fallback identity", source);
            return self.fallback(sink);
        };

        if let Some(id) = self.identities.get(&target) {
            return Ok(*id);
        }

        match sink.find_user(&target)? {
            Some(id) => {
                self.identities.insert(target, id);
                Ok(id)
            }
            None => {
                tracing::warn!(
                    "'{}' maps to unknown target user '{}', using fallback identity",
                    source,
                    target
                );
                self.fallback(sink)
            }
        }
    }

    pub fn record_milestone(&mut self, title: &str, id: u64) {
        self.milestones.insert(title.to_string(), id);
    }

    /// Id of a migrated milestone. Empty and unknown titles give None.
    pub fn milestone(&self, title: &str) -> Option<u64> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }
        let id = self.milestones.get(title).copied();
        if id.is_none() {
            tracing::warn!("milestone '{}' was not migrated, leaving issue unscheduled", title);
        }
        id
    }

    pub fn issue(&mut self, sink: &dyn Sink, draft: IssueDraft) -> Result<TargetIssue> {
        let author_id = self.user(sink, &draft.author)?;
        let assignee_id = self.user(sink, &draft.assignee)?;
        let milestone_id = self.milestone(&draft.milestone);

        Ok(TargetIssue {
            title: draft.title,
            description: draft.description,
            state: draft.state,
            labels: draft.labels,
            author_id,
            assignee_id,
            milestone_id,
            project_id: self.project_id,
            created_at: draft.created_at,
            updated_at: draft.updated_at,
        })
    }

    pub fn note(&mut self, sink: &dyn Sink, draft: NoteDraft) -> Result<TargetNote> {
        let author_id = self.user(sink, &draft.author)?;
        Ok(TargetNote {
            body: draft.body,
            author_id,
            updated_by_id: author_id,
            created_at: draft.time,
            updated_at: draft.time,
        })
    }
}
