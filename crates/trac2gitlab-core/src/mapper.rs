//! Ticket and milestone attribute mapping
//!
//! Pure functions over explicit lookup tables. Nothing here touches the
//! target; user and milestone references are left as source names in the
//! drafts and filled in by the [`crate::Resolver`].

use chrono::{DateTime, Utc};

use crate::config::LabelTables;
use crate::source::{ChangelogEntry, SourceMilestone, SourceTicket, TicketAttributes};
use crate::target::{IssueState, LabelSet, MilestoneState, TargetMilestone};
use crate::wiki::{self, BasePath, MarkupConverter};
use crate::{Error, Result};

/// Issue with unresolved source references
#[derive(Debug, Clone)]
pub struct IssueDraft {
    pub source_id: u64,
    pub title: String,
    pub description: String,
    pub state: Option<IssueState>,
    pub labels: LabelSet,
    /// Source username of the reporter
    pub author: String,
    /// Source username of the owner, possibly empty
    pub assignee: String,
    /// Source milestone title, possibly empty
    pub milestone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Note with an unresolved author
#[derive(Debug, Clone)]
pub struct NoteDraft {
    pub body: String,
    pub author: String,
    pub time: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct AttributeMapper {
    tables: LabelTables,
}

impl AttributeMapper {
    pub fn new(tables: LabelTables) -> Self {
        Self { tables }
    }

    pub fn priority_labels(&self, attributes: &TicketAttributes) -> LabelSet {
        lookup_label(&self.tables.priority, &attributes.priority)
    }

    pub fn resolution_labels(&self, attributes: &TicketAttributes) -> LabelSet {
        lookup_label(&self.tables.resolution, &attributes.resolution)
    }

    pub fn version_labels(&self, attributes: &TicketAttributes) -> LabelSet {
        let version = attributes.version.trim();
        let mut labels = LabelSet::new();
        if !version.is_empty() {
            labels.insert(format!("ver:{}", version));
        }
        labels
    }

    /// One `comp:` label per comma separated component
    pub fn component_labels(&self, attributes: &TicketAttributes) -> LabelSet {
        attributes
            .component
            .split(',')
            .map(str::trim)
            .filter(|comp| !comp.is_empty())
            .map(|comp| format!("comp:{}", comp))
            .collect()
    }

    pub fn type_labels(&self, attributes: &TicketAttributes) -> Result<LabelSet> {
        let ticket_type = attributes
            .ticket_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::mapping("ticket", "missing type"))?;

        let mut labels = LabelSet::new();
        labels.insert(format!("type:{}", ticket_type));
        Ok(labels)
    }

    /// Target state, or a `state:` label when the source state is unknown
    pub fn state(&self, attributes: &TicketAttributes) -> (Option<IssueState>, LabelSet) {
        let status = attributes.status.trim();
        let mut labels = LabelSet::new();

        if let Some(state) = self.tables.state.get(status) {
            return (Some(*state), labels);
        }

        if !status.is_empty() {
            tracing::debug!("unmapped ticket state '{}', keeping it as a label", status);
            labels.insert(format!("state:{}", status));
        }
        (None, labels)
    }

    /// Target state and the union of every label subset
    pub fn labels(&self, attributes: &TicketAttributes) -> Result<(Option<IssueState>, LabelSet)> {
        let (state, state_labels) = self.state(attributes);

        let mut labels = self.type_labels(attributes)?;
        labels.union(self.priority_labels(attributes));
        labels.union(self.resolution_labels(attributes));
        labels.union(self.version_labels(attributes));
        labels.union(self.component_labels(attributes));
        labels.union(state_labels);

        Ok((state, labels))
    }

    pub fn issue(&self, ticket: &SourceTicket, converter: &dyn MarkupConverter) -> Result<IssueDraft> {
        let entity = format!("ticket #{}", ticket.id);
        let attributes = &ticket.attributes;

        let (state, labels) = self.labels(attributes).map_err(|e| match e {
            Error::Mapping { reason, .. } => Error::mapping(&entity, reason),
            other => other,
        })?;

        let title = attributes
            .summary
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::mapping(&entity, "missing summary"))?;
        let created_at = attributes
            .time
            .ok_or_else(|| Error::mapping(&entity, "missing creation time"))?;
        let updated_at = attributes.changetime.unwrap_or(created_at);

        Ok(IssueDraft {
            source_id: ticket.id,
            title: title.to_string(),
            description: wiki::convert(converter, &attributes.description, &BasePath::Issues),
            state,
            labels,
            author: attributes.reporter.trim().to_string(),
            assignee: attributes.owner.trim().to_string(),
            milestone: attributes.milestone.trim().to_string(),
            created_at,
            updated_at,
        })
    }

    /// Note for a comment entry. Blank comments yield None.
    pub fn note(&self, entry: &ChangelogEntry, converter: &dyn MarkupConverter) -> Option<NoteDraft> {
        if !entry.is_comment() || entry.new.trim().is_empty() {
            return None;
        }
        Some(NoteDraft {
            body: wiki::convert(converter, &entry.new, &BasePath::Issues),
            author: entry.author.trim().to_string(),
            time: entry.time,
        })
    }

    pub fn milestone(
        &self,
        milestone: &SourceMilestone,
        converter: &dyn MarkupConverter,
        project_id: u64,
    ) -> Result<TargetMilestone> {
        let title = milestone.name.trim();
        if title.is_empty() {
            return Err(Error::mapping("milestone", "missing name"));
        }

        Ok(TargetMilestone {
            title: title.to_string(),
            description: wiki::convert(converter, &milestone.description, &BasePath::Milestones),
            state: if milestone.completed {
                MilestoneState::Closed
            } else {
                MilestoneState::Active
            },
            due_date: milestone.due,
            project_id,
        })
    }
}

fn lookup_label(table: &std::collections::BTreeMap<String, String>, key: &str) -> LabelSet {
    let mut labels = LabelSet::new();
    if let Some(label) = table.get(key.trim()) {
        labels.insert(label.clone());
    }
    labels
}
