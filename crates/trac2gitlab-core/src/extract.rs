//! In-memory project extract
//!
//! Everything the migration needs from the source tracker, pulled up front
//! so that no write happens before extraction has fully succeeded.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::source::{Attachment, ChangelogEntry, Source, SourceMilestone, SourceTicket, SourceWikiPage};
use crate::{Error, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectExtract {
    pub tickets: Vec<SourceTicket>,
    pub milestones: Vec<SourceMilestone>,
    pub wiki: Vec<SourceWikiPage>,
}

impl ProjectExtract {
    /// Drain a source into memory
    ///
    /// Any failure is reported as an extraction error, before anything has
    /// been written to the target.
    pub fn collect(source: &dyn Source) -> Result<Self> {
        let mut tickets = source.tickets().map_err(as_extraction)?;
        for ticket in &mut tickets {
            ticket.changelog = source.changelog(ticket.id).map_err(as_extraction)?;
            ticket.attachments = source.ticket_attachments(ticket.id).map_err(as_extraction)?;
        }

        let milestones = source
            .milestone_names()
            .map_err(as_extraction)?
            .iter()
            .map(|name| source.milestone(name))
            .collect::<Result<Vec<_>>>()
            .map_err(as_extraction)?;

        let wiki = source
            .wiki_page_names()
            .map_err(as_extraction)?
            .iter()
            .map(|name| source.wiki_page(name))
            .collect::<Result<Vec<_>>>()
            .map_err(as_extraction)?;

        Ok(Self {
            tickets,
            milestones,
            wiki,
        })
    }

    /// Load a JSON project dump
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Extraction(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Extraction(format!("{}: {}", path.display(), e)))
    }

    /// Every source username referenced by the selected entities
    pub fn authors(&self, from_wiki: bool, from_tickets: bool) -> BTreeSet<String> {
        let mut authors = BTreeSet::new();

        if from_tickets {
            for ticket in &self.tickets {
                authors.insert(ticket.attributes.reporter.clone());
                authors.insert(ticket.attributes.owner.clone());
                authors.extend(ticket.changelog.iter().map(|c| c.author.clone()));
                authors.extend(ticket.attachments.values().map(|a| a.author.clone()));
            }
        }

        if from_wiki {
            for page in &self.wiki {
                authors.insert(page.author.clone());
                authors.extend(page.attachments.values().map(|a| a.author.clone()));
            }
        }

        authors.retain(|name| !name.trim().is_empty());
        authors
    }

    /// Tickets in stable id order
    pub fn tickets_by_id(&self) -> Vec<&SourceTicket> {
        let mut tickets: Vec<_> = self.tickets.iter().collect();
        tickets.sort_by_key(|t| t.id);
        tickets
    }

    fn ticket(&self, id: u64) -> Result<&SourceTicket> {
        self.tickets
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| Error::Extraction(format!("ticket #{} not in extract", id)))
    }
}

fn as_extraction(err: Error) -> Error {
    match err {
        Error::Extraction(_) => err,
        other => Error::Extraction(other.to_string()),
    }
}

impl Source for ProjectExtract {
    fn tickets(&self) -> Result<Vec<SourceTicket>> {
        Ok(self.tickets.clone())
    }

    fn changelog(&self, ticket_id: u64) -> Result<Vec<ChangelogEntry>> {
        Ok(self.ticket(ticket_id)?.changelog.clone())
    }

    fn ticket_attachments(&self, ticket_id: u64) -> Result<BTreeMap<String, Attachment>> {
        Ok(self.ticket(ticket_id)?.attachments.clone())
    }

    fn milestone_names(&self) -> Result<Vec<String>> {
        Ok(self.milestones.iter().map(|m| m.name.clone()).collect())
    }

    fn milestone(&self, name: &str) -> Result<SourceMilestone> {
        self.milestones
            .iter()
            .find(|m| m.name == name)
            .cloned()
            .ok_or_else(|| Error::Extraction(format!("milestone '{}' not in extract", name)))
    }

    fn wiki_page_names(&self) -> Result<Vec<String>> {
        Ok(self.wiki.iter().map(|p| p.name.clone()).collect())
    }

    fn wiki_page(&self, name: &str) -> Result<SourceWikiPage> {
        self.wiki
            .iter()
            .find(|p| p.name == name)
            .cloned()
            .ok_or_else(|| Error::Extraction(format!("wiki page '{}' not in extract", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::TicketAttributes;

    fn sample() -> ProjectExtract {
        let mut ticket = SourceTicket::new(
            2,
            TicketAttributes {
                reporter: "alice".into(),
                owner: "bob".into(),
                ..TicketAttributes::default()
            },
        );
        ticket.changelog.push(ChangelogEntry {
            time: "2016-03-01T10:00:00Z".parse().unwrap(),
            author: "carol".into(),
            field: "comment".into(),
            old: "1".into(),
            new: "Looks good".into(),
            permanent: true,
        });
        let other = SourceTicket::new(1, TicketAttributes::default());

        ProjectExtract {
            tickets: vec![ticket, other],
            milestones: vec![SourceMilestone {
                name: "1.0".into(),
                ..SourceMilestone::default()
            }],
            wiki: vec![SourceWikiPage {
                name: "WikiStart".into(),
                text: "Welcome".into(),
                version: 3,
                last_modified: None,
                author: "dave".into(),
                attachments: BTreeMap::new(),
            }],
        }
    }

    #[test]
    fn test_authors_by_origin() {
        let extract = sample();

        let all = extract.authors(true, true);
        assert_eq!(
            all.into_iter().collect::<Vec<_>>(),
            vec!["alice", "bob", "carol", "dave"]
        );

        let wiki_only = extract.authors(true, false);
        assert_eq!(wiki_only.into_iter().collect::<Vec<_>>(), vec!["dave"]);
    }

    #[test]
    fn test_tickets_by_id_is_sorted() {
        let extract = sample();
        let ids: Vec<_> = extract.tickets_by_id().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_collect_round_trips_through_source() {
        let extract = sample();
        let collected = ProjectExtract::collect(&extract).unwrap();
        assert_eq!(collected.tickets.len(), 2);
        assert_eq!(collected.tickets[0].changelog.len(), 1);
        assert_eq!(collected.milestones[0].name, "1.0");
        assert_eq!(collected.wiki[0].version, 3);
    }

    /// Source whose changelog call fails after tickets were listed
    struct BrokenChangelog(ProjectExtract);

    impl Source for BrokenChangelog {
        fn tickets(&self) -> Result<Vec<SourceTicket>> {
            self.0.tickets()
        }

        fn changelog(&self, ticket_id: u64) -> Result<Vec<ChangelogEntry>> {
            Err(Error::Other(format!("connection reset reading ticket {}", ticket_id)))
        }

        fn ticket_attachments(&self, ticket_id: u64) -> Result<BTreeMap<String, Attachment>> {
            self.0.ticket_attachments(ticket_id)
        }

        fn milestone_names(&self) -> Result<Vec<String>> {
            self.0.milestone_names()
        }

        fn milestone(&self, name: &str) -> Result<SourceMilestone> {
            self.0.milestone(name)
        }

        fn wiki_page_names(&self) -> Result<Vec<String>> {
            self.0.wiki_page_names()
        }

        fn wiki_page(&self, name: &str) -> Result<SourceWikiPage> {
            self.0.wiki_page(name)
        }
    }

    #[test]
    fn test_source_failure_is_extraction_error() {
        let err = ProjectExtract::collect(&BrokenChangelog(sample())).unwrap_err();
        match &err {
            Error::Extraction(reason) => assert!(reason.contains("connection reset")),
            other => panic!("expected extraction error, got {:?}", other),
        }
        assert!(err.is_fatal());
    }

    #[test]
    fn test_load_failure_is_extraction_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = ProjectExtract::load(&path).unwrap_err();
        assert!(matches!(err, Error::Extraction(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_load_dump() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.json");
        std::fs::write(&path, serde_json::to_string_pretty(&sample()).unwrap()).unwrap();

        let loaded = ProjectExtract::load(&path).unwrap();
        assert_eq!(loaded.tickets.len(), 2);
        assert_eq!(loaded.wiki[0].author, "dave");
    }
}
