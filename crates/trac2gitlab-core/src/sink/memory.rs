//! In-memory sink, for dry runs and tests

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::{Sink, UploadLayout};
use crate::target::{PersistedIssue, TargetIssue, TargetMilestone, TargetNote, TargetWikiPage};
use crate::{Error, Result};

#[derive(Debug)]
pub struct MemorySink {
    layout: UploadLayout,
    users: HashMap<String, u64>,
    next_id: u64,
    iids: HashMap<u64, u64>,

    pub milestones: Vec<(u64, TargetMilestone)>,
    pub issues: Vec<(PersistedIssue, TargetIssue)>,
    /// (note id, issue id, note)
    pub notes: Vec<(u64, u64, TargetNote)>,
    /// storage path -> bytes
    pub attachments: BTreeMap<String, Vec<u8>>,
    pub wiki: Vec<TargetWikiPage>,

    /// Titles this sink refuses to persist
    pub reject_titles: BTreeSet<String>,
}

impl MemorySink {
    pub fn new(layout: UploadLayout) -> Self {
        Self {
            layout,
            users: HashMap::new(),
            next_id: 1,
            iids: HashMap::new(),
            milestones: Vec::new(),
            issues: Vec::new(),
            notes: Vec::new(),
            attachments: BTreeMap::new(),
            wiki: Vec::new(),
            reject_titles: BTreeSet::new(),
        }
    }

    pub fn add_user(&mut self, username: &str, id: u64) {
        self.users.insert(username.to_string(), id);
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn check(&self, kind: &str, title: &str) -> Result<()> {
        if self.reject_titles.contains(title) {
            return Err(Error::persist(
                format!("{} '{}'", kind, title),
                "rejected by sink",
            ));
        }
        Ok(())
    }

    pub fn issue_by_title(&self, title: &str) -> Option<&(PersistedIssue, TargetIssue)> {
        self.issues.iter().find(|(_, issue)| issue.title == title)
    }

    pub fn notes_for(&self, issue_id: u64) -> Vec<&TargetNote> {
        self.notes
            .iter()
            .filter(|(_, id, _)| *id == issue_id)
            .map(|(_, _, note)| note)
            .collect()
    }

    pub fn wiki_page(&self, title: &str) -> Option<&TargetWikiPage> {
        self.wiki.iter().find(|page| page.title == title)
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new(UploadLayout::Legacy)
    }
}

impl Sink for MemorySink {
    fn create_milestone(&mut self, milestone: &TargetMilestone) -> Result<u64> {
        self.check("milestone", &milestone.title)?;
        let id = self.next_id();
        self.milestones.push((id, milestone.clone()));
        Ok(id)
    }

    fn create_issue(&mut self, issue: &TargetIssue) -> Result<PersistedIssue> {
        self.check("issue", &issue.title)?;
        let counter = self.iids.entry(issue.project_id).or_insert(0);
        *counter += 1;
        let iid = *counter;
        let persisted = PersistedIssue {
            id: self.next_id(),
            iid,
        };
        self.issues.push((persisted.clone(), issue.clone()));
        Ok(persisted)
    }

    fn create_note(
        &mut self,
        _project_id: u64,
        issue: &PersistedIssue,
        note: &TargetNote,
    ) -> Result<u64> {
        let id = self.next_id();
        self.notes.push((id, issue.id, note.clone()));
        Ok(id)
    }

    fn find_user(&self, username: &str) -> Result<Option<u64>> {
        Ok(self.users.get(username).copied())
    }

    fn store_wiki_attachment(
        &mut self,
        _project_id: u64,
        filename: &str,
        data: &[u8],
    ) -> Result<String> {
        let path = self.layout.path(data, filename);
        self.attachments.insert(path.clone(), data.to_vec());
        Ok(path)
    }

    fn save_wiki_page(&mut self, _project_id: u64, page: &TargetWikiPage) -> Result<()> {
        self.check("wiki page", &page.title)?;
        self.wiki.push(page.clone());
        Ok(())
    }
}
