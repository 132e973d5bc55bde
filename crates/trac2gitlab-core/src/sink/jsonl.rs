//! JSONL sink
//!
//! Writes one JSONL file per record kind plus attachment blobs, ready to be
//! bulk-loaded into the target database. Reruns append.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use super::{Sink, UploadLayout};
use crate::target::{PersistedIssue, TargetIssue, TargetMilestone, TargetNote, TargetWikiPage};
use crate::{Error, Result};

const USERS_FILE: &str = "users.json";
const MILESTONES_FILE: &str = "milestones.jsonl";
const ISSUES_FILE: &str = "issues.jsonl";
const NOTES_FILE: &str = "notes.jsonl";
const WIKI_FILE: &str = "wiki.jsonl";

/// Entry of `users.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: u64,
    pub username: String,
}

#[derive(Serialize)]
struct Row<'a, T> {
    id: u64,
    #[serde(flatten)]
    record: &'a T,
}

#[derive(Serialize)]
struct IssueRow<'a> {
    id: u64,
    iid: u64,
    #[serde(flatten)]
    issue: &'a TargetIssue,
}

#[derive(Serialize)]
struct NoteRow<'a> {
    id: u64,
    project_id: u64,
    issue_id: u64,
    #[serde(flatten)]
    note: &'a TargetNote,
}

#[derive(Serialize)]
struct WikiRow<'a> {
    project_id: u64,
    #[serde(flatten)]
    page: &'a TargetWikiPage,
}

/// Issue fields needed to continue iid numbering across runs
#[derive(Deserialize)]
struct IssueKey {
    iid: u64,
    project_id: u64,
}

pub struct JsonlSink {
    root: PathBuf,
    layout: UploadLayout,
    users: HashMap<String, u64>,
    next_milestone: u64,
    next_issue: u64,
    next_note: u64,
    iids: HashMap<u64, u64>,
}

impl JsonlSink {
    /// Open (or create) a sink rooted at `root`
    pub fn open(root: &Path, layout: UploadLayout) -> Result<Self> {
        fs::create_dir_all(root)?;

        let users = load_users(&root.join(USERS_FILE))?;

        let mut iids = HashMap::new();
        for key in read_rows::<IssueKey>(&root.join(ISSUES_FILE))? {
            let last = iids.entry(key.project_id).or_insert(0);
            *last = (*last).max(key.iid);
        }

        Ok(Self {
            root: root.to_path_buf(),
            layout,
            users,
            next_milestone: count_rows(&root.join(MILESTONES_FILE))? + 1,
            next_issue: count_rows(&root.join(ISSUES_FILE))? + 1,
            next_note: count_rows(&root.join(NOTES_FILE))? + 1,
            iids,
        })
    }

    fn append<T: Serialize>(&self, file: &str, row: &T) -> Result<()> {
        let mut out = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.root.join(file))?;
        let mut line = serde_json::to_vec(row)?;
        line.push(b'\n');
        out.write_all(&line)?;
        Ok(())
    }
}

fn load_users(path: &Path) -> Result<HashMap<String, u64>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let content = fs::read_to_string(path)?;
    let records: Vec<UserRecord> = serde_json::from_str(&content)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    Ok(records.into_iter().map(|u| (u.username, u.id)).collect())
}

fn read_rows<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let reader = BufReader::new(File::open(path)?);
    let mut rows = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        rows.push(serde_json::from_str(&line)?);
    }
    Ok(rows)
}

fn count_rows(path: &Path) -> Result<u64> {
    Ok(read_rows::<serde_json::Value>(path)?.len() as u64)
}

impl Sink for JsonlSink {
    fn create_milestone(&mut self, milestone: &TargetMilestone) -> Result<u64> {
        let id = self.next_milestone;
        self.append(MILESTONES_FILE, &Row { id, record: milestone })?;
        self.next_milestone += 1;
        Ok(id)
    }

    fn create_issue(&mut self, issue: &TargetIssue) -> Result<PersistedIssue> {
        let id = self.next_issue;
        let iid = self.iids.get(&issue.project_id).copied().unwrap_or(0) + 1;
        self.append(ISSUES_FILE, &IssueRow { id, iid, issue })?;

        self.next_issue += 1;
        self.iids.insert(issue.project_id, iid);
        Ok(PersistedIssue { id, iid })
    }

    fn create_note(
        &mut self,
        project_id: u64,
        issue: &PersistedIssue,
        note: &TargetNote,
    ) -> Result<u64> {
        let id = self.next_note;
        self.append(
            NOTES_FILE,
            &NoteRow {
                id,
                project_id,
                issue_id: issue.id,
                note,
            },
        )?;
        self.next_note += 1;
        Ok(id)
    }

    fn find_user(&self, username: &str) -> Result<Option<u64>> {
        Ok(self.users.get(username).copied())
    }

    fn store_wiki_attachment(
        &mut self,
        project_id: u64,
        filename: &str,
        data: &[u8],
    ) -> Result<String> {
        let path = self.layout.path(data, filename);
        let target = self
            .root
            .join(format!("project-{}", project_id))
            .join(&path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, data)?;
        Ok(path)
    }

    fn save_wiki_page(&mut self, project_id: u64, page: &TargetWikiPage) -> Result<()> {
        self.append(WIKI_FILE, &WikiRow { project_id, page })
    }
}
