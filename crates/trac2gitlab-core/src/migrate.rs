//! Migration orchestrator
//!
//! Applies an extract to a sink in three ordered phases: milestones, then
//! tickets with their comments, then wiki pages with their attachments.
//! Later phases rely on ids recorded by earlier ones.
//!
//! A failure on one entity is logged, audited and skipped. Fatal errors stop
//! the run; whatever was already written stays written.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::attachment::{self, StoredAttachment};
use crate::audit::{AuditLog, EntityKind, Outcome, RunSummary};
use crate::config::WikiConfig;
use crate::extract::ProjectExtract;
use crate::mapper::AttributeMapper;
use crate::resolver::Resolver;
use crate::sink::Sink;
use crate::source::{SourceMilestone, SourceTicket, SourceWikiPage};
use crate::target::{PersistedIssue, TargetWikiPage};
use crate::usermap::UserMap;
use crate::wiki::{self, BasePath, MarkupConverter, Passthrough};
use crate::{Config, Error, Result};

/// Cooperative cancellation flag
///
/// Checked between entities: the entity in flight completes, the next one
/// never starts.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct Migrator {
    mapper: AttributeMapper,
    converter: Box<dyn MarkupConverter>,
    resolver: Resolver,
    wiki: WikiConfig,
    audit: AuditLog,
    cancel: CancelToken,
}

impl Migrator {
    pub fn new(config: &Config, usermap: UserMap) -> Self {
        Self {
            mapper: AttributeMapper::new(config.labels.clone()),
            converter: Box::new(Passthrough),
            resolver: Resolver::new(usermap, config.project_id),
            wiki: config.wiki.clone(),
            audit: AuditLog::new(),
            cancel: CancelToken::new(),
        }
    }

    /// Use a real markup converter instead of passing text through
    pub fn with_converter(mut self, converter: Box<dyn MarkupConverter>) -> Self {
        self.converter = converter;
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Run every phase
    ///
    /// Per-entity failures end up in the summary. A fatal error is returned
    /// as is; the audit log keeps what happened up to that point.
    pub fn run(&mut self, extract: &ProjectExtract, sink: &mut dyn Sink) -> Result<RunSummary> {
        let fallback = self.resolver.fallback(&*sink)?;
        tracing::info!(
            "Migrating into project {} (fallback identity {} = {})",
            self.resolver.project_id(),
            self.resolver.usermap().fallback(),
            fallback
        );

        let completed = self.migrate_milestones(&extract.milestones, sink)?
            && self.migrate_tickets(extract, sink)?
            && self.migrate_wiki(&extract.wiki, sink)?;

        let summary = self.audit.summary(!completed);
        tracing::info!(
            "Run {} finished: {} skipped, cancelled = {}",
            summary.run_id,
            summary.skipped.len(),
            summary.cancelled
        );
        Ok(summary)
    }

    /// Returns false when cancelled
    fn migrate_milestones(&mut self, milestones: &[SourceMilestone], sink: &mut dyn Sink) -> Result<bool> {
        for milestone in milestones {
            if self.cancelled() {
                return Ok(false);
            }
            match self.migrate_milestone(milestone, sink) {
                Ok(id) => {
                    tracing::info!("milestone '{}' -> {}", milestone.name, id);
                    self.audit.created(EntityKind::Milestone, &milestone.name, id);
                }
                Err(e) => self.skip_or_abort(EntityKind::Milestone, &milestone.name, e)?,
            }
        }
        Ok(true)
    }

    fn migrate_milestone(&mut self, milestone: &SourceMilestone, sink: &mut dyn Sink) -> Result<u64> {
        let target =
            self.mapper
                .milestone(milestone, self.converter.as_ref(), self.resolver.project_id())?;
        let id = sink
            .create_milestone(&target)
            .map_err(|e| Error::persist(format!("milestone '{}'", target.title), e))?;
        self.resolver.record_milestone(&target.title, id);
        Ok(id)
    }

    fn migrate_tickets(&mut self, extract: &ProjectExtract, sink: &mut dyn Sink) -> Result<bool> {
        for ticket in extract.tickets_by_id() {
            if self.cancelled() {
                return Ok(false);
            }
            let source_id = format!("#{}", ticket.id);
            match self.migrate_ticket(ticket, sink) {
                Ok(issue) => {
                    tracing::info!("ticket {} -> issue {} (iid {})", source_id, issue.id, issue.iid);
                }
                Err(e) => self.skip_or_abort(EntityKind::Issue, &source_id, e)?,
            }
        }
        Ok(true)
    }

    /// Create the issue, then its notes in changelog order
    fn migrate_ticket(&mut self, ticket: &SourceTicket, sink: &mut dyn Sink) -> Result<PersistedIssue> {
        let source_id = format!("#{}", ticket.id);
        let draft = self.mapper.issue(ticket, self.converter.as_ref())?;
        let issue = self.resolver.issue(&*sink, draft)?;
        let persisted = sink
            .create_issue(&issue)
            .map_err(|e| Error::persist(format!("ticket {}", source_id), e))?;
        self.audit.created(EntityKind::Issue, &source_id, persisted.id);

        for (n, entry) in ticket.comments().enumerate() {
            let Some(draft) = self.mapper.note(entry, self.converter.as_ref()) else {
                continue;
            };
            let note_id = format!("{}.{}", source_id, n + 1);
            let note = self.resolver.note(&*sink, draft)?;
            match sink.create_note(self.resolver.project_id(), &persisted, &note) {
                Ok(id) => {
                    tracing::info!("comment {} -> note {}", note_id, id);
                    self.audit.created(EntityKind::Note, &note_id, id);
                }
                Err(e) => {
                    let e = Error::persist(format!("comment {}", note_id), e);
                    self.skip_or_abort(EntityKind::Note, &note_id, e)?;
                }
            }
        }

        Ok(persisted)
    }

    fn migrate_wiki(&mut self, pages: &[SourceWikiPage], sink: &mut dyn Sink) -> Result<bool> {
        for page in pages {
            if self.cancelled() {
                return Ok(false);
            }
            match self.migrate_wiki_page(page, sink) {
                Ok(title) => {
                    tracing::info!("wiki page '{}' -> '{}'", page.name, title);
                    self.audit.created(EntityKind::WikiPage, &page.name, title);
                }
                Err(e) => self.skip_or_abort(EntityKind::WikiPage, &page.name, e)?,
            }
        }
        Ok(true)
    }

    /// Target title of a source page
    pub fn wiki_title(&self, name: &str) -> String {
        if name == self.wiki.start_page {
            self.wiki.root_page.clone()
        } else {
            name.to_string()
        }
    }

    fn migrate_wiki_page(&mut self, page: &SourceWikiPage, sink: &mut dyn Sink) -> Result<String> {
        let project_id = self.resolver.project_id();
        let title = self.wiki_title(&page.name);
        let author_id = self.resolver.user(&*sink, &page.author)?;

        let mut body = wiki::convert(
            self.converter.as_ref(),
            &page.text,
            &BasePath::WikiPage(page.name.clone()),
        );

        let mut seen = HashSet::new();
        let mut stored = Vec::new();
        for (name, file) in &page.attachments {
            let source_id = format!("{}/{}", page.name, name);
            let flat = attachment::flatten(name);

            if !seen.insert(flat.to_string()) {
                tracing::warn!("attachment {} collides on '{}', not stored", source_id, flat);
                self.audit.record(
                    EntityKind::Attachment,
                    &source_id,
                    Outcome::Collision {
                        filename: flat.to_string(),
                    },
                );
                continue;
            }

            let data = match file.decode() {
                Ok(data) => data,
                Err(e) => {
                    tracing::warn!("attachment {} is not valid base64: {}", source_id, e);
                    self.audit.record(
                        EntityKind::Attachment,
                        &source_id,
                        Outcome::DecodeFailed {
                            reason: e.to_string(),
                        },
                    );
                    Vec::new()
                }
            };

            match sink.store_wiki_attachment(project_id, flat, &data) {
                Ok(path) => {
                    tracing::info!("attachment {} -> {}", source_id, path);
                    self.audit.created(EntityKind::Attachment, &source_id, &path);
                    body = attachment::rewrite_links(&body, name, flat);
                    stored.push(StoredAttachment {
                        filename: flat.to_string(),
                        path,
                    });
                }
                Err(e) => {
                    let e = Error::persist(format!("attachment {}", source_id), e);
                    self.skip_or_abort(EntityKind::Attachment, &source_id, e)?;
                }
            }
        }

        if let Some(section) = attachment::orphan_section(&body, &self.wiki.attachments_heading, &stored) {
            body.push_str(&section);
        }

        let target = TargetWikiPage {
            title: title.clone(),
            body,
            attachments: stored.into_iter().map(|a| a.filename).collect(),
            version: page.version,
            last_modified: page.last_modified,
            author_id,
        };
        sink.save_wiki_page(project_id, &target)
            .map_err(|e| Error::persist(format!("wiki page '{}'", page.name), e))?;
        Ok(title)
    }

    fn cancelled(&self) -> bool {
        let cancelled = self.cancel.is_cancelled();
        if cancelled {
            tracing::warn!("Cancellation requested, stopping before the next entity");
        }
        cancelled
    }

    /// Audit and skip a per-entity failure, or hand back a fatal one
    fn skip_or_abort(&self, kind: EntityKind, source_id: &str, err: Error) -> Result<()> {
        if err.is_fatal() {
            tracing::error!("{} {}: {}", kind, source_id, err);
            return Err(err);
        }
        tracing::warn!("skipping {} {}: {}", kind, source_id, err);
        self.audit.skipped(kind, source_id, &err);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use crate::source::{Attachment, ChangelogEntry, TicketAttributes};
    use crate::target::{IssueState, MilestoneState, TargetIssue, TargetMilestone, TargetNote};
    use std::collections::BTreeMap;

    fn ticket(id: u64, reporter: &str, status: &str, milestone: &str) -> SourceTicket {
        SourceTicket::new(
            id,
            TicketAttributes {
                ticket_type: Some("defect".into()),
                priority: "high".into(),
                summary: Some(format!("Ticket {}", id)),
                reporter: reporter.into(),
                owner: "alice".into(),
                time: Some("2014-01-01T00:00:00Z".parse().unwrap()),
                changetime: Some("2014-02-01T00:00:00Z".parse().unwrap()),
                milestone: milestone.into(),
                component: "Core, UI".into(),
                status: status.into(),
                ..TicketAttributes::default()
            },
        )
    }

    fn comment(time: &str, author: &str, text: &str) -> ChangelogEntry {
        ChangelogEntry {
            time: time.parse().unwrap(),
            author: author.into(),
            field: "comment".into(),
            old: String::new(),
            new: text.into(),
            permanent: true,
        }
    }

    fn page(name: &str, text: &str, attachments: &[(&str, &[u8])]) -> SourceWikiPage {
        SourceWikiPage {
            name: name.into(),
            text: text.into(),
            version: 4,
            last_modified: Some("2015-05-05T05:05:05Z".parse().unwrap()),
            author: "alice".into(),
            attachments: attachments
                .iter()
                .map(|(n, data)| (n.to_string(), Attachment::from_bytes(data)))
                .collect(),
        }
    }

    fn sink() -> MemorySink {
        let mut sink = MemorySink::default();
        sink.add_user("alice.g", 10);
        sink.add_user("migration-bot", 99);
        sink
    }

    fn migrator() -> Migrator {
        let config = Config {
            project_id: 7,
            fallback_user: "migration-bot".into(),
            ..Config::default()
        };
        let mut usermap = UserMap::new("migration-bot");
        usermap.insert("alice", "alice.g");
        Migrator::new(&config, usermap)
    }

    fn extract() -> ProjectExtract {
        let mut second = ticket(2, "bob", "needs_info", "");
        second.changelog = vec![
            comment("2014-01-03T00:00:00Z", "alice", "second"),
            ChangelogEntry {
                field: "status".into(),
                ..comment("2014-01-04T00:00:00Z", "alice", "closed")
            },
            comment("2014-01-05T00:00:00Z", "bob", "third [changeset:abc123]"),
            comment("2014-01-02T00:00:00Z", "alice", ""),
        ];

        ProjectExtract {
            tickets: vec![second, ticket(1, "alice", "closed", "1.0")],
            milestones: vec![SourceMilestone {
                name: "1.0".into(),
                description: "First".into(),
                completed: true,
                due: None,
            }],
            wiki: vec![page("WikiStart", "Welcome", &[])],
        }
    }

    #[test]
    fn test_full_run() {
        let mut migrator = migrator();
        let mut sink = sink();

        let summary = migrator.run(&extract(), &mut sink).unwrap();
        assert!(summary.is_clean());
        assert_eq!(summary.created(EntityKind::Milestone), 1);
        assert_eq!(summary.created(EntityKind::Issue), 2);
        assert_eq!(summary.created(EntityKind::Note), 2);
        assert_eq!(summary.created(EntityKind::WikiPage), 1);

        let (_, milestone) = &sink.milestones[0];
        assert_eq!(milestone.state, MilestoneState::Closed);
        assert_eq!(milestone.project_id, 7);

        // stable id order regardless of extract order
        assert_eq!(sink.issues[0].1.title, "Ticket 1");
        assert_eq!(sink.issues[0].0.iid, 1);
        assert_eq!(sink.issues[1].0.iid, 2);

        let (_, first) = sink.issue_by_title("Ticket 1").unwrap();
        assert_eq!(first.author_id, 10);
        assert_eq!(first.milestone_id, Some(sink.milestones[0].0));
        assert_eq!(first.state, Some(IssueState::Closed));
        assert!(first.labels.contains("comp:Core"));
        assert!(first.labels.contains("comp:UI"));
        assert!(first.labels.contains("prio:high"));

        let (persisted, second) = sink.issue_by_title("Ticket 2").unwrap();
        assert_eq!(second.author_id, 99);
        assert_eq!(second.assignee_id, 10);
        assert_eq!(second.milestone_id, None);
        assert_eq!(second.state, None);
        assert!(second.labels.contains("state:needs_info"));

        let notes: Vec<&TargetNote> = sink.notes_for(persisted.id);
        let bodies: Vec<_> = notes.iter().map(|n| n.body.as_str()).collect();
        assert_eq!(bodies, vec!["second", "third abc123"]);
        assert_eq!(notes[1].author_id, 99);
        assert_eq!(notes[1].created_at, notes[1].updated_at);

        assert!(sink.wiki_page("home").is_some());
    }

    #[test]
    fn test_every_persist_is_audited() {
        let mut migrator = migrator();
        let mut sink = sink();
        migrator.run(&extract(), &mut sink).unwrap();

        let created: Vec<_> = migrator
            .audit()
            .entries()
            .into_iter()
            .filter(|e| matches!(e.outcome, Outcome::Created { .. }))
            .map(|e| (e.kind, e.source_id))
            .collect();
        assert!(created.contains(&(EntityKind::Milestone, "1.0".to_string())));
        assert!(created.contains(&(EntityKind::Issue, "#1".to_string())));
        assert!(created.contains(&(EntityKind::Note, "#2.1".to_string())));
        assert!(created.contains(&(EntityKind::WikiPage, "WikiStart".to_string())));
    }

    #[test]
    fn test_unresolvable_fallback_aborts_before_writes() {
        let mut migrator = migrator();
        let mut sink = MemorySink::default();

        let err = migrator.run(&extract(), &mut sink).unwrap_err();
        assert!(matches!(err, Error::ReferenceResolution(_)));
        assert!(sink.milestones.is_empty());
        assert!(sink.issues.is_empty());
    }

    #[test]
    fn test_bad_ticket_is_skipped() {
        let mut extract = extract();
        extract.tickets[0].attributes.ticket_type = None;

        let mut migrator = migrator();
        let mut sink = sink();
        let summary = migrator.run(&extract, &mut sink).unwrap();

        assert_eq!(summary.created(EntityKind::Issue), 1);
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].source_id, "#2");
        assert_eq!(summary.created(EntityKind::WikiPage), 1);
    }

    #[test]
    fn test_rejected_milestone_leaves_issue_unscheduled() {
        let mut migrator = migrator();
        let mut sink = sink();
        sink.reject_titles.insert("1.0".into());

        let summary = migrator.run(&extract(), &mut sink).unwrap();
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].kind, EntityKind::Milestone);

        let (_, issue) = sink.issue_by_title("Ticket 1").unwrap();
        assert_eq!(issue.milestone_id, None);
    }

    #[test]
    fn test_orphaned_attachment_gets_appendix() {
        let mut extract = extract();
        extract.wiki = vec![page(
            "Dev/Design",
            "Architecture overview.\n\n![arch](Dev/arch.png)",
            &[("Dev/arch.png", b"arch"), ("diagram.png", b"diagram")],
        )];

        let mut migrator = migrator();
        let mut sink = sink();
        migrator.run(&extract, &mut sink).unwrap();

        let page = sink.wiki_page("Dev/Design").unwrap();
        assert_eq!(page.attachments, vec!["arch.png", "diagram.png"]);
        assert!(page.body.contains("![arch](arch.png)"));

        let section = page.body.split("## Attached files").nth(1).unwrap();
        assert!(section.contains("[diagram.png](uploads/"));
        assert!(!section.contains("arch.png"));
        assert_eq!(page.version, 4);
        assert_eq!(page.author_id, 10);
        assert_eq!(sink.attachments.len(), 2);
    }

    #[test]
    fn test_start_page_alias() {
        let migrator = migrator();
        assert_eq!(migrator.wiki_title("WikiStart"), "home");
        assert_eq!(migrator.wiki_title("Guide/WikiStart"), "Guide/WikiStart");
    }

    #[test]
    fn test_undecodable_attachment_uses_placeholder() {
        let mut broken = page("Notes", "text", &[]);
        broken.attachments.insert(
            "bad.bin".into(),
            Attachment {
                content: "%%%".into(),
                ..Attachment::default()
            },
        );
        let extract = ProjectExtract {
            wiki: vec![broken],
            ..ProjectExtract::default()
        };

        let mut migrator = migrator();
        let mut sink = sink();
        let summary = migrator.run(&extract, &mut sink).unwrap();

        assert_eq!(summary.decode_failures, 1);
        assert_eq!(summary.created(EntityKind::WikiPage), 1);
        let stored: Vec<_> = sink.attachments.values().collect();
        assert_eq!(stored, vec![&Vec::<u8>::new()]);
    }

    #[test]
    fn test_colliding_attachment_is_not_overwritten() {
        let extract = ProjectExtract {
            wiki: vec![page(
                "Shots",
                "",
                &[("a/shot.png", b"first"), ("b/shot.png", b"second")],
            )],
            ..ProjectExtract::default()
        };

        let mut migrator = migrator();
        let mut sink = sink();
        let summary = migrator.run(&extract, &mut sink).unwrap();

        assert_eq!(sink.attachments.len(), 1);
        assert_eq!(sink.attachments.values().next().unwrap(), b"first");
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].source_id, "Shots/b/shot.png");
    }

    /// Sink that requests cancellation once the first issue is written
    struct CancellingSink {
        inner: MemorySink,
        token: CancelToken,
    }

    impl Sink for CancellingSink {
        fn create_milestone(&mut self, milestone: &TargetMilestone) -> Result<u64> {
            self.inner.create_milestone(milestone)
        }

        fn create_issue(&mut self, issue: &TargetIssue) -> Result<PersistedIssue> {
            self.token.cancel();
            self.inner.create_issue(issue)
        }

        fn create_note(&mut self, project_id: u64, issue: &PersistedIssue, note: &TargetNote) -> Result<u64> {
            self.inner.create_note(project_id, issue, note)
        }

        fn find_user(&self, username: &str) -> Result<Option<u64>> {
            self.inner.find_user(username)
        }

        fn store_wiki_attachment(&mut self, project_id: u64, filename: &str, data: &[u8]) -> Result<String> {
            self.inner.store_wiki_attachment(project_id, filename, data)
        }

        fn save_wiki_page(&mut self, project_id: u64, page: &TargetWikiPage) -> Result<()> {
            self.inner.save_wiki_page(project_id, page)
        }
    }

    #[test]
    fn test_cancel_finishes_entity_in_flight() {
        let mut migrator = migrator();
        let mut sink = CancellingSink {
            inner: sink(),
            token: migrator.cancel_token(),
        };

        let summary = migrator.run(&extract(), &mut sink).unwrap();
        assert!(summary.cancelled);
        assert_eq!(sink.inner.issues.len(), 1);
        assert!(sink.inner.wiki.is_empty());
        assert_eq!(sink.inner.milestones.len(), 1);
    }

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            let mut guard = self.0.lock().map_err(|_| std::io::ErrorKind::Other)?;
            guard.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLog {
        type Writer = CapturedLog;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_every_persist_logged_at_info() {
        let mut extract = extract();
        extract.wiki = vec![page("Guide", "No links here", &[("a.png", b"a".as_slice())])];

        let log = CapturedLog::default();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .with_writer(log.clone())
            .finish();

        let mut migrator = migrator();
        let mut sink = sink();
        tracing::subscriber::with_default(subscriber, || migrator.run(&extract, &mut sink)).unwrap();

        let output = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("ticket #1 -> issue"));
        assert!(output.contains("comment #2.1 -> note"));
        assert!(output.contains("attachment Guide/a.png -> uploads/"));
    }

    #[test]
    fn test_run_into_jsonl_sink() {
        use crate::sink::{SinkOptions, SinkRegistry};

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("users.json"),
            r#"[{"id": 10, "username": "alice.g"}, {"id": 99, "username": "migration-bot"}]"#,
        )
        .unwrap();
        let options = SinkOptions {
            output: Some(dir.path().to_path_buf()),
            ..SinkOptions::default()
        };
        let mut sink = SinkRegistry::default().create("9.0.0", &options).unwrap();

        let mut migrator = migrator();
        let summary = migrator.run(&extract(), sink.as_mut()).unwrap();
        assert!(summary.is_clean());

        let issues = std::fs::read_to_string(dir.path().join("issues.jsonl")).unwrap();
        let rows: Vec<serde_json::Value> = issues
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["title"], "Ticket 1");
        assert_eq!(rows[0]["state"], "closed");
        assert_eq!(rows[0]["project_id"], 7);
        assert!(rows[1].get("state").is_none());

        let wiki = std::fs::read_to_string(dir.path().join("wiki.jsonl")).unwrap();
        assert!(wiki.contains("\"title\":\"home\""));
    }

    #[test]
    fn test_label_map_is_not_shared_between_runs() {
        let mut config = Config::default();
        config.labels.priority = BTreeMap::from([("high".to_string(), "urgent".to_string())]);
        let mut usermap = UserMap::new("migration-bot");
        usermap.insert("alice", "alice.g");
        let mut custom = Migrator::new(&config, usermap);

        let mut sink = sink();
        custom.run(&extract(), &mut sink).unwrap();
        let (_, issue) = sink.issue_by_title("Ticket 1").unwrap();
        assert!(issue.labels.contains("urgent"));
        assert!(!issue.labels.contains("prio:high"));
    }
}
