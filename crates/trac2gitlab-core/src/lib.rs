//! trac2gitlab-core: transformation and apply engine for Trac to GitLab
//! migrations
//!
//! Maps ticket attributes to labels and states, normalizes Trac wiki markup,
//! resolves users and milestones to target ids, and applies a project
//! extract to a target sink in dependency order.

pub mod attachment;
pub mod audit;
pub mod config;
pub mod error;
pub mod extract;
pub mod mapper;
pub mod migrate;
pub mod resolver;
pub mod sink;
pub mod source;
pub mod target;
pub mod usermap;
pub mod wiki;

pub use audit::{AuditEntry, AuditLog, EntityKind, Outcome, RunSummary, SkippedEntity};
pub use config::{Config, LabelTables, WikiConfig};
pub use error::Error;
pub use extract::ProjectExtract;
pub use mapper::AttributeMapper;
pub use migrate::{CancelToken, Migrator};
pub use resolver::Resolver;
pub use sink::{JsonlSink, MemorySink, Sink, SinkOptions, SinkRegistry, UploadLayout};
pub use source::{Attachment, ChangelogEntry, Source, SourceMilestone, SourceTicket, SourceWikiPage};
pub use target::{IssueState, LabelSet, MilestoneState, TargetIssue, TargetMilestone, TargetNote, TargetWikiPage};
pub use usermap::UserMap;
pub use wiki::{BasePath, MarkupConverter, Passthrough};

/// Result type for trac2gitlab operations
pub type Result<T> = std::result::Result<T, Error>;
