//! Target persistence
//!
//! The [`Sink`] trait is everything the migration needs from the target.
//! Concrete sinks are picked through a [`SinkRegistry`] keyed by the target
//! version tag.

mod jsonl;
mod memory;

pub use jsonl::JsonlSink;
pub use memory::MemorySink;

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::target::{PersistedIssue, TargetIssue, TargetMilestone, TargetNote, TargetWikiPage};
use crate::{Error, Result};

/// Write access to the target tracker. Every method is blocking.
pub trait Sink {
    /// Create a milestone, returning its id
    fn create_milestone(&mut self, milestone: &TargetMilestone) -> Result<u64>;

    /// Create an issue under its project; the sink assigns the sequence number
    fn create_issue(&mut self, issue: &TargetIssue) -> Result<PersistedIssue>;

    /// Create a note on an issue, returning the note id
    fn create_note(&mut self, project_id: u64, issue: &PersistedIssue, note: &TargetNote)
    -> Result<u64>;

    /// Numeric identity of a target username, None when unknown
    fn find_user(&self, username: &str) -> Result<Option<u64>>;

    /// Store a wiki attachment blob, returning its storage path
    fn store_wiki_attachment(&mut self, project_id: u64, filename: &str, data: &[u8])
    -> Result<String>;

    /// Persist one wiki page revision
    fn save_wiki_page(&mut self, project_id: u64, page: &TargetWikiPage) -> Result<()>;
}

/// Where uploaded blobs land, which changed between target versions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadLayout {
    /// `uploads/<secret>/<file>`
    Legacy,
    /// `uploads/-/system/<secret>/<file>`
    System,
}

impl UploadLayout {
    /// Storage path of a blob, keyed by a digest of its content
    pub fn path(&self, data: &[u8], filename: &str) -> String {
        let secret = secret_for(data);
        match self {
            UploadLayout::Legacy => format!("uploads/{}/{}", secret, filename),
            UploadLayout::System => format!("uploads/-/system/{}/{}", secret, filename),
        }
    }
}

fn secret_for(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    hash[..16].iter().map(|b| format!("{:02x}", b)).collect()
}

/// How a sink should be opened
#[derive(Debug, Clone, Default)]
pub struct SinkOptions {
    /// Output directory for file-backed sinks
    pub output: Option<PathBuf>,

    /// Keep everything in memory
    pub dry_run: bool,

    /// Identities known to an in-memory sink
    pub users: BTreeMap<String, u64>,
}

pub type SinkFactory = fn(&SinkOptions) -> Result<Box<dyn Sink>>;

/// Sink factories keyed by target version tag
pub struct SinkRegistry {
    factories: BTreeMap<String, SinkFactory>,
}

impl Default for SinkRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register("9.0.0", |opts| open(UploadLayout::Legacy, opts));
        registry.register("10.0.0", |opts| open(UploadLayout::System, opts));
        registry
    }
}

impl SinkRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, version: &str, factory: SinkFactory) {
        self.factories.insert(version.trim().to_string(), factory);
    }

    pub fn versions(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    pub fn create(&self, version: &str, options: &SinkOptions) -> Result<Box<dyn Sink>> {
        let factory = self
            .factories
            .get(version.trim())
            .ok_or_else(|| Error::UnknownVersion(version.to_string()))?;
        factory(options)
    }
}

fn open(layout: UploadLayout, options: &SinkOptions) -> Result<Box<dyn Sink>> {
    if options.dry_run {
        let mut sink = MemorySink::new(layout);
        for (name, id) in &options.users {
            sink.add_user(name, *id);
        }
        return Ok(Box::new(sink));
    }

    let root = options
        .output
        .as_ref()
        .ok_or_else(|| Error::Config("an output directory is required".into()))?;
    Ok(Box::new(JsonlSink::open(root, layout)?))
}
