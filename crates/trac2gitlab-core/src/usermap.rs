//! Source -> target username mapping
//!
//! Merged from several optional sources (config pairs, mapping files, CLI
//! pairs). Later sources override earlier ones on key collision.

use std::collections::BTreeMap;
use std::path::Path;

use crate::{Config, Error, Result};

#[derive(Debug, Clone)]
pub struct UserMap {
    entries: BTreeMap<String, String>,
    fallback: String,
}

impl UserMap {
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            entries: BTreeMap::new(),
            fallback: fallback.into(),
        }
    }

    /// Build from the config's inline pairs and mapping files, in that order
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut map = Self::new(config.fallback_user.clone());
        map.merge(config.usermap.clone());
        for path in &config.usermap_files {
            map.merge_file(path)?;
        }
        Ok(map)
    }

    pub fn insert(&mut self, source: impl Into<String>, target: impl Into<String>) {
        self.entries.insert(source.into(), target.into());
    }

    /// Merge pairs; later pairs win
    pub fn merge<I, S, T>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        for (source, target) in pairs {
            self.insert(source, target);
        }
    }

    /// Merge a mapping file of `source = "target"` lines
    pub fn merge_file(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        let pairs: BTreeMap<String, String> = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        self.merge(pairs);
        Ok(())
    }

    /// Parse an inline `source=target` pair
    pub fn parse_pair(pair: &str) -> Result<(String, String)> {
        let (source, target) = pair
            .split_once('=')
            .ok_or_else(|| Error::Config(format!("expected source=target, got '{}'", pair)))?;
        let (source, target) = (source.trim(), target.trim());
        if source.is_empty() || target.is_empty() {
            return Err(Error::Config(format!("empty username in pair '{}'", pair)));
        }
        Ok((source.to_string(), target.to_string()))
    }

    pub fn get(&self, source: &str) -> Option<&str> {
        self.entries.get(source).map(String::as_str)
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(s, t)| (s.as_str(), t.as_str()))
    }
}
