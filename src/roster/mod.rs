//! Roster scanner for discovering player profile documents.
//!
//! This module walks a directory of exported profiles so a whole roster
//! can be scored in one run.

use crate::config::RosterConfig;
use crate::models::PlayerProfile;
use crate::profile;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Configuration for roster scanning.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Names to exclude (directories or files)
    pub excludes: Vec<String>,
    /// Maximum number of profiles to return
    pub max_profiles: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::from(&RosterConfig::default())
    }
}

impl From<&RosterConfig> for ScanConfig {
    fn from(config: &RosterConfig) -> Self {
        Self {
            excludes: config.excludes.clone(),
            max_profiles: config.max_profiles,
        }
    }
}

/// A profile loaded from the roster, with the file it came from.
#[derive(Debug, Clone)]
pub struct RosterProfile {
    pub path: PathBuf,
    pub profile: PlayerProfile,
}

/// Scanner over a directory of profile documents.
pub struct RosterScanner {
    config: ScanConfig,
    root: PathBuf,
}

impl RosterScanner {
    /// Create a new roster scanner.
    pub fn new(root: PathBuf, config: ScanConfig) -> Self {
        Self { config, root }
    }

    /// Find all profile documents, sorted by path.
    pub fn scan(&self) -> Result<Vec<PathBuf>> {
        let (mut paths, truncated) = self.walk();

        if truncated {
            warn!(
                "Roster limit of {} profiles reached; remaining files ignored",
                self.config.max_profiles
            );
        }

        paths.sort();
        Ok(paths)
    }

    /// Collect profile documents up to the limit. The flag is set only when
    /// a further document was found past the limit.
    fn walk(&self) -> (Vec<PathBuf>, bool) {
        let mut paths = Vec::new();

        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !self.is_excluded(entry));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("Cannot read roster entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() || !is_profile_document(entry.path()) {
                continue;
            }

            if paths.len() >= self.config.max_profiles {
                return (paths, true);
            }
            paths.push(entry.into_path());
        }

        (paths, false)
    }

    /// Load every profile in the roster. Unreadable documents are skipped.
    pub fn load_roster(&self) -> Result<Vec<RosterProfile>> {
        let paths = self
            .scan()
            .with_context(|| format!("Failed to scan roster: {}", self.root.display()))?;

        let mut roster = Vec::new();
        for path in paths {
            match profile::load_profile(&path) {
                Ok(profile) => roster.push(RosterProfile { path, profile }),
                Err(e) => warn!("Skipping {}: {:#}", path.display(), e),
            }
        }

        Ok(roster)
    }

    /// Check if an entry matches exclusion patterns.
    fn is_excluded(&self, entry: &DirEntry) -> bool {
        let name = entry.file_name().to_string_lossy();

        // Hidden files
        if name.starts_with('.') {
            return true;
        }

        self.config.excludes.iter().any(|pattern| name == pattern.as_str())
    }
}

fn is_profile_document(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}
