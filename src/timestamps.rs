//! Git-derived creation and modification times of posts

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::process::Command;

use crate::SiteError;

/// Timestamps of a single post, ISO-8601 UTC with milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileTimestamps {
    pub last_modified: String,
    pub created: String,
}

impl FileTimestamps {
    /// Fill gaps in what git reported: `created` falls back to
    /// `last_modified`, which falls back to `now`
    pub fn resolve(
        last_modified: Option<String>,
        created: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let last_modified = last_modified.unwrap_or_else(|| to_iso_utc(now));
        let created = created.unwrap_or_else(|| last_modified.clone());
        Self {
            last_modified,
            created,
        }
    }
}

/// Post slug to timestamps, in posts-directory order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GitTimestamps {
    entries: IndexMap<String, FileTimestamps>,
}

impl GitTimestamps {
    /// Collect timestamps for every `*.md` file under `posts_dir`
    ///
    /// Files git knows nothing about get the current time for both fields.
    pub fn generate(repo_root: &Path, posts_dir: &Path) -> Result<Self> {
        if !is_git_repo(repo_root) {
            return Err(SiteError::NotAGitRepo(repo_root.to_path_buf()).into());
        }
        if !posts_dir.is_dir() {
            return Err(SiteError::MissingPostsDir(posts_dir.to_path_buf()).into());
        }

        let mut files: Vec<_> = fs::read_dir(posts_dir)
            .with_context(|| format!("Failed to read {:?}", posts_dir))?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && p.extension().map_or(false, |ext| ext == "md"))
            .collect();
        files.sort();

        let mut stamps = Self::default();
        for path in files {
            let Some(slug) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let rel = path.strip_prefix(repo_root).unwrap_or(&path);

            let entry = FileTimestamps::resolve(
                last_commit_time(repo_root, rel),
                first_commit_time(repo_root, rel),
                Utc::now(),
            );

            tracing::debug!(
                "{}: created {}, modified {}",
                slug,
                entry.created,
                entry.last_modified
            );
            stamps.insert(slug, entry);
        }

        Ok(stamps)
    }

    /// Read a timestamp file; a missing file yields an empty map
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        serde_json::from_str(&content).with_context(|| format!("Failed to parse {:?}", path))
    }

    /// Write the map as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json + "\n").with_context(|| format!("Failed to write {:?}", path))?;
        Ok(())
    }

    pub fn get(&self, slug: &str) -> Option<&FileTimestamps> {
        self.entries.get(slug)
    }

    pub fn insert(&mut self, slug: impl Into<String>, stamps: FileTimestamps) {
        self.entries.insert(slug.into(), stamps);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FileTimestamps)> {
        self.entries.iter()
    }
}

/// Format as `YYYY-MM-DDTHH:MM:SS.mmmZ`
pub fn to_iso_utc(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Convert a git `%aI` date (strict ISO-8601 with offset) to UTC
pub fn normalize_git_date(raw: &str) -> Option<String> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|t| to_iso_utc(t.with_timezone(&Utc)))
}

fn is_git_repo(dir: &Path) -> bool {
    Command::new("git")
        .args(["rev-parse", "--git-dir"])
        .current_dir(dir)
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}

fn git_log(repo_root: &Path, args: &[&str], file: &Path) -> Option<String> {
    let output = Command::new("git")
        .arg("log")
        .args(args)
        .arg("--")
        .arg(file)
        .current_dir(repo_root)
        .output()
        .ok()?;

    if !output.status.success() {
        tracing::debug!(
            "git log failed for {:?}: {}",
            file,
            String::from_utf8_lossy(&output.stderr).trim()
        );
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn last_commit_time(repo_root: &Path, file: &Path) -> Option<String> {
    let out = git_log(repo_root, &["-1", "--format=%aI"], file)?;
    out.lines().next().and_then(normalize_git_date)
}

fn first_commit_time(repo_root: &Path, file: &Path) -> Option<String> {
    let out = git_log(
        repo_root,
        &["--diff-filter=A", "--follow", "--format=%aI"],
        file,
    )?;
    out.lines()
        .filter(|l| !l.trim().is_empty())
        .last()
        .and_then(normalize_git_date)
}
