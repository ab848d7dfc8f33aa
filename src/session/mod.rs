//! Locate and read the latest Claude Code session transcript for a project.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::{ClaudebinError, Result};

const SESSION_EXTENSION: &str = "jsonl";
const AGENT_PREFIX: &str = "agent-";

/// Reads session transcripts from `~/.claude/projects/<normalized path>/`.
#[derive(Debug, Clone)]
pub struct SessionSource {
    projects_dir: PathBuf,
}

impl SessionSource {
    pub fn new(projects_dir: PathBuf) -> Self {
        Self { projects_dir }
    }

    pub fn new_default() -> Self {
        let projects_dir = directories::UserDirs::new()
            .map(|dirs| dirs.home_dir().join(".claude").join("projects"))
            .unwrap_or_else(|| PathBuf::from(".claude/projects"));
        Self::new(projects_dir)
    }

    /// Directory holding the transcripts for `project_path`.
    pub fn project_dir(&self, project_path: &str) -> PathBuf {
        self.projects_dir.join(normalize_project_path(project_path))
    }

    /// Newest `*.jsonl` transcript, ignoring `agent-*` sidechains.
    pub fn latest(&self, project_path: &str) -> Result<PathBuf> {
        let dir = self.project_dir(project_path);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(ClaudebinError::SessionNotFound(format!(
                    "No Claude sessions found for project path: {project_path}"
                )));
            }
            Err(err) => return Err(err.into()),
        };

        let mut seen_any = false;
        let mut newest: Option<(SystemTime, PathBuf)> = None;
        for entry in entries {
            let entry = entry?;
            seen_any = true;
            let path = entry.path();
            if !is_session_file(&path) {
                continue;
            }
            let modified = entry.metadata()?.modified()?;
            if newest.as_ref().map_or(true, |(best, _)| modified > *best) {
                newest = Some((modified, path));
            }
        }

        match newest {
            Some((_, path)) => Ok(path),
            None if !seen_any => Err(ClaudebinError::SessionNotFound(format!(
                "No session files found in: {}",
                dir.display()
            ))),
            None => Err(ClaudebinError::SessionNotFound(format!(
                "No valid session files found (excluding agent-* files) in: {}",
                dir.display()
            ))),
        }
    }

    /// Raw contents of the latest transcript.
    pub fn extract(&self, project_path: &str) -> Result<String> {
        let path = self.latest(project_path)?;
        tracing::debug!(path = %path.display(), "Reading session transcript");
        Ok(fs::read_to_string(path)?)
    }
}

/// Replace every non-alphanumeric character with `-`, as Claude Code does
/// when naming project directories.
///
/// Claude Code counts UTF-16 code units, so a character outside the BMP
/// (e.g. an emoji) becomes `--`.
pub fn normalize_project_path(project_path: &str) -> String {
    let mut normalized = String::with_capacity(project_path.len());
    for ch in project_path.chars() {
        if ch.is_ascii_alphanumeric() {
            normalized.push(ch);
        } else {
            normalized.extend(std::iter::repeat('-').take(ch.len_utf16()));
        }
    }
    normalized
}

fn is_session_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    path.extension().and_then(|e| e.to_str()) == Some(SESSION_EXTENSION)
        && !name.starts_with(AGENT_PREFIX)
}
