//! Deployment log
//!
//! The persisted, append-only record of `(timestamp -> revision)` pairs
//! for one project: the source of truth for "currently deployed
//! revision" and for revert targets. Stored as a YAML mapping with
//! sorted keys (`BTreeMap` serialization) so the file stays
//! diff-friendly, and rewritten atomically via temp-file-then-rename.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::{GitriolError, GitriolResult};

/// Timestamp key format: RFC-3339 UTC at millisecond resolution, so
/// lexical order equals chronological order.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// One recorded deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentRecord {
    pub timestamp: String,
    pub revision: String,
}

/// The ordered deployment history of one project.
#[derive(Debug, Clone, Default)]
pub struct DeploymentLog {
    records: BTreeMap<String, String>,
}

/// A parsed `revert` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevertSpec {
    /// `N` deployments back; `0` is the deployment immediately before
    /// the current one.
    Steps(usize),
    /// The last deployment strictly earlier than this instant.
    Before(DateTime<Utc>),
}

impl RevertSpec {
    /// Parse a revert argument: a non-negative integer is a step count,
    /// anything else must be a date.
    pub fn parse(input: &str) -> GitriolResult<Self> {
        let trimmed = input.trim();
        if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            // Fits-in-usize is guaranteed for any sane step count; an
            // absurd one just becomes out-of-range later.
            return Ok(Self::Steps(trimmed.parse().map_err(|_| {
                GitriolError::InvalidRevertSpec {
                    input: input.to_string(),
                }
            })?));
        }

        parse_date(trimmed)
            .map(Self::Before)
            .ok_or_else(|| GitriolError::InvalidRevertSpec {
                input: input.to_string(),
            })
    }
}

impl DeploymentLog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Read the persisted log. A missing file is `HistoryNotFound` -
    /// distinct from an existing-but-empty log.
    pub fn load(path: &Path, project: &str) -> GitriolResult<Self> {
        if !path.exists() {
            return Err(GitriolError::HistoryNotFound {
                name: project.to_string(),
                repo_dir: path.parent().unwrap_or(Path::new(".")).to_path_buf(),
            });
        }

        let content = fs::read_to_string(path)?;
        let records: BTreeMap<String, String> = if content.trim().is_empty() {
            BTreeMap::new()
        } else {
            serde_yaml_ng::from_str(&content)?
        };

        Ok(Self { records })
    }

    /// Whether a log file exists at all (used by `init` to gate the
    /// overwrite confirmation).
    pub fn exists(path: &Path) -> bool {
        path.exists()
    }

    /// The revision with the chronologically latest timestamp.
    pub fn current_revision(&self) -> Option<&str> {
        self.records.values().next_back().map(String::as_str)
    }

    /// Append a record timestamped now. Wall clocks can repeat or run
    /// backwards, so a key that would not sort strictly after the last
    /// record is replaced with the next representable instant after it.
    pub fn append(&mut self, revision: &str) -> String {
        self.append_at(Utc::now(), revision)
    }

    fn append_at(&mut self, when: DateTime<Utc>, revision: &str) -> String {
        let mut key = when.format(TIMESTAMP_FORMAT).to_string();
        if let Some((last, _)) = self.records.last_key_value() {
            if *last >= key {
                key = match parse_timestamp(last) {
                    Some(last_at) => (last_at + chrono::Duration::milliseconds(1))
                        .format(TIMESTAMP_FORMAT)
                        .to_string(),
                    // Hand-edited key that does not parse: any extension
                    // of it sorts strictly after.
                    None => format!("{last}0"),
                };
            }
        }
        self.records.insert(key.clone(), revision.to_string());
        key
    }

    /// Persist the full mapping atomically: write to a temp file in the
    /// same directory, then rename over the target.
    pub fn save(&self, path: &Path) -> GitriolResult<()> {
        let dir = path.parent().unwrap_or(Path::new("."));
        fs::create_dir_all(dir)?;

        let content = serde_yaml_ng::to_string(&self.records)?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.persist(path).map_err(|e| GitriolError::Io(e.error))?;
        Ok(())
    }

    /// Records in ascending timestamp order.
    pub fn records(&self) -> Vec<DeploymentRecord> {
        self.records
            .iter()
            .map(|(timestamp, revision)| DeploymentRecord {
                timestamp: timestamp.clone(),
                revision: revision.clone(),
            })
            .collect()
    }

    /// Records in descending timestamp order (history listing).
    pub fn records_desc(&self) -> Vec<DeploymentRecord> {
        let mut records = self.records();
        records.reverse();
        records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Resolve a revert request to a recorded revision. Never mutates
    /// the log; the result feeds the normal deploy pipeline.
    pub fn revert_target(&self, spec: &RevertSpec) -> GitriolResult<&str> {
        match spec {
            RevertSpec::Steps(n) => {
                let records = &self.records;
                // N=0 is the record just before the current one.
                let index = records
                    .len()
                    .checked_sub(2)
                    .and_then(|i| i.checked_sub(*n))
                    .ok_or_else(|| GitriolError::NothingToRevert {
                        request: n.to_string(),
                    })?;
                Ok(records.values().nth(index).expect("index in range"))
            }
            RevertSpec::Before(date) => {
                let mut target = None;
                for (timestamp, revision) in &self.records {
                    match parse_timestamp(timestamp) {
                        Some(recorded) if recorded < *date => target = Some(revision.as_str()),
                        _ => break,
                    }
                }
                target.ok_or_else(|| GitriolError::NothingToRevert {
                    request: date.to_rfc3339(),
                })
            }
        }
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse an operator-supplied date: RFC-3339, `YYYY-MM-DD HH:MM:SS`,
/// `YYYY-MM-DDTHH:MM:SS`, or a bare `YYYY-MM-DD` (midnight). Naive
/// forms are read as UTC.
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_hms_opt(0, 0, 0).expect("midnight is valid").and_utc())
}
