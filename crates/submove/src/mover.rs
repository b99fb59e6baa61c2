//! Moves subs whose sort index falls in a range from one directory to another.
//!
//! Entries are processed one at a time in file-name order, so the report is
//! deterministic. Each match is copied first and the original removed only
//! after the copy succeeded; a failure on one entry is recorded and the run
//! continues with the next.
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::sortindex::SortSource;

#[derive(Debug, Error)]
pub enum MoveError {
    #[error("failed to list source directory {path}: {source}")]
    Source { path: PathBuf, source: io::Error },

    #[error("invalid sort range: lower bound {min} is not below upper bound {max}")]
    EmptyRange { min: i64, max: i64 },

    #[error("source and destination are the same directory: {path}")]
    SameDirectory { path: PathBuf },
}

/// Half-open sort range `(min_exclusive, max_inclusive]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortRange {
    pub min_exclusive: i64,
    pub max_inclusive: i64,
}

impl Default for SortRange {
    fn default() -> Self {
        Self {
            min_exclusive: 200,
            max_inclusive: 300,
        }
    }
}

impl SortRange {
    pub fn new(min_exclusive: i64, max_inclusive: i64) -> Self {
        Self {
            min_exclusive,
            max_inclusive,
        }
    }

    pub fn contains(&self, value: i64) -> bool {
        value > self.min_exclusive && value <= self.max_inclusive
    }
}

impl fmt::Display for SortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}]", self.min_exclusive, self.max_inclusive)
    }
}

#[derive(Debug, Clone)]
pub struct MoveOptions {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub range: SortRange,
    pub dry_run: bool,
}

impl Default for MoveOptions {
    fn default() -> Self {
        Self {
            source: PathBuf::from("subs"),
            destination: PathBuf::from("subs2"),
            range: SortRange::default(),
            dry_run: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NoSortIndex,
    OutOfRange(i64),
}

#[derive(Debug, Clone)]
pub struct MovedEntry {
    pub sort: i64,
    pub from: PathBuf,
    pub to: PathBuf,
}

#[derive(Debug, Clone)]
pub struct SkippedEntry {
    pub path: PathBuf,
    pub reason: SkipReason,
}

#[derive(Debug, Clone)]
pub struct FailedEntry {
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct MoveReport {
    pub scanned: usize,
    pub dry_run: bool,
    pub moved: Vec<MovedEntry>,
    pub skipped: Vec<SkippedEntry>,
    pub failed: Vec<FailedEntry>,
}

impl MoveReport {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

pub fn move_matching(options: &MoveOptions) -> Result<MoveReport, MoveError> {
    if options.range.min_exclusive >= options.range.max_inclusive {
        return Err(MoveError::EmptyRange {
            min: options.range.min_exclusive,
            max: options.range.max_inclusive,
        });
    }

    let source_err = |source: io::Error| MoveError::Source {
        path: options.source.clone(),
        source,
    };
    let source_dir = fs::canonicalize(&options.source).map_err(source_err)?;
    if fs::canonicalize(&options.destination).is_ok_and(|dest| dest == source_dir) {
        return Err(MoveError::SameDirectory { path: source_dir });
    }

    let mut entries = fs::read_dir(&options.source)
        .map_err(source_err)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<io::Result<Vec<_>>>()
        .map_err(source_err)?;
    entries.sort();

    let mut report = MoveReport {
        dry_run: options.dry_run,
        ..MoveReport::default()
    };

    for path in entries {
        report.scanned += 1;
        let kind = SortSource::detect(&path);
        let sort = match kind.read(&path) {
            Ok(Some(value)) => value,
            Ok(None) => {
                debug!(path = %path.display(), "no sort index; leaving in place");
                report.skipped.push(SkippedEntry {
                    path,
                    reason: SkipReason::NoSortIndex,
                });
                continue;
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to read sub");
                report.failed.push(FailedEntry {
                    path,
                    error: format!("read failed: {err}"),
                });
                continue;
            }
        };

        if !options.range.contains(sort) {
            debug!(path = %path.display(), sort, range = %options.range, "sort index out of range");
            report.skipped.push(SkippedEntry {
                path,
                reason: SkipReason::OutOfRange(sort),
            });
            continue;
        }

        let Some(name) = path.file_name() else {
            warn!(path = %path.display(), "entry has no file name");
            report.failed.push(FailedEntry {
                path,
                error: "entry has no file name".to_string(),
            });
            continue;
        };
        let target = options.destination.join(name);
        if target == path {
            report.failed.push(FailedEntry {
                path,
                error: "destination is the entry itself".to_string(),
            });
            continue;
        }

        if options.dry_run {
            info!(from = %path.display(), to = %target.display(), sort, "sub would be moved (dry-run)");
            report.moved.push(MovedEntry {
                sort,
                from: path,
                to: target,
            });
            continue;
        }

        if let Err(err) = relocate(kind, &path, &target) {
            warn!(from = %path.display(), to = %target.display(), error = %err, "failed to move sub");
            report.failed.push(FailedEntry { path, error: err });
            continue;
        }

        info!(from = %path.display(), to = %target.display(), sort, "moved sub");
        report.moved.push(MovedEntry {
            sort,
            from: path,
            to: target,
        });
    }

    info!(
        scanned = report.scanned,
        moved = report.moved.len(),
        skipped = report.skipped.len(),
        failed = report.failed.len(),
        "sub move finished"
    );
    Ok(report)
}

fn relocate(kind: SortSource, from: &Path, to: &Path) -> Result<(), String> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)
            .map_err(|err| format!("failed to create {}: {err}", parent.display()))?;
    }

    let copied = if kind == SortSource::Pack {
        copy_dir_recursive(from, to)
    } else {
        fs::copy(from, to).map(|_| ())
    };
    copied.map_err(|err| format!("copy failed: {err}"))?;

    let removed = if kind == SortSource::Pack {
        fs::remove_dir_all(from)
    } else {
        fs::remove_file(from)
    };
    removed.map_err(|err| format!("copied but failed to remove source: {err}"))
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let entry_type = entry.file_type()?;
        let target = dst.join(entry.file_name());
        if entry_type.is_dir() {
            copy_dir_recursive(&entry.path(), &target)?;
        } else if entry_type.is_file() {
            fs::copy(entry.path(), &target)?;
        } else {
            warn!(path = %entry.path().display(), "skipping unsupported entry type inside pack");
        }
    }
    Ok(())
}
