//! Archive consolidation engine.
//!
//! # Responsibility
//! - Fold daily notes older than `archive.after_days` into one archive per
//!   month.
//! - Merge in-memory archives with archives already on disk and write them.
//! - Discover daily note files in the app directory.
//!
//! # Invariants
//! - A note exactly `after_days * 24h` old is not archived; anything older is.
//! - `write` drops each in-memory archive once it is on disk, so a second
//!   call writes only the archives a failed call left pending.
//! - Re-archiving a daily note that was not deleted appends a duplicate
//!   dated entry. Callers delete `archived_files()` after a successful write.
//!
//! # See also
//! - `textnote archive --delete`

use crate::config::Opts;
use crate::file::{FileError, ReadWriter};
use crate::template::{parse_template_file_name, MonthArchiveTemplate, Template, TemplateError};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use log::{debug, info};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// Archiver failure with the file it concerns.
#[derive(Debug)]
pub enum ArchiveError {
    /// Daily note could not be read.
    Read { path: PathBuf, source: FileError },
    /// A section could not be folded into the month archive.
    Section {
        path: PathBuf,
        section: String,
        source: TemplateError,
    },
    /// Existing archive file could not be read.
    ReadExisting { path: PathBuf, source: FileError },
    /// Existing archive could not be merged.
    Merge { path: PathBuf, source: TemplateError },
    /// Archive file could not be written.
    Write { path: PathBuf, source: FileError },
}

impl Display for ArchiveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => write!(
                f,
                "cannot add unreadable file [{}] to archive: {source}",
                path.display()
            ),
            Self::Section {
                path,
                section,
                source,
            } => write!(
                f,
                "cannot add section [{section}] from [{}] to archive: {source}",
                path.display()
            ),
            Self::ReadExisting { path, source } => write!(
                f,
                "unable to open existing archive file [{}]: {source}",
                path.display()
            ),
            Self::Merge { path, source } => write!(
                f,
                "unable to merge existing archive file [{}]: {source}",
                path.display()
            ),
            Self::Write { path, source } => write!(
                f,
                "failed to write archive file [{}]: {source}",
                path.display()
            ),
        }
    }
}

impl Error for ArchiveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. }
            | Self::ReadExisting { source, .. }
            | Self::Write { source, .. } => Some(source),
            Self::Section { source, .. } | Self::Merge { source, .. } => Some(source),
        }
    }
}

/// Result of offering one daily note to the archiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// Note was folded into its month archive.
    Archived,
    /// Note is not older than `after_days` and was left alone.
    TooRecent,
}

/// Consolidates daily notes into month archives.
pub struct Archiver<R: ReadWriter> {
    opts: Opts,
    rw: R,
    now: NaiveDateTime,
    month_archives: BTreeMap<String, MonthArchiveTemplate>,
    archived_files: Vec<PathBuf>,
}

impl<R: ReadWriter> Archiver<R> {
    /// Creates an archiver measuring note age against `now`.
    pub fn new(opts: &Opts, rw: R, now: NaiveDateTime) -> Self {
        Self {
            opts: opts.clone(),
            rw,
            now,
            month_archives: BTreeMap::new(),
            archived_files: Vec::new(),
        }
    }

    /// Offers the daily note dated `date` for archiving.
    ///
    /// # Errors
    /// - `ArchiveError::Read` when the note cannot be read.
    /// - `ArchiveError::Section` when a configured section cannot be folded.
    pub fn add(&mut self, date: NaiveDateTime) -> ArchiveResult<AddOutcome> {
        let threshold = Duration::days(i64::from(self.opts.archive.after_days));
        if self.now.signed_duration_since(date) <= threshold {
            debug!(
                "event=archive_add module=archive status=skip reason=too_recent date={}",
                date.date()
            );
            return Ok(AddOutcome::TooRecent);
        }

        let mut daily = Template::new(&self.opts, date.date());
        let path = daily.file_path();
        self.rw
            .read(&mut daily)
            .map_err(|source| ArchiveError::Read {
                path: path.clone(),
                source,
            })?;

        let month_key = date.format(&self.opts.archive.month_time_format).to_string();
        let opts = &self.opts;
        let archive = self
            .month_archives
            .entry(month_key)
            .or_insert_with(|| MonthArchiveTemplate::new(opts, date.date()));

        for name in &opts.section.names {
            archive
                .archive_section_contents(&daily, name)
                .map_err(|source| ArchiveError::Section {
                    path: path.clone(),
                    section: name.clone(),
                    source,
                })?;
        }

        debug!(
            "event=archive_add module=archive status=ok path={}",
            path.display()
        );
        self.archived_files.push(path);
        Ok(AddOutcome::Archived)
    }

    /// Writes every month archive, merging with archive files already on
    /// disk. Archives written before a failure stay on disk; the failed
    /// archive and those after it stay pending so `write` can be retried.
    pub fn write(&mut self) -> ArchiveResult<()> {
        let month_keys: Vec<String> = self.month_archives.keys().cloned().collect();
        for month_key in month_keys {
            let Some(pending) = self.month_archives.get(&month_key) else {
                continue;
            };
            let path = pending.file_path();
            let mut archive = pending.clone();
            if self.rw.exists(&archive) {
                let mut existing = MonthArchiveTemplate::new(&self.opts, archive.date());
                self.rw
                    .read(&mut existing)
                    .map_err(|source| ArchiveError::ReadExisting {
                        path: path.clone(),
                        source,
                    })?;
                archive
                    .merge(&existing)
                    .map_err(|source| ArchiveError::Merge {
                        path: path.clone(),
                        source,
                    })?;
            }

            self.rw
                .overwrite(&archive)
                .map_err(|source| ArchiveError::Write {
                    path: path.clone(),
                    source,
                })?;
            self.month_archives.remove(&month_key);
            info!(
                "event=archive_write module=archive status=ok month={} path={}",
                month_key,
                path.display()
            );
        }
        Ok(())
    }

    /// Month keys with pending in-memory archives.
    pub fn month_keys(&self) -> impl Iterator<Item = &str> {
        self.month_archives.keys().map(String::as_str)
    }

    /// Pending in-memory archive for a month key, e.g. `Dec2020`.
    pub fn month_archive(&self, month_key: &str) -> Option<&MonthArchiveTemplate> {
        self.month_archives.get(month_key)
    }

    /// Paths of every daily note folded in by `add`.
    pub fn archived_files(&self) -> &[PathBuf] {
        &self.archived_files
    }
}

/// Returns whether a directory entry name can never be a daily note.
///
/// Hidden files and archive files are skipped.
pub fn is_ignored_file_name(file_name: &str, opts: &Opts) -> bool {
    file_name.starts_with('.') || file_name.starts_with(&opts.archive.file_prefix)
}

/// Lists the dates of every daily note file directly inside `dir`, oldest
/// first.
pub fn list_daily_note_dates(dir: &Path, opts: &Opts) -> std::io::Result<Vec<NaiveDate>> {
    let mut dates = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            continue;
        }
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };
        if is_ignored_file_name(file_name, opts) {
            continue;
        }
        if let Some(date) = parse_template_file_name(file_name, &opts.file) {
            dates.push(date);
        }
    }
    dates.sort();
    Ok(dates)
}
