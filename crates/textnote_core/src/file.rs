//! File collaborators for note documents.
//!
//! # Responsibility
//! - Define the load/write/path contract shared by daily notes and month
//!   archives (`ReadWriteable`).
//! - Define the read/overwrite/exists contract the archiver consumes
//!   (`ReadWriter`) and its `std::fs` implementation.
//!
//! # Invariants
//! - `overwrite` truncates existing file contents.
//! - Every error carries the path it happened on.

use crate::template::{MonthArchiveTemplate, Template, TemplateError};
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Read, Write};
use std::path::PathBuf;

pub type FileResult<T> = Result<T, FileError>;

/// File operation failure with path context.
#[derive(Debug)]
pub enum FileError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Template {
        path: PathBuf,
        source: TemplateError,
    },
}

impl Display for FileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "[{}]: {source}", path.display()),
            Self::Template { path, source } => write!(f, "[{}]: {source}", path.display()),
        }
    }
}

impl Error for FileError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Template { source, .. } => Some(source),
        }
    }
}

/// A document that can be loaded from and written to a file.
pub trait ReadWriteable {
    fn load(&mut self, reader: &mut dyn Read) -> Result<(), TemplateError>;
    fn write(&self, writer: &mut dyn Write) -> Result<(), TemplateError>;
    fn file_path(&self) -> PathBuf;
}

impl ReadWriteable for Template {
    fn load(&mut self, reader: &mut dyn Read) -> Result<(), TemplateError> {
        let mut raw = String::new();
        reader.read_to_string(&mut raw)?;
        self.load_str(&raw)
    }

    fn write(&self, writer: &mut dyn Write) -> Result<(), TemplateError> {
        writer.write_all(self.render().as_bytes())?;
        Ok(())
    }

    fn file_path(&self) -> PathBuf {
        Template::file_path(self)
    }
}

impl ReadWriteable for MonthArchiveTemplate {
    fn load(&mut self, reader: &mut dyn Read) -> Result<(), TemplateError> {
        let mut raw = String::new();
        reader.read_to_string(&mut raw)?;
        self.load_str(&raw)
    }

    fn write(&self, writer: &mut dyn Write) -> Result<(), TemplateError> {
        writer.write_all(self.render().as_bytes())?;
        Ok(())
    }

    fn file_path(&self) -> PathBuf {
        MonthArchiveTemplate::file_path(self)
    }
}

/// File operations executed against `ReadWriteable` documents.
pub trait ReadWriter {
    /// Loads the document from its file.
    fn read(&self, doc: &mut dyn ReadWriteable) -> FileResult<()>;
    /// Writes the document to its file, replacing any existing contents.
    fn overwrite(&self, doc: &dyn ReadWriteable) -> FileResult<()>;
    /// Returns whether the document's file exists.
    fn exists(&self, doc: &dyn ReadWriteable) -> bool;

    /// Writes the document only when its file does not exist yet.
    fn write_if_not_exists(&self, doc: &dyn ReadWriteable) -> FileResult<()> {
        if self.exists(doc) {
            return Ok(());
        }
        self.overwrite(doc)
    }
}

impl<T: ReadWriter + ?Sized> ReadWriter for &T {
    fn read(&self, doc: &mut dyn ReadWriteable) -> FileResult<()> {
        (**self).read(doc)
    }

    fn overwrite(&self, doc: &dyn ReadWriteable) -> FileResult<()> {
        (**self).overwrite(doc)
    }

    fn exists(&self, doc: &dyn ReadWriteable) -> bool {
        (**self).exists(doc)
    }
}

/// `std::fs` backed `ReadWriter`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileReadWriter;

impl FileReadWriter {
    pub fn new() -> Self {
        Self
    }
}

impl ReadWriter for FileReadWriter {
    fn read(&self, doc: &mut dyn ReadWriteable) -> FileResult<()> {
        let path = doc.file_path();
        let mut file = File::open(&path).map_err(|source| FileError::Io {
            path: path.clone(),
            source,
        })?;
        doc.load(&mut file)
            .map_err(|source| FileError::Template { path: path.clone(), source })?;
        debug!("event=file_read module=file status=ok path={}", path.display());
        Ok(())
    }

    fn overwrite(&self, doc: &dyn ReadWriteable) -> FileResult<()> {
        let path = doc.file_path();
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(|source| FileError::Io {
                path: path.clone(),
                source,
            })?;
        let mut writer = BufWriter::new(file);
        doc.write(&mut writer)
            .map_err(|source| FileError::Template { path: path.clone(), source })?;
        writer.flush().map_err(|source| FileError::Io {
            path: path.clone(),
            source,
        })?;
        debug!("event=file_write module=file status=ok path={}", path.display());
        Ok(())
    }

    fn exists(&self, doc: &dyn ReadWriteable) -> bool {
        doc.file_path().exists()
    }
}
