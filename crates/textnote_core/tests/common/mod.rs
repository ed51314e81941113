#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use textnote_core::{FileError, FileResult, Opts, ReadWriteable, ReadWriter};

/// Options shared by integration tests; changing them affects expected text.
pub fn test_opts() -> Opts {
    let mut opts = Opts::with_app_dir("my/app/dir");
    opts.header.prefix = "-^-".to_string();
    opts.header.suffix = "-v-".to_string();
    opts.section.prefix = "_p_".to_string();
    opts.section.suffix = "_q_".to_string();
    opts.section.names = vec![
        "TestSectionA".to_string(),
        "TestSectionB".to_string(),
        "TestSectionC".to_string(),
    ];
    opts.archive.header_prefix = "ARCHIVEPREFIX ".to_string();
    opts.archive.header_suffix = " ARCHIVESUFFIX".to_string();
    opts.validate().expect("test options should validate");
    opts
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn midnight(y: i32, m: u32, d: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(0, 0, 0).unwrap()
}

/// In-memory file store keyed by document path.
#[derive(Default)]
pub struct MemoryReadWriter {
    files: RefCell<HashMap<PathBuf, String>>,
    fail_writes: Cell<bool>,
}

impl MemoryReadWriter {
    pub fn failing_writes() -> Self {
        Self {
            fail_writes: Cell::new(true),
            ..Self::default()
        }
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    pub fn put(&self, path: impl Into<PathBuf>, text: impl Into<String>) {
        self.files.borrow_mut().insert(path.into(), text.into());
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files.borrow().get(path.as_ref()).cloned()
    }
}

impl ReadWriter for MemoryReadWriter {
    fn read(&self, doc: &mut dyn ReadWriteable) -> FileResult<()> {
        let path = doc.file_path();
        let files = self.files.borrow();
        let Some(raw) = files.get(&path) else {
            return Err(FileError::Io {
                path,
                source: io::Error::from(io::ErrorKind::NotFound),
            });
        };
        doc.load(&mut raw.as_bytes())
            .map_err(|source| FileError::Template {
                path: path.clone(),
                source,
            })
    }

    fn overwrite(&self, doc: &dyn ReadWriteable) -> FileResult<()> {
        let path = doc.file_path();
        if self.fail_writes.get() {
            return Err(FileError::Io {
                path,
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            });
        }
        let mut buf = Vec::new();
        doc.write(&mut buf).map_err(|source| FileError::Template {
            path: path.clone(),
            source,
        })?;
        let text = String::from_utf8(buf).expect("rendered text is utf-8");
        self.files.borrow_mut().insert(path, text);
        Ok(())
    }

    fn exists(&self, doc: &dyn ReadWriteable) -> bool {
        self.files.borrow().contains_key(&doc.file_path())
    }
}
