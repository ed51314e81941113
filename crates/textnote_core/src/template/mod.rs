//! Daily note document: fixed sections, parse and render.
//!
//! # Responsibility
//! - Build a note whose section set and order come from configuration.
//! - Load section contents from note text and render notes back to text.
//! - Copy, move and clear section contents between notes.
//!
//! # Invariants
//! - Sections are created once in `Opts::section.names` order; only their
//!   contents change afterwards.
//! - `section_index` maps every section name to its position in `sections`.
//! - Loading never invents a section: unknown names are a parse error.

mod archive;
mod parse;

pub use archive::MonthArchiveTemplate;

use crate::config::{FileOpts, Opts};
use crate::model::section::Section;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub type TemplateResult<T> = Result<T, TemplateError>;

/// Parse, lookup and stream errors for note documents.
#[derive(Debug)]
pub enum TemplateError {
    /// Named section is not part of this document.
    SectionNotFound(String),
    /// Note text contains a section marker for an unconfigured section.
    UndefinedSection(String),
    /// Note text has no header line.
    MalformedHeader,
    /// Section prefix/suffix cannot form a valid marker pattern.
    InvalidSectionPattern(String),
    /// Reader or writer failure.
    Io(std::io::Error),
}

impl Display for TemplateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SectionNotFound(name) => write!(f, "section [{name}] not found"),
            Self::UndefinedSection(name) => write!(f, "cannot load undefined section [{name}]"),
            Self::MalformedHeader => write!(f, "failed to parse header"),
            Self::InvalidSectionPattern(details) => {
                write!(f, "invalid section prefix or suffix: {details}")
            }
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TemplateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for TemplateError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Read access to named sections.
pub trait SectionGettable {
    fn section(&self, name: &str) -> TemplateResult<&Section>;
}

/// Section access plus the date the sections belong to.
pub trait DateSectionGettable: SectionGettable {
    fn date(&self) -> NaiveDate;
}

/// One day's note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    opts: Opts,
    date: NaiveDate,
    sections: Vec<Section>,
    section_index: HashMap<String, usize>,
}

impl Template {
    /// Creates an empty note with one section per configured name.
    pub fn new(opts: &Opts, date: NaiveDate) -> Self {
        let sections: Vec<Section> = opts.section.names.iter().map(Section::new).collect();
        let section_index = opts
            .section
            .names
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.clone(), idx))
            .collect();
        Self {
            opts: opts.clone(),
            date,
            sections,
            section_index,
        }
    }

    pub fn opts(&self) -> &Opts {
        &self.opts
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Sections in configuration order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Line an editor should open the note at.
    pub fn file_cursor_line(&self) -> usize {
        self.opts.file.cursor_line
    }

    /// `<app_dir>/<date>.<ext>`, omitting the dot when `ext` is empty.
    pub fn file_path(&self) -> PathBuf {
        let mut name = self.date.format(&self.opts.file.time_format).to_string();
        if !self.opts.file.ext.is_empty() {
            name.push('.');
            name.push_str(&self.opts.file.ext);
        }
        self.opts.app_dir.join(name)
    }

    /// Mutable access to one section.
    pub fn section_mut(&mut self, name: &str) -> TemplateResult<&mut Section> {
        let idx = self.position(name)?;
        Ok(&mut self.sections[idx])
    }

    /// Appends the source's items for `name` after this note's items.
    pub fn copy_section_contents(
        &mut self,
        src: &dyn SectionGettable,
        name: &str,
    ) -> TemplateResult<()> {
        let incoming = src.section(name)?.contents().to_vec();
        self.section_mut(name)?.extend_contents(incoming);
        Ok(())
    }

    /// Clears one section's items.
    pub fn delete_section_contents(&mut self, name: &str) -> TemplateResult<()> {
        self.section_mut(name)?.delete_contents();
        Ok(())
    }

    /// Parses note text into this note's sections.
    ///
    /// Sections absent from the text keep their current contents.
    ///
    /// # Errors
    /// - `MalformedHeader` when non-empty text has no header line.
    /// - `UndefinedSection` when the text names a section that is not
    ///   configured.
    pub fn load_str(&mut self, raw: &str) -> TemplateResult<()> {
        for section in parse::parse_sections(raw, &self.opts)? {
            let idx = self
                .section_index
                .get(section.name())
                .copied()
                .ok_or_else(|| TemplateError::UndefinedSection(section.name().to_string()))?;
            self.sections[idx] = section;
        }
        Ok(())
    }

    /// Renders the note as text.
    ///
    /// Empty sections are padded with `section.trailing_newlines` blank
    /// lines so every section spans a predictable number of lines.
    pub fn render(&self) -> String {
        let mut out = render_header(
            &self.opts.header.prefix,
            &self.date.format(&self.opts.header.time_format).to_string(),
            &self.opts.header.suffix,
            self.opts.header.trailing_newlines,
        );
        for section in &self.sections {
            out.push_str(&section.name_string(&self.opts.section.prefix, &self.opts.section.suffix));
            let body = section.content_string();
            if body.is_empty() {
                out.push_str(&"\n".repeat(self.opts.section.trailing_newlines));
            } else {
                out.push_str(&body);
            }
        }
        out
    }

    fn position(&self, name: &str) -> TemplateResult<usize> {
        self.section_index
            .get(name)
            .copied()
            .ok_or_else(|| TemplateError::SectionNotFound(name.to_string()))
    }
}

impl SectionGettable for Template {
    fn section(&self, name: &str) -> TemplateResult<&Section> {
        let idx = self.position(name)?;
        Ok(&self.sections[idx])
    }
}

impl DateSectionGettable for Template {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Copies `name` from `src` into `tgt`, then clears it in `src`.
pub fn move_section_contents(src: &mut Template, tgt: &mut Template, name: &str) -> TemplateResult<()> {
    tgt.copy_section_contents(&*src, name)?;
    src.delete_section_contents(name)
}

/// Parses a daily note file name back into its date.
///
/// Accepts `<date>.<ext>`, `<date>.` and bare `<date>`. Returns `None` for
/// anything the file time format cannot parse, including archive files.
pub fn parse_template_file_name(file_name: &str, opts: &FileOpts) -> Option<NaiveDate> {
    let stem = if opts.ext.is_empty() {
        file_name
    } else {
        file_name
            .strip_suffix(&format!(".{}", opts.ext))
            .unwrap_or(file_name)
    };
    let stem = stem.strip_suffix('.').unwrap_or(stem);
    NaiveDate::parse_from_str(stem, &opts.time_format).ok()
}

fn render_header(prefix: &str, formatted_date: &str, suffix: &str, trailing_newlines: usize) -> String {
    format!(
        "{prefix}{formatted_date}{suffix}\n{}",
        "\n".repeat(trailing_newlines)
    )
}
