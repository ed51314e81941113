//! Month archive document.
//!
//! # Responsibility
//! - Fold one day's section contents into a month-level note, tagging each
//!   entry with its source date.
//! - Merge two archives of the same month.
//! - Render entries in chronological order with blank padding removed.
//!
//! # Invariants
//! - The archive date is always the first day of its month.
//! - Rendering sorts items by header string; item headers use a zero-padded
//!   date format, so string order is date order.
//! - Archiving a section with no text never appends an item.

use super::{render_header, DateSectionGettable, SectionGettable, Template, TemplateResult};
use crate::config::Opts;
use crate::model::section::{ContentItem, Section};
use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;

static BLANK_LINES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{2,}").expect("valid blank lines regex"));

/// One month's consolidated archive of daily notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthArchiveTemplate {
    inner: Template,
}

impl MonthArchiveTemplate {
    /// Creates an empty archive for the month containing `date`.
    pub fn new(opts: &Opts, date: NaiveDate) -> Self {
        let first_of_month = date.with_day(1).unwrap_or(date);
        Self {
            inner: Template::new(opts, first_of_month),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.inner.date()
    }

    pub fn sections(&self) -> &[Section] {
        self.inner.sections()
    }

    /// Month key used for lookup and file naming, e.g. `Dec2020`.
    pub fn month_key(&self) -> String {
        self.inner
            .date()
            .format(&self.inner.opts().archive.month_time_format)
            .to_string()
    }

    /// `<app_dir>/<archive prefix><month>.<ext>`.
    pub fn file_path(&self) -> PathBuf {
        let opts = self.inner.opts();
        let mut name = format!("{}{}", opts.archive.file_prefix, self.month_key());
        if !opts.file.ext.is_empty() {
            name.push('.');
            name.push_str(&opts.file.ext);
        }
        opts.app_dir.join(name)
    }

    /// Appends the source section's flattened text as one dated item.
    ///
    /// Existing headers in the source are discarded; the source date is the
    /// only provenance recorded. Text made only of newlines is skipped.
    ///
    /// # Errors
    /// - `SectionNotFound` when either side lacks `name`.
    pub fn archive_section_contents(
        &mut self,
        src: &dyn DateSectionGettable,
        name: &str,
    ) -> TemplateResult<()> {
        let header = self.content_header(src.date());
        let text = src.section(name)?.flattened_text();
        let target = self.inner.section_mut(name)?;
        if text.chars().all(|c| c == '\n') {
            return Ok(());
        }
        target.extend_contents([ContentItem::with_header(header, text)]);
        Ok(())
    }

    /// Appends every item of `other` after this archive's items, section by
    /// section.
    pub fn merge(&mut self, other: &MonthArchiveTemplate) -> TemplateResult<()> {
        let names: Vec<String> = self
            .inner
            .sections()
            .iter()
            .map(|section| section.name().to_string())
            .collect();
        for name in names {
            let incoming = other.section(&name)?.contents().to_vec();
            self.inner.section_mut(&name)?.extend_contents(incoming);
        }
        Ok(())
    }

    /// Parses archive text into this archive's sections.
    pub fn load_str(&mut self, raw: &str) -> TemplateResult<()> {
        self.inner.load_str(raw)
    }

    /// Renders the archive with items sorted by date and blank lines
    /// collapsed.
    pub fn render(&self) -> String {
        let opts = self.inner.opts();
        let mut out = render_header(
            &opts.archive.header_prefix,
            &self.month_key(),
            &opts.archive.header_suffix,
            opts.header.trailing_newlines,
        );
        for section in self.inner.sections() {
            let mut sorted = section.clone();
            sorted.sort_contents();
            out.push_str(&sorted.name_string(&opts.section.prefix, &opts.section.suffix));
            out.push_str(&BLANK_LINES_RE.replace_all(&sorted.content_string(), "\n"));
            out.push_str(&"\n".repeat(opts.section.trailing_newlines));
        }
        out
    }

    fn content_header(&self, date: NaiveDate) -> String {
        let archive = &self.inner.opts().archive;
        format!(
            "{}{}{}",
            archive.section_content_prefix,
            date.format(&archive.section_content_time_format),
            archive.section_content_suffix
        )
    }
}

impl SectionGettable for MonthArchiveTemplate {
    fn section(&self, name: &str) -> TemplateResult<&Section> {
        self.inner.section(name)
    }
}

#[cfg(test)]
mod tests {
    use super::MonthArchiveTemplate;
    use crate::config::Opts;
    use crate::model::section::ContentItem;
    use crate::template::{SectionGettable, Template};
    use chrono::NaiveDate;
    use std::path::PathBuf;

    fn opts() -> Opts {
        let mut opts = Opts::with_app_dir("notes");
        opts.archive.header_prefix = "ARCHIVEPREFIX ".to_string();
        opts.archive.header_suffix = " ARCHIVESUFFIX".to_string();
        opts.section.prefix = "_p_".to_string();
        opts.section.suffix = "_q_".to_string();
        opts.section.names = vec![
            "SectionA".to_string(),
            "SectionB".to_string(),
            "SectionC".to_string(),
        ];
        opts
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 12, d).unwrap()
    }

    fn daily(opts: &Opts, date: NaiveDate, section: &str, text: &str) -> Template {
        let mut template = Template::new(opts, date);
        template
            .section_mut(section)
            .unwrap()
            .set_contents(vec![ContentItem::new(text)]);
        template
    }

    #[test]
    fn date_is_normalized_to_first_of_month() {
        let archive = MonthArchiveTemplate::new(&opts(), day(20));
        assert_eq!(archive.date(), day(1));
        assert_eq!(archive.month_key(), "Dec2020");
        assert_eq!(
            archive.file_path(),
            PathBuf::from("notes/archive-Dec2020.txt")
        );
    }

    #[test]
    fn archiving_tags_flattened_text_with_source_date() {
        let opts = opts();
        let mut src = Template::new(&opts, day(19));
        src.section_mut("SectionA").unwrap().set_contents(vec![
            ContentItem::with_header("[2019-01-01]", "one\n"),
            ContentItem::new("two\n"),
        ]);
        let mut archive = MonthArchiveTemplate::new(&opts, day(19));

        archive.archive_section_contents(&src, "SectionA").unwrap();

        assert_eq!(
            archive.section("SectionA").unwrap().contents(),
            &[ContentItem::with_header("[2020-12-19]", "one\ntwo\n")]
        );
    }

    #[test]
    fn archiving_empty_section_is_noop() {
        let opts = opts();
        let src = Template::new(&opts, day(19));
        let mut archive = MonthArchiveTemplate::new(&opts, day(19));
        archive.archive_section_contents(&src, "SectionB").unwrap();
        assert!(archive.section("SectionB").unwrap().contents().is_empty());
    }

    #[test]
    fn archiving_padding_only_section_is_noop() {
        let opts = opts();
        let src = daily(&opts, day(19), "SectionB", "\n\n\n");
        let mut archive = MonthArchiveTemplate::new(&opts, day(19));
        archive.archive_section_contents(&src, "SectionB").unwrap();
        assert!(archive.section("SectionB").unwrap().contents().is_empty());
    }

    #[test]
    fn archiving_unknown_section_fails() {
        let opts = opts();
        let src = Template::new(&opts, day(19));
        let mut archive = MonthArchiveTemplate::new(&opts, day(19));
        assert!(archive.archive_section_contents(&src, "Missing").is_err());
    }

    #[test]
    fn render_sorts_by_date_and_collapses_blank_lines() {
        let opts = opts();
        let mut archive = MonthArchiveTemplate::new(&opts, day(1));
        for (d, text) in [(19, "text1b\n\n\n"), (17, "text1a\n")] {
            let src = daily(&opts, day(d), "SectionA", text);
            archive.archive_section_contents(&src, "SectionA").unwrap();
        }
        let src = daily(&opts, day(18), "SectionC", "text3a");
        archive.archive_section_contents(&src, "SectionC").unwrap();

        let expected = "ARCHIVEPREFIX Dec2020 ARCHIVESUFFIX\n\n\
_p_SectionA_q_\n[2020-12-17]\ntext1a\n[2020-12-19]\ntext1b\n\n\n\n\
_p_SectionB_q_\n\n\n\n\
_p_SectionC_q_\n[2020-12-18]\ntext3a\n\n\n\n";
        assert_eq!(archive.render(), expected);
    }

    #[test]
    fn render_then_load_is_stable() {
        let opts = opts();
        let mut archive = MonthArchiveTemplate::new(&opts, day(1));
        let src = daily(&opts, day(3), "SectionA", "entry\n\n\n\n");
        archive.archive_section_contents(&src, "SectionA").unwrap();
        let rendered = archive.render();

        let mut reloaded = MonthArchiveTemplate::new(&opts, day(1));
        reloaded.load_str(&rendered).unwrap();
        assert_eq!(reloaded.render(), rendered);
    }

    #[test]
    fn merge_appends_other_items() {
        let opts = opts();
        let mut first = MonthArchiveTemplate::new(&opts, day(1));
        first
            .archive_section_contents(&daily(&opts, day(19), "SectionA", "new\n"), "SectionA")
            .unwrap();
        let mut second = MonthArchiveTemplate::new(&opts, day(1));
        second
            .archive_section_contents(&daily(&opts, day(15), "SectionA", "old\n"), "SectionA")
            .unwrap();

        let mut forward = first.clone();
        forward.merge(&second).unwrap();
        let mut backward = second.clone();
        backward.merge(&first).unwrap();

        assert_eq!(forward.section("SectionA").unwrap().contents().len(), 2);
        assert_eq!(forward.render(), backward.render());
        let rendered = forward.render();
        let old_at = rendered.find("[2020-12-15]").unwrap();
        let new_at = rendered.find("[2020-12-19]").unwrap();
        assert!(old_at < new_at);
    }
}
