//! Note text parser.
//!
//! # Responsibility
//! - Split note text into section spans at section marker lines.
//! - Split each span into content items at dated item header lines.
//!
//! # Invariants
//! - A span starts at its marker line (inclusive) and ends at the next
//!   marker line (exclusive) or the end of the text.
//! - A line is an item header only when the text between the configured
//!   content prefix/suffix parses as a date under the item time format.
//! - A section whose items all have newline-only bodies parses as a section
//!   with no items, whatever their headers.

use super::{TemplateError, TemplateResult};
use crate::config::Opts;
use crate::model::section::{ContentItem, Section};
use chrono::NaiveDate;
use regex::Regex;

/// Parses every section span found after the header line of `raw`.
pub(crate) fn parse_sections(raw: &str, opts: &Opts) -> TemplateResult<Vec<Section>> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    let Some((_header, body)) = raw.split_once('\n') else {
        return Err(TemplateError::MalformedHeader);
    };

    let marker = section_marker_regex(&opts.section.prefix, &opts.section.suffix)?;
    let starts: Vec<usize> = marker.find_iter(body).map(|m| m.start()).collect();

    let mut sections = Vec::with_capacity(starts.len());
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(body.len());
        sections.push(parse_section(&body[start..end], opts));
    }
    Ok(sections)
}

fn section_marker_regex(prefix: &str, suffix: &str) -> TemplateResult<Regex> {
    let pattern = format!(
        "(?m)^{}[A-Za-z]+{}$",
        regex::escape(prefix),
        regex::escape(suffix)
    );
    Regex::new(&pattern).map_err(|err| TemplateError::InvalidSectionPattern(err.to_string()))
}

fn parse_section(span: &str, opts: &Opts) -> Section {
    let mut lines = span.split('\n');
    let name_line = lines.next().unwrap_or_default();
    let name = strip_prefix_suffix(name_line, &opts.section.prefix, &opts.section.suffix);

    let item_header = ItemHeaderMatcher {
        prefix: &opts.archive.section_content_prefix,
        suffix: &opts.archive.section_content_suffix,
        time_format: &opts.archive.section_content_time_format,
    };
    let contents = parse_section_contents(lines, &item_header);

    if is_blank_padding(&contents) {
        return Section::new(name);
    }
    Section::with_contents(name, contents)
}

fn parse_section_contents<'a, I>(lines: I, item_header: &ItemHeaderMatcher<'_>) -> Vec<ContentItem>
where
    I: Iterator<Item = &'a str>,
{
    let mut contents = Vec::new();
    let mut header = String::new();
    let mut body: Vec<&str> = Vec::new();

    for line in lines {
        if !item_header.matches(line) {
            body.push(line);
            continue;
        }
        if !header.is_empty() || !body.is_empty() {
            contents.push(ContentItem::with_header(
                std::mem::take(&mut header),
                body.join("\n"),
            ));
        }
        header = line.to_string();
        body.clear();
    }

    if !body.is_empty() || !header.is_empty() {
        contents.push(ContentItem::with_header(header, body.join("\n")));
    }
    contents
}

/// True when every item body holds nothing but newlines. Headers are not
/// considered, so a dated item with a blank body counts as padding too.
fn is_blank_padding(contents: &[ContentItem]) -> bool {
    contents
        .iter()
        .all(|item| item.text.chars().all(|c| c == '\n'))
}

struct ItemHeaderMatcher<'a> {
    prefix: &'a str,
    suffix: &'a str,
    time_format: &'a str,
}

impl ItemHeaderMatcher<'_> {
    fn matches(&self, line: &str) -> bool {
        let Some(inner) = line
            .strip_prefix(self.prefix)
            .and_then(|rest| rest.strip_suffix(self.suffix))
        else {
            return false;
        };
        NaiveDate::parse_from_str(inner, self.time_format).is_ok()
    }
}

fn strip_prefix_suffix<'a>(line: &'a str, prefix: &str, suffix: &str) -> &'a str {
    let line = line.strip_suffix(suffix).unwrap_or(line);
    line.strip_prefix(prefix).unwrap_or(line)
}
