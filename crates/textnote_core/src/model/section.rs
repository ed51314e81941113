//! Section and content item model.
//!
//! # Responsibility
//! - Hold the ordered content items of one named section.
//! - Render a section's name line and content body as text.
//!
//! # Invariants
//! - Every rendered content item ends with exactly one `\n` added when the
//!   item text does not already end in a newline.
//! - `sort_contents` is stable, so items sharing a header keep their
//!   relative order.

/// One `(header, text)` unit of section content.
///
/// An empty `header` marks a plain note entry. Archived entries carry the
/// formatted source date line as their header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentItem {
    /// Full item header line, e.g. `[2020-12-19]`. Empty for plain notes.
    pub header: String,
    /// Body text, may contain embedded newlines.
    pub text: String,
}

impl ContentItem {
    /// Creates a plain (headerless) content item.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            header: String::new(),
            text: text.into(),
        }
    }

    /// Creates a content item tagged with a header line.
    pub fn with_header(header: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            text: text.into(),
        }
    }

    fn render(&self) -> String {
        if self.header.is_empty() {
            self.text.clone()
        } else {
            format!("{}\n{}", self.header, self.text)
        }
    }
}

/// Named, ordered list of content items within a note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    name: String,
    contents: Vec<ContentItem>,
}

impl Section {
    /// Creates an empty section.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_contents(name, Vec::new())
    }

    /// Creates a section holding `contents` in the given order.
    pub fn with_contents(name: impl Into<String>, contents: Vec<ContentItem>) -> Self {
        Self {
            name: name.into(),
            contents,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contents(&self) -> &[ContentItem] {
        &self.contents
    }

    /// Appends items after the existing contents.
    pub fn extend_contents<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = ContentItem>,
    {
        self.contents.extend(items);
    }

    /// Replaces all contents.
    pub fn set_contents(&mut self, contents: Vec<ContentItem>) {
        self.contents = contents;
    }

    /// Clears all contents, leaving the section itself in place.
    pub fn delete_contents(&mut self) {
        self.contents.clear();
    }

    /// Stable sort of contents by header string, ascending.
    pub fn sort_contents(&mut self) {
        self.contents.sort_by(|a, b| a.header.cmp(&b.header));
    }

    /// Concatenates the text of every item, ignoring headers.
    pub fn flattened_text(&self) -> String {
        self.contents.iter().map(|item| item.text.as_str()).collect()
    }

    /// Renders the marker line `prefix + name + suffix + "\n"`.
    pub fn name_string(&self, prefix: &str, suffix: &str) -> String {
        format!("{prefix}{}{suffix}\n", self.name)
    }

    /// Renders every content item in order, each terminated by a newline.
    pub fn content_string(&self) -> String {
        let mut out = String::new();
        for item in &self.contents {
            let rendered = item.render();
            out.push_str(&rendered);
            if !rendered.ends_with('\n') {
                out.push('\n');
            }
        }
        out
    }
}
