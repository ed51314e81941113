//! Core logic for dated plain-text notes and their month archives.
//! This crate owns the note text format and the archive consolidation rules.

pub mod archive;
pub mod config;
pub mod file;
pub mod logging;
pub mod model;
pub mod template;

pub use archive::{list_daily_note_dates, AddOutcome, ArchiveError, ArchiveResult, Archiver};
pub use config::{ensure_app_dir, load_or_create, ConfigError, Opts};
pub use file::{FileError, FileReadWriter, FileResult, ReadWriteable, ReadWriter};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::section::{ContentItem, Section};
pub use template::{
    move_section_contents, parse_template_file_name, DateSectionGettable, MonthArchiveTemplate,
    SectionGettable, Template, TemplateError, TemplateResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
