//! Application options, defaults and validation.
//!
//! # Responsibility
//! - Define every prefix/suffix/time-format/threshold setting used by the
//!   note parser, serializer and archiver.
//! - Load options from `<app_dir>/.config.yml`, creating it from defaults
//!   when missing.
//!
//! # Invariants
//! - Options returned by `load_or_create` have passed `Opts::validate()`.
//! - Section names are unique ASCII-letter words so the section scanner can
//!   find them again after serialization.
//! - Time formats are `strftime` strings; the item-header format must be
//!   zero-padded so string order equals date order.

use chrono::format::{Item, StrftimeItems};
use chrono::{Datelike, NaiveDate};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter, Write as _};
use std::path::{Path, PathBuf};

/// Config file name inside the app directory.
pub const CONFIG_FILE_NAME: &str = ".config.yml";

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration load/validation failure.
#[derive(Debug)]
pub enum ConfigError {
    /// File-system failure while reading or creating config state.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Config file is not valid YAML for `Opts`.
    Yaml(serde_yaml::Error),
    /// Options parsed but violate an invariant.
    Invalid(String),
    /// The app directory path exists and is not a directory.
    NotADirectory(PathBuf),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "config io error at `{}`: {source}", path.display()),
            Self::Yaml(err) => write!(f, "unable to parse config file: {err}"),
            Self::Invalid(message) => write!(f, "invalid configuration: {message}"),
            Self::NotADirectory(path) => {
                write!(f, "app directory `{}` must be a directory", path.display())
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Yaml(err) => Some(err),
            Self::Invalid(_) | Self::NotADirectory(_) => None,
        }
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(value: serde_yaml::Error) -> Self {
        Self::Yaml(value)
    }
}

/// Top-level application options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Opts {
    /// Directory holding every note and archive file. Never persisted.
    #[serde(skip)]
    pub app_dir: PathBuf,
    pub header: HeaderOpts,
    pub section: SectionOpts,
    pub file: FileOpts,
    pub archive: ArchiveOpts,
}

/// Options for the first line of a daily note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeaderOpts {
    pub prefix: String,
    pub suffix: String,
    pub trailing_newlines: usize,
    pub time_format: String,
}

/// Options for section marker lines and padding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SectionOpts {
    pub prefix: String,
    pub suffix: String,
    pub trailing_newlines: usize,
    pub names: Vec<String>,
}

/// Options for daily note file names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FileOpts {
    pub time_format: String,
    pub ext: String,
    /// 1-based line an editor should place the cursor on.
    pub cursor_line: usize,
}

/// Options for month archive files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ArchiveOpts {
    /// Minimum age in days before a daily note is archived.
    pub after_days: u32,
    pub file_prefix: String,
    pub header_prefix: String,
    pub header_suffix: String,
    pub section_content_prefix: String,
    pub section_content_suffix: String,
    pub section_content_time_format: String,
    pub month_time_format: String,
}

impl Default for HeaderOpts {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            suffix: String::new(),
            trailing_newlines: 1,
            time_format: "[%a] %d %b %Y".to_string(),
        }
    }
}

impl Default for SectionOpts {
    fn default() -> Self {
        Self {
            prefix: "___".to_string(),
            suffix: "___".to_string(),
            trailing_newlines: 3,
            names: vec!["TODO".to_string(), "DONE".to_string(), "NOTES".to_string()],
        }
    }
}

impl Default for FileOpts {
    fn default() -> Self {
        Self {
            time_format: "%Y-%m-%d".to_string(),
            ext: "txt".to_string(),
            cursor_line: 4,
        }
    }
}

impl Default for ArchiveOpts {
    fn default() -> Self {
        Self {
            after_days: 14,
            file_prefix: "archive-".to_string(),
            header_prefix: "ARCHIVE ".to_string(),
            header_suffix: String::new(),
            section_content_prefix: "[".to_string(),
            section_content_suffix: "]".to_string(),
            section_content_time_format: "%Y-%m-%d".to_string(),
            month_time_format: "%b%Y".to_string(),
        }
    }
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            app_dir: PathBuf::new(),
            header: HeaderOpts::default(),
            section: SectionOpts::default(),
            file: FileOpts::default(),
            archive: ArchiveOpts::default(),
        }
    }
}

impl Opts {
    /// Returns defaults rooted at `app_dir`.
    pub fn with_app_dir(app_dir: impl Into<PathBuf>) -> Self {
        Self {
            app_dir: app_dir.into(),
            ..Self::default()
        }
    }

    /// Checks every invariant the parser and archiver rely on.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.section.names.is_empty() {
            return Err(invalid("must include at least one section"));
        }

        let mut unique = BTreeSet::new();
        for name in &self.section.names {
            if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(invalid(format!(
                    "section name `{name}` must contain only ASCII letters"
                )));
            }
            if !unique.insert(name.as_str()) {
                return Err(invalid("section names must be unique"));
            }
        }

        if self.archive.file_prefix.trim().is_empty() {
            return Err(invalid("file prefix for archives must not be empty"));
        }

        let sample = sample_date();
        if try_format(sample, &self.header.time_format).is_none() {
            return Err(invalid("invalid header time format"));
        }
        if !round_trips(&self.file.time_format, sample) {
            return Err(invalid("invalid file time format"));
        }
        if !round_trips(&self.archive.section_content_time_format, sample) {
            return Err(invalid("invalid archive section content time format"));
        }
        if !sorts_chronologically(&self.archive.section_content_time_format) {
            return Err(invalid(
                "archive section content time format must be fixed width with the largest unit first",
            ));
        }
        if !month_round_trips(&self.archive.month_time_format, sample) {
            return Err(invalid("invalid archive month time format"));
        }

        Ok(())
    }
}

/// Loads options from `<app_dir>/.config.yml`, writing defaults first when
/// the file does not exist.
///
/// # Errors
/// - `ConfigError::Io` when the file cannot be read or created.
/// - `ConfigError::Yaml` when the file is not valid YAML.
/// - `ConfigError::Invalid` when the loaded options fail validation.
pub fn load_or_create(app_dir: impl AsRef<Path>) -> ConfigResult<Opts> {
    let app_dir = app_dir.as_ref();
    let config_path = app_dir.join(CONFIG_FILE_NAME);

    if !config_path.exists() {
        let yaml = serde_yaml::to_string(&Opts::default())?;
        std::fs::write(&config_path, yaml).map_err(|source| ConfigError::Io {
            path: config_path.clone(),
            source,
        })?;
        info!(
            "event=config_create module=config status=ok path={}",
            config_path.display()
        );
    }

    let raw = std::fs::read_to_string(&config_path).map_err(|source| ConfigError::Io {
        path: config_path.clone(),
        source,
    })?;
    let mut opts: Opts = serde_yaml::from_str(&raw)?;
    opts.app_dir = app_dir.to_path_buf();
    opts.validate()?;
    Ok(opts)
}

/// Creates the app directory when missing.
///
/// # Errors
/// - `ConfigError::NotADirectory` when the path exists as a regular file.
/// - `ConfigError::Io` when the directory cannot be created.
pub fn ensure_app_dir(app_dir: impl AsRef<Path>) -> ConfigResult<()> {
    let app_dir = app_dir.as_ref();
    if app_dir.exists() {
        if !app_dir.is_dir() {
            return Err(ConfigError::NotADirectory(app_dir.to_path_buf()));
        }
        return Ok(());
    }

    std::fs::create_dir_all(app_dir).map_err(|source| ConfigError::Io {
        path: app_dir.to_path_buf(),
        source,
    })?;
    info!(
        "event=app_dir_create module=config status=ok path={}",
        app_dir.display()
    );
    Ok(())
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(message.into())
}

fn sample_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 3, 7).unwrap_or_default()
}

fn is_well_formed(format: &str) -> bool {
    !format.is_empty() && !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

fn try_format(date: NaiveDate, format: &str) -> Option<String> {
    if !is_well_formed(format) {
        return None;
    }
    let mut out = String::new();
    write!(out, "{}", date.format(format)).ok()?;
    Some(out)
}

fn round_trips(format: &str, date: NaiveDate) -> bool {
    try_format(date, format)
        .and_then(|formatted| NaiveDate::parse_from_str(&formatted, format).ok())
        .is_some_and(|parsed| parsed == date)
}

/// Formatted strings of consecutive dates across day, month and year
/// boundaries must share a width and compare in date order.
fn sorts_chronologically(format: &str) -> bool {
    const BOUNDARIES: [((i32, u32, u32), (i32, u32, u32)); 3] = [
        ((2021, 3, 9), (2021, 3, 10)),
        ((2021, 9, 30), (2021, 10, 1)),
        ((2021, 12, 31), (2022, 1, 1)),
    ];
    BOUNDARIES.iter().all(|&((y1, m1, d1), (y2, m2, d2))| {
        let (Some(earlier), Some(later)) = (
            NaiveDate::from_ymd_opt(y1, m1, d1),
            NaiveDate::from_ymd_opt(y2, m2, d2),
        ) else {
            return false;
        };
        match (try_format(earlier, format), try_format(later, format)) {
            (Some(a), Some(b)) => a.len() == b.len() && a < b,
            _ => false,
        }
    })
}

fn month_round_trips(format: &str, date: NaiveDate) -> bool {
    let Some(first) = date.with_day(1) else {
        return false;
    };
    try_format(first, format)
        .and_then(|formatted| {
            NaiveDate::parse_from_str(&format!("{formatted} 01"), &format!("{format} %d")).ok()
        })
        .is_some_and(|parsed| parsed == first)
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, Opts};

    #[test]
    fn defaults_are_valid() {
        Opts::default().validate().expect("defaults should validate");
    }

    #[test]
    fn rejects_empty_sections() {
        let mut opts = Opts::default();
        opts.section.names.clear();
        assert!(matches!(opts.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_duplicate_sections() {
        let mut opts = Opts::default();
        opts.section.names.push("TODO".to_string());
        let err = opts.validate().unwrap_err();
        assert!(err.to_string().contains("unique"));
    }

    #[test]
    fn rejects_non_letter_section_names() {
        let mut opts = Opts::default();
        opts.section.names = vec!["Section1".to_string()];
        assert!(opts.validate().is_err());
    }

    #[test]
    fn rejects_blank_archive_prefix() {
        let mut opts = Opts::default();
        opts.archive.file_prefix = "   ".to_string();
        let err = opts.validate().unwrap_err();
        assert!(err.to_string().contains("file prefix"));
    }

    #[test]
    fn rejects_file_format_without_day() {
        let mut opts = Opts::default();
        opts.file.time_format = "%Y-%m".to_string();
        let err = opts.validate().unwrap_err();
        assert!(err.to_string().contains("file time format"));
    }

    #[test]
    fn rejects_malformed_format_specifier() {
        let mut opts = Opts::default();
        opts.archive.section_content_time_format = "%Y-%Q".to_string();
        assert!(opts.validate().is_err());
    }

    #[test]
    fn rejects_header_format_with_time_fields() {
        let mut opts = Opts::default();
        opts.header.time_format = "%Y-%m-%d %H:%M".to_string();
        let err = opts.validate().unwrap_err();
        assert!(err.to_string().contains("header time format"));
    }

    #[test]
    fn rejects_unpadded_content_format() {
        let mut opts = Opts::default();
        opts.archive.section_content_time_format = "%-d %b %Y".to_string();
        let err = opts.validate().unwrap_err();
        assert!(err.to_string().contains("fixed width"));
    }

    #[test]
    fn rejects_content_format_led_by_weekday() {
        let mut opts = Opts::default();
        opts.archive.section_content_time_format = "%a %Y-%m-%d".to_string();
        assert!(opts.validate().is_err());
    }

    #[test]
    fn rejects_content_format_not_led_by_year() {
        let mut opts = Opts::default();
        opts.archive.section_content_time_format = "%d-%m-%Y".to_string();
        assert!(opts.validate().is_err());
    }

    #[test]
    fn accepts_slashed_content_format() {
        let mut opts = Opts::default();
        opts.archive.section_content_time_format = "%Y/%m/%d".to_string();
        opts.validate().expect("zero-padded format should validate");
    }

    #[test]
    fn accepts_month_format_without_day() {
        let mut opts = Opts::default();
        opts.archive.month_time_format = "%Y-%m".to_string();
        opts.validate().expect("month-only format should validate");
    }

    #[test]
    fn yaml_round_trip_keeps_values() {
        let opts = Opts::default();
        let yaml = serde_yaml::to_string(&opts).unwrap();
        assert!(yaml.contains("trailingNewlines"));
        let decoded: Opts = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(decoded, opts);
    }

    #[test]
    fn partial_yaml_falls_back_to_defaults() {
        let decoded: Opts = serde_yaml::from_str("archive:\n  afterDays: 30\n").unwrap();
        assert_eq!(decoded.archive.after_days, 30);
        assert_eq!(decoded.archive.file_prefix, "archive-");
        assert_eq!(decoded.section.names.len(), 3);
    }
}
