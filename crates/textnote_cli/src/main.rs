//! `textnote` command line entry point.
//!
//! # Responsibility
//! - Resolve the app directory from `TEXTNOTE_DIR` and load options.
//! - Map `open`, `next` and `archive` subcommands onto `textnote_core`
//!   operations.
//!
//! Editor integration is left to the caller: `open` prints the note path and
//! cursor line instead of launching an editor.

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime};
use clap::{Args, Parser, Subcommand};
use log::{info, warn};
use std::error::Error;
use std::path::PathBuf;
use textnote_core::{
    ensure_app_dir, init_logging, list_daily_note_dates, load_or_create, logging_status,
    Archiver, FileReadWriter, Opts, ReadWriter, Template,
};

const ENV_APP_DIR: &str = "TEXTNOTE_DIR";
const LOG_DIR_NAME: &str = ".logs";

type CliResult<T> = Result<T, Box<dyn Error>>;

/// Dated plain-text notes with monthly archives.
#[derive(Parser)]
#[command(name = "textnote", version)]
struct Cli {
    /// Log level written to `<TEXTNOTE_DIR>/.logs`.
    #[arg(long, global = true, default_value = textnote_core::default_log_level())]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a note if missing, optionally copying sections from another day.
    Open(OpenArgs),
    /// Create the note for the next given day of the week.
    Next(NextArgs),
    /// Consolidate old notes into monthly archive files.
    Archive(ArchiveArgs),
}

#[derive(Args)]
struct OpenArgs {
    /// Date of the note to open, in the file time format (defaults to today).
    #[arg(long, conflicts_with_all = ["days_back", "tomorrow"])]
    date: Option<String>,

    /// Open the note this many days before today.
    #[arg(short = 'd', long, conflicts_with = "tomorrow")]
    days_back: Option<u32>,

    /// Open tomorrow's note.
    #[arg(short = 't', long)]
    tomorrow: bool,

    #[command(flatten)]
    copy: CopyArgs,
}

#[derive(Args)]
struct NextArgs {
    /// Day of the week to open (0=Sunday, 1=Monday, ...).
    #[arg(short = 'w', long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(0..=6))]
    weekday: u8,

    #[command(flatten)]
    copy: CopyArgs,
}

#[derive(Args)]
struct CopyArgs {
    /// Date of the note to copy sections from (`open` defaults to the latest
    /// earlier note, `next` to today).
    #[arg(long, conflicts_with = "copy_back")]
    copy: Option<String>,

    /// Copy from the note this many days before today.
    #[arg(short = 'c', long)]
    copy_back: Option<u32>,

    /// Section to copy; repeat for several sections.
    #[arg(short = 's', long = "section")]
    sections: Vec<String>,

    /// Remove copied sections from the source note.
    #[arg(short = 'x', long, requires = "sections")]
    delete: bool,
}

#[derive(Args)]
struct ArchiveArgs {
    /// Delete daily notes after archiving them.
    #[arg(short = 'x', long)]
    delete: bool,

    /// Skip writing archive files (useful for deleting already archived notes).
    #[arg(short = 'n', long)]
    no_write: bool,

    /// List the notes `--delete` would remove and stop.
    #[arg(long)]
    dry_run: bool,
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let app_dir = std::env::var_os(ENV_APP_DIR)
        .map(PathBuf::from)
        .filter(|dir| !dir.as_os_str().is_empty())
        .ok_or_else(|| format!("environment variable [{ENV_APP_DIR}] is not set"))?;
    ensure_app_dir(&app_dir)?;
    init_logging(&cli.log_level, app_dir.join(LOG_DIR_NAME))?;
    if let Some((level, log_dir)) = logging_status() {
        info!(
            "event=cli_start module=cli status=ok level={level} log_dir={}",
            log_dir.display()
        );
    }
    let opts = load_or_create(&app_dir)?;
    let now = Local::now().naive_local();

    match cli.command {
        Command::Open(args) => run_open(&opts, &args, now),
        Command::Next(args) => run_next(&opts, &args, now),
        Command::Archive(args) => run_archive(&opts, &args, now),
    }
}

fn run_open(opts: &Opts, args: &OpenArgs, now: NaiveDateTime) -> CliResult<()> {
    let today = now.date();
    let date = match (&args.date, args.days_back, args.tomorrow) {
        (Some(raw), _, _) => parse_cli_date(raw, opts)?,
        (None, Some(days), _) => today - Duration::days(i64::from(days)),
        (None, None, true) => today + Duration::days(1),
        (None, None, false) => today,
    };
    open_note(opts, date, &args.copy, today, None)
}

fn run_next(opts: &Opts, args: &NextArgs, now: NaiveDateTime) -> CliResult<()> {
    let today = now.date();
    let date = next_weekday(today, u32::from(args.weekday));
    open_note(opts, date, &args.copy, today, Some(today))
}

/// Creates the note for `date` if missing and copies the requested sections
/// into it. Without an explicit copy date, sections come from
/// `default_copy_date` or else the latest note before `date`.
fn open_note(
    opts: &Opts,
    date: NaiveDate,
    args: &CopyArgs,
    today: NaiveDate,
    default_copy_date: Option<NaiveDate>,
) -> CliResult<()> {
    let rw = FileReadWriter::new();
    let mut note = Template::new(opts, date);

    if args.sections.is_empty() {
        rw.write_if_not_exists(&note)?;
        return print_note_location(&note);
    }

    let copy_date = match (&args.copy, args.copy_back) {
        (Some(raw), _) => parse_cli_date(raw, opts)?,
        (None, Some(days)) => today - Duration::days(i64::from(days)),
        (None, None) => match default_copy_date {
            Some(copy_date) => copy_date,
            None => latest_note_before(opts, date)?,
        },
    };
    let mut src = Template::new(opts, copy_date);
    rw.read(&mut src)
        .map_err(|err| format!("cannot read source file for copy: {err}"))?;
    if rw.exists(&note) {
        rw.read(&mut note)
            .map_err(|err| format!("cannot load note file: {err}"))?;
    }

    for name in &args.sections {
        note.copy_section_contents(&src, name)
            .map_err(|err| format!("cannot copy section [{name}]: {err}"))?;
    }
    if args.delete {
        for name in &args.sections {
            src.delete_section_contents(name)?;
        }
        rw.overwrite(&src)
            .map_err(|err| format!("failed to save changes to source file: {err}"))?;
    }
    rw.overwrite(&note)?;
    info!(
        "event=note_open module=cli status=ok date={} copy_date={} sections={}",
        date,
        copy_date,
        args.sections.len()
    );
    print_note_location(&note)
}

fn run_archive(opts: &Opts, args: &ArchiveArgs, now: NaiveDateTime) -> CliResult<()> {
    let mut archiver = Archiver::new(opts, FileReadWriter::new(), now);

    for date in list_daily_note_dates(&opts.app_dir, opts)? {
        let Some(start_of_day) = date.and_hms_opt(0, 0, 0) else {
            continue;
        };
        if let Err(err) = archiver.add(start_of_day) {
            warn!("event=archive_add module=cli status=skip date={date} error={err}");
            eprintln!("skipping unarchivable file: {err}");
        }
    }

    if args.dry_run {
        let files = archiver.archived_files();
        println!(
            "running \"archive --delete\" will remove [{}] files",
            files.len()
        );
        for path in files {
            println!("- {}", path.display());
        }
        return Ok(());
    }

    if !args.no_write {
        archiver.write()?;
    }
    if !args.delete {
        return Ok(());
    }

    let mut removed = 0usize;
    for path in archiver.archived_files() {
        match std::fs::remove_file(path) {
            Ok(()) => removed += 1,
            Err(err) => {
                warn!(
                    "event=note_delete module=cli status=error path={} error={err}",
                    path.display()
                );
                eprintln!("unable to remove file [{}]: {err}", path.display());
            }
        }
    }
    info!("event=note_delete module=cli status=ok removed={removed}");
    println!("removed [{removed}] files after archiving");
    Ok(())
}

/// First date strictly after `today` falling on `weekday` (days from Sunday).
fn next_weekday(today: NaiveDate, weekday: u32) -> NaiveDate {
    let current = today.weekday().num_days_from_sunday();
    let ahead = match (weekday + 7 - current) % 7 {
        0 => 7,
        days => days,
    };
    today + Duration::days(i64::from(ahead))
}

fn parse_cli_date(raw: &str, opts: &Opts) -> CliResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, &opts.file.time_format)
        .map_err(|err| format!("malformed date [{raw}]: {err}").into())
}

fn latest_note_before(opts: &Opts, date: NaiveDate) -> CliResult<NaiveDate> {
    list_daily_note_dates(&opts.app_dir, opts)?
        .into_iter()
        .filter(|candidate| *candidate < date)
        .max()
        .ok_or_else(|| format!("no note found before [{date}] to copy from").into())
}

fn print_note_location(note: &Template) -> CliResult<()> {
    println!("{}", note.file_path().display());
    println!("line {}", note.file_cursor_line());
    Ok(())
}
