use log::{debug, info};

use draw_ledger::export::{ExportError, ExportFormat};
use draw_ledger::*;
use snafu::prelude::*;

use std::fs;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::args::Args;
use crate::draw::config_reader::*;
use crate::draw::io_common::{format_row, infer_provider, resolve_path, simplify_file_name};
use crate::draw::session::{ExportFile, Session};

mod config_reader;
mod io_common;
mod io_csv;
mod io_excel;
mod io_gsheet;
mod session;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum LuckyDrawError {
    #[snafu(display("Error opening spreadsheet {path}"))]
    OpeningExcel {
        source: calamine::Error,
        path: String,
    },
    #[snafu(display("Worksheet {name:?} not found in {path}"))]
    MissingWorksheet { name: String, path: String },
    #[snafu(display("The spreadsheet {path} has no worksheet or no header row"))]
    EmptyExcel { path: String },
    #[snafu(display("Unsupported cell at row {lineno}: {content}"))]
    ExcelWrongCellType { lineno: u64, content: String },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno} of {path}"))]
    CsvLineParse {
        source: csv::Error,
        path: String,
        lineno: u64,
    },
    #[snafu(display("The CSV input {path} has no header row"))]
    CsvMissingHeader { path: String },
    #[snafu(display("Error opening JSON file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Expected a positive number in the draw plan, found {value}"))]
    ParsingJsonNumber { value: String },
    #[snafu(display("Not a Google Sheet address with a gid: {url}"))]
    GoogleSheetUrl { url: String },
    #[snafu(display("Invalid pattern"))]
    Pattern { source: regex::Error },
    #[snafu(display("Error fetching {url}"))]
    Fetching { source: reqwest::Error, url: String },
    #[snafu(display("Unknown input type {provider:?} (expected csv, xlsx or gsheet)"))]
    UnknownProvider { provider: String },
    #[snafu(display("Unknown output format {format:?} (expected csv or xlsx)"))]
    UnknownFormat { format: String },
    #[snafu(display("No participant source: use --input or --config"))]
    NoSource {},
    #[snafu(display("No participants loaded"))]
    NoParticipants {},
    #[snafu(display("{source}"))]
    Drawing { source: DrawErrors },
    #[snafu(display("Error exporting {label}"))]
    Exporting { source: ExportError, label: String },
    #[snafu(display("Error writing {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
}

pub type LuckyDrawResult<T> = Result<T, LuckyDrawError>;
pub type BLuckyDrawResult<T> = Result<T, Box<LuckyDrawError>>;

/// Reads one source into a participant table, with the name used to label
/// the results.
fn read_participants(
    root_path: Option<&Path>,
    src: &ParticipantSource,
) -> BLuckyDrawResult<(ParticipantSet, String)> {
    if src.provider == "gsheet" {
        info!("Attempting to read Google Sheet {:?}", src.file_path);
        return io_gsheet::read_google_sheet(&src.file_path);
    }
    let p = resolve_path(root_path, &src.file_path);
    info!("Attempting to read participant file {:?}", p);
    let participants = match src.provider.as_str() {
        "csv" => io_csv::read_csv_participants(&p)?,
        "xlsx" | "excel" => {
            io_excel::read_excel_participants(&p, src.excel_worksheet_name.as_deref())?
        }
        x => {
            return Err(Box::new(LuckyDrawError::UnknownProvider {
                provider: x.to_string(),
            }));
        }
    };
    Ok((participants, simplify_file_name(&p)))
}

/// Reads all the sources and concatenates them. The session is labeled with
/// the name of the first source.
fn load_sources(
    root_path: Option<&Path>,
    sources: &[ParticipantSource],
) -> BLuckyDrawResult<(ParticipantSet, String)> {
    let mut loaded: Option<(ParticipantSet, String)> = None;
    for src in sources {
        let (ps, name) = read_participants(root_path, src)?;
        info!("Loaded {} participants from {:?}", ps.len(), name);
        loaded = Some(match loaded {
            None => (ps, name),
            Some((acc, first_name)) => (acc.concat(ps).context(DrawingSnafu)?, first_name),
        });
    }
    Ok(loaded.context(NoSourceSnafu)?)
}

/// Assembles the plan of the run: the plan file if any, then the command line
/// options on top of it.
fn build_plan(args: &Args) -> BLuckyDrawResult<(DrawPlan, Option<PathBuf>)> {
    let (mut plan, root) = match &args.config {
        Some(config_path) => {
            let plan = read_plan(config_path)?;
            let root = Path::new(config_path).parent().map(|p| p.to_path_buf());
            (plan, root)
        }
        None => (DrawPlan::default(), None),
    };

    if let Some(input) = &args.input {
        let provider = match &args.input_type {
            Some(t) => t.to_lowercase(),
            None => infer_provider(input).to_string(),
        };
        // Command line paths are relative to the working directory.
        let file_path = if provider == "gsheet" {
            input.clone()
        } else {
            resolve_path(None, input)
        };
        plan.participant_sources = vec![ParticipantSource {
            provider,
            file_path,
            excel_worksheet_name: args.excel_worksheet_name.clone(),
        }];
    }

    if args.name.is_some() || plan.draws.is_empty() {
        let names = args
            .name
            .clone()
            .unwrap_or_else(|| vec![DrawName::round(1).to_string()]);
        let count = args.count.unwrap_or(1);
        plan.draws = names
            .iter()
            .map(|name| DrawSettings::new(name, count, args.exclude_previous))
            .collect();
    } else if args.count.is_some() || args.exclude_previous {
        for d in plan.draws.iter_mut() {
            if let Some(count) = args.count {
                d.set_count(count);
            }
            if args.exclude_previous {
                d.exclude_previous = Some(true);
            }
        }
    }

    let output = plan.output_settings.get_or_insert_with(OutputSettings::default);
    if let Some(out) = &args.out {
        output.output_directory = Some(out.clone());
    }
    if let Some(format) = &args.format {
        output.format = Some(format.clone());
    }
    debug!("build_plan: {:?}", plan);
    Ok((plan, root))
}

fn export_format(settings: &OutputSettings, source_name: &str) -> BLuckyDrawResult<ExportFormat> {
    match &settings.format {
        Some(f) => Ok(ExportFormat::parse(f).context(UnknownFormatSnafu { format: f.clone() })?),
        None => Ok(ExportFormat::for_source(source_name)),
    }
}

fn print_draw(session: &Session, draw: &Draw) {
    println!(
        "{}: {} winner(s) out of {} eligible participant(s)",
        draw.name,
        draw.winners.len(),
        draw.pool_size
    );
    if let Some(ps) = session.participants() {
        for (idx, row) in draw.winners.iter().enumerate() {
            println!("  {:>3}. {}", idx + 1, format_row(ps.schema(), row));
        }
    }
}

fn write_files(dir: &Path, files: &[ExportFile]) -> BLuckyDrawResult<()> {
    fs::create_dir_all(dir).context(WritingFileSnafu {
        path: dir.display().to_string(),
    })?;
    for f in files {
        let p = dir.join(&f.file_name);
        fs::write(&p, &f.bytes).context(WritingFileSnafu {
            path: p.display().to_string(),
        })?;
        info!("Wrote {} ({} bytes)", p.display(), f.bytes.len());
    }
    Ok(())
}

fn write_exports(
    session: &Session,
    settings: &OutputSettings,
    root_path: Option<&Path>,
) -> BLuckyDrawResult<()> {
    let format = export_format(settings, session.source_name())?;
    let out = match &settings.output_directory {
        Some(out) => out,
        None => return Ok(()),
    };

    if out == "stdout" {
        let file = session.ledger_export(ExportFormat::Csv)?;
        print!("{}", String::from_utf8_lossy(&file.bytes));
        return Ok(());
    }

    let mut files: Vec<ExportFile> = Vec::new();
    if settings.export_latest.unwrap_or(true) {
        files.extend(session.latest_export(format)?);
    }
    if settings.export_each_draw.unwrap_or(true) {
        files.extend(session.group_exports(format)?);
    }
    if settings.export_ledger.unwrap_or(true) {
        files.push(session.ledger_export(format)?);
    }
    let dir = PathBuf::from(resolve_path(root_path, out));
    write_files(&dir, &files)
}

/// Runs a whole session: loads the participants, makes every draw of the plan
/// in order and writes the result files.
pub fn run(args: &Args) -> BLuckyDrawResult<Session> {
    let (plan, root) = build_plan(args)?;
    let root_path = root.as_deref();

    ensure!(!plan.participant_sources.is_empty(), NoSourceSnafu);
    let (participants, source_name) = load_sources(root_path, &plan.participant_sources)?;

    let mut session = Session::new();
    session.load(participants, &source_name)?;

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    for settings in plan.draws.iter() {
        let request = settings.to_request()?;
        let draw = session.draw(&request, &mut rng)?.clone();
        print_draw(&session, &draw);
    }

    let output = plan.output_settings.unwrap_or_default();
    write_exports(&session, &output, root_path)?;
    Ok(session)
}
