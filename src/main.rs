use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use seoye_judge::config::{self, Config};
use seoye_judge::output::{self, ExportFormat, ExportOrder};
use seoye_judge::ranking::{parse_sub_score, results_order, SUB_SCORE_COUNT};
use seoye_judge::schedule::{parse_start, Schedule, ScheduleError};
use seoye_judge::sheet::{Scoresheet, SheetError};
use seoye_judge::store::RecordStore;

const EXIT_SUCCESS: i32 = 0;
const EXIT_STORE: i32 = 2;
const EXIT_INPUT: i32 = 3;
const EXIT_CONFIG: i32 = 4;

#[derive(Debug, thiserror::Error)]
enum InputError {
    #[error("Invalid score '{0}' (use a number, or '-' to leave it unset)")]
    BadScore(String),
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a config file interactively
    Init,
    /// Add a contestant to the scoresheet
    Add {
        contestant: String,
        /// Title of the submitted work
        #[arg(short, long, default_value = "")]
        work: String,
    },
    /// Enter all three judges' scores for an entry ("-" leaves a score unset)
    Score {
        id: u64,
        #[arg(required = true, num_args = SUB_SCORE_COUNT, value_names = ["S1", "S2", "S3"], allow_hyphen_values = true)]
        scores: Vec<String>,
    },
    /// Set written feedback for an entry (omit the text to clear it)
    Feedback { id: u64, text: Option<String> },
    /// Show one entry in detail
    Show { id: u64 },
    /// Remove an entry; remaining entries are renumbered
    Remove { id: u64 },
    /// Print the scoresheet (default if no subcommand)
    List {
        /// Order by rank instead of entry number
        #[arg(long)]
        by_rank: bool,
    },
    /// Export results
    Export {
        #[arg(short, long, value_enum, default_value = "csv")]
        format: ExportFormat,
        #[arg(long)]
        by_rank: bool,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Manage the competition timetable
    Schedule {
        #[command(subcommand)]
        command: ScheduleCommands,
    },
    /// Open the interactive scoresheet editor
    Tui,
}

#[derive(Subcommand, Debug)]
enum ScheduleCommands {
    /// Add an event, e.g. `schedule add "2026-10-20 10:00" 심사 --duration 2h`
    Add {
        when: String,
        title: String,
        #[arg(short, long)]
        duration: Option<String>,
        #[arg(long)]
        venue: Option<String>,
    },
    List,
    Remove { id: u64 },
    /// Export the timetable as Markdown
    Export {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Parser, Debug)]
#[command(name = "seoye-judge")]
#[command(about = "Scoresheets and results for calligraphy competitions", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/seoye-judge/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Directory holding scoresheet.json and schedule.json
    #[arg(long, global = true)]
    data_dir: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn main() {
    let cli = Cli::parse();
    seoye_judge::logging::init_logging(cli.verbose);

    let command = cli.command.unwrap_or(Commands::List { by_rank: false });
    let config_path = cli.config.map(PathBuf::from);

    if let Commands::Init = command {
        if let Err(e) = config::init::run_init_wizard(config_path) {
            eprintln!("Init failed: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
        std::process::exit(EXIT_SUCCESS);
    }

    let config = match config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if let Err(errors) = config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let store_dir = cli
        .data_dir
        .map(PathBuf::from)
        .unwrap_or_else(|| config.store_dir());
    tracing::debug!(dir = %store_dir.display(), "using data directory");
    let store = RecordStore::new(store_dir);

    if let Err(e) = run(command, &config, &store) {
        eprintln!("Error: {:#}", e);
        std::process::exit(exit_code_for(&e));
    }

    std::process::exit(EXIT_SUCCESS);
}

/// Bad ids and bad input exit with 3; anything else came from the data store.
fn exit_code_for(error: &anyhow::Error) -> i32 {
    let store_error = matches!(error.downcast_ref::<SheetError>(), Some(SheetError::Store(_)))
        || matches!(error.downcast_ref::<ScheduleError>(), Some(ScheduleError::Store(_)));
    if store_error {
        EXIT_STORE
    } else if error.downcast_ref::<SheetError>().is_some()
        || error.downcast_ref::<ScheduleError>().is_some()
        || error.downcast_ref::<InputError>().is_some()
    {
        EXIT_INPUT
    } else {
        EXIT_STORE
    }
}

fn run(command: Commands, config: &Config, store: &RecordStore) -> Result<()> {
    let use_colors = output::should_use_colors();

    match command {
        // Runs before the config is loaded, see main
        Commands::Init => {}
        Commands::Add { contestant, work } => {
            let mut sheet: Scoresheet = store.load()?;
            let id = sheet.add(&contestant, &work)?;
            store.save(&sheet)?;
            println!("Added #{} {}", id, contestant.trim());
        }
        Commands::Score { id, scores } => {
            let mut values = [None; SUB_SCORE_COUNT];
            for (slot, raw) in scores.iter().enumerate() {
                values[slot] = parse_score_arg(raw)?;
            }

            let mut sheet: Scoresheet = store.load()?;
            sheet.set_scores(id, values)?;
            store.save(&sheet)?;

            if let Some(record) = sheet.get(id) {
                if !record.is_ranked() && values.iter().all(Option::is_some) {
                    seoye_judge::buffered_eprintln!(
                        "Warning: scores must be between 0 and 100; #{} stays unranked",
                        id
                    );
                }
                println!(
                    "{}",
                    output::format_record_detail(record, &config.judge_labels(), use_colors)
                );
            }
        }
        Commands::Feedback { id, text } => {
            let mut sheet: Scoresheet = store.load()?;
            sheet.set_feedback(id, text.as_deref())?;
            store.save(&sheet)?;
            match sheet.get(id).and_then(|r| r.feedback.as_ref()) {
                Some(_) => println!("Feedback saved for #{}", id),
                None => println!("Feedback cleared for #{}", id),
            }
        }
        Commands::Show { id } => {
            let sheet: Scoresheet = store.load()?;
            let record = sheet.get(id).ok_or(SheetError::UnknownRecord(id))?;
            println!(
                "{}",
                output::format_record_detail(record, &config.judge_labels(), use_colors)
            );
        }
        Commands::Remove { id } => {
            let mut sheet: Scoresheet = store.load()?;
            let removed = sheet.remove(id)?;
            store.save(&sheet)?;
            println!("Removed #{} {}", removed.id, removed.contestant);
        }
        Commands::List { by_rank } => {
            let sheet: Scoresheet = store.load()?;
            let rows = if by_rank {
                results_order(sheet.records())
            } else {
                sheet.records().iter().collect()
            };
            println!(
                "{}",
                output::format_scoresheet_table(&rows, &config.judge_labels(), use_colors)
            );
            if !sheet.is_empty() {
                println!();
                println!("{}", output::format_summary(sheet.records()));
            }
        }
        Commands::Export {
            format,
            by_rank,
            output: path,
        } => {
            let sheet: Scoresheet = store.load()?;
            let order = if by_rank {
                ExportOrder::Results
            } else {
                ExportOrder::Position
            };
            let text = output::export_scoresheet(sheet.records(), config, format, order)?;
            write_output(path, &text)?;
        }
        Commands::Schedule { command } => run_schedule(command, config, store, use_colors)?,
        Commands::Tui => {
            let sheet: Scoresheet = store.load()?;
            let schedule: Schedule = store.load()?;
            let app = seoye_judge::tui::App::new(config.clone(), store.clone(), sheet, schedule);
            seoye_judge::tui::run_tui(app)?;
        }
    }

    Ok(())
}

fn run_schedule(
    command: ScheduleCommands,
    config: &Config,
    store: &RecordStore,
    use_colors: bool,
) -> Result<()> {
    match command {
        ScheduleCommands::Add {
            when,
            title,
            duration,
            venue,
        } => {
            let starts_at = parse_start(&when)?;
            let mut schedule: Schedule = store.load()?;
            let id = schedule.add(starts_at, &title, duration.as_deref(), venue.as_deref())?;
            store.save(&schedule)?;
            println!("Scheduled [{}] {} at {}", id, title.trim(), starts_at.format("%Y-%m-%d %H:%M"));
        }
        ScheduleCommands::List => {
            let schedule: Schedule = store.load()?;
            println!("{}", output::format_schedule(schedule.entries(), use_colors));
        }
        ScheduleCommands::Remove { id } => {
            let mut schedule: Schedule = store.load()?;
            let removed = schedule.remove(id)?;
            store.save(&schedule)?;
            println!("Removed [{}] {}", removed.id, removed.title);
        }
        ScheduleCommands::Export { output: path } => {
            let schedule: Schedule = store.load()?;
            let text = output::format_schedule_markdown(schedule.entries(), &config.competition);
            write_output(path, &text)?;
        }
    }
    Ok(())
}

/// Parse one score argument. "-" or blank leaves the score unset.
fn parse_score_arg(raw: &str) -> Result<Option<f64>, InputError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return Ok(None);
    }
    parse_sub_score(trimmed)
        .map(Some)
        .ok_or_else(|| InputError::BadScore(trimmed.to_string()))
}

fn write_output(path: Option<PathBuf>, text: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(&path, text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => {
            print!("{}", text);
            if !text.ends_with('\n') {
                println!();
            }
        }
    }
    Ok(())
}
