use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use evenday::{Advisor, Calendar, DaySchedule, Interval, RawTimeTable, TimeTable};

#[derive(Parser)]
#[command(name = "meeting", version, about = "Appointment slot advisor")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rank the free slots closest to a requested meeting
    Advise {
        /// Request JSON file (reads stdin if omitted)
        file: Option<PathBuf>,
        /// Maximum number of slots to print
        #[arg(short, long, default_value_t = 1)]
        count: usize,
        /// IANA timezone used to map timestamps onto the calendar
        #[arg(long, default_value = "UTC")]
        timezone: String,
    },
    /// Validate a weekly timetable and print it normalized
    Timetable {
        /// Timetable JSON file (reads stdin if omitted)
        file: Option<PathBuf>,
    },
}

/// `advise` input: a timetable, the bookings already taken, and the request.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdviseInput {
    time_table: RawTimeTable,
    #[serde(default)]
    taken: Vec<Range>,
    /// Requested start, Unix seconds.
    from: i64,
    /// Requested length, minutes.
    length: i64,
}

#[derive(Deserialize)]
struct Range {
    from: i64,
    to: i64,
}

#[derive(Serialize)]
struct Slot {
    start: u32,
    end: u32,
    window: String,
}

impl From<Interval> for Slot {
    fn from(i: Interval) -> Self {
        Self {
            start: i.start(),
            end: i.end(),
            window: i.to_string(),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Advise {
            file,
            count,
            timezone,
        } => {
            let input: AdviseInput = serde_json::from_str(&read_input(file.as_ref())?)
                .context("Failed to parse advise request")?;
            let calendar = Calendar::from_name(&timezone)?;
            let slots = advise(&input, &calendar, count)?;
            if count > 0 && slots.is_empty() {
                bail!("Can't advise, all day is taken");
            }
            let slots: Vec<Slot> = slots.into_iter().map(Slot::from).collect();
            println!("{}", serde_json::to_string_pretty(&slots)?);
        }
        Command::Timetable { file } => {
            let raw: RawTimeTable = serde_json::from_str(&read_input(file.as_ref())?)
                .context("Failed to parse timetable")?;
            let time_table = TimeTable::parse(&raw)?;
            println!("{}", serde_json::to_string_pretty(&normalized(&time_table))?);
        }
    }

    Ok(())
}

fn advise(input: &AdviseInput, calendar: &Calendar, count: usize) -> Result<Vec<Interval>> {
    let time_table = TimeTable::parse(&input.time_table)?;
    let to = input
        .length
        .checked_mul(60)
        .and_then(|secs| input.from.checked_add(secs))
        .context("Requested length overflows")?;
    let wanted = calendar.interval(input.from, to)?;
    let weekday = calendar.weekday(input.from)?;
    let day = calendar.day_key(input.from)?;

    // Only bookings on the requested date matter.
    let mut same_day = Vec::new();
    for range in &input.taken {
        if calendar.day_key(range.from)? == day {
            same_day.push((range.from, range.to));
        }
    }
    let taken = DaySchedule::from_ranges(calendar, same_day)?;
    debug!(%wanted, %weekday, taken = taken.len(), "advising");

    Ok(Advisor::new(time_table.day(weekday), &taken)
        .amount(count)
        .advise(&wanted))
}

/// Weekday (`mon`..`sun`) → list of `HH:MM-HH:MM` windows, Monday first.
fn normalized(time_table: &TimeTable) -> Map<String, Value> {
    time_table
        .iter()
        .map(|(weekday, windows)| {
            let list = windows
                .windows()
                .iter()
                .map(|w| Value::String(w.to_string()))
                .collect();
            (weekday.to_string().to_lowercase(), Value::Array(list))
        })
        .collect()
}

fn read_input(file: Option<&PathBuf>) -> Result<String> {
    match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}
