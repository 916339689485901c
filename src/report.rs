use crate::carriage::Carriage;
use crate::carriages::Seating;
use crate::command::ParseError;
use crate::error::YardError;
use crate::yard::{Outcome, TotalsScope};
use serde_json::json;
use std::fmt::Write;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = &'static str;
    fn from_str(format: &str) -> Result<Self, Self::Err> {
        match format {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err("Could not parse output format."),
        }
    }
}

pub const USAGE: &str = "\
=====================[ Carriage Simulator ]=====================
      ===============[     Usage Info     ]===============
  a [carriage_id] [type] [capacity]
    Add a carriage to the train
  p
    Print out all of the carriages in the train
  i [n] [carriage_id] [type] [capacity]
    Insert a carriage into the train at position `n`

  s [carriage_id] [n]
    Seat `n` passengers onto the train starting from carriage
    `carriage_id`
  d [carriage_id] [n]
    Remove `n` passengers from carriage `carriage_id`
  T
    Display the total number of passengers and empty seats on
    the train
  c [start_id] [end_id]
    Display the number of passengers and empty seats on between
    carriage `start_id` and carriage `end_id`
  m [source_id] [destination_id] [n]
    Move `n` passengers from carriage `source_id` to carriage
    `destination_id`

  N
    Create a new empty train
  >
    Select the next train in the train list.
  <
    Select the previous train in the train list.
  P
    Display all trains in the train list.
  r [carriage_id]
    Remove carriage `carriage_id` from the selected train.
  R
    Remove the selected train.

  M
    Merge the selected train with the following train
  S [n]
    Split the current train into smaller trains at `n` carriage ids

  ?
    Show help
================================================================
";

pub fn render(format: OutputFormat, result: &Result<Outcome, YardError>) -> String {
    match (format, result) {
        (OutputFormat::Text, Ok(outcome)) => outcome_text(outcome),
        (OutputFormat::Text, Err(e)) => format!("ERROR: {}\n", e),
        (OutputFormat::Json, Ok(outcome)) => json_line(&json!(outcome)),
        (OutputFormat::Json, Err(e)) => json_line(&json!({
            "event": "error",
            "kind": e.kind(),
            "message": e.to_string(),
        })),
    }
}

pub fn render_parse_error(format: OutputFormat, e: &ParseError) -> String {
    match format {
        OutputFormat::Text => format!("ERROR: {}\n", e),
        OutputFormat::Json => json_line(&json!({
            "event": "error",
            "kind": "parse",
            "message": e.to_string(),
        })),
    }
}

fn json_line(value: &serde_json::Value) -> String {
    let mut line = value.to_string();
    line.push('\n');
    line
}

fn outcome_text(outcome: &Outcome) -> String {
    let mut out = String::new();
    match outcome {
        Outcome::Help => out.push_str(USAGE),
        Outcome::CarriageAdded { id, appended, .. } => {
            let verb = if *appended { "attached" } else { "inserted" };
            writeln!(out, "Carriage: '{}' {}!", id, verb).ok();
        }
        Outcome::Carriages { carriages } => {
            if carriages.is_empty() {
                out.push_str("This train is empty!\n");
            }
            for carriage in carriages {
                out.push_str(&carriage_box(carriage));
            }
        }
        Outcome::Seated { seating } => {
            for p in seating.placements.iter() {
                writeln!(out, "{} passengers added to {}", p.count, p.id).ok();
            }
            out.push_str(&unseated(seating));
        }
        Outcome::Disembarked { id, count } => {
            writeln!(out, "{} passengers removed from {}", count, id).ok();
        }
        Outcome::Totals { scope, space } => match scope {
            TotalsScope::Train => {
                writeln!(out, "Total occupancy: {}", space.occupied).ok();
                writeln!(out, "Unoccupied capacity: {}", space.unoccupied).ok();
            }
            TotalsScope::Range => {
                writeln!(out, "Occupancy: {}", space.occupied).ok();
                writeln!(out, "Unoccupied: {}", space.unoccupied).ok();
            }
        },
        Outcome::Moved { source, seating } => {
            for p in seating.placements.iter() {
                writeln!(out, "{} passengers moved from {} to {}", p.count, source, p.id).ok();
            }
            out.push_str(&unseated(seating));
        }
        Outcome::Roster { trains } => {
            for t in trains {
                let marker = if t.selected { "--->" } else { "    " };
                writeln!(out, "{}Train #{}", marker, t.position).ok();
                writeln!(out, "        Carriages: {:>3}", t.carriages).ok();
                writeln!(out, "        Capacity : {:>3}/{:<3}", t.occupancy, t.capacity).ok();
                out.push_str("    ----------------------\n");
            }
        }
        Outcome::Split { report } => {
            for id in report.skipped.iter() {
                writeln!(out, "No carriage exists with id: '{}'. Skipping", id).ok();
            }
        }
        Outcome::TrainCreated { .. }
        | Outcome::Selected { .. }
        | Outcome::CarriageRemoved { .. }
        | Outcome::TrainRemoved { .. }
        | Outcome::Merged { .. }
        | Outcome::Ignored { .. } => {}
    }
    out
}

fn unseated(seating: &Seating) -> String {
    if seating.unseated > 0 {
        format!("{} passengers could not be seated\n", seating.unseated)
    } else {
        String::new()
    }
}

fn carriage_box(carriage: &Carriage) -> String {
    let width = 20;
    let mut out = String::new();
    out.push_str(" ---------\\/--------- \n");

    let id = carriage.id.as_str();
    let padding = width - id.chars().count();
    writeln!(
        out,
        "|{}{}{}|",
        " ".repeat(padding / 2),
        id,
        " ".repeat((padding + 1) / 2)
    )
    .ok();

    let kind = carriage.kind.label();
    let padding = width - 2 - kind.len();
    writeln!(
        out,
        "|{}({}){}|",
        " ".repeat(padding / 2),
        kind,
        " ".repeat((padding + 1) / 2)
    )
    .ok();

    writeln!(
        out,
        "| Occupancy: {:>3}/{:<3} |",
        carriage.occupancy, carriage.capacity
    )
    .ok();
    out.push_str(" ---------||--------- \n");
    out
}
