use crate::carriage::{Carriage, CarriageId};
use crate::carriages::{positive_count, Seating, Space};
use crate::command::Command;
use crate::error::*;
use crate::trains::{MergeReport, SplitReport, TrainList, TrainSummary};
use log::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TotalsScope {
    Train,
    Range,
}

/// What an applied command did, for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
#[derive(serde::Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Outcome {
    Help,
    CarriageAdded {
        id: CarriageId,
        appended: bool,
        index: usize,
    },
    Carriages {
        carriages: Vec<Carriage>,
    },
    Seated {
        seating: Seating,
    },
    Disembarked {
        id: CarriageId,
        count: u32,
    },
    Totals {
        scope: TotalsScope,
        space: Space,
    },
    Moved {
        source: CarriageId,
        seating: Seating,
    },
    TrainCreated {
        position: usize,
    },
    Selected {
        position: usize,
        moved: bool,
    },
    Roster {
        trains: Vec<TrainSummary>,
    },
    CarriageRemoved {
        id: CarriageId,
    },
    TrainRemoved {
        carriages: usize,
        selected: usize,
    },
    Merged {
        report: Option<MergeReport>,
    },
    Split {
        report: SplitReport,
    },
    Ignored {
        code: char,
    },
}

/// Owns the trains and routes commands to them.
#[derive(Debug, Default)]
pub struct Yard {
    trains: TrainList,
}

impl Yard {
    pub fn new() -> Yard {
        Yard::default()
    }

    pub fn trains(&self) -> &TrainList {
        &self.trains
    }

    /// Applies one command. On error the yard is unchanged.
    pub fn execute(&mut self, command: Command) -> YardResult<Outcome> {
        let outcome = match command {
            Command::Help => Outcome::Help,
            Command::Append { id, kind, capacity } => {
                let carriages = &mut self.trains.selected_mut().carriages;
                let index = carriages.append(id.clone(), kind, capacity)?;
                Outcome::CarriageAdded {
                    id,
                    appended: true,
                    index,
                }
            }
            Command::Insert {
                position,
                id,
                kind,
                capacity,
            } => {
                let carriages = &mut self.trains.selected_mut().carriages;
                let index = carriages.insert_at(position, id.clone(), kind, capacity)?;
                Outcome::CarriageAdded {
                    id,
                    appended: false,
                    index,
                }
            }
            Command::PrintTrain => Outcome::Carriages {
                carriages: self.trains.selected().carriages.iter().cloned().collect(),
            },
            Command::Seat { id, count } => {
                let seating = self
                    .trains
                    .selected_mut()
                    .carriages
                    .load_passengers(&id, count)?;
                debug!("Seated {} of {} from {}", seating.seated(), count, id);
                Outcome::Seated { seating }
            }
            Command::Disembark { id, count } => {
                let count = self
                    .trains
                    .selected_mut()
                    .carriages
                    .unload_passengers(&id, count)?;
                Outcome::Disembarked { id, count }
            }
            Command::Total => {
                let carriages = &self.trains.selected().carriages;
                let space = match carriages.edges() {
                    Some((first, last)) => carriages.range_totals(first, last)?,
                    None => Space::default(),
                };
                Outcome::Totals {
                    scope: TotalsScope::Train,
                    space,
                }
            }
            Command::Count { start, end } => Outcome::Totals {
                scope: TotalsScope::Range,
                space: self
                    .trains
                    .selected()
                    .carriages
                    .range_totals(&start, &end)?,
            },
            Command::Move {
                source,
                destination,
                count,
            } => {
                let seating = self
                    .trains
                    .selected_mut()
                    .carriages
                    .move_passengers(&source, &destination, count)?;
                Outcome::Moved { source, seating }
            }
            Command::NewTrain => {
                let id = self.trains.insert_before_selected();
                Outcome::TrainCreated {
                    position: self.trains.position(id).unwrap_or_default(),
                }
            }
            Command::Next => {
                let moved = self.trains.select_next();
                Outcome::Selected {
                    position: self.trains.selected_position(),
                    moved,
                }
            }
            Command::Previous => {
                let moved = self.trains.select_previous();
                Outcome::Selected {
                    position: self.trains.selected_position(),
                    moved,
                }
            }
            Command::PrintAll => Outcome::Roster {
                trains: self.trains.summaries(),
            },
            Command::RemoveCarriage { id } => {
                self.trains.selected_mut().carriages.remove_by_id(&id)?;
                Outcome::CarriageRemoved { id }
            }
            Command::RemoveTrain => {
                let removed = self.trains.remove_selected();
                Outcome::TrainRemoved {
                    carriages: removed.carriages.len(),
                    selected: self.trains.selected_position(),
                }
            }
            Command::Merge => {
                let report = self.trains.merge_selected();
                if report.is_none() {
                    debug!("No train after the selected one, nothing to merge");
                }
                Outcome::Merged { report }
            }
            Command::Split { count, ids } => {
                positive_count(count)?;
                Outcome::Split {
                    report: self.trains.split_selected(&ids),
                }
            }
            Command::Unknown(code) => Outcome::Ignored { code },
        };
        Ok(outcome)
    }

    /// Releases every train at the end of a session.
    pub fn close(self) -> usize {
        self.trains.remove_all()
    }
}
