use crate::carriage::*;
use crate::error::*;
use log::*;
use std::convert::TryFrom;

/// Ordered carriages of one train. Ids are unique within a list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[derive(serde::Serialize)]
#[serde(transparent)]
pub struct CarriageList {
    carriages: Vec<Carriage>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[derive(serde::Serialize)]
pub struct Space {
    pub occupied: u32,
    pub unoccupied: u32,
    pub capacity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[derive(serde::Serialize)]
pub struct Placement {
    pub id: CarriageId,
    pub count: u32,
}

/// Where a batch of passengers ended up. Only carriages that received at
/// least one passenger are listed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[derive(serde::Serialize)]
pub struct Seating {
    pub placements: Vec<Placement>,
    pub unseated: u32,
}

impl Seating {
    pub fn seated(&self) -> u32 {
        self.placements.iter().map(|p| p.count).sum()
    }
}

/// Rejects non-positive counts and counts that do not fit a `u32`.
pub fn positive_count(n: i64) -> YardResult<u32> {
    if n <= 0 {
        return Err(InvalidArgument::NonPositiveCount(n).into());
    }
    u32::try_from(n).map_err(|_| InvalidArgument::CountTooLarge(n).into())
}

impl CarriageList {
    pub fn new() -> CarriageList {
        CarriageList::default()
    }

    pub fn len(&self) -> usize {
        self.carriages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.carriages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Carriage> {
        self.carriages.iter()
    }

    pub fn contains(&self, id: &CarriageId) -> bool {
        self.find(id).is_some()
    }

    pub fn index_of(&self, id: &CarriageId) -> Option<usize> {
        self.carriages.iter().position(|c| &c.id == id)
    }

    pub fn find(&self, id: &CarriageId) -> Option<&Carriage> {
        self.carriages.iter().find(|c| &c.id == id)
    }

    fn find_mut(&mut self, id: &CarriageId) -> Option<&mut Carriage> {
        self.carriages.iter_mut().find(|c| &c.id == id)
    }

    /// First and last carriage ids, or `None` for an empty train.
    pub fn edges(&self) -> Option<(&CarriageId, &CarriageId)> {
        let first = self.carriages.first()?;
        let last = self.carriages.last()?;
        Some((&first.id, &last.id))
    }

    /// Inserts a new empty carriage before `position`, or at the end when
    /// `position` is past the last carriage. Returns the index it landed at.
    pub fn insert_at(
        &mut self,
        position: i64,
        id: CarriageId,
        kind: CarriageType,
        capacity: i64,
    ) -> YardResult<usize> {
        if position < 0 {
            return Err(InvalidArgument::NegativePosition(position).into());
        }
        if !kind.is_valid() {
            return Err(InvalidArgument::InvalidType.into());
        }
        if capacity < 1 || capacity > MAX_CAPACITY as i64 {
            return Err(InvalidArgument::CapacityOutOfRange(capacity).into());
        }
        if self.contains(&id) {
            return Err(YardError::DuplicateId(id));
        }

        let index = usize::try_from(position).unwrap_or(usize::MAX).min(self.len());
        trace!("Inserting carriage {} at index {}", id, index);
        self.carriages
            .insert(index, Carriage::new(id, kind, capacity as u32));
        Ok(index)
    }

    pub fn append(&mut self, id: CarriageId, kind: CarriageType, capacity: i64) -> YardResult<usize> {
        let position = self.len() as i64;
        self.insert_at(position, id, kind, capacity)
    }

    pub fn remove_by_id(&mut self, id: &CarriageId) -> YardResult<Carriage> {
        let index = self
            .index_of(id)
            .ok_or_else(|| YardError::NotFound(id.clone()))?;
        Ok(self.carriages.remove(index))
    }

    /// Sums the inclusive range `start..=end` in train order.
    pub fn range_totals(&self, start: &CarriageId, end: &CarriageId) -> YardResult<Space> {
        let from = self
            .index_of(start)
            .ok_or_else(|| YardError::NotFound(start.clone()))?;
        let to = self
            .index_of(end)
            .ok_or_else(|| YardError::NotFound(end.clone()))?;
        if from > to {
            return Err(YardError::OrderError {
                start: start.clone(),
                end: end.clone(),
            });
        }
        Ok(sum_space(&self.carriages[from..=to]))
    }

    /// Totals over the whole train, all zero when it has no carriages.
    pub fn totals(&self) -> Space {
        sum_space(&self.carriages)
    }

    /// Seats `n` passengers from carriage `id` onward, overflowing into the
    /// following carriages.
    pub fn load_passengers(&mut self, id: &CarriageId, n: i64) -> YardResult<Seating> {
        let n = positive_count(n)?;
        let index = self
            .index_of(id)
            .ok_or_else(|| YardError::NotFound(id.clone()))?;
        Ok(self.fill_from(index, n))
    }

    pub fn unload_passengers(&mut self, id: &CarriageId, n: i64) -> YardResult<u32> {
        let n = positive_count(n)?;
        let carriage = self
            .find_mut(id)
            .ok_or_else(|| YardError::NotFound(id.clone()))?;
        if carriage.occupancy < n {
            return Err(YardError::InsufficientOccupancy {
                id: id.clone(),
                count: n,
            });
        }
        carriage.occupancy -= n;
        Ok(n)
    }

    /// Moves `n` passengers out of `source` and seats them from `destination`
    /// to the end of the train. Only the carriages from `destination` onward
    /// count as room, so a move that does not fit there changes nothing.
    pub fn move_passengers(
        &mut self,
        source: &CarriageId,
        destination: &CarriageId,
        n: i64,
    ) -> YardResult<Seating> {
        let n = positive_count(n)?;
        let src = self
            .index_of(source)
            .ok_or_else(|| YardError::NotFound(source.clone()))?;
        if self.carriages[src].occupancy < n {
            return Err(YardError::InsufficientOccupancy {
                id: source.clone(),
                count: n,
            });
        }
        let dst = self
            .index_of(destination)
            .ok_or_else(|| YardError::NotFound(destination.clone()))?;

        // Seats freed in the source count as room when the source lies in
        // the destination range.
        let mut available = sum_space(&self.carriages[dst..]).unoccupied;
        if src >= dst {
            available += n;
        }
        if n > available {
            debug!(
                "Move of {} from {} to {} rejected, {} seats available",
                n, source, destination, available
            );
            return Err(YardError::InsufficientSpace {
                requested: n,
                available,
            });
        }

        self.carriages[src].occupancy -= n;
        Ok(self.fill_from(dst, n))
    }

    fn fill_from(&mut self, index: usize, n: u32) -> Seating {
        let mut seating = Seating::default();
        let mut remaining = n;
        for carriage in self.carriages[index..].iter_mut() {
            if remaining == 0 {
                break;
            }
            let seated = carriage.board(remaining);
            if seated > 0 {
                trace!("Seated {} in {}", seated, carriage.id);
                remaining -= seated;
                seating.placements.push(Placement {
                    id: carriage.id.clone(),
                    count: seated,
                });
            }
        }
        seating.unseated = remaining;
        seating
    }

    /// Cuts the list before `index`, returning everything from `index` on.
    pub fn split_off(&mut self, index: usize) -> CarriageList {
        CarriageList {
            carriages: self.carriages.split_off(index),
        }
    }

    /// Appends `other` after reconciling duplicates: a carriage of `other`
    /// whose id already exists here has its capacity and occupancy added to
    /// the existing carriage and is dropped. Returns the number reconciled.
    pub fn absorb(&mut self, other: CarriageList) -> usize {
        let mut duplicates = 0;
        for carriage in other.carriages {
            match self.find_mut(&carriage.id) {
                Some(existing) => {
                    trace!("Merging duplicate carriage {}", carriage.id);
                    existing.capacity += carriage.capacity;
                    existing.occupancy += carriage.occupancy;
                    duplicates += 1;
                }
                None => self.carriages.push(carriage),
            }
        }
        duplicates
    }
}

fn sum_space(carriages: &[Carriage]) -> Space {
    let capacity = carriages.iter().map(|c| c.capacity).sum::<u32>();
    let occupied = carriages.iter().map(|c| c.occupancy).sum::<u32>();
    Space {
        occupied,
        unoccupied: capacity - occupied,
        capacity,
    }
}
