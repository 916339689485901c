use crate::carriage::CarriageId;
use crate::carriages::CarriageList;
use log::*;
use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Stable handle of a train, valid across merges and splits.
    pub struct TrainId;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Train {
    pub carriages: CarriageList,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[derive(serde::Serialize)]
pub struct TrainSummary {
    pub position: usize,
    pub selected: bool,
    pub carriages: usize,
    pub capacity: u32,
    pub occupancy: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[derive(serde::Serialize)]
pub struct MergeReport {
    pub absorbed: usize,
    pub duplicates: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[derive(serde::Serialize)]
pub struct SplitReport {
    pub created: usize,
    pub skipped: Vec<CarriageId>,
}

/// The ordered trains of the yard plus the selected-train cursor.
///
/// There is always at least one train, and the cursor always refers to a
/// train in the list.
#[derive(Debug)]
pub struct TrainList {
    trains: SlotMap<TrainId, Train>,
    order: Vec<TrainId>,
    selected: TrainId,
}

impl Default for TrainList {
    fn default() -> Self {
        TrainList::new()
    }
}

impl TrainList {
    pub fn new() -> TrainList {
        let mut trains = SlotMap::with_key();
        let selected = trains.insert(Train::default());
        TrainList {
            trains,
            order: vec![selected],
            selected,
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn selected_id(&self) -> TrainId {
        self.selected
    }

    pub fn selected(&self) -> &Train {
        &self.trains[self.selected]
    }

    pub fn selected_mut(&mut self) -> &mut Train {
        &mut self.trains[self.selected]
    }

    /// Index from the head of the list.
    pub fn position(&self, id: TrainId) -> Option<usize> {
        self.order.iter().position(|t| *t == id)
    }

    pub fn selected_position(&self) -> usize {
        self.position(self.selected)
            .expect("selected train is always in the list")
    }

    /// Trains in list order.
    pub fn iter(&self) -> impl Iterator<Item = (TrainId, &Train)> + '_ {
        self.order.iter().map(move |id| (*id, &self.trains[*id]))
    }

    pub fn select_next(&mut self) -> bool {
        let pos = self.selected_position();
        match self.order.get(pos + 1) {
            Some(next) => {
                self.selected = *next;
                true
            }
            None => false,
        }
    }

    pub fn select_previous(&mut self) -> bool {
        let pos = self.selected_position();
        if pos == 0 {
            return false;
        }
        self.selected = self.order[pos - 1];
        true
    }

    /// Links a new empty train in front of the selected one. The cursor
    /// keeps pointing at the same train.
    pub fn insert_before_selected(&mut self) -> TrainId {
        let pos = self.selected_position();
        let id = self.trains.insert(Train::default());
        self.order.insert(pos, id);
        id
    }

    /// Destroys the selected train. The cursor moves to the previous train,
    /// else the next, else to a freshly created empty train.
    pub fn remove_selected(&mut self) -> Train {
        let pos = self.selected_position();
        self.order.remove(pos);
        let removed = self
            .trains
            .remove(self.selected)
            .expect("selected train is always stored");

        self.selected = if pos > 0 {
            self.order[pos - 1]
        } else if let Some(next) = self.order.first() {
            *next
        } else {
            debug!("Removed the last train, creating an empty one");
            let id = self.trains.insert(Train::default());
            self.order.push(id);
            id
        };
        removed
    }

    /// Drops every train. Returns how many there were.
    pub fn remove_all(self) -> usize {
        let n = self.order.len();
        trace!("Releasing {} trains", n);
        n
    }

    pub fn summaries(&self) -> Vec<TrainSummary> {
        self.iter()
            .enumerate()
            .map(|(position, (id, train))| {
                let space = train.carriages.totals();
                TrainSummary {
                    position,
                    selected: id == self.selected_id(),
                    carriages: train.carriages.len(),
                    capacity: space.capacity,
                    occupancy: space.occupied,
                }
            })
            .collect()
    }

    /// Merges the train after the cursor into the selected train. Returns
    /// `None` when the selected train is the last one.
    pub fn merge_selected(&mut self) -> Option<MergeReport> {
        let pos = self.selected_position();
        let next = *self.order.get(pos + 1)?;
        self.order.remove(pos + 1);
        let successor = self.trains.remove(next)?;

        if successor.carriages.is_empty() {
            trace!("Train #{} is empty, dropping it", pos + 1);
        }
        let absorbed = successor.carriages.len();
        let duplicates = self.selected_mut().carriages.absorb(successor.carriages);
        debug!(
            "Merged train #{} into #{}: {} carriages, {} duplicates",
            pos + 1,
            pos,
            absorbed,
            duplicates
        );
        Some(MergeReport {
            absorbed,
            duplicates,
        })
    }

    /// Splits the selected train before each of `ids`, in order.
    ///
    /// Each id is searched for in the selected train and in the trains this
    /// call has created so far, which always sit directly after it. Trains
    /// that already followed the selected train are never searched. A match
    /// at the first carriage moves the whole train's carriages into the new
    /// train and leaves the old one empty.
    pub fn split_selected(&mut self, ids: &[CarriageId]) -> SplitReport {
        let start = self.selected_position();
        let mut window = 1;
        let mut report = SplitReport::default();

        for id in ids {
            let found = (start..start + window).find_map(|pos| {
                let train = self.order[pos];
                self.trains[train]
                    .carriages
                    .index_of(id)
                    .map(|index| (pos, index))
            });

            let (pos, index) = match found {
                Some(found) => found,
                None => {
                    warn!("Split id {} not found in the split trains", id);
                    report.skipped.push(id.clone());
                    continue;
                }
            };

            let source = self.order[pos];
            let tail = self.trains[source].carriages.split_off(index);
            trace!(
                "Split train #{} at {} (index {}), {} carriages move",
                pos,
                id,
                index,
                tail.len()
            );
            let new_train = self.trains.insert(Train { carriages: tail });
            self.order.insert(pos + 1, new_train);
            window += 1;
            report.created += 1;
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carriages::tests::{id, train};
    use proptest::prelude::*;

    fn names(train: &Train) -> Vec<&str> {
        train.carriages.iter().map(|c| c.id.as_str()).collect()
    }

    fn layout(list: &TrainList) -> Vec<Vec<&str>> {
        list.iter().map(|(_, t)| names(t)).collect()
    }

    fn with_selected(carriages: CarriageList) -> TrainList {
        let mut list = TrainList::new();
        list.selected_mut().carriages = carriages;
        list
    }

    #[test]
    fn navigation_stops_at_ends() {
        let mut list = TrainList::new();
        assert!(!list.select_next());
        assert!(!list.select_previous());
        let front = list.insert_before_selected();
        assert_eq!(list.selected_position(), 1);
        assert!(list.select_previous());
        assert_eq!(list.selected_id(), front);
        assert!(!list.select_previous());
        assert!(list.select_next());
        assert_eq!(list.selected_position(), 1);
    }

    #[test]
    fn removal_prefers_previous_then_next() {
        let mut list = TrainList::new();
        let last = list.selected_id();
        let first = list.insert_before_selected();
        let middle = list.insert_before_selected();
        assert_eq!(list.iter().map(|(t, _)| t).collect::<Vec<_>>(), vec![first, middle, last]);

        list.select_previous();
        list.remove_selected();
        assert_eq!(list.selected_id(), first);
        list.remove_selected();
        assert_eq!(list.selected_id(), last);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn removing_only_train_spawns_empty_one() {
        let mut list = with_selected(train(&[("A", 3, 1)]));
        let old = list.selected_id();
        let removed = list.remove_selected();
        assert_eq!(removed.carriages.len(), 1);
        assert_eq!(list.len(), 1);
        assert_ne!(list.selected_id(), old);
        assert!(list.selected().carriages.is_empty());
        assert_eq!(list.remove_all(), 1);
    }

    #[test]
    fn summaries_mark_selection() {
        let mut list = with_selected(train(&[("A", 10, 4), ("B", 5, 0)]));
        list.insert_before_selected();
        let summaries = list.summaries();
        assert_eq!(summaries.len(), 2);
        assert_eq!(
            summaries[1],
            TrainSummary {
                position: 1,
                selected: true,
                carriages: 2,
                capacity: 15,
                occupancy: 4
            }
        );
        assert_eq!((summaries[0].carriages, summaries[0].capacity), (0, 0));
        assert!(!summaries[0].selected);
    }

    #[test]
    fn merge_needs_a_successor() {
        let mut list = TrainList::new();
        assert_eq!(list.merge_selected(), None);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn merge_empty_successor_keeps_carriages() {
        let mut list = TrainList::new();
        list.insert_before_selected();
        list.select_previous();
        list.selected_mut().carriages = train(&[("X", 4, 2), ("Y", 2, 0)]);
        assert_eq!(layout(&list), vec![vec!["X", "Y"], vec![]]);

        let report = list.merge_selected().unwrap();
        assert_eq!(report, MergeReport { absorbed: 0, duplicates: 0 });
        assert_eq!(layout(&list), vec![vec!["X", "Y"]]);
        let x = list.selected().carriages.find(&id("X")).unwrap();
        assert_eq!((x.capacity, x.occupancy), (4, 2));
    }

    #[test]
    fn merge_into_empty_train() {
        let mut list = with_selected(train(&[("A", 3, 0), ("B", 3, 0)]));
        list.insert_before_selected();
        list.select_previous();
        let report = list.merge_selected().unwrap();
        assert_eq!(report, MergeReport { absorbed: 2, duplicates: 0 });
        assert_eq!(layout(&list), vec![vec!["A", "B"]]);
    }

    #[test]
    fn merge_relinks_following_train() {
        let mut list = with_selected(train(&[("C", 1, 0)]));
        list.insert_before_selected();
        list.insert_before_selected();
        list.select_previous();
        list.select_previous();
        list.selected_mut().carriages = train(&[("A", 2, 1)]);
        list.select_next();
        list.selected_mut().carriages = train(&[("A", 3, 2), ("B", 1, 0)]);
        list.select_previous();

        let report = list.merge_selected().unwrap();
        assert_eq!(report.duplicates, 1);
        assert_eq!(layout(&list), vec![vec!["A", "B"], vec!["C"]]);
        let a = list.selected().carriages.find(&id("A")).unwrap();
        assert_eq!((a.capacity, a.occupancy), (5, 3));
        assert!(list.select_next());
        assert!(!list.select_next());
    }

    #[test]
    fn split_at_interior_id() {
        let mut list = with_selected(train(&[("A", 1, 0), ("B", 1, 0), ("C", 1, 0), ("D", 1, 0)]));
        let report = list.split_selected(&[id("C")]);
        assert_eq!(report.created, 1);
        assert_eq!(layout(&list), vec![vec!["A", "B"], vec!["C", "D"]]);
        assert_eq!(list.selected_position(), 0);
    }

    #[test]
    fn split_at_first_carriage_empties_train() {
        let mut list = with_selected(train(&[("A", 1, 0), ("B", 1, 0)]));
        list.split_selected(&[id("A")]);
        assert_eq!(layout(&list), vec![vec![], vec!["A", "B"]]);
    }

    #[test]
    fn split_searches_new_trains_in_order() {
        let mut list = with_selected(train(&[
            ("A", 1, 0),
            ("B", 1, 0),
            ("C", 1, 0),
            ("D", 1, 0),
            ("E", 1, 0),
        ]));
        let report = list.split_selected(&[id("C"), id("E"), id("B"), id("X")]);
        assert_eq!(report.created, 3);
        assert_eq!(report.skipped, vec![id("X")]);
        assert_eq!(
            layout(&list),
            vec![vec!["A"], vec!["B"], vec!["C", "D"], vec!["E"]]
        );
    }

    #[test]
    fn split_ignores_trains_that_already_followed() {
        let mut list = with_selected(train(&[("Z", 1, 0)]));
        list.insert_before_selected();
        list.select_previous();
        list.selected_mut().carriages = train(&[("A", 1, 0), ("B", 1, 0)]);

        let report = list.split_selected(&[id("Z"), id("B")]);
        assert_eq!(report.skipped, vec![id("Z")]);
        assert_eq!(layout(&list), vec![vec!["A"], vec!["B"], vec!["Z"]]);
    }

    #[test]
    fn split_repeated_id_reaches_new_train() {
        let mut list = with_selected(train(&[("A", 1, 0), ("B", 1, 0)]));
        list.split_selected(&[id("B"), id("B")]);
        assert_eq!(layout(&list), vec![vec!["A"], vec![], vec!["B"]]);
    }

    proptest! {
        #[test]
        fn split_then_merge_restores_train(len in 2..10usize, cut in 1..10usize, fill in 0..30i64) {
            let names = (0..len).map(|i| format!("c{}", i)).collect::<Vec<_>>();
            let shape = names.iter().map(|n| (n.as_str(), 3, 0)).collect::<Vec<_>>();
            let mut carriages = train(&shape);
            if fill > 0 {
                carriages.load_passengers(&id("c0"), fill).unwrap();
            }
            let mut list = with_selected(carriages.clone());
            let cut = cut % (len - 1) + 1;

            let report = list.split_selected(&[id(&names[cut])]);
            prop_assert_eq!(report.created, 1);
            prop_assert_eq!(list.len(), 2);
            let merged = list.merge_selected().unwrap();
            prop_assert_eq!(merged.duplicates, 0);
            prop_assert_eq!(&list.selected().carriages, &carriages);
        }

        #[test]
        fn at_least_one_train_survives(inserts in 0..5usize, moves in proptest::collection::vec(any::<bool>(), 0..6), removals in 1..8usize) {
            let mut list = TrainList::new();
            for _ in 0..inserts {
                list.insert_before_selected();
            }
            for forward in moves {
                if forward { list.select_next(); } else { list.select_previous(); }
            }
            for _ in 0..removals {
                list.remove_selected();
                prop_assert!(list.len() >= 1);
                prop_assert!(list.position(list.selected_id()).is_some());
            }
        }
    }
}
