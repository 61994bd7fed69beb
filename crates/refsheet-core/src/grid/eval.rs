//! Display value computation and change propagation.
//!
//! A cell is evaluated by running the strategy chain against the grid, then
//! its observer edges are rebuilt from the cells it read. After an edit, the
//! cells downstream of the edited one are recomputed in dependency order
//! (Kahn's algorithm); when that order stalls on a cycle, a cell on the cycle
//! is forced, which resolves to `#CIRCULAR-REF`.

use std::collections::{BTreeSet, HashMap, VecDeque};

use super::Grid;
use refsheet_engine::engine::{CellRef, ErrorKind, EvalContext, ReferenceGraph, detect_cycle, evaluate};

impl Grid {
    /// Recompute one cell and commit its display value. Observers are not
    /// notified; callers decide the propagation order.
    pub(crate) fn update_display_value(&mut self, at: CellRef) {
        let Some(cell) = self.cell_mut(&at) else {
            return;
        };
        let entered = cell.entered.clone();
        let stale = std::mem::take(&mut cell.observing);
        for source in stale {
            if let Some(source) = self.cell_mut(&source) {
                source.observers.remove(&at);
            }
        }

        let (outcome, mut references) = {
            let mut ctx = EvalContext::new(&*self, at);
            let outcome = evaluate(&entered, &mut ctx);
            (outcome, ctx.into_references())
        };
        references.remove(&at);
        for source in &references {
            if let Some(source) = self.cell_mut(source) {
                source.observers.insert(at);
            }
        }
        if let Some(cell) = self.cell_mut(&at) {
            cell.observing = references;
        }

        let display = if let Some(path) = detect_cycle(&at, &*self) {
            log::debug!("{} is on a reference cycle ({} cells)", at, path.len() - 1);
            ErrorKind::CircularReference.token().to_string()
        } else {
            match outcome {
                Err(kind) => kind.token().to_string(),
                Ok(value) => self.validate(&at, value),
            }
        };

        if let Some(cell) = self.cell_mut(&at) {
            log::trace!("{} = {:?}", at, display);
            cell.display = display;
        }
    }

    /// Apply the cell's validation rules to a computed value.
    fn validate(&self, at: &CellRef, value: String) -> String {
        let Some(cell) = self.cell(at) else {
            return value;
        };
        match cell.rules.iter().find(|rule| !rule.check(&value)) {
            Some(rule) => {
                log::debug!("{} rejected {:?}: expected {}", at, value, rule);
                rule.error_kind().token().to_string()
            }
            None => value,
        }
    }

    /// Recompute `at`, then everything that (transitively) observes it.
    pub(crate) fn recompute_from(&mut self, at: CellRef) {
        self.update_display_value(at);

        let mut affected = BTreeSet::new();
        let mut queue: VecDeque<CellRef> = self.observers_of(&at).into();
        while let Some(next) = queue.pop_front() {
            if next == at || !affected.insert(next) {
                continue;
            }
            queue.extend(self.observers_of(&next));
        }
        log::debug!("{} changed, recomputing {} dependents", at, affected.len());
        self.recompute_in_order(affected);
    }

    /// Recompute every cell, e.g. after the grid was resized.
    pub(crate) fn recompute_all(&mut self) {
        let all: BTreeSet<CellRef> = self.iter().map(|(at, _)| at).collect();
        self.recompute_in_order(all);
    }

    fn observers_of(&self, at: &CellRef) -> Vec<CellRef> {
        self.cell(at)
            .map(|cell| cell.observers().copied().collect())
            .unwrap_or_default()
    }

    /// Recompute `pending` so that every cell runs after the pending cells it
    /// reads. Each cell is recomputed exactly once.
    fn recompute_in_order(&mut self, mut pending: BTreeSet<CellRef>) {
        let mut in_degree: HashMap<CellRef, usize> = pending
            .iter()
            .map(|at| {
                let waiting_on = self
                    .references(at)
                    .iter()
                    .filter(|source| pending.contains(source))
                    .count();
                (*at, waiting_on)
            })
            .collect();
        let mut ready: BTreeSet<CellRef> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(at, _)| *at)
            .collect();

        while !pending.is_empty() {
            let next = match ready.pop_first() {
                Some(next) => next,
                None => {
                    // Every pending cell waits on another pending cell, so
                    // there is a cycle. Cells on it evaluate to an error no
                    // matter what they read, so one can go first.
                    let forced = pending
                        .iter()
                        .copied()
                        .find(|at| detect_cycle(at, &*self).is_some())
                        .or_else(|| pending.first().copied());
                    let Some(forced) = forced else {
                        break;
                    };
                    log::debug!("recompute order stalled, forcing {}", forced);
                    forced
                }
            };
            if !pending.remove(&next) {
                continue;
            }
            self.update_display_value(next);

            for observer in self.observers_of(&next) {
                if !pending.contains(&observer) {
                    continue;
                }
                if let Some(degree) = in_degree.get_mut(&observer) {
                    *degree = degree.saturating_sub(1);
                    if *degree == 0 {
                        ready.insert(observer);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::Grid;
    use pretty_assertions::assert_eq;

    fn grid() -> Grid {
        Grid::new(6, 6).unwrap()
    }

    fn show(grid: &Grid, address: &str) -> String {
        grid.display_value(address).unwrap().to_string()
    }

    #[test]
    fn test_edges_follow_references() {
        let mut g = grid();
        g.set("A1", "5").unwrap();
        g.set("B1", "REF(A1) * 2").unwrap();
        let observers: Vec<String> = g
            .cell_at("A1")
            .unwrap()
            .observers()
            .map(|at| at.to_string())
            .collect();
        assert_eq!(observers, vec!["B1"]);

        g.set("B1", "3").unwrap();
        assert_eq!(g.cell_at("A1").unwrap().observers().count(), 0);
        assert_eq!(g.cell_at("B1").unwrap().observing().count(), 0);
    }

    #[test]
    fn test_chain_recomputes_in_dependency_order() {
        // A1 -> B1 -> C1 -> D1, and D1 also reads A1 directly.
        let mut g = grid();
        g.set("A1", "1").unwrap();
        g.set("B1", "REF(A1) + 1").unwrap();
        g.set("C1", "REF(B1) + 1").unwrap();
        g.set("D1", "REF(C1) + REF(A1)").unwrap();
        assert_eq!(show(&g, "D1"), "4");

        g.set("A1", "10").unwrap();
        assert_eq!(show(&g, "B1"), "11");
        assert_eq!(show(&g, "C1"), "12");
        assert_eq!(show(&g, "D1"), "22");
    }

    #[test]
    fn test_two_cell_cycle_is_reported_and_recovers() {
        let mut g = grid();
        g.set("A1", "REF(B1)").unwrap();
        g.set("B1", "REF(A1)").unwrap();
        assert_eq!(show(&g, "A1"), "#CIRCULAR-REF");
        assert_eq!(show(&g, "B1"), "#CIRCULAR-REF");

        g.set("B1", "7").unwrap();
        assert_eq!(show(&g, "B1"), "7");
        assert_eq!(show(&g, "A1"), "7");
    }

    #[test]
    fn test_three_cell_cycle_with_downstream_reader() {
        let mut g = grid();
        g.set("A1", "REF(B1)").unwrap();
        g.set("B1", "REF(C1)").unwrap();
        g.set("D1", "REF(A1)").unwrap();
        g.set("C1", "REF(A1)").unwrap();
        for address in ["A1", "B1", "C1"] {
            assert_eq!(show(&g, address), "#CIRCULAR-REF", "{address}");
        }
        // D1 is not on the cycle; it shows the error it read.
        assert_eq!(show(&g, "D1"), "#CIRCULAR-REF");

        g.set("C1", "hi").unwrap();
        for address in ["A1", "B1", "C1", "D1"] {
            assert_eq!(show(&g, address), "hi", "{address}");
        }
    }

    #[test]
    fn test_cycle_through_range() {
        let mut g = grid();
        g.set("A1", "SUM(B1..C1)").unwrap();
        g.set("C1", "REF(A1)").unwrap();
        assert_eq!(show(&g, "A1"), "#CIRCULAR-REF");
        assert_eq!(show(&g, "C1"), "#CIRCULAR-REF");
    }

    #[test]
    fn test_failed_range_still_observes_its_cells() {
        let mut g = grid();
        g.set("A1", "word").unwrap();
        g.set("B1", "2").unwrap();
        g.set("C1", "SUM(A1..B1)").unwrap();
        assert_eq!(show(&g, "C1"), "#INVALID-FORMULA");

        g.set("A1", "3").unwrap();
        assert_eq!(show(&g, "C1"), "5");
    }
}
