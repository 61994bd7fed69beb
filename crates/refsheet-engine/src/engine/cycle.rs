//! Circular reference detection for formula cells.
//!
//! A single-hop self reference is caught by the strategies themselves
//! (`#SELF-REF`). Longer loops (A1 references B1, B1 references A1) are found
//! here with a depth-first search over the cells each cell references, so
//! recomputation never chases its own tail.

use std::collections::HashSet;

use super::CellRef;

/// The outgoing reference edges of a grid.
pub trait ReferenceGraph {
    /// Cells whose display value `at` read during its last evaluation.
    fn references(&self, at: &CellRef) -> Vec<CellRef>;
}

/// Detect a reference cycle passing through `start`.
/// Returns Some(cycle_path) beginning and ending at `start`, None otherwise.
pub fn detect_cycle<G: ReferenceGraph + ?Sized>(start: &CellRef, graph: &G) -> Option<Vec<CellRef>> {
    let mut visited = HashSet::new();
    let mut path = vec![*start];

    if detect_cycle_dfs(start, start, graph, &mut visited, &mut path) {
        Some(path)
    } else {
        None
    }
}

fn detect_cycle_dfs<G: ReferenceGraph + ?Sized>(
    start: &CellRef,
    current: &CellRef,
    graph: &G,
    visited: &mut HashSet<CellRef>,
    path: &mut Vec<CellRef>,
) -> bool {
    for next in graph.references(current) {
        if next == *current {
            continue;
        }
        if next == *start {
            path.push(next);
            return true;
        }
        if !visited.insert(next) {
            continue;
        }
        path.push(next);
        if detect_cycle_dfs(start, &next, graph, visited, path) {
            return true;
        }
        path.pop();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Edges(HashMap<CellRef, Vec<CellRef>>);

    impl ReferenceGraph for Edges {
        fn references(&self, at: &CellRef) -> Vec<CellRef> {
            self.0.get(at).cloned().unwrap_or_default()
        }
    }

    fn c(name: &str) -> CellRef {
        CellRef::parse(name).unwrap()
    }

    fn edges(pairs: &[(&str, &str)]) -> Edges {
        let mut map: HashMap<CellRef, Vec<CellRef>> = HashMap::new();
        for (from, to) in pairs {
            map.entry(c(from)).or_default().push(c(to));
        }
        Edges(map)
    }

    #[test]
    fn test_no_cycle_in_chain() {
        let graph = edges(&[("A1", "B1"), ("B1", "C1")]);
        assert!(detect_cycle(&c("A1"), &graph).is_none());
    }

    #[test]
    fn test_two_cell_cycle() {
        let graph = edges(&[("A1", "B1"), ("B1", "A1")]);
        assert_eq!(detect_cycle(&c("A1"), &graph), Some(vec![c("A1"), c("B1"), c("A1")]));
    }

    #[test]
    fn test_longer_cycle() {
        let graph = edges(&[("A1", "B1"), ("B1", "C1"), ("C1", "D1"), ("D1", "A1")]);
        let path = detect_cycle(&c("A1"), &graph).unwrap();
        assert_eq!(path.first(), Some(&c("A1")));
        assert_eq!(path.last(), Some(&c("A1")));
        assert_eq!(path.len(), 5);
    }

    #[test]
    fn test_downstream_of_cycle_is_not_on_it() {
        let graph = edges(&[("A1", "B1"), ("B1", "C1"), ("C1", "B1")]);
        assert!(detect_cycle(&c("A1"), &graph).is_none());
        assert!(detect_cycle(&c("B1"), &graph).is_some());
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        let graph = edges(&[("A1", "B1"), ("A1", "C1"), ("B1", "D1"), ("C1", "D1")]);
        assert!(detect_cycle(&c("A1"), &graph).is_none());
    }
}
