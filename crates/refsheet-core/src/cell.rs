//! Cell data structures for the spreadsheet grid.
//!
//! - [`Style`] - Presentation attributes carried through grid edits
//! - [`Cell`] - Entered value, display value, rules and observer edges
//!
//! Edges are stored as grid coordinates on both ends: `observers` lists the
//! cells that read this one, `observing` the cells this one read during its
//! last evaluation.

use refsheet_engine::engine::{CellRef, ShiftOperation, ValidationRule};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub color: Option<String>,
}

/// A cell in the spreadsheet grid.
#[derive(Clone, Debug, Default)]
pub struct Cell {
    pub(crate) entered: String,
    pub(crate) display: String,
    pub(crate) rules: Vec<ValidationRule>,
    pub(crate) observers: BTreeSet<CellRef>,
    pub(crate) observing: BTreeSet<CellRef>,
    pub(crate) style: Style,
}

impl Cell {
    pub fn new_empty() -> Cell {
        Cell::default()
    }

    /// Exactly what the user typed.
    pub fn entered_value(&self) -> &str {
        &self.entered
    }

    pub fn display_value(&self) -> &str {
        &self.display
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn rules(&self) -> &[ValidationRule] {
        &self.rules
    }

    /// Cells whose content references this cell.
    pub fn observers(&self) -> impl Iterator<Item = &CellRef> {
        self.observers.iter()
    }

    /// Cells this cell referenced during its last evaluation.
    pub fn observing(&self) -> impl Iterator<Item = &CellRef> {
        self.observing.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entered.is_empty()
    }

    /// Replace every occurrence of `find` in the entered value.
    /// Returns whether the entered value changed.
    pub(crate) fn find_replace(&mut self, find: &str, replace: &str) -> bool {
        if find.is_empty() || !self.entered.contains(find) {
            return false;
        }
        let replaced = self.entered.replace(find, replace);
        let changed = replaced != self.entered;
        self.entered = replaced;
        changed
    }

    /// Move edges and references to match a row/column insertion or deletion.
    pub(crate) fn shift(&mut self, op: ShiftOperation) {
        self.entered = refsheet_engine::engine::shift_formula_references(&self.entered, op);
        self.observers = self.observers.iter().filter_map(|at| op.apply(at)).collect();
        self.observing = self.observing.iter().filter_map(|at| op.apply(at)).collect();
    }
}
