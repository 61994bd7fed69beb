use super::Grid;
use crate::cell::{Cell, Style};
use crate::error::{CoreError, Result};
use refsheet_engine::engine::{CellRef, ShiftOperation, ValidationRule};

/// Dimension for row/column operations
#[derive(Copy, Clone, Debug)]
enum Dimension {
    Row,
    Column,
}

impl Dimension {
    fn name(&self) -> &'static str {
        match self {
            Dimension::Row => "Row",
            Dimension::Column => "Column",
        }
    }

    fn insert_op(&self, at: usize) -> ShiftOperation {
        match self {
            Dimension::Row => ShiftOperation::InsertRow(at),
            Dimension::Column => ShiftOperation::InsertColumn(at),
        }
    }

    fn delete_op(&self, at: usize) -> ShiftOperation {
        match self {
            Dimension::Row => ShiftOperation::DeleteRow(at),
            Dimension::Column => ShiftOperation::DeleteColumn(at),
        }
    }
}

impl Grid {
    /// Store `value` verbatim as the cell's entered value and recompute it
    /// and everything that depends on it.
    pub fn set_entered_value(&mut self, at: &CellRef, value: impl Into<String>) -> Result<()> {
        let cell = self.checked_cell_mut(at)?;
        cell.entered = value.into();
        log::debug!("set {} to {:?}", at, cell.entered);
        self.recompute_from(*at);
        Ok(())
    }

    /// Same as [`Grid::set_entered_value`], addressed in A1 notation.
    pub fn set(&mut self, address: &str, value: impl Into<String>) -> Result<()> {
        let at = self.resolve(address)?;
        self.set_entered_value(&at, value)
    }

    pub fn clear_cell(&mut self, at: &CellRef) -> Result<()> {
        self.set_entered_value(at, String::new())
    }

    pub fn set_style(&mut self, at: &CellRef, style: Style) -> Result<()> {
        self.checked_cell_mut(at)?.style = style;
        Ok(())
    }

    /// Attach a validation rule and re-check the cell against it.
    pub fn add_rule(&mut self, at: &CellRef, rule: ValidationRule) -> Result<()> {
        self.checked_cell_mut(at)?.rules.push(rule);
        self.recompute_from(*at);
        Ok(())
    }

    pub fn remove_rule(&mut self, at: &CellRef, index: usize) -> Result<ValidationRule> {
        let cell = self.checked_cell_mut(at)?;
        if index >= cell.rules.len() {
            return Err(CoreError::NoSuchRule(*at, index));
        }
        let rule = cell.rules.remove(index);
        self.recompute_from(*at);
        Ok(rule)
    }

    pub fn clear_rules(&mut self, at: &CellRef) -> Result<()> {
        self.checked_cell_mut(at)?.rules.clear();
        self.recompute_from(*at);
        Ok(())
    }

    /// Replace every occurrence of `find` in one cell's entered value.
    /// Returns whether the cell changed.
    pub fn find_replace(&mut self, at: &CellRef, find: &str, replace: &str) -> Result<bool> {
        let changed = self.checked_cell_mut(at)?.find_replace(find, replace);
        if changed {
            self.recompute_from(*at);
        }
        Ok(changed)
    }

    /// Replace every occurrence of `find` across the grid.
    /// Returns the number of cells changed.
    pub fn find_and_replace_all(&mut self, find: &str, replace: &str) -> usize {
        if find.is_empty() {
            return 0;
        }
        let matches: Vec<CellRef> = self
            .iter()
            .filter(|(_, cell)| cell.entered.contains(find))
            .map(|(at, _)| at)
            .collect();

        let mut changed = 0;
        for at in matches {
            if let Some(cell) = self.cell_mut(&at)
                && cell.find_replace(find, replace)
            {
                changed += 1;
                self.recompute_from(at);
            }
        }
        log::debug!("replaced {:?} with {:?} in {} cells", find, replace, changed);
        changed
    }

    /// Generic insert operation for row or column
    fn insert_dimension(&mut self, dim: Dimension, at: usize) -> Result<()> {
        let count = self.dimension_len(dim);
        if at > count {
            return Err(CoreError::IndexOutOfBounds {
                dimension: dim.name(),
                index: at,
                count,
            });
        }

        match dim {
            Dimension::Row => {
                let cols = self.cols();
                self.cells.insert(at, vec![Cell::new_empty(); cols]);
            }
            Dimension::Column => {
                for row in &mut self.cells {
                    row.insert(at, Cell::new_empty());
                }
            }
        }

        self.apply_shift(dim.insert_op(at));
        Ok(())
    }

    /// Generic delete operation for row or column.
    /// Deleting the last remaining row or column is a no-op returning false.
    fn delete_dimension(&mut self, dim: Dimension, at: usize) -> Result<bool> {
        let count = self.dimension_len(dim);
        if at >= count {
            return Err(CoreError::IndexOutOfBounds {
                dimension: dim.name(),
                index: at,
                count,
            });
        }
        if count == 1 {
            return Ok(false);
        }

        match dim {
            Dimension::Row => {
                self.cells.remove(at);
            }
            Dimension::Column => {
                for row in &mut self.cells {
                    row.remove(at);
                }
            }
        }

        self.apply_shift(dim.delete_op(at));
        Ok(true)
    }

    fn dimension_len(&self, dim: Dimension) -> usize {
        match dim {
            Dimension::Row => self.rows(),
            Dimension::Column => self.cols(),
        }
    }

    /// Rewrite every reference and edge for a resize, then recompute all.
    fn apply_shift(&mut self, op: ShiftOperation) {
        log::debug!("{:?}: recomputing {} cells", op, self.cell_count());
        for row in &mut self.cells {
            for cell in row {
                cell.shift(op);
            }
        }
        self.recompute_all();
    }

    /// Insert an empty row before row index `at` (`at == rows()` appends).
    pub fn insert_row(&mut self, at: usize) -> Result<()> {
        self.insert_dimension(Dimension::Row, at)
    }

    /// Delete the specified row
    pub fn delete_row(&mut self, at: usize) -> Result<bool> {
        self.delete_dimension(Dimension::Row, at)
    }

    /// Insert an empty column before column index `at` (`at == cols()` appends).
    pub fn insert_column(&mut self, at: usize) -> Result<()> {
        self.insert_dimension(Dimension::Column, at)
    }

    /// Delete the specified column
    pub fn delete_column(&mut self, at: usize) -> Result<bool> {
        self.delete_dimension(Dimension::Column, at)
    }
}
