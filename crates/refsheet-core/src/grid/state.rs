use crate::cell::Cell;
use crate::config::GridConfig;
use crate::error::{CoreError, Result};
use refsheet_engine::engine::{CellRef, GridView, ReferenceGraph};

/// Rectangular arena of cells, indexed `cells[row][col]`.
///
/// The grid is the only owner of cells; cells refer to each other by
/// coordinate, so the observer graph may contain cycles without any
/// ownership cycle.
#[derive(Clone, Debug)]
pub struct Grid {
    pub(crate) cells: Vec<Vec<Cell>>,
}

impl Grid {
    /// Create an empty grid of `rows` x `cols` cells.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(CoreError::EmptyGrid);
        }
        Ok(Grid {
            cells: vec![vec![Cell::new_empty(); cols]; rows],
        })
    }

    pub fn with_config(config: &GridConfig) -> Result<Self> {
        Self::new(config.rows, config.cols)
    }

    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    pub fn cols(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    pub fn cell_count(&self) -> usize {
        self.rows() * self.cols()
    }

    pub fn cell(&self, at: &CellRef) -> Option<&Cell> {
        self.cells.get(at.row)?.get(at.col)
    }

    pub fn cell_by_index(&self, row: usize, col: usize) -> Option<&Cell> {
        self.cell(&CellRef::new(col, row))
    }

    /// Look up a cell by its A1 address.
    pub fn cell_at(&self, address: &str) -> Result<&Cell> {
        let at = self.resolve(address)?;
        self.checked_cell(&at)
    }

    /// Display value of the cell at an A1 address.
    pub fn display_value(&self, address: &str) -> Result<&str> {
        self.cell_at(address).map(Cell::display_value)
    }

    /// Parse an A1 address and check it lies inside the grid.
    pub fn resolve(&self, address: &str) -> Result<CellRef> {
        let at = CellRef::parse(address.trim())
            .map_err(|_| CoreError::InvalidAddress(address.to_string()))?;
        self.checked_cell(&at)?;
        Ok(at)
    }

    /// All cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellRef, &Cell)> {
        self.cells.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .map(move |(col, cell)| (CellRef::new(col, row), cell))
        })
    }

    pub(crate) fn checked_cell(&self, at: &CellRef) -> Result<&Cell> {
        self.cell(at).ok_or_else(|| self.out_of_bounds(at))
    }

    pub(crate) fn checked_cell_mut(&mut self, at: &CellRef) -> Result<&mut Cell> {
        let err = self.out_of_bounds(at);
        self.cell_mut(at).ok_or(err)
    }

    pub(crate) fn cell_mut(&mut self, at: &CellRef) -> Option<&mut Cell> {
        self.cells.get_mut(at.row)?.get_mut(at.col)
    }

    fn out_of_bounds(&self, at: &CellRef) -> CoreError {
        CoreError::OutOfBounds {
            cell: *at,
            rows: self.rows(),
            cols: self.cols(),
        }
    }
}

impl GridView for Grid {
    fn rows(&self) -> usize {
        Grid::rows(self)
    }

    fn cols(&self) -> usize {
        Grid::cols(self)
    }

    fn display_value(&self, at: &CellRef) -> Option<&str> {
        self.cell(at).map(Cell::display_value)
    }
}

impl ReferenceGraph for Grid {
    fn references(&self, at: &CellRef) -> Vec<CellRef> {
        self.cell(at)
            .map(|cell| cell.observing().copied().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_rejects_empty_dimensions() {
        assert_eq!(Grid::new(0, 3).unwrap_err(), CoreError::EmptyGrid);
        assert_eq!(Grid::new(3, 0).unwrap_err(), CoreError::EmptyGrid);
    }

    #[test]
    fn test_lookup_by_address_and_index() {
        let grid = Grid::with_config(&GridConfig { rows: 3, cols: 2 }).unwrap();
        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.cols(), 2);
        assert_eq!(grid.cell_count(), 6);
        assert!(grid.cell_at("B3").is_ok());
        assert!(grid.cell_by_index(2, 1).is_some());
        assert!(grid.cell_by_index(3, 0).is_none());
        assert_eq!(grid.display_value("A1").unwrap(), "");
    }

    #[test]
    fn test_resolve_errors() {
        let grid = Grid::new(2, 2).unwrap();
        assert_eq!(
            grid.resolve("a1").unwrap_err(),
            CoreError::InvalidAddress("a1".to_string())
        );
        assert_eq!(
            grid.resolve("C1").unwrap_err(),
            CoreError::OutOfBounds {
                cell: CellRef::new(2, 0),
                rows: 2,
                cols: 2
            }
        );
    }

    #[test]
    fn test_iter_is_row_major() {
        let grid = Grid::new(2, 2).unwrap();
        let order: Vec<String> = grid.iter().map(|(at, _)| at.to_string()).collect();
        assert_eq!(order, vec!["A1", "B1", "A2", "B2"]);
    }
}
