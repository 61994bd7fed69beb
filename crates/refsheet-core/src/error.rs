//! Error types for refsheet core.
//!
//! These report misuse of the grid API. Evaluation failures are not errors at
//! this level: they become display tokens on the cell that failed.

use refsheet_engine::engine::{CellRef, ErrorKind};
use thiserror::Error;

/// Errors that can occur when driving a [`crate::Grid`]
#[derive(Error, Debug, PartialEq)]
pub enum CoreError {
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    #[error("Cell {cell} is outside the {rows}x{cols} grid")]
    OutOfBounds {
        cell: CellRef,
        rows: usize,
        cols: usize,
    },

    #[error("{dimension} index {index} out of bounds (count: {count})")]
    IndexOutOfBounds {
        dimension: &'static str,
        index: usize,
        count: usize,
    },

    #[error("Grid must have at least one row and one column")]
    EmptyGrid,

    #[error("Cell {0} has no validation rule at index {1}")]
    NoSuchRule(CellRef, usize),

    #[error("Invalid validation rule: {0}")]
    InvalidRule(#[from] ErrorKind),
}

pub type Result<T> = std::result::Result<T, CoreError>;
