//! refsheet-core - Grid model: cells, observer graph and recomputation.

pub mod cell;
pub mod config;
pub mod error;
pub mod grid;

pub use cell::{Cell, Style};
pub use config::GridConfig;
pub use error::{CoreError, Result};
pub use grid::Grid;

pub use refsheet_engine::engine::{
    CellRef, Comparison, ErrorKind, TypeConstraint, ValidationRule,
};
