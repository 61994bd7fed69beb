//! Grid state and logic.

mod eval;
mod ops;
mod state;

pub use state::Grid;
