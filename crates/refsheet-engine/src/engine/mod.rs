//! Cell evaluation engine API.
//!
//! This module turns a raw entered string into a display string:
//!
//! - [`CellRef`] - Address parsing (A1 notation ↔ column/row indices)
//! - [`ErrorKind`] - The fixed set of error display tokens
//! - [`Strategy`], [`evaluate`] - The rewriting chain applied to entered values
//! - [`ValidationRule`] - Predicates checked against computed display values
//! - [`detect_cycle`] - Circular reference detection over the observer graph
//! - [`shift_formula_references`] - Keep references stable across row/column edits
//! - [`format_number`] - Format numeric results for display

mod cell_ref;
mod cycle;
mod error;
mod format;
mod preprocess;
mod strategy;
mod validation;

pub use cell_ref::CellRef;
pub use cycle::{ReferenceGraph, detect_cycle};
pub use error::{ErrorKind, EvalResult};
pub use format::{format_number, parse_number};
pub use preprocess::{ShiftOperation, shift_formula_references};
pub use strategy::{EvalContext, GridView, Strategy, evaluate};
pub use validation::{Comparison, TypeConstraint, ValidationRule};
