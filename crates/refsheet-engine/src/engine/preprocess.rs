//! Reference rewriting for row/column insertion and deletion.
//!
//! Addresses inside `REF(..)`, `SUM(..)` and `AVERAGE(..)` are absolute, so
//! when the grid grows or shrinks every entered value is rewritten to keep
//! pointing at the same logical cells.

use regex::{Captures, Regex};
use std::sync::OnceLock;

use super::cell_ref::CellRef;

/// Placeholder written where a referenced row/column was deleted. It never
/// decodes, so the cell evaluates to `#INVALID-REF` or `#INVALID-EXPR`.
pub const DELETED_REF: &str = "#REF!";

/// Operation for shifting cell references in formulas.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ShiftOperation {
    InsertRow(usize),
    DeleteRow(usize),
    InsertColumn(usize),
    DeleteColumn(usize),
}

impl ShiftOperation {
    /// Where `at` ends up after the operation; None if it was deleted.
    ///
    /// Rules:
    /// - Insert row at R: rows >= R become row + 1
    /// - Delete row at R: rows > R become row - 1; row == R is gone
    /// - Same logic for columns
    pub fn apply(&self, at: &CellRef) -> Option<CellRef> {
        match *self {
            ShiftOperation::InsertRow(r) if at.row >= r => Some(CellRef::new(at.col, at.row + 1)),
            ShiftOperation::DeleteRow(r) if at.row == r => None,
            ShiftOperation::DeleteRow(r) if at.row > r => Some(CellRef::new(at.col, at.row - 1)),
            ShiftOperation::InsertColumn(c) if at.col >= c => Some(CellRef::new(at.col + 1, at.row)),
            ShiftOperation::DeleteColumn(c) if at.col == c => None,
            ShiftOperation::DeleteColumn(c) if at.col > c => Some(CellRef::new(at.col - 1, at.row)),
            _ => Some(*at),
        }
    }
}

fn ref_call_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"REF\(\s*([A-Z]+[0-9]+)\s*\)").expect("REF call regex must compile")
    })
}

fn range_call_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(SUM|AVERAGE)\(\s*([A-Z]+[0-9]+)\s*\.\.\s*([A-Z]+[0-9]+)\s*\)")
            .expect("range call regex must compile")
    })
}

/// Shift the references in an entered value. Invocations whose addresses do
/// not move are left byte-for-byte as typed.
pub fn shift_formula_references(entered: &str, op: ShiftOperation) -> String {
    let ranges_shifted = range_call_re().replace_all(entered, |caps: &Captures| {
        let start = shift_single_ref(&caps[2], op);
        let end = shift_single_ref(&caps[3], op);
        if start == caps[2] && end == caps[3] {
            return caps[0].to_string();
        }
        format!("{}({}..{})", &caps[1], start, end)
    });

    ref_call_re()
        .replace_all(&ranges_shifted, |caps: &Captures| {
            let target = shift_single_ref(&caps[1], op);
            if target == caps[1] {
                return caps[0].to_string();
            }
            format!("REF({})", target)
        })
        .into_owned()
}

fn shift_single_ref(cell_ref_str: &str, op: ShiftOperation) -> String {
    let Ok(cr) = CellRef::parse(cell_ref_str) else {
        return cell_ref_str.to_string();
    };
    match op.apply(&cr) {
        Some(moved) => moved.to_string(),
        None => DELETED_REF.to_string(),
    }
}
