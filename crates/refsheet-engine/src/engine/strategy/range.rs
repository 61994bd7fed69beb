//! `SUM(<a>..<b>)` and `AVERAGE(<a>..<b>)` substitution.

use super::{EvalContext, substitute_invocations};
use crate::engine::cell_ref::CellRef;
use crate::engine::error::{ErrorKind, EvalResult};
use crate::engine::format::{format_number, parse_number};

#[derive(Clone, Copy, Debug)]
pub(super) enum RangeFunction {
    Sum,
    Average,
}

impl RangeFunction {
    fn trigger(&self) -> &'static str {
        match self {
            RangeFunction::Sum => "SUM(",
            RangeFunction::Average => "AVERAGE(",
        }
    }
}

pub(super) fn parse(
    input: &str,
    ctx: &mut EvalContext<'_>,
    function: RangeFunction,
) -> EvalResult<String> {
    substitute_invocations(
        input,
        function.trigger(),
        ErrorKind::InvalidRangeExpression,
        |inner| {
            let (start, end) = parse_bounds(inner)?;
            let total = sum_range(ctx, start, end)?;
            let value = match function {
                RangeFunction::Sum => total,
                RangeFunction::Average => {
                    let count = (end.row - start.row + 1) * (end.col - start.col + 1);
                    total / count as f64
                }
            };
            if !value.is_finite() {
                return Err(ErrorKind::InvalidFormula);
            }
            Ok(format_number(value))
        },
    )
}

/// Parse `A1..B2` into its two corners, start first.
fn parse_bounds(inner: &str) -> EvalResult<(CellRef, CellRef)> {
    let mut parts = inner.split("..");
    let (Some(start), Some(end), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(ErrorKind::InvalidRangeExpression);
    };
    let start = CellRef::parse(start.trim()).map_err(|_| ErrorKind::InvalidRangeExpression)?;
    let end = CellRef::parse(end.trim()).map_err(|_| ErrorKind::InvalidRangeExpression)?;
    if start.col > end.col || start.row > end.row {
        return Err(ErrorKind::InvalidRangeExpression);
    }
    Ok((start, end))
}

/// Sum the rectangle row by row, recording every cell as a reference.
fn sum_range(ctx: &mut EvalContext<'_>, start: CellRef, end: CellRef) -> EvalResult<f64> {
    if !end.within(ctx.rows(), ctx.cols()) {
        return Err(ErrorKind::OutOfRange);
    }
    let origin = ctx.origin();
    if (start.row..=end.row).contains(&origin.row) && (start.col..=end.col).contains(&origin.col) {
        return Err(ErrorKind::SelfReference);
    }

    let mut total = 0.0;
    for row in start.row..=end.row {
        for col in start.col..=end.col {
            let display = ctx.read(CellRef::new(col, row))?;
            total += coerce(display)?;
        }
    }
    Ok(total)
}

/// Blank cells count as zero; anything else must be a number.
fn coerce(display: &str) -> EvalResult<f64> {
    if display.trim().is_empty() {
        return Ok(0.0);
    }
    parse_number(display).ok_or(ErrorKind::InvalidFormula)
}
