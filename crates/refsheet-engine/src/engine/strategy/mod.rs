//! The expression strategy chain.
//!
//! An entered value is rewritten by each [`Strategy`] in [`Strategy::CHAIN`]
//! order. Each strategy reduces one syntactic construct to plain text and
//! leaves everything else untouched:
//!
//! 1. `REF(A1)` is replaced by A1's display value
//! 2. `SUM(A1..B2)` / `AVERAGE(A1..B2)` are replaced by the computed number
//! 3. Arithmetic over the substituted string is evaluated
//! 4. `+` between text operands is dropped (concatenation)
//!
//! References must resolve before arithmetic runs, and concatenation has to
//! see the substituted string to tell numeric `+` from textual `+`.

mod arithmetic;
mod concat;
mod range;
mod reference;

use std::collections::BTreeSet;

use super::cell_ref::CellRef;
use super::error::{ErrorKind, EvalResult};

pub(crate) use arithmetic::is_numeric_char;

/// Read-only view of the grid a strategy resolves references against.
pub trait GridView {
    fn rows(&self) -> usize;
    fn cols(&self) -> usize;
    /// Current display value at `at`, or `None` outside the grid.
    fn display_value(&self, at: &CellRef) -> Option<&str>;
}

/// Evaluation state for one cell: the grid, the cell's own address and every
/// cell read so far.
pub struct EvalContext<'a> {
    grid: &'a dyn GridView,
    origin: CellRef,
    references: BTreeSet<CellRef>,
}

impl<'a> EvalContext<'a> {
    pub fn new(grid: &'a dyn GridView, origin: CellRef) -> Self {
        EvalContext {
            grid,
            origin,
            references: BTreeSet::new(),
        }
    }

    pub fn origin(&self) -> CellRef {
        self.origin
    }

    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    pub fn cols(&self) -> usize {
        self.grid.cols()
    }

    /// Read a cell's display value and record it as a reference.
    pub(crate) fn read(&mut self, at: CellRef) -> EvalResult<&'a str> {
        let display = self.grid.display_value(&at).ok_or(ErrorKind::OutOfRange)?;
        self.references.insert(at);
        Ok(display)
    }

    /// Cells read during evaluation, in row-major order.
    pub fn references(&self) -> &BTreeSet<CellRef> {
        &self.references
    }

    pub fn into_references(self) -> BTreeSet<CellRef> {
        self.references
    }
}

/// One rewriting step of the chain.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Strategy {
    CellReference,
    RangeSum,
    RangeAverage,
    ArithmeticFormula,
    PlusSignCleanup,
}

impl Strategy {
    pub const CHAIN: [Strategy; 5] = [
        Strategy::CellReference,
        Strategy::RangeSum,
        Strategy::RangeAverage,
        Strategy::ArithmeticFormula,
        Strategy::PlusSignCleanup,
    ];

    pub fn parse(&self, input: &str, ctx: &mut EvalContext<'_>) -> EvalResult<String> {
        match self {
            Strategy::CellReference => reference::parse(input, ctx),
            Strategy::RangeSum => range::parse(input, ctx, range::RangeFunction::Sum),
            Strategy::RangeAverage => range::parse(input, ctx, range::RangeFunction::Average),
            Strategy::ArithmeticFormula => arithmetic::parse(input),
            Strategy::PlusSignCleanup => Ok(concat::parse(input)),
        }
    }
}

/// Run the full chain over an entered value.
pub fn evaluate(entered: &str, ctx: &mut EvalContext<'_>) -> EvalResult<String> {
    Strategy::CHAIN
        .iter()
        .try_fold(entered.to_string(), |value, strategy| {
            let next = strategy.parse(&value, ctx)?;
            if next != value {
                log::trace!("{} {:?}: {:?} -> {:?}", ctx.origin(), strategy, value, next);
            }
            Ok(next)
        })
}

/// Replace every `<trigger><inner>)` invocation with `resolve(inner)`, keeping
/// the text around each invocation. Fails with `unclosed` when an invocation
/// has no closing parenthesis.
fn substitute_invocations<F>(
    input: &str,
    trigger: &str,
    unclosed: ErrorKind,
    mut resolve: F,
) -> EvalResult<String>
where
    F: FnMut(&str) -> EvalResult<String>,
{
    let mut parts = input.split(trigger);
    let mut out = parts.next().unwrap_or_default().to_string();
    for part in parts {
        let close = part.find(')').ok_or(unclosed)?;
        out.push_str(&resolve(&part[..close])?);
        out.push_str(&part[close + 1..]);
    }
    Ok(out)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Fixed-size grid backed by a map; missing cells read as blank.
    pub(crate) struct MapGrid {
        rows: usize,
        cols: usize,
        values: HashMap<CellRef, String>,
    }

    impl MapGrid {
        pub(crate) fn new(rows: usize, cols: usize) -> Self {
            MapGrid {
                rows,
                cols,
                values: HashMap::new(),
            }
        }

        pub(crate) fn with(mut self, address: &str, display: &str) -> Self {
            let at = CellRef::parse(address).unwrap();
            self.values.insert(at, display.to_string());
            self
        }
    }

    impl GridView for MapGrid {
        fn rows(&self) -> usize {
            self.rows
        }

        fn cols(&self) -> usize {
            self.cols
        }

        fn display_value(&self, at: &CellRef) -> Option<&str> {
            if !at.within(self.rows, self.cols) {
                return None;
            }
            Some(self.values.get(at).map(String::as_str).unwrap_or(""))
        }
    }

    pub(crate) fn quad() -> MapGrid {
        MapGrid::new(5, 5)
            .with("A1", "5")
            .with("B1", "6")
            .with("A2", "7")
            .with("B2", "8")
    }

    pub(crate) fn eval_at(grid: &MapGrid, origin: &str, entered: &str) -> EvalResult<String> {
        let mut ctx = EvalContext::new(grid, CellRef::parse(origin).unwrap());
        evaluate(entered, &mut ctx)
    }

    #[test]
    fn test_plain_text_and_numbers_pass_through() {
        let grid = quad();
        assert_eq!(eval_at(&grid, "C3", "hello"), Ok("hello".to_string()));
        assert_eq!(eval_at(&grid, "C3", "42"), Ok("42".to_string()));
        assert_eq!(eval_at(&grid, "C3", ""), Ok(String::new()));
    }

    #[test]
    fn test_sum_and_average() {
        let grid = quad();
        assert_eq!(eval_at(&grid, "C3", "SUM(A1..B2)"), Ok("26".to_string()));
        assert_eq!(eval_at(&grid, "C3", "AVERAGE(A1..B2)"), Ok("6.5".to_string()));
    }

    #[test]
    fn test_mixed_formula_honours_precedence() {
        let grid = quad();
        assert_eq!(
            eval_at(&grid, "C3", "AVERAGE(A1..B2) * SUM(B1..B2) + 8"),
            Ok("99".to_string())
        );
    }

    #[test]
    fn test_juxtaposed_results_stay_text() {
        let grid = quad();
        assert_eq!(
            eval_at(&grid, "C3", "AVERAGE(A1..B2) SUM(B1..B2) 8"),
            Ok("6.5 14 8".to_string())
        );
    }

    #[test]
    fn test_reference_and_concatenation() {
        let grid = MapGrid::new(3, 3).with("A1", "howdy").with("B1", "Bye");
        assert_eq!(eval_at(&grid, "C1", "REF(B1)"), Ok("Bye".to_string()));
        assert_eq!(
            eval_at(&grid, "C1", "REF(A1)+goodbye"),
            Ok("howdygoodbye".to_string())
        );
    }

    #[test]
    fn test_reference_feeds_arithmetic() {
        let grid = quad();
        assert_eq!(eval_at(&grid, "C3", "REF(A1) * REF(B2)"), Ok("40".to_string()));
    }

    #[test]
    fn test_negative_references_in_arithmetic() {
        let grid = MapGrid::new(3, 3).with("A1", "-3").with("B1", "5");
        assert_eq!(eval_at(&grid, "C1", "REF(B1)-REF(A1)"), Ok("8".to_string()));
        assert_eq!(eval_at(&grid, "C1", "REF(A1)^2"), Ok("-9".to_string()));
        assert_eq!(eval_at(&grid, "C1", "(REF(A1))^2"), Ok("9".to_string()));
        assert_eq!(eval_at(&grid, "C1", "-2^2"), Ok("-4".to_string()));
    }

    #[test]
    fn test_malformed_inputs() {
        let grid = quad();
        assert_eq!(
            eval_at(&grid, "C3", "REF(A5"),
            Err(ErrorKind::InvalidCellReference)
        );
        assert_eq!(
            eval_at(&grid, "C3", "SUM(A5..D5"),
            Err(ErrorKind::InvalidRangeExpression)
        );
        assert_eq!(eval_at(&grid, "C3", "1 / hi"), Err(ErrorKind::InvalidFormula));
    }

    #[test]
    fn test_self_reference_is_reported() {
        let grid = quad();
        assert_eq!(eval_at(&grid, "A1", "REF(A1)"), Err(ErrorKind::SelfReference));
        assert_eq!(
            eval_at(&grid, "B2", "SUM(A1..C3)"),
            Err(ErrorKind::SelfReference)
        );
    }

    #[test]
    fn test_references_are_recorded() {
        let grid = quad();
        let mut ctx = EvalContext::new(&grid, CellRef::new(4, 4));
        evaluate("REF(A1) + SUM(A2..B2)", &mut ctx).unwrap();
        let refs: Vec<String> = ctx.references().iter().map(|r| r.to_string()).collect();
        assert_eq!(refs, vec!["A1", "A2", "B2"]);
    }

    #[test]
    fn test_substitute_invocations_keeps_surrounding_text() {
        let out = substitute_invocations("x F(a) y F(b)z", "F(", ErrorKind::InvalidFormula, |inner| {
            Ok(inner.to_uppercase())
        });
        assert_eq!(out, Ok("x A y Bz".to_string()));
    }
}
