//! Line-oriented command language for driving a grid from scripts or stdin.
//!
//! ```text
//! A1 = 5
//! B1 = REF(A1) * 2
//! rule B1 range < 100
//! print B1
//! ```

use anyhow::{Context, Result, bail};
use refsheet_core::Grid;
use refsheet_engine::engine::{CellRef, TypeConstraint, ValidationRule};
use std::io::Write;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Axis {
    Row,
    Column,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Set { address: String, value: String },
    Print(String),
    Show,
    Clear(String),
    Rule { address: String, rule: ValidationRule },
    Unrule(String),
    Insert(Axis, usize),
    Delete(Axis, usize),
    Replace { find: String, replace: String },
}

/// Parse one input line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (keyword, rest) = match line.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword, rest.trim()),
        None => (line, ""),
    };

    let command = match keyword {
        "print" => Command::Print(single_address(keyword, rest)?),
        "show" => {
            if !rest.is_empty() {
                bail!("show takes no arguments");
            }
            Command::Show
        }
        "clear" => Command::Clear(single_address(keyword, rest)?),
        "unrule" => Command::Unrule(single_address(keyword, rest)?),
        "rule" => parse_rule(rest)?,
        "insert" => {
            let (axis, index) = parse_axis(rest)?;
            Command::Insert(axis, index)
        }
        "delete" => {
            let (axis, index) = parse_axis(rest)?;
            Command::Delete(axis, index)
        }
        "replace" => {
            let mut words = rest.split_whitespace();
            let Some(find) = words.next() else {
                bail!("usage: replace <find> [<with>]");
            };
            let replace = words.next().unwrap_or_default();
            if words.next().is_some() {
                bail!("usage: replace <find> [<with>]");
            }
            Command::Replace {
                find: find.to_string(),
                replace: replace.to_string(),
            }
        }
        _ => match line.split_once('=') {
            Some((address, value)) if !address.trim().contains(char::is_whitespace) => {
                Command::Set {
                    address: address.trim().to_string(),
                    value: value.trim().to_string(),
                }
            }
            _ => bail!("unknown command: {}", keyword),
        },
    };
    Ok(Some(command))
}

fn single_address(keyword: &str, rest: &str) -> Result<String> {
    if rest.is_empty() || rest.contains(char::is_whitespace) {
        bail!("usage: {} <ADDR>", keyword);
    }
    Ok(rest.to_string())
}

fn parse_rule(rest: &str) -> Result<Command> {
    let mut words = rest.split_whitespace();
    let (Some(address), Some(kind)) = (words.next(), words.next()) else {
        bail!("usage: rule <ADDR> type|range|oneof ...");
    };
    let args: Vec<&str> = words.collect();

    let rule = match (kind, args.as_slice()) {
        ("type", [constraint]) => ValidationRule::Type(
            constraint
                .parse::<TypeConstraint>()
                .with_context(|| format!("unknown type constraint: {}", constraint))?,
        ),
        ("range", [comparison, threshold]) => ValidationRule::range(comparison, threshold)
            .with_context(|| format!("invalid range rule: {} {}", comparison, threshold))?,
        ("oneof", list) if !list.is_empty() => {
            let list = list.join(" ");
            ValidationRule::one_of(&list)
                .with_context(|| format!("invalid value list: {}", list))?
        }
        ("type", _) => bail!("usage: rule <ADDR> type number|word|any"),
        ("range", _) => bail!("usage: rule <ADDR> range =|<|> <n>"),
        ("oneof", _) => bail!("usage: rule <ADDR> oneof <a,b,c>"),
        _ => bail!("unknown rule kind: {}", kind),
    };
    Ok(Command::Rule {
        address: address.to_string(),
        rule,
    })
}

/// `row 3` or `col C`, converted to a zero-based index.
fn parse_axis(rest: &str) -> Result<(Axis, usize)> {
    let mut words = rest.split_whitespace();
    let (Some(axis), Some(label), None) = (words.next(), words.next(), words.next()) else {
        bail!("usage: insert|delete row <n> | col <letters>");
    };
    match axis {
        "row" => {
            let number: usize = label
                .parse()
                .with_context(|| format!("invalid row number: {}", label))?;
            if number == 0 {
                bail!("row numbers start at 1");
            }
            Ok((Axis::Row, number - 1))
        }
        "col" | "column" => {
            let at = CellRef::parse(&format!("{}1", label))
                .with_context(|| format!("invalid column label: {}", label))?;
            Ok((Axis::Column, at.col))
        }
        _ => bail!("expected row or col, got {}", axis),
    }
}

/// Apply a command to the grid, writing any output to `out`.
pub fn execute(grid: &mut Grid, command: &Command, out: &mut impl Write) -> Result<()> {
    match command {
        Command::Set { address, value } => grid.set(address, value.as_str())?,
        Command::Print(address) => writeln!(out, "{}", grid.display_value(address)?)?,
        Command::Show => show(grid, out)?,
        Command::Clear(address) => {
            let at = grid.resolve(address)?;
            grid.clear_cell(&at)?;
        }
        Command::Rule { address, rule } => {
            let at = grid.resolve(address)?;
            grid.add_rule(&at, rule.clone())?;
        }
        Command::Unrule(address) => {
            let at = grid.resolve(address)?;
            grid.clear_rules(&at)?;
        }
        Command::Insert(Axis::Row, at) => grid.insert_row(*at)?,
        Command::Insert(Axis::Column, at) => grid.insert_column(*at)?,
        Command::Delete(axis, at) => {
            let deleted = match axis {
                Axis::Row => grid.delete_row(*at)?,
                Axis::Column => grid.delete_column(*at)?,
            };
            if !deleted {
                log::warn!("cannot delete the last remaining {:?}", axis);
            }
        }
        Command::Replace { find, replace } => {
            let changed = grid.find_and_replace_all(find, replace);
            log::info!("replaced {:?} in {} cells", find, changed);
        }
    }
    Ok(())
}

/// Print the smallest rectangle from A1 holding every non-empty display
/// value, tab separated with row and column headers.
fn show(grid: &Grid, out: &mut impl Write) -> Result<()> {
    let Some((last_row, last_col)) = grid
        .iter()
        .filter(|(_, cell)| !cell.display_value().is_empty())
        .fold(None, |bounds: Option<(usize, usize)>, (at, _)| match bounds {
            Some((row, col)) => Some((row.max(at.row), col.max(at.col))),
            None => Some((at.row, at.col)),
        })
    else {
        return Ok(());
    };

    let header: Vec<String> = (0..=last_col).map(CellRef::col_to_letters).collect();
    writeln!(out, "\t{}", header.join("\t"))?;
    for row in 0..=last_row {
        let values: Vec<&str> = (0..=last_col)
            .map(|col| {
                grid.cell_by_index(row, col)
                    .map_or("", |cell| cell.display_value())
            })
            .collect();
        writeln!(out, "{}\t{}", row + 1, values.join("\t"))?;
    }
    Ok(())
}
