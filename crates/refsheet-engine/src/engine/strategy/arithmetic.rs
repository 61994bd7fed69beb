//! Infix arithmetic over the substituted string.
//!
//! Evaluation is handed to Rhai in expression-only mode. The formula is first
//! parsed here and written back out fully parenthesised, so precedence is
//! ours rather than Rhai's: `^` binds tighter than unary minus (`-2^2` is
//! `-4`) and is right associative. `^` becomes Rhai's `**`, and every numeric
//! literal becomes a float literal so `1 / 2` divides as `0.5`.

use rhai::{Dynamic, Engine};
use std::sync::OnceLock;

use crate::engine::error::{ErrorKind, EvalResult};
use crate::engine::format::format_number;

const OPERATORS: [char; 5] = ['+', '-', '*', '^', '/'];

/// Characters allowed in a numeric formula.
pub(crate) fn is_numeric_char(c: char) -> bool {
    c.is_ascii_digit() || OPERATORS.contains(&c) || matches!(c, '(' | ')' | '.' | ' ')
}

pub(super) fn parse(input: &str) -> EvalResult<String> {
    if !input.contains(&OPERATORS[..]) {
        return Ok(input.to_string());
    }
    if input.chars().all(is_numeric_char) {
        return evaluate_numeric(input).map(format_number);
    }
    // Text joined only by `+` is concatenation, handled after this step.
    let only_plus = input
        .chars()
        .filter(|c| OPERATORS.contains(c))
        .all(|c| c == '+');
    if only_plus {
        Ok(input.to_string())
    } else {
        Err(ErrorKind::InvalidFormula)
    }
}

fn engine() -> &'static Engine {
    static ENGINE: OnceLock<Engine> = OnceLock::new();
    ENGINE.get_or_init(|| {
        let mut engine = Engine::new();
        // Scripts nest one level per operator.
        engine.set_max_expr_depths(256, 256);
        engine
    })
}

#[derive(Clone, Debug, PartialEq)]
enum Token<'a> {
    Number(&'a str),
    Op(char),
    Open,
    Close,
}

fn tokenize(expr: &str) -> Option<Vec<Token<'_>>> {
    let mut tokens = Vec::new();
    let mut chars = expr.char_indices().peekable();
    while let Some((start, c)) = chars.next() {
        match c {
            ' ' => {}
            '(' => tokens.push(Token::Open),
            ')' => tokens.push(Token::Close),
            c if OPERATORS.contains(&c) => tokens.push(Token::Op(c)),
            c if c.is_ascii_digit() || c == '.' => {
                let mut end = start + c.len_utf8();
                while let Some(&(i, d)) = chars.peek() {
                    if !(d.is_ascii_digit() || d == '.') {
                        break;
                    }
                    end = i + d.len_utf8();
                    chars.next();
                }
                tokens.push(Token::Number(&expr[start..end]));
            }
            _ => return None,
        }
    }
    Some(tokens)
}

/// Recursive descent over the tokens, emitting a parenthesised Rhai script.
///
/// ```text
/// expr  := term (('+' | '-') term)*
/// term  := unary (('*' | '/') unary)*
/// unary := ('-' | '+') unary | power
/// power := primary ('^' unary)?
/// primary := number | '(' expr ')'
/// ```
struct ScriptWriter<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
}

impl<'a> ScriptWriter<'a> {
    fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos)
    }

    fn expr(&mut self) -> Option<String> {
        let mut out = self.term()?;
        while let Some(&Token::Op(op @ ('+' | '-'))) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            out = format!("({} {} {})", out, op, rhs);
        }
        Some(out)
    }

    fn term(&mut self) -> Option<String> {
        let mut out = self.unary()?;
        while let Some(&Token::Op(op @ ('*' | '/'))) = self.peek() {
            self.pos += 1;
            let rhs = self.unary()?;
            out = format!("({} {} {})", out, op, rhs);
        }
        Some(out)
    }

    fn unary(&mut self) -> Option<String> {
        match self.peek() {
            Some(Token::Op('-')) => {
                self.pos += 1;
                Some(format!("(-{})", self.unary()?))
            }
            Some(Token::Op('+')) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Option<String> {
        let base = self.primary()?;
        if let Some(Token::Op('^')) = self.peek() {
            self.pos += 1;
            let exponent = self.unary()?;
            return Some(format!("({} ** {})", base, exponent));
        }
        Some(base)
    }

    fn primary(&mut self) -> Option<String> {
        match self.peek()?.clone() {
            Token::Number(literal) => {
                self.pos += 1;
                float_literal(literal)
            }
            Token::Open => {
                self.pos += 1;
                let inner = self.expr()?;
                if self.peek() != Some(&Token::Close) {
                    return None;
                }
                self.pos += 1;
                Some(inner)
            }
            _ => None,
        }
    }
}

fn float_literal(literal: &str) -> Option<String> {
    literal.parse::<f64>().ok()?;
    let mut out = if literal.starts_with('.') {
        format!("0{}", literal)
    } else {
        literal.to_string()
    };
    if out.ends_with('.') {
        out.push('0');
    } else if !out.contains('.') {
        out.push_str(".0");
    }
    Some(out)
}

/// Translate a numeric formula into a Rhai float expression, or `None` if it
/// does not parse.
fn to_script(expr: &str) -> Option<String> {
    let mut writer = ScriptWriter {
        tokens: tokenize(expr)?,
        pos: 0,
    };
    let script = writer.expr()?;
    (writer.pos == writer.tokens.len()).then_some(script)
}

fn evaluate_numeric(expr: &str) -> EvalResult<f64> {
    let Some(script) = to_script(expr) else {
        log::debug!("formula {:?} does not parse", expr);
        return Err(ErrorKind::InvalidFormula);
    };
    let value = engine()
        .eval_expression::<Dynamic>(&script)
        .map_err(|err| {
            log::debug!("formula {:?} failed: {}", expr, err);
            ErrorKind::InvalidFormula
        })?;
    value
        .as_float()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or(ErrorKind::InvalidFormula)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_script() {
        let script = |expr| to_script(expr).unwrap();
        assert_eq!(script("1 + 2"), "(1.0 + 2.0)");
        assert_eq!(script("6.5 * 14"), "(6.5 * 14.0)");
        assert_eq!(script(".5 + 5."), "(0.5 + 5.0)");
        assert_eq!(script("2^3"), "(2.0 ** 3.0)");
        assert_eq!(script("-2^2"), "(-(2.0 ** 2.0))");
        assert_eq!(script("5--3"), "(5.0 - (-3.0))");
        assert_eq!(to_script("1.2.3 + 1"), None);
    }

    #[test]
    fn test_power_binds_tighter_than_negation() {
        assert_eq!(parse("-2^2"), Ok("-4".to_string()));
        assert_eq!(parse("(-8)^2"), Ok("64".to_string()));
        assert_eq!(parse("2^-1"), Ok("0.5".to_string()));
        assert_eq!(parse("2 ^ 3 ^ 2"), Ok("512".to_string()));
    }

    #[test]
    fn test_double_minus() {
        assert_eq!(parse("5--3"), Ok("8".to_string()));
        assert_eq!(parse("5 - -3"), Ok("8".to_string()));
        assert_eq!(parse("--4"), Ok("4".to_string()));
        assert_eq!(parse("2*-3"), Ok("-6".to_string()));
    }

    #[test]
    fn test_precedence() {
        assert_eq!(parse("6.5 * 14 + 8"), Ok("99".to_string()));
        assert_eq!(parse("2 + 3 * 4"), Ok("14".to_string()));
        assert_eq!(parse("(2 + 3) * 4"), Ok("20".to_string()));
        assert_eq!(parse("2 * 3 ^ 2"), Ok("18".to_string()));
        assert_eq!(parse("10 - 4 - 3"), Ok("3".to_string()));
    }

    #[test]
    fn test_division_is_floating_point() {
        assert_eq!(parse("1 / 2"), Ok("0.5".to_string()));
        assert_eq!(parse("7/4"), Ok("1.75".to_string()));
    }

    #[test]
    fn test_negative_numbers() {
        assert_eq!(parse("-5"), Ok("-5".to_string()));
        assert_eq!(parse("3 - 10"), Ok("-7".to_string()));
    }

    #[test]
    fn test_no_operator_passes_through() {
        assert_eq!(parse("6.5 14 8"), Ok("6.5 14 8".to_string()));
        assert_eq!(parse("hello"), Ok("hello".to_string()));
    }

    #[test]
    fn test_illegal_characters() {
        assert_eq!(parse("1 / hi"), Err(ErrorKind::InvalidFormula));
        assert_eq!(parse("well-known"), Err(ErrorKind::InvalidFormula));
    }

    #[test]
    fn test_text_with_plus_is_left_for_concatenation() {
        assert_eq!(parse("howdy+goodbye"), Ok("howdy+goodbye".to_string()));
    }

    #[test]
    fn test_malformed_syntax() {
        for bad in ["1 +", "(1 + 2", "1 2 + 3", "2 ^^ 3", "() + 1", "/"] {
            assert_eq!(parse(bad), Err(ErrorKind::InvalidFormula), "{bad}");
        }
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(parse("1 / 0"), Err(ErrorKind::InvalidFormula));
    }
}
