//! Validation rules checked against a cell's computed display value.
//!
//! A cell may carry several rules; all of them must accept the value or the
//! cell shows the failing rule's error token instead. Blank values are never
//! flagged, so an empty cell with rules attached still reads as empty.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::ErrorKind;
use super::format::{format_number, parse_number};

/// What kind of value a [`ValidationRule::Type`] accepts.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum TypeConstraint {
    Number,
    Word,
    Any,
}

impl FromStr for TypeConstraint {
    type Err = ErrorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "number" | "numeric" => Ok(TypeConstraint::Number),
            "word" | "text" => Ok(TypeConstraint::Word),
            "any" | "none" => Ok(TypeConstraint::Any),
            _ => Err(ErrorKind::InvalidValidationData),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Comparison {
    Equal,
    LessThan,
    GreaterThan,
}

impl FromStr for Comparison {
    type Err = ErrorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "=" => Ok(Comparison::Equal),
            "<" => Ok(Comparison::LessThan),
            ">" => Ok(Comparison::GreaterThan),
            _ => Err(ErrorKind::InvalidValidationData),
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Comparison::Equal => "=",
            Comparison::LessThan => "<",
            Comparison::GreaterThan => ">",
        };
        f.write_str(symbol)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ValidationRule {
    Type(TypeConstraint),
    Range {
        comparison: Comparison,
        threshold: f64,
    },
    OneOf(Vec<String>),
}

impl ValidationRule {
    /// Build a range rule from user text such as (`"<"`, `"10"`).
    pub fn range(comparison: &str, threshold: &str) -> Result<Self, ErrorKind> {
        Ok(ValidationRule::Range {
            comparison: comparison.parse()?,
            threshold: parse_number(threshold).ok_or(ErrorKind::InvalidValidationData)?,
        })
    }

    /// Build a one-of rule from a comma separated list of literals.
    pub fn one_of(list: &str) -> Result<Self, ErrorKind> {
        let values: Vec<String> = list
            .split(',')
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect();
        if values.is_empty() {
            return Err(ErrorKind::InvalidValidationData);
        }
        Ok(ValidationRule::OneOf(values))
    }

    /// Whether `candidate` satisfies this rule.
    pub fn check(&self, candidate: &str) -> bool {
        let candidate = candidate.trim();
        if candidate.is_empty() {
            return true;
        }
        match self {
            ValidationRule::Type(TypeConstraint::Any) => true,
            ValidationRule::Type(TypeConstraint::Number) => parse_number(candidate).is_some(),
            ValidationRule::Type(TypeConstraint::Word) => parse_number(candidate).is_none(),
            ValidationRule::Range {
                comparison,
                threshold,
            } => match parse_number(candidate) {
                Some(n) => match comparison {
                    Comparison::Equal => n == *threshold,
                    Comparison::LessThan => n < *threshold,
                    Comparison::GreaterThan => n > *threshold,
                },
                None => false,
            },
            ValidationRule::OneOf(values) => values.iter().any(|allowed| {
                match (parse_number(allowed), parse_number(candidate)) {
                    (Some(a), Some(b)) => a == b,
                    _ => allowed.as_str() == candidate,
                }
            }),
        }
    }

    /// The error a cell shows when this rule rejects its value.
    pub fn error_kind(&self) -> ErrorKind {
        ErrorKind::InvalidValidationData
    }
}

impl fmt::Display for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationRule::Type(constraint) => write!(f, "type {:?}", constraint),
            ValidationRule::Range {
                comparison,
                threshold,
            } => write!(f, "value {} {}", comparison, format_number(*threshold)),
            ValidationRule::OneOf(values) => write!(f, "one of {}", values.join(", ")),
        }
    }
}
