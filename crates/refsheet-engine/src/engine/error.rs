//! Error taxonomy for cell evaluation.
//!
//! Every failure inside the strategy chain or a validation rule is one of
//! these kinds. They never escape a cell: the grid stores the kind's token as
//! the cell's display value, and other cells read that token like any other
//! display string.

use thiserror::Error;

/// A cell evaluation failure. `Display` yields the display token.
#[derive(Error, Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum ErrorKind {
    #[error("#INVALID-REF")]
    InvalidCellReference,

    #[error("#INVALID-EXPR")]
    InvalidRangeExpression,

    #[error("#REF-OUT-OF-RANGE")]
    OutOfRange,

    #[error("#INVALID-FORMULA")]
    InvalidFormula,

    #[error("#SELF-REF")]
    SelfReference,

    #[error("#INVALID-DATA")]
    InvalidValidationData,

    #[error("#CIRCULAR-REF")]
    CircularReference,
}

pub type EvalResult<T> = std::result::Result<T, ErrorKind>;

impl ErrorKind {
    pub const ALL: [ErrorKind; 7] = [
        ErrorKind::InvalidCellReference,
        ErrorKind::InvalidRangeExpression,
        ErrorKind::OutOfRange,
        ErrorKind::InvalidFormula,
        ErrorKind::SelfReference,
        ErrorKind::InvalidValidationData,
        ErrorKind::CircularReference,
    ];

    /// The display token stored in a cell that failed with this kind.
    pub fn token(&self) -> &'static str {
        match self {
            ErrorKind::InvalidCellReference => "#INVALID-REF",
            ErrorKind::InvalidRangeExpression => "#INVALID-EXPR",
            ErrorKind::OutOfRange => "#REF-OUT-OF-RANGE",
            ErrorKind::InvalidFormula => "#INVALID-FORMULA",
            ErrorKind::SelfReference => "#SELF-REF",
            ErrorKind::InvalidValidationData => "#INVALID-DATA",
            ErrorKind::CircularReference => "#CIRCULAR-REF",
        }
    }

    /// Recognise a display value that is exactly an error token.
    pub fn from_token(display: &str) -> Option<ErrorKind> {
        Self::ALL.into_iter().find(|kind| kind.token() == display)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_token() {
        for kind in ErrorKind::ALL {
            assert_eq!(kind.to_string(), kind.token());
        }
    }

    #[test]
    fn test_from_token() {
        assert_eq!(
            ErrorKind::from_token("#SELF-REF"),
            Some(ErrorKind::SelfReference)
        );
        assert_eq!(
            ErrorKind::from_token("#REF-OUT-OF-RANGE"),
            Some(ErrorKind::OutOfRange)
        );
        assert_eq!(ErrorKind::from_token("#SELF-REF "), None);
        assert_eq!(ErrorKind::from_token("hello"), None);
    }
}
