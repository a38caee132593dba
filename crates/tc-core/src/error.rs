use std::fmt;

use thiserror::Error;

use crate::constants::MAX_POWER;
use crate::radix::Radix;

/// Failures while reading or encoding power scalar digits.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScalarError {
    #[error("malformed digit string {raw:?}")]
    Malformed { raw: String },
    #[error("digit {digit} is out of range for radix {radix}")]
    DigitOutOfRange { digit: u8, radix: Radix },
    /// A digit equal to the radix's value count names the reserved imaginary
    /// direction; it never becomes a stored scalar.
    #[error("{raw:?} contains the imaginary digit of radix {radix}")]
    Imaginary { raw: String, radix: Radix },
    #[error("{value} cannot be encoded as digits")]
    NonFinite { value: f64 },
    #[error("digit place {power} is outside ±{}", MAX_POWER)]
    PowerOutOfRange { power: i64 },
}

/// Failure raised by a plugin's own evaluation.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{0}")]
pub struct CalculatorError(pub String);

/// Category of an evaluation failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Syntax,
    Type,
    Range,
    Reference,
    Eval,
    Load,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Syntax => "SyntaxError",
            ErrorKind::Type => "TypeError",
            ErrorKind::Range => "RangeError",
            ErrorKind::Reference => "ReferenceError",
            ErrorKind::Eval => "EvalError",
            ErrorKind::Load => "LoadError",
        };
        f.write_str(name)
    }
}

/// Every failure the parser, evaluator, or serializer can raise.
#[derive(Debug, Error)]
pub enum CalcError {
    #[error("syntax error: {0}")]
    Syntax(String),
    #[error("type error: {0}")]
    Type(String),
    #[error("range error: {0}")]
    Range(String),
    #[error("reference error: {0}")]
    Reference(String),
    #[error("calculator {path} failed: {source}")]
    Eval {
        path: String,
        source: CalculatorError,
    },
    #[error("failed to load {path}: {reason}")]
    Load { path: String, reason: String },
    #[error("{context}: {source}")]
    Scalar {
        context: String,
        source: ScalarError,
    },
    #[error("malformed serialized value: {0}")]
    Json(#[from] serde_json::Error),
}

impl CalcError {
    pub fn scalar(context: impl fmt::Display, source: ScalarError) -> Self {
        CalcError::Scalar {
            context: context.to_string(),
            source,
        }
    }

    pub fn load(path: &str, reason: impl fmt::Display) -> Self {
        CalcError::Load {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CalcError::Syntax(_) => ErrorKind::Syntax,
            CalcError::Type(_) => ErrorKind::Type,
            CalcError::Range(_) => ErrorKind::Range,
            CalcError::Reference(_) => ErrorKind::Reference,
            CalcError::Eval { .. } => ErrorKind::Eval,
            CalcError::Load { .. } | CalcError::Json(_) => ErrorKind::Load,
            CalcError::Scalar {
                source: ScalarError::NonFinite { .. } | ScalarError::PowerOutOfRange { .. },
                ..
            } => ErrorKind::Range,
            CalcError::Scalar { .. } => ErrorKind::Syntax,
        }
    }
}

pub type Result<T> = std::result::Result<T, CalcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_kinds() {
        let malformed = CalcError::scalar("0q1x", ScalarError::Malformed { raw: "1x".into() });
        assert_eq!(malformed.kind(), ErrorKind::Syntax);

        let overflow = CalcError::scalar("1/0", ScalarError::NonFinite { value: f64::INFINITY });
        assert_eq!(overflow.kind(), ErrorKind::Range);

        let shifted = CalcError::scalar("tc", ScalarError::PowerOutOfRange { power: 5000 });
        assert_eq!(shifted.kind(), ErrorKind::Range);
        assert!(shifted.to_string().contains("5000"));
    }

    #[test]
    fn test_messages_name_the_offender() {
        let err = CalcError::load("plugins/avg.json", "no such file");
        assert_eq!(err.to_string(), "failed to load plugins/avg.json: no such file");

        let err = CalcError::Eval {
            path: "avg".into(),
            source: CalculatorError("bad argument".into()),
        };
        assert_eq!(err.kind(), ErrorKind::Eval);
        assert!(err.to_string().contains("bad argument"));
    }
}
