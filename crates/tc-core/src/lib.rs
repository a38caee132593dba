//! Tetracoordinate calculator engine.
//!
//! Numbers are power scalars in radix 2, 4 or 10 with an optional repeating
//! last digit. Points live either in cartesian space or on a self-similar
//! triangular lattice addressed by base-4 direction digits, and convert
//! between the two. An expression evaluator ties it together over a
//! persistent `var` namespace with pluggable calculators.
//!
//! No terminal or data-file I/O; plugin manifests are the only files read.

pub mod ast;
pub mod calculator;
pub mod cartesian;
pub mod constants;
pub mod context;
pub mod error;
pub mod eval;
pub mod parser;
pub mod radix;
pub mod scalar;
pub mod serde_compat;
pub mod tetracoord;
pub mod value;

pub use ast::Expr;
pub use calculator::{
    CalculatorCache, CalculatorLoader, CalculatorRef, CalculatorRegistry, ExpressionCalculator,
    VectorAverageMagnitude,
};
pub use cartesian::{CartesianCoordinate, Point};
pub use constants::{ANSWER_KEY, COS_PI_OVER_6, MAX_POWER, SIN_PI_OVER_6, VAR_NAMESPACE};
pub use context::VariableContext;
pub use error::{CalcError, CalculatorError, ErrorKind, ScalarError};
pub use eval::{Evaluator, evaluate};
pub use parser::parse;
pub use radix::{DigitOrder, Radix};
pub use scalar::{ArithOp, Digits, Operand, PowerScalar, Sign};
pub use serde_compat::{deserialize, export_json, import_json, serialize};
pub use tetracoord::{Orientation, Tetracoordinate, cell_radius};
pub use value::{Value, VectorKind};
