//! rule expression engine
//!
//! provides a small boolean expression language over named rules:
//! - logical operators: AND, OR, NOT (NOT > AND > OR)
//! - parentheses for grouping
//! - case-insensitive keywords and identifiers
//!
//! expressions are parsed once, resolved against a rule set, and then
//! evaluated per message.

mod eval;
mod parser;
mod types;

pub use eval::{evaluate, resolve, EvalContext};
pub use parser::{parse_expression, ParseError};
pub use types::Expr;
