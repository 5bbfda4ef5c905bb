//! error types shared by the rule engine

use thiserror::Error;

use crate::conditions::ParseError;

/// error returned by rule loading, expression compilation, and evaluation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// the rule configuration is inconsistent (unknown identifier, unknown
    /// rule type, missing expression, invalid rate-limit parameters)
    #[error("config error: {0}")]
    Config(String),

    /// the expression string could not be parsed
    #[error("expression error: {0}")]
    Expression(ParseError),
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Error::Expression(e)
    }
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    /// check if this is a configuration error
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_))
    }

    /// check if this is an expression error
    pub fn is_expression(&self) -> bool {
        matches!(self, Error::Expression(_))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
