//! exit codes for msgrule commands
//!
//! these follow Unix conventions where 0 = success and non-zero = error
//! specific codes help scripts distinguish between failure types

#![allow(dead_code)]

use crate::error::Error;

/// command completed successfully
pub const SUCCESS: i32 = 0;

/// general or unknown error (I/O, unreadable file)
pub const ERROR: i32 = 1;

/// a message on the input stream could not be decoded
pub const INVALID_INPUT: i32 = 2;

/// rule configuration is invalid
pub const CONFIG_ERROR: i32 = 3;

/// rule expression does not parse
pub const EXPRESSION_ERROR: i32 = 4;

/// pick the exit code for an error chain
pub fn for_error(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<Error>() {
            return match e {
                Error::Config(_) => CONFIG_ERROR,
                Error::Expression(_) => EXPRESSION_ERROR,
            };
        }
        if cause.downcast_ref::<serde_json::Error>().is_some() {
            return INVALID_INPUT;
        }
    }
    ERROR
}
