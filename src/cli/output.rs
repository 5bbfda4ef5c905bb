//! text and JSON output for the msgrule CLI
//!
//! machine-readable output is one JSON-RPC 2.0 object per line, so `eval`
//! results can be streamed: `{"jsonrpc":"2.0","result":{...},"id":null}` or
//! `{"jsonrpc":"2.0","error":{"code":-32003,"message":"..."},"id":null}`.

use serde::Serialize;
use std::io::IsTerminal;

const JSONRPC_VERSION: &str = "2.0";

/// start of the JSON-RPC range reserved for application errors
const RPC_CODE_OFFSET: i32 = -32000;

/// how command results are written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// human-readable text output
    Text,
    /// machine-readable JSON-RPC 2.0 output
    Json,
    /// no output on success (errors still go to stderr)
    Quiet,
}

impl OutputMode {
    /// pick a mode from the global flags, falling back to JSON when stdout
    /// is piped
    pub fn from_flags(json: bool, no_json: bool, quiet: bool) -> Self {
        if quiet {
            return Self::Quiet;
        }
        if json {
            return Self::Json;
        }
        if no_json {
            return Self::Text;
        }
        if std::io::stdout().is_terminal() {
            Self::Text
        } else {
            Self::Json
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json)
    }

    pub fn is_quiet(&self) -> bool {
        matches!(self, Self::Quiet)
    }
}

/// one line of JSON-RPC output, either a result or an error
#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    jsonrpc: &'static str,
    #[serde(flatten)]
    body: Body<'a, T>,
    /// always null, the CLI answers no request id
    id: Option<u64>,
}

#[derive(Serialize)]
#[serde(rename_all = "lowercase")]
enum Body<'a, T: Serialize> {
    Result(&'a T),
    Error { code: i32, message: &'a str },
}

impl<'a, T: Serialize> Envelope<'a, T> {
    fn new(body: Body<'a, T>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            body,
            id: None,
        }
    }
}

/// map a process exit code to an application JSON-RPC error code
pub fn rpc_code(exit_code: i32) -> i32 {
    RPC_CODE_OFFSET - exit_code
}

/// result of evaluating one message
#[derive(Debug, Serialize)]
pub struct EvalData {
    /// 1-based input line number
    pub line: usize,
    pub author: u64,
    pub channel: u64,
    /// whether the expression matched
    pub fired: bool,
}

/// result of a config verification
#[derive(Debug, Serialize)]
pub struct VerifyData {
    pub path: String,
    pub valid: bool,
    pub errors: Vec<String>,
}

/// result of parsing an expression
#[derive(Debug, Serialize)]
pub struct ParseData {
    pub expression: String,
    pub canonical: String,
    pub identifiers: Vec<String>,
}

fn emit<T: Serialize>(envelope: &Envelope<'_, T>) {
    match serde_json::to_string(envelope) {
        Ok(line) => println!("{}", line),
        Err(e) => tracing::warn!(error = %e, "failed to serialize output"),
    }
}

/// print a JSON-RPC result line to stdout
pub fn print_json<T: Serialize>(data: &T) {
    emit(&Envelope::new(Body::Result(data)));
}

/// print a JSON-RPC error line to stdout
pub fn print_json_error(exit_code: i32, message: &str) {
    emit(&Envelope::<()>::new(Body::Error {
        code: rpc_code(exit_code),
        message,
    }));
}
