// library crate for msgrule
// the rule engine lives here; the binaries only add CLI plumbing

pub mod cli;
pub mod conditions;
pub mod config;
pub mod context;
pub mod error;
pub mod message;
pub mod ratelimit;
pub mod rules;

pub use context::EvaluationContext;
pub use error::{Error, Result};
pub use message::{AuthorView, ChannelKind, ChannelView, MessageView};
pub use ratelimit::{RateLimitSettings, RequestCounter};
pub use rules::{RuleKind, RuleSet, RuleSpec, RuleType};
