//! expression evaluator
//!
//! evaluates parsed expressions against a message, dispatching each
//! identifier to the predicate its rule declares

use parking_lot::Mutex;
use strsim::levenshtein;
use tracing::trace;

use super::types::Expr;
use crate::error::{Error, Result};
use crate::message::MessageView;
use crate::ratelimit::{RateLimitSettings, RequestCounter};
use crate::rules::{self, RuleKind, RuleSet};

/// maximum edit distance for "did you mean" suggestions
const SUGGESTION_DISTANCE: usize = 2;

/// context for evaluating expressions
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    /// declared rules
    pub rules: &'a RuleSet,
    /// parameters for rate-limit rules
    pub settings: &'a RateLimitSettings,
    /// shared rate-limit state
    pub counter: &'a Mutex<RequestCounter>,
    /// message being evaluated
    pub message: &'a MessageView,
}

impl<'a> EvalContext<'a> {
    pub fn new(
        rules: &'a RuleSet,
        settings: &'a RateLimitSettings,
        counter: &'a Mutex<RequestCounter>,
        message: &'a MessageView,
    ) -> Self {
        Self {
            rules,
            settings,
            counter,
            message,
        }
    }
}

/// check that every identifier in `expr` names a declared rule
pub fn resolve(expr: &Expr, rules: &RuleSet) -> Result<()> {
    for name in expr.identifiers() {
        if !rules.contains(name) {
            return Err(unknown_rule(name, rules));
        }
    }
    Ok(())
}

fn unknown_rule(name: &str, rules: &RuleSet) -> Error {
    let suggestion = rules
        .names()
        .into_iter()
        .map(|candidate| (levenshtein(name, candidate), candidate))
        .filter(|(distance, _)| *distance <= SUGGESTION_DISTANCE)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, candidate)| candidate);

    match suggestion {
        Some(candidate) => Error::config(format!(
            "unknown rule '{}' in expression (did you mean '{}'?)",
            name, candidate
        )),
        None => Error::config(format!("unknown rule '{}' in expression", name)),
    }
}

/// evaluate an expression against the given context
///
/// AND and OR short-circuit left to right, so a rate-limit rule after a
/// deciding operand is never consulted and records nothing.
pub fn evaluate(expr: &Expr, ctx: &EvalContext) -> Result<bool> {
    match expr {
        Expr::All(children) => {
            for child in children {
                if !evaluate(child, ctx)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Expr::Any(children) => {
            for child in children {
                if evaluate(child, ctx)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Expr::Not(inner) => Ok(!evaluate(inner, ctx)?),
        Expr::Ident(name) => evaluate_rule(name, ctx),
    }
}

fn evaluate_rule(name: &str, ctx: &EvalContext) -> Result<bool> {
    let rule = ctx
        .rules
        .get(name)
        .ok_or_else(|| unknown_rule(name, ctx.rules))?;

    let message = ctx.message;
    let matched = match rule.kind() {
        RuleKind::ChannelSet(ids) => rules::in_channels(message, ids),
        RuleKind::ForumSet(ids) => rules::in_forums(message, ids),
        RuleKind::CategorySet(ids) => rules::in_categories(message, ids),
        RuleKind::RoleSet(ids) => rules::has_role(message, ids),
        RuleKind::RateLimit => {
            ctx.counter
                .lock()
                .admit(ctx.settings, message.author.id, message.created_at)
        }
    };

    trace!(rule = name, matched, "evaluated rule");
    Ok(matched)
}
