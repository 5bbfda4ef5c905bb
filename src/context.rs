//! long-lived evaluation state for one rule scope (e.g. one guild)

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::debug;

use crate::conditions::{self, EvalContext, Expr};
use crate::error::{Error, Result};
use crate::message::{MessageView, UserId};
use crate::ratelimit::{RateLimitSettings, RequestCounter};
use crate::rules::RuleSet;

/// rules, compiled expression, and rate-limit state
///
/// `evaluate` takes `&self`; the counter is guarded by a single mutex, so a
/// context can be shared across threads behind an `Arc`.
#[derive(Debug)]
pub struct EvaluationContext {
    rules: RuleSet,
    expr: Expr,
    settings: RateLimitSettings,
    counter: Mutex<RequestCounter>,
}

impl EvaluationContext {
    /// compile the rule set's expression and check every identifier
    ///
    /// fails with a config error if the expression is missing or names an
    /// undeclared rule, and with an expression error if it does not parse
    pub fn new(rules: RuleSet, settings: RateLimitSettings) -> Result<Self> {
        if rules.expression().trim().is_empty() {
            return Err(Error::config("rule expression is missing"));
        }

        let expr = conditions::parse_expression(rules.expression())?;
        conditions::resolve(&expr, &rules)?;

        debug!(
            rules = rules.len(),
            rate_limited = rules.has_rate_limit(),
            expression = %expr,
            "compiled rule expression"
        );

        Ok(Self {
            rules,
            expr,
            settings,
            counter: Mutex::new(RequestCounter::new()),
        })
    }

    /// decide whether the configured action fires for `message`
    pub fn evaluate(&self, message: &MessageView) -> Result<bool> {
        let ctx = EvalContext::new(&self.rules, &self.settings, &self.counter, message);
        conditions::evaluate(&self.expr, &ctx)
    }

    /// evaluate an ad-hoc expression against this context's rules and counter
    ///
    /// identifiers are resolved before anything is evaluated
    pub fn evaluate_expr(&self, expr: &Expr, message: &MessageView) -> Result<bool> {
        conditions::resolve(expr, &self.rules)?;
        let ctx = EvalContext::new(&self.rules, &self.settings, &self.counter, message);
        conditions::evaluate(expr, &ctx)
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// the compiled top-level expression
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn settings(&self) -> &RateLimitSettings {
        &self.settings
    }

    /// forget all rate-limit history
    pub fn reset_counter(&self) {
        self.counter.lock().clear();
    }

    /// number of users currently tracked by the rate counter
    pub fn tracked_users(&self) -> usize {
        self.counter.lock().len()
    }

    /// stored timestamps for a user, if tracked
    pub fn user_history(&self, user_id: UserId) -> Option<Vec<DateTime<Utc>>> {
        self.counter.lock().history(user_id).map(<[_]>::to_vec)
    }
}
