// integration tests for the rate-limit rule through the evaluation context

use std::sync::Arc;
use std::thread;

use chrono::Duration;
use msgrule::{EvaluationContext, RateLimitSettings, RuleSet, RuleSpec};

use crate::common::{at, message};

const USER_A: u64 = 1;
const USER_B: u64 = 2;

fn limit_context(max_per_user: u32, max_users: usize) -> EvaluationContext {
    let rules = RuleSet::new("limit").with_rule(RuleSpec::rate_limit("limit"));
    let settings = RateLimitSettings::new(max_per_user, max_users, Duration::hours(1)).unwrap();
    EvaluationContext::new(rules, settings).unwrap()
}

#[test]
fn test_sliding_window() {
    let ctx = limit_context(2, 1);

    assert!(ctx.evaluate(&message(10, USER_A, 0)).unwrap());
    assert!(ctx.evaluate(&message(10, USER_A, 30)).unwrap());
    assert!(!ctx.evaluate(&message(10, USER_A, 40)).unwrap());
    assert!(ctx.evaluate(&message(10, USER_A, 61)).unwrap());

    assert_eq!(ctx.user_history(USER_A), Some(vec![at(30), at(61)]));
}

#[test]
fn test_eviction_forgets_first_user() {
    let ctx = limit_context(1, 1);

    assert!(ctx.evaluate(&message(10, USER_A, 0)).unwrap());
    assert!(!ctx.evaluate(&message(10, USER_A, 1)).unwrap());

    assert!(ctx.evaluate(&message(10, USER_B, 2)).unwrap());
    assert_eq!(ctx.user_history(USER_A), None);
    assert_eq!(ctx.tracked_users(), 1);

    // A is brand new again, so admitted despite being over budget a minute ago
    assert!(ctx.evaluate(&message(10, USER_A, 3)).unwrap());
}

#[test]
fn test_repeated_evaluation_is_not_idempotent() {
    let ctx = limit_context(2, 10);
    let msg = message(10, USER_A, 0);

    let results: Vec<bool> = (0..3).map(|_| ctx.evaluate(&msg).unwrap()).collect();
    assert_eq!(results, vec![true, true, false]);
}

#[test]
fn test_negated_rate_limit_flags_spammers() {
    let rules = RuleSet::new("NOT limit").with_rule(RuleSpec::rate_limit("limit"));
    let settings = RateLimitSettings::from_hours(1, 10, 1.0).unwrap();
    let ctx = EvaluationContext::new(rules, settings).unwrap();

    assert!(!ctx.evaluate(&message(10, USER_A, 0)).unwrap());
    assert!(ctx.evaluate(&message(10, USER_A, 1)).unwrap());
}

#[test]
fn test_concurrent_users_respect_capacity() {
    let max_users = 8;
    let ctx = Arc::new(limit_context(1_000, max_users));

    thread::scope(|s| {
        for worker in 0..8u64 {
            let ctx = Arc::clone(&ctx);
            s.spawn(move || {
                for i in 0..200u64 {
                    let user = worker * 1_000 + i % 20;
                    ctx.evaluate(&message(10, user, i as i64)).unwrap();
                    assert!(ctx.tracked_users() <= max_users);
                }
            });
        }
    });

    assert_eq!(ctx.tracked_users(), max_users);
}

#[test]
fn test_concurrent_single_user_has_no_lost_updates() {
    let max_per_user = 50;
    let ctx = Arc::new(limit_context(max_per_user, 10));

    let admitted: usize = thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ctx = Arc::clone(&ctx);
                s.spawn(move || {
                    (0..100)
                        .filter(|_| ctx.evaluate(&message(10, USER_A, 0)).unwrap())
                        .count()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).sum()
    });

    assert_eq!(admitted, max_per_user as usize);
    assert_eq!(
        ctx.user_history(USER_A).map(|h| h.len()),
        Some(max_per_user as usize)
    );
}
