// integration tests for expression evaluation against rule sets

use msgrule::conditions::parse_expression;
use msgrule::{ChannelKind, EvaluationContext, RateLimitSettings, RuleSet, RuleSpec};

use crate::common::message;

const GENERAL: u64 = 100;
const HELP_FORUM: u64 = 200;
const OFF_TOPIC_CATEGORY: u64 = 300;
const MOD_ROLE: u64 = 400;

fn rules(expression: &str) -> RuleSet {
    RuleSet::new(expression)
        .with_rule(RuleSpec::channels("channels", [GENERAL]))
        .with_rule(RuleSpec::forums("forums", [HELP_FORUM]))
        .with_rule(RuleSpec::categories("categories", [OFF_TOPIC_CATEGORY]))
        .with_rule(RuleSpec::roles("mods", [MOD_ROLE]))
        .with_rule(RuleSpec::rate_limit("limit"))
}

fn context(expression: &str) -> EvaluationContext {
    EvaluationContext::new(rules(expression), RateLimitSettings::default())
        .expect("rules should compile")
}

/// every well-formed expression over declared rules yields a bool
#[test]
fn test_resolvable_expressions_always_evaluate() {
    let expressions = [
        "channels",
        "NOT channels",
        "channels AND forums",
        "channels OR forums OR categories",
        "(channels AND forums) OR NOT categories",
        "NOT (mods OR categories) AND NOT NOT channels",
        "((((channels))))",
        "limit OR mods",
        "Channels and Not FORUMS or limit",
    ];

    let messages = [
        message(GENERAL, 1, 0),
        message(999, 2, 0).in_thread(ChannelKind::PublicThread, HELP_FORUM),
        message(999, 3, 0).with_category(Some(OFF_TOPIC_CATEGORY)),
        message(999, 4, 0)
            .with_author_roles([MOD_ROLE])
            .with_guild_roles([MOD_ROLE]),
    ];

    for expression in expressions {
        let ctx = context(expression);
        for msg in &messages {
            assert!(
                ctx.evaluate(msg).is_ok(),
                "{} failed on {:?}",
                expression,
                msg
            );
        }
    }
}

#[test]
fn test_example_expression() {
    let ctx = context("(channels AND forums) OR NOT categories");

    // not in the category: NOT categories holds
    assert!(ctx.evaluate(&message(GENERAL, 1, 0)).unwrap());

    // in the category, and channels AND forums cannot both hold
    let msg = message(GENERAL, 1, 0).with_category(Some(OFF_TOPIC_CATEGORY));
    assert!(!ctx.evaluate(&msg).unwrap());

    // thread in the forum that is also listed as a channel
    let msg = message(GENERAL, 1, 0)
        .in_thread(ChannelKind::PublicThread, HELP_FORUM)
        .with_category(Some(OFF_TOPIC_CATEGORY));
    assert!(ctx.evaluate(&msg).unwrap());
}

#[test]
fn test_and_stops_before_rate_limit() {
    // true, true, false, then the rate limit
    let ctx = context("channels AND NOT forums AND categories AND limit");
    let msg = message(GENERAL, 1, 0);

    assert!(!ctx.evaluate(&msg).unwrap());
    assert_eq!(ctx.tracked_users(), 0);
}

#[test]
fn test_or_stops_after_first_true() {
    let ctx = context("forums OR channels OR limit");
    let msg = message(GENERAL, 1, 0);

    for _ in 0..10 {
        assert!(ctx.evaluate(&msg).unwrap());
    }
    assert_eq!(ctx.tracked_users(), 0);
}

#[test]
fn test_rate_limit_runs_when_reached() {
    let ctx = context("channels AND limit");

    assert!(!ctx.evaluate(&message(999, 1, 0)).unwrap());
    assert_eq!(ctx.tracked_users(), 0);

    assert!(ctx.evaluate(&message(GENERAL, 1, 0)).unwrap());
    assert_eq!(ctx.tracked_users(), 1);
}

#[test]
fn test_unknown_identifier_is_config_error() {
    let err = EvaluationContext::new(RuleSet::new("missing_rule"), RateLimitSettings::default())
        .unwrap_err();
    assert!(err.is_config(), "{}", err);
}

#[test]
fn test_arithmetic_is_expression_error() {
    let err = EvaluationContext::new(rules("1 + 2"), RateLimitSettings::default()).unwrap_err();
    assert!(err.is_expression(), "{}", err);
}

#[test]
fn test_role_set() {
    let ctx = context("mods");

    // no roles at all
    let msg = message(GENERAL, 1, 0).with_guild_roles([MOD_ROLE]);
    assert!(!ctx.evaluate(&msg).unwrap());

    // disjoint roles
    let msg = message(GENERAL, 1, 0)
        .with_author_roles([1, 2])
        .with_guild_roles([1, 2, MOD_ROLE]);
    assert!(!ctx.evaluate(&msg).unwrap());

    // overlap
    let msg = message(GENERAL, 1, 0)
        .with_author_roles([1, MOD_ROLE])
        .with_guild_roles([1, MOD_ROLE]);
    assert!(ctx.evaluate(&msg).unwrap());
}

#[test]
fn test_forum_requires_thread_channel() {
    let ctx = context("forums");

    let mut msg = message(HELP_FORUM, 1, 0);
    msg.channel.kind = ChannelKind::Forum;
    assert!(!ctx.evaluate(&msg).unwrap());

    let msg = message(555, 1, 0).in_thread(ChannelKind::PublicThread, HELP_FORUM);
    assert!(ctx.evaluate(&msg).unwrap());
}

#[test]
fn test_ad_hoc_expression_shares_counter() {
    let settings = RateLimitSettings::from_hours(1, 10, 1.0).unwrap();
    let ctx = EvaluationContext::new(rules("limit"), settings).unwrap();
    let msg = message(GENERAL, 1, 0);

    let expr = parse_expression("channels AND limit").unwrap();
    assert!(ctx.evaluate_expr(&expr, &msg).unwrap());

    // the configured expression sees the timestamp recorded above
    assert!(!ctx.evaluate(&msg).unwrap());
}
