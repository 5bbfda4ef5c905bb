use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::context::EvaluationContext;
use crate::error::{Error, Result};
use crate::ratelimit::{
    RateLimitSettings, DEFAULT_DELETE_AFTER_HOURS, DEFAULT_MAX_PER_USER, DEFAULT_MAX_USERS,
};
use crate::rules::{RuleKind, RuleSet, RuleSpec, RuleType};

/// config file layout: named rule definitions, one top-level expression,
/// and an optional `rate_limit` section
///
/// unknown keys are rejected so a misplaced setting fails to load instead of
/// silently falling back to defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub rules: BTreeMap<String, RuleDefinition>,
    /// top-level expression combining the rules
    #[serde(default)]
    pub expression: String,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

/// a rule as written in the config file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleDefinition {
    /// rule type tag, e.g. "channels" or "is_in_specified_channels"
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(
        default,
        deserialize_with = "deserialize_ids",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub channels: Vec<u64>,
    #[serde(
        default,
        deserialize_with = "deserialize_ids",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub forums: Vec<u64>,
    #[serde(
        default,
        deserialize_with = "deserialize_ids",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub categories: Vec<u64>,
    #[serde(
        default,
        deserialize_with = "deserialize_ids",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub roles: Vec<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimitConfig {
    #[serde(default = "default_max_per_user")]
    pub max_per_user: u32,
    #[serde(default = "default_max_users")]
    pub max_users: usize,
    /// sliding window length in hours
    #[serde(default = "default_delete_after_hours")]
    pub delete_after_hours: f64,
}

fn default_max_per_user() -> u32 {
    DEFAULT_MAX_PER_USER
}

fn default_max_users() -> usize {
    DEFAULT_MAX_USERS
}

fn default_delete_after_hours() -> f64 {
    DEFAULT_DELETE_AFTER_HOURS
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_per_user: DEFAULT_MAX_PER_USER,
            max_users: DEFAULT_MAX_USERS,
            delete_after_hours: DEFAULT_DELETE_AFTER_HOURS,
        }
    }
}

/// ids may be written as numbers or as strings (snowflakes often are)
#[derive(Deserialize)]
#[serde(untagged)]
enum IdValue {
    Number(u64),
    Text(String),
}

fn deserialize_ids<'de, D>(deserializer: D) -> std::result::Result<Vec<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<IdValue>::deserialize(deserializer)?
        .into_iter()
        .map(|v| match v {
            IdValue::Number(n) => Ok(n),
            IdValue::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| <D::Error as serde::de::Error>::custom(format!("invalid id '{}'", s))),
        })
        .collect()
}

impl RuleDefinition {
    /// the id list the rule type reads, if any
    fn params_for(&self, rule_type: RuleType) -> Option<&[u64]> {
        match rule_type {
            RuleType::ChannelSet => Some(self.channels.as_slice()),
            RuleType::ForumSet => Some(self.forums.as_slice()),
            RuleType::CategorySet => Some(self.categories.as_slice()),
            RuleType::RoleSet => Some(self.roles.as_slice()),
            RuleType::RateLimit => None,
        }
    }

    /// convert to a rule spec, failing on an unknown type tag
    pub fn to_spec(&self, name: &str) -> Result<RuleSpec> {
        let rule_type = RuleType::parse(&self.kind).ok_or_else(|| {
            Error::config(format!("rule '{}': unknown type '{}'", name, self.kind))
        })?;

        let ids = self.params_for(rule_type).unwrap_or_default();
        let kind = match rule_type {
            RuleType::ChannelSet => RuleKind::ChannelSet(ids.iter().copied().collect()),
            RuleType::ForumSet => RuleKind::ForumSet(ids.iter().copied().collect()),
            RuleType::CategorySet => RuleKind::CategorySet(ids.iter().copied().collect()),
            RuleType::RoleSet => RuleKind::RoleSet(ids.to_vec()),
            RuleType::RateLimit => RuleKind::RateLimit,
        };

        Ok(RuleSpec::new(name, kind))
    }

    /// non-fatal problems: id lists the rule type never reads, or an empty
    /// id list that can never match
    pub fn lint(&self, name: &str) -> Vec<String> {
        let Some(rule_type) = RuleType::parse(&self.kind) else {
            return Vec::new();
        };

        let mut problems = Vec::new();
        let lists = [
            ("channels", RuleType::ChannelSet, &self.channels),
            ("forums", RuleType::ForumSet, &self.forums),
            ("categories", RuleType::CategorySet, &self.categories),
            ("roles", RuleType::RoleSet, &self.roles),
        ];

        for (key, owner, ids) in lists {
            if owner != rule_type && !ids.is_empty() {
                problems.push(format!(
                    "rule '{}': field '{}' is ignored by type '{}'",
                    name, key, rule_type
                ));
            }
        }

        if let Some(ids) = self.params_for(rule_type) {
            if ids.is_empty() {
                problems.push(format!(
                    "rule '{}': no ids listed, the rule can never match",
                    name
                ));
            }
        }

        problems
    }
}

impl RateLimitConfig {
    pub fn settings(&self) -> Result<RateLimitSettings> {
        RateLimitSettings::from_hours(self.max_per_user, self.max_users, self.delete_after_hours)
    }
}

impl Config {
    /// build the rule set, rejecting unknown types and names that collide
    /// once lower-cased
    pub fn rule_set(&self) -> Result<RuleSet> {
        let mut rules = RuleSet::new(self.expression.clone());

        for (name, definition) in &self.rules {
            let spec = definition.to_spec(name)?;
            if let Some(previous) = rules.insert(spec) {
                return Err(Error::config(format!(
                    "rule '{}' is declared more than once (names are case-insensitive)",
                    previous.name()
                )));
            }
        }

        Ok(rules)
    }

    /// build a ready-to-use evaluation context
    pub fn build_context(&self) -> Result<EvaluationContext> {
        EvaluationContext::new(self.rule_set()?, self.rate_limit.settings()?)
    }
}
