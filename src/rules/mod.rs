//! named predicate definitions
//!
//! a rule set maps case-insensitive rule names to predicates, plus the
//! top-level expression that combines them.

mod predicates;

pub use predicates::{has_role, in_categories, in_channels, in_forums};

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::message::{ChannelId, RoleId};

/// rule type tag as written in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleType {
    /// message posted in one of the listed channels
    ChannelSet,
    /// message posted in a thread under one of the listed forums
    ForumSet,
    /// message posted in a channel under one of the listed categories
    CategorySet,
    /// author holds one of the listed roles
    RoleSet,
    /// per-user sliding-window admission
    RateLimit,
}

impl RuleType {
    /// parse a type tag (supports short, snake_case, and long forms)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "channels" | "channel_set" | "is_in_specified_channels" => Some(RuleType::ChannelSet),
            "forums" | "forum_set" | "is_in_specified_forums" => Some(RuleType::ForumSet),
            "categories" | "category_set" | "is_in_specified_categories" => {
                Some(RuleType::CategorySet)
            }
            "roles" | "role_set" | "has_specified_role" => Some(RuleType::RoleSet),
            "rate_limit" | "request_count" => Some(RuleType::RateLimit),
            _ => None,
        }
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleType::ChannelSet => write!(f, "channels"),
            RuleType::ForumSet => write!(f, "forums"),
            RuleType::CategorySet => write!(f, "categories"),
            RuleType::RoleSet => write!(f, "roles"),
            RuleType::RateLimit => write!(f, "rate_limit"),
        }
    }
}

/// a predicate together with its parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleKind {
    ChannelSet(HashSet<ChannelId>),
    ForumSet(HashSet<ChannelId>),
    CategorySet(HashSet<ChannelId>),
    /// kept ordered so role resolution follows configuration order
    RoleSet(Vec<RoleId>),
    /// parameters live on the evaluation context
    RateLimit,
}

impl RuleKind {
    pub fn rule_type(&self) -> RuleType {
        match self {
            RuleKind::ChannelSet(_) => RuleType::ChannelSet,
            RuleKind::ForumSet(_) => RuleType::ForumSet,
            RuleKind::CategorySet(_) => RuleType::CategorySet,
            RuleKind::RoleSet(_) => RuleType::RoleSet,
            RuleKind::RateLimit => RuleType::RateLimit,
        }
    }

    /// check if evaluating this rule mutates shared state
    pub fn is_stateful(&self) -> bool {
        matches!(self, RuleKind::RateLimit)
    }
}

/// a named predicate definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSpec {
    name: String,
    kind: RuleKind,
}

impl RuleSpec {
    pub fn new(name: impl AsRef<str>, kind: RuleKind) -> Self {
        Self {
            name: name.as_ref().to_lowercase(),
            kind,
        }
    }

    pub fn channels(name: impl AsRef<str>, ids: impl IntoIterator<Item = ChannelId>) -> Self {
        Self::new(name, RuleKind::ChannelSet(ids.into_iter().collect()))
    }

    pub fn forums(name: impl AsRef<str>, ids: impl IntoIterator<Item = ChannelId>) -> Self {
        Self::new(name, RuleKind::ForumSet(ids.into_iter().collect()))
    }

    pub fn categories(name: impl AsRef<str>, ids: impl IntoIterator<Item = ChannelId>) -> Self {
        Self::new(name, RuleKind::CategorySet(ids.into_iter().collect()))
    }

    pub fn roles(name: impl AsRef<str>, ids: impl IntoIterator<Item = RoleId>) -> Self {
        Self::new(name, RuleKind::RoleSet(ids.into_iter().collect()))
    }

    pub fn rate_limit(name: impl AsRef<str>) -> Self {
        Self::new(name, RuleKind::RateLimit)
    }

    /// lower-cased rule name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &RuleKind {
        &self.kind
    }
}

impl fmt::Display for RuleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.kind.rule_type())
    }
}

/// rule definitions plus the expression combining them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: HashMap<String, RuleSpec>,
    expression: String,
}

impl RuleSet {
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            rules: HashMap::new(),
            expression: expression.into(),
        }
    }

    /// add a rule, builder style
    pub fn with_rule(mut self, spec: RuleSpec) -> Self {
        self.insert(spec);
        self
    }

    /// add a rule, returning any previous rule with the same name
    pub fn insert(&mut self, spec: RuleSpec) -> Option<RuleSpec> {
        self.rules.insert(spec.name.clone(), spec)
    }

    /// look up a rule by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&RuleSpec> {
        self.rules.get(&name.to_lowercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// declared rule names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// check if any declared rule is a rate limit
    pub fn has_rate_limit(&self) -> bool {
        self.rules.values().any(|r| r.kind.is_stateful())
    }
}
