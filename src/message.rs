//! message metadata consumed by the rule predicates
//!
//! this is a minimal view of a chat message: the hosting platform
//! integration fills it in from its own object model.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type ChannelId = u64;
pub type RoleId = u64;
pub type UserId = u64;

/// kind of channel a message was posted in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    #[default]
    Text,
    Voice,
    News,
    Forum,
    Category,
    Stage,
    PublicThread,
    PrivateThread,
    NewsThread,
}

impl ChannelKind {
    /// check if this channel kind is a thread (forum posts are threads)
    pub fn is_thread(&self) -> bool {
        matches!(
            self,
            ChannelKind::PublicThread | ChannelKind::PrivateThread | ChannelKind::NewsThread
        )
    }
}

/// channel the message was posted in
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelView {
    pub id: ChannelId,
    #[serde(default)]
    pub kind: ChannelKind,
    /// parent channel for threads
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ChannelId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<ChannelId>,
}

/// author of the message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorView {
    pub id: UserId,
    /// role ids the author holds
    #[serde(default)]
    pub roles: HashSet<RoleId>,
}

/// message metadata evaluated by rule expressions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageView {
    pub channel: ChannelView,
    pub author: AuthorView,
    /// roles that exist in the guild; a role id resolves iff it is listed here
    #[serde(default)]
    pub guild_roles: HashSet<RoleId>,
    pub created_at: DateTime<Utc>,
}

impl MessageView {
    /// create a message posted by `author_id` in a plain text channel
    pub fn new(channel_id: ChannelId, author_id: UserId, created_at: DateTime<Utc>) -> Self {
        Self {
            channel: ChannelView {
                id: channel_id,
                ..Default::default()
            },
            author: AuthorView {
                id: author_id,
                ..Default::default()
            },
            guild_roles: HashSet::new(),
            created_at,
        }
    }

    /// mark the channel as a thread under `parent_id`
    pub fn in_thread(mut self, kind: ChannelKind, parent_id: ChannelId) -> Self {
        self.channel.kind = kind;
        self.channel.parent_id = Some(parent_id);
        self
    }

    /// set the channel category
    pub fn with_category(mut self, category_id: Option<ChannelId>) -> Self {
        self.channel.category_id = category_id;
        self
    }

    /// set the author's roles
    pub fn with_author_roles(mut self, roles: impl IntoIterator<Item = RoleId>) -> Self {
        self.author.roles = roles.into_iter().collect();
        self
    }

    /// set the roles known to the guild
    pub fn with_guild_roles(mut self, roles: impl IntoIterator<Item = RoleId>) -> Self {
        self.guild_roles = roles.into_iter().collect();
        self
    }

    /// resolve a role id against the guild, like a platform `get_role` lookup
    pub fn guild_role(&self, role_id: RoleId) -> Option<RoleId> {
        self.guild_roles.get(&role_id).copied()
    }
}
