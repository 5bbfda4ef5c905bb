//! stateless message predicates
//!
//! none of these fail: absent optional fields simply do not match.

use std::collections::HashSet;

use crate::message::{ChannelId, MessageView, RoleId};

/// message posted directly in one of `channels`
pub fn in_channels(message: &MessageView, channels: &HashSet<ChannelId>) -> bool {
    channels.contains(&message.channel.id)
}

/// message posted in a thread whose parent is one of `forums`
pub fn in_forums(message: &MessageView, forums: &HashSet<ChannelId>) -> bool {
    if !message.channel.kind.is_thread() {
        return false;
    }

    message
        .channel
        .parent_id
        .is_some_and(|parent| forums.contains(&parent))
}

/// message posted in a channel under one of `categories`
pub fn in_categories(message: &MessageView, categories: &HashSet<ChannelId>) -> bool {
    message
        .channel
        .category_id
        .is_some_and(|category| categories.contains(&category))
}

/// author holds at least one of `roles` that exists in the guild
pub fn has_role(message: &MessageView, roles: &[RoleId]) -> bool {
    roles
        .iter()
        .filter_map(|&id| message.guild_role(id))
        .any(|role| message.author.roles.contains(&role))
}
