//! Interaction payloads exchanged with the chat platform.

use serde::{Deserialize, Serialize};

/// Inbound interaction kinds.
pub const PING: u8 = 1;
pub const APPLICATION_COMMAND: u8 = 2;

/// Outbound response kinds.
pub const PONG: u8 = 1;
pub const CHANNEL_MESSAGE: u8 = 4;

#[derive(Debug, Deserialize)]
pub struct Interaction {
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub data: Option<CommandData>,
    /// Present for guild interactions.
    #[serde(default)]
    pub member: Option<Member>,
    /// Present for direct-message interactions.
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Deserialize)]
pub struct CommandData {
    pub name: String,
    #[serde(default)]
    pub options: Vec<CommandOption>,
}

/// Only the value is read; options are taken by position.
#[derive(Debug, Deserialize)]
pub struct CommandOption {
    #[serde(default)]
    pub value: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct Member {
    pub user: Option<User>,
}

#[derive(Debug, Deserialize)]
pub struct User {
    pub id: String,
}

impl Interaction {
    /// Invoking user, from the guild member or the direct-message user.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.member
            .as_ref()
            .and_then(|m| m.user.as_ref())
            .or(self.user.as_ref())
            .map(|u| u.id.as_str())
    }

    /// Value of the first option as text.
    #[must_use]
    pub fn first_option(&self) -> Option<String> {
        let value = self.data.as_ref()?.options.first()?.value.as_ref()?;
        Some(match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct InteractionResponse {
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ResponseData {
    pub content: String,
}

impl InteractionResponse {
    #[must_use]
    pub fn pong() -> Self {
        Self {
            kind: PONG,
            data: None,
        }
    }

    #[must_use]
    pub fn message(content: impl Into<String>) -> Self {
        Self {
            kind: CHANNEL_MESSAGE,
            data: Some(ResponseData {
                content: content.into(),
            }),
        }
    }
}
