//! Discord API v10 wire types and conversions to and from the domain

use serde::{Deserialize, Serialize};

use crate::domain::entities::{
    ButtonStyle, Command, ComponentPress, Embed, Interaction, Invocation, Permissions, Reply, User, Visibility,
};

/// Interaction types we act on.
pub const INTERACTION_APPLICATION_COMMAND: u8 = 2;
pub const INTERACTION_MESSAGE_COMPONENT: u8 = 3;

/// Interaction callback types.
pub const CALLBACK_CHANNEL_MESSAGE: u8 = 4;
pub const CALLBACK_DEFERRED_CHANNEL_MESSAGE: u8 = 5;
pub const CALLBACK_UPDATE_MESSAGE: u8 = 7;

/// Message flag: only the invoking user sees the message.
pub const FLAG_EPHEMERAL: u64 = 1 << 6;

const OPTION_TYPE_STRING: u8 = 3;
const COMPONENT_ACTION_ROW: u8 = 1;
const COMPONENT_BUTTON: u8 = 2;
const BUTTONS_PER_ROW: usize = 5;

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct InteractionPayload {
    pub id: String,
    pub application_id: String,
    #[serde(rename = "type")]
    pub kind: u8,
    pub token: String,
    #[serde(default)]
    pub data: Option<InteractionData>,
    #[serde(default)]
    pub guild_id: Option<String>,
    #[serde(default)]
    pub channel_id: Option<String>,
    /// Present in guilds.
    #[serde(default)]
    pub member: Option<Member>,
    /// Present in DMs.
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InteractionData {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub options: Vec<OptionValue>,
    #[serde(default)]
    pub custom_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OptionValue {
    pub name: String,
    #[serde(default)]
    pub value: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Member {
    pub user: User,
    #[serde(default)]
    pub permissions: Option<String>,
}

impl InteractionPayload {
    /// Convert into a domain interaction; `None` for kinds the bot ignores.
    pub fn into_interaction(self) -> Option<Interaction> {
        let (user, permissions) = match (self.member, self.user) {
            (Some(member), _) => {
                let perms = member
                    .permissions
                    .as_deref()
                    .and_then(Permissions::from_wire)
                    .unwrap_or_default();
                (member.user, perms)
            }
            (None, Some(user)) => (user, Permissions::empty()),
            (None, None) => return None,
        };
        let data = self.data?;
        let channel_id = self.channel_id.unwrap_or_default();

        match self.kind {
            INTERACTION_APPLICATION_COMMAND => {
                let options = data
                    .options
                    .into_iter()
                    .filter_map(|opt| {
                        let value = match opt.value? {
                            serde_json::Value::String(s) => s,
                            other => other.to_string(),
                        };
                        Some((opt.name, value))
                    })
                    .collect();
                Some(Interaction::Command(Invocation {
                    id: self.id,
                    token: self.token,
                    command: data.name?,
                    user,
                    permissions,
                    options,
                    channel_id,
                    guild_id: self.guild_id,
                }))
            }
            INTERACTION_MESSAGE_COMPONENT => Some(Interaction::Component(ComponentPress {
                id: self.id,
                token: self.token,
                custom_id: data.custom_id?,
                user,
                channel_id,
            })),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct MessagePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub embeds: Vec<EmbedPayload>,
    pub components: Vec<ActionRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<u64>,
}

impl MessagePayload {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }
}

impl From<&Reply> for MessagePayload {
    fn from(reply: &Reply) -> Self {
        let components = reply
            .buttons
            .chunks(BUTTONS_PER_ROW)
            .map(|row| ActionRow {
                kind: COMPONENT_ACTION_ROW,
                components: row
                    .iter()
                    .map(|b| ButtonPayload {
                        kind: COMPONENT_BUTTON,
                        style: button_style(b.style),
                        label: b.label.clone(),
                        custom_id: b.custom_id.clone(),
                    })
                    .collect(),
            })
            .collect();

        Self {
            content: reply.content.clone(),
            embeds: reply.embeds.iter().map(EmbedPayload::from).collect(),
            components,
            flags: reply.is_ephemeral().then_some(FLAG_EPHEMERAL),
        }
    }
}

fn button_style(style: ButtonStyle) -> u8 {
    match style {
        ButtonStyle::Primary => 1,
        ButtonStyle::Secondary => 2,
        ButtonStyle::Success => 3,
        ButtonStyle::Danger => 4,
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EmbedPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedFieldPayload>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EmbedFieldPayload {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl From<&Embed> for EmbedPayload {
    fn from(embed: &Embed) -> Self {
        Self {
            title: embed.title.clone(),
            description: embed.description.clone(),
            color: embed.color,
            fields: embed
                .fields
                .iter()
                .map(|f| EmbedFieldPayload {
                    name: f.name.clone(),
                    value: f.value.clone(),
                    inline: f.inline,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ActionRow {
    #[serde(rename = "type")]
    pub kind: u8,
    pub components: Vec<ButtonPayload>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ButtonPayload {
    #[serde(rename = "type")]
    pub kind: u8,
    pub style: u8,
    pub label: String,
    pub custom_id: String,
}

/// Body of `POST /interactions/{id}/{token}/callback`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InteractionCallback {
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<MessagePayload>,
}

impl InteractionCallback {
    pub fn message(reply: &Reply) -> Self {
        Self {
            kind: CALLBACK_CHANNEL_MESSAGE,
            data: Some(reply.into()),
        }
    }

    pub fn deferred(visibility: Visibility) -> Self {
        let data = (visibility == Visibility::Ephemeral).then(|| MessagePayload {
            flags: Some(FLAG_EPHEMERAL),
            ..MessagePayload::default()
        });
        Self {
            kind: CALLBACK_DEFERRED_CHANNEL_MESSAGE,
            data,
        }
    }

    /// Replace the component's message; empty embeds and buttons clear them.
    pub fn update(reply: &Reply) -> Self {
        let mut data = MessagePayload::from(reply);
        data.flags = None;
        Self {
            kind: CALLBACK_UPDATE_MESSAGE,
            data: Some(data),
        }
    }
}

/// Slash command registration body
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ApplicationCommandPayload {
    pub name: String,
    pub description: String,
    pub options: Vec<CommandOptionPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_member_permissions: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CommandOptionPayload {
    #[serde(rename = "type")]
    pub kind: u8,
    pub name: String,
    pub description: String,
    pub required: bool,
}

impl From<&Command> for ApplicationCommandPayload {
    fn from(cmd: &Command) -> Self {
        Self {
            name: cmd.name.clone(),
            description: cmd.description.clone(),
            options: cmd
                .options
                .iter()
                .map(|o| CommandOptionPayload {
                    kind: OPTION_TYPE_STRING,
                    name: o.name.clone(),
                    description: o.description.clone(),
                    required: o.required,
                })
                .collect(),
            default_member_permissions: cmd.permission.map(Permissions::to_wire),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageRef {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelRef {
    pub id: String,
}
