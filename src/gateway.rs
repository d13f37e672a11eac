//! Chat platform side of a voice session.
//!
//! The node needs the session id from the voice state update and the token
//! and endpoint from the voice server update before it can open the voice
//! connection. These types carry exactly that, in the raw gateway shape the
//! node forwards to Discord.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serenity::model::{
    event::VoiceServerUpdateEvent,
    id::{ChannelId, GuildId, UserId},
    voice::VoiceState,
};
use songbird::Songbird;

use crate::error::{PlayerError, PlayerResult};

/// Sends voice state changes (gateway opcode 4) for a guild.
#[async_trait]
pub trait VoiceGateway: Send + Sync {
    /// `Some` joins or moves to the channel, `None` leaves voice.
    async fn update_voice_state(
        &self,
        guild_id: GuildId,
        channel_id: Option<ChannelId>,
    ) -> PlayerResult<()>;
}

/// Songbird without its driver only manages the gateway half of the
/// connection, which is all the node needs from us.
#[async_trait]
impl VoiceGateway for Songbird {
    async fn update_voice_state(
        &self,
        guild_id: GuildId,
        channel_id: Option<ChannelId>,
    ) -> PlayerResult<()> {
        let result = match channel_id {
            Some(channel_id) => self.join_gateway(guild_id, channel_id).await.map(|_| ()),
            None => self.remove(guild_id).await,
        };

        result.map_err(|e| PlayerError::Gateway(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceStateUpdate {
    pub guild_id: Option<GuildId>,
    pub channel_id: Option<ChannelId>,
    pub user_id: UserId,
    pub session_id: String,
}

impl From<&VoiceState> for VoiceStateUpdate {
    fn from(state: &VoiceState) -> Self {
        VoiceStateUpdate {
            guild_id: state.guild_id,
            channel_id: state.channel_id,
            user_id: state.user_id,
            session_id: state.session_id.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VoiceServerUpdate {
    pub token: String,
    pub guild_id: String,
    pub endpoint: Option<String>,
}

impl VoiceServerUpdate {
    pub fn new(guild_id: GuildId, token: impl Into<String>, endpoint: Option<String>) -> Self {
        VoiceServerUpdate {
            token: token.into(),
            guild_id: guild_id.to_string(),
            endpoint,
        }
    }

    /// `None` when the event is not tied to a guild.
    pub fn from_event(event: &VoiceServerUpdateEvent) -> Option<Self> {
        event.guild_id.map(|guild_id| {
            VoiceServerUpdate::new(guild_id, event.token.clone(), event.endpoint.clone())
        })
    }
}
