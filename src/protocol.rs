//! Frames exchanged with the node over the websocket.

use serde::{Deserialize, Serialize};

use crate::{events::NodeEvent, filters::Filter, gateway::VoiceServerUpdate};

/// Commands sent to the node. Guild ids travel as decimal strings.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum OutgoingOp {
    #[serde(rename_all = "camelCase")]
    VoiceUpdate {
        guild_id: String,
        session_id: String,
        event: VoiceServerUpdate,
    },

    #[serde(rename_all = "camelCase")]
    Play {
        guild_id: String,
        track: String,
        start_time: u64,
        end_time: u64,
        no_replace: bool,
    },

    #[serde(rename_all = "camelCase")]
    Stop { guild_id: String },

    #[serde(rename_all = "camelCase")]
    Destroy { guild_id: String },

    #[serde(rename_all = "camelCase")]
    Seek { guild_id: String, position: u64 },

    #[serde(rename_all = "camelCase")]
    Pause { guild_id: String, pause: bool },

    #[serde(rename_all = "camelCase")]
    Volume { guild_id: String, volume: u16 },

    #[serde(rename_all = "camelCase")]
    Filters {
        guild_id: String,
        #[serde(flatten)]
        filter: Filter,
    },

    /// Timeout is in seconds.
    ConfigureResuming { key: String, timeout: u64 },
}

impl OutgoingOp {
    pub fn name(&self) -> &'static str {
        match self {
            OutgoingOp::VoiceUpdate { .. } => "voiceUpdate",
            OutgoingOp::Play { .. } => "play",
            OutgoingOp::Stop { .. } => "stop",
            OutgoingOp::Destroy { .. } => "destroy",
            OutgoingOp::Seek { .. } => "seek",
            OutgoingOp::Pause { .. } => "pause",
            OutgoingOp::Volume { .. } => "volume",
            OutgoingOp::Filters { .. } => "filters",
            OutgoingOp::ConfigureResuming { .. } => "configureResuming",
        }
    }

    pub fn guild_id(&self) -> Option<&str> {
        match self {
            OutgoingOp::VoiceUpdate { guild_id, .. }
            | OutgoingOp::Play { guild_id, .. }
            | OutgoingOp::Stop { guild_id }
            | OutgoingOp::Destroy { guild_id }
            | OutgoingOp::Seek { guild_id, .. }
            | OutgoingOp::Pause { guild_id, .. }
            | OutgoingOp::Volume { guild_id, .. }
            | OutgoingOp::Filters { guild_id, .. } => Some(guild_id),
            OutgoingOp::ConfigureResuming { .. } => None,
        }
    }
}

/// Frames received from the node.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum IncomingOp {
    #[serde(rename_all = "camelCase")]
    PlayerUpdate { guild_id: String, state: PlayerState },

    Stats(Stats),

    Event(NodeEvent),

    #[serde(other)]
    Unknown,
}

/// Periodic playback state of one player.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlayerState {
    /// Node clock in epoch milliseconds.
    #[serde(default)]
    pub time: u64,
    /// Absent while nothing is playing.
    #[serde(default)]
    pub position: u64,
    #[serde(default)]
    pub connected: bool,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub players: u32,
    pub playing_players: u32,
    pub uptime: u64,
    pub memory: MemoryStats,
    pub cpu: CpuStats,
    #[serde(default)]
    pub frame_stats: Option<FrameStats>,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemoryStats {
    pub free: u64,
    pub used: u64,
    pub allocated: u64,
    pub reservable: u64,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CpuStats {
    pub cores: u32,
    pub system_load: f64,
    pub lavalink_load: f64,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    pub sent: i64,
    pub nulled: i64,
    pub deficit: i64,
}
