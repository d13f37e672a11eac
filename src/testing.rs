//! In-memory doubles for the node and the chat platform.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use serenity::model::id::{ChannelId, GuildId};

use crate::{
    error::{NodeError, NodeResult, PlayerError, PlayerResult},
    gateway::VoiceGateway,
    node::Node,
    player::Player,
    protocol::OutgoingOp,
    track::{Track, TrackInfo},
};

pub fn track(id: &str, length: u64) -> Track {
    Track {
        track_id: id.to_owned(),
        info: TrackInfo {
            identifier: id.to_owned(),
            title: format!("Track {}", id),
            author: "Author".to_owned(),
            length,
            uri: None,
            is_stream: false,
            is_seekable: true,
            position: 0,
            source_name: Some("youtube".to_owned()),
        },
        spotify: None,
        resolved: None,
    }
}

#[derive(Default)]
pub struct RecordingNode {
    pub sent: Mutex<Vec<OutgoingOp>>,
    pub queries: Mutex<Vec<String>>,
    pub tracks: Vec<Track>,
    pub offline: bool,
    /// Sends still accepted before the node starts failing.
    remaining: Mutex<Option<usize>>,
    players: Mutex<HashMap<GuildId, Arc<Player>>>,
}

impl RecordingNode {
    pub fn with_tracks(tracks: Vec<Track>) -> Self {
        RecordingNode {
            tracks,
            ..Default::default()
        }
    }

    pub fn offline() -> Self {
        RecordingNode {
            offline: true,
            ..Default::default()
        }
    }

    pub fn accept_only(&self, sends: usize) {
        *self.remaining.lock().unwrap() = Some(sends);
    }

    pub fn sent(&self) -> Vec<OutgoingOp> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_names(&self) -> Vec<&'static str> {
        self.sent.lock().unwrap().iter().map(OutgoingOp::name).collect()
    }

    pub fn has_player(&self, guild_id: GuildId) -> bool {
        self.players.lock().unwrap().contains_key(&guild_id)
    }
}

#[async_trait]
impl Node for RecordingNode {
    fn identifier(&self) -> &str {
        "TEST"
    }

    async fn send(&self, op: OutgoingOp) -> NodeResult<()> {
        if self.offline {
            return Err(NodeError::NodeNotAvailable("TEST".into()));
        }
        if let Some(remaining) = self.remaining.lock().unwrap().as_mut() {
            if *remaining == 0 {
                return Err(NodeError::NodeNotAvailable("TEST".into()));
            }
            *remaining -= 1;
        }
        self.sent.lock().unwrap().push(op);
        Ok(())
    }

    async fn get_tracks(&self, query: &str) -> NodeResult<Vec<Track>> {
        self.queries.lock().unwrap().push(query.to_owned());
        Ok(self.tracks.clone())
    }

    async fn register_player(&self, player: Arc<Player>) {
        self.players.lock().unwrap().insert(player.guild_id(), player);
    }

    async fn remove_player(&self, guild_id: GuildId) -> Option<Arc<Player>> {
        self.players.lock().unwrap().remove(&guild_id)
    }
}

#[derive(Default)]
pub struct RecordingGateway {
    pub calls: Mutex<Vec<(GuildId, Option<ChannelId>)>>,
    pub failing: bool,
}

impl RecordingGateway {
    pub fn failing() -> Self {
        RecordingGateway {
            failing: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<(GuildId, Option<ChannelId>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl VoiceGateway for RecordingGateway {
    async fn update_voice_state(
        &self,
        guild_id: GuildId,
        channel_id: Option<ChannelId>,
    ) -> PlayerResult<()> {
        self.calls.lock().unwrap().push((guild_id, channel_id));
        if self.failing {
            return Err(PlayerError::Gateway("timed out".into()));
        }
        Ok(())
    }
}
