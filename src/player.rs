//! Per-guild voice session proxy.
//!
//! A [`Player`] keeps a local mirror of what the node is doing for one guild
//! and turns method calls into node ops. The node reports progress every few
//! seconds; in between, [`Player::position`] extrapolates from the last
//! report.

use std::{fmt, sync::Arc};

use serenity::model::id::{ChannelId, GuildId};
use tokio::{
    sync::{broadcast, Mutex},
    time::Instant,
};
use tracing::{debug, info, trace, warn};

use crate::{
    error::{PlayerError, PlayerResult},
    events::NodeEvent,
    filters::Filter,
    gateway::{VoiceGateway, VoiceServerUpdate, VoiceStateUpdate},
    node::Node,
    protocol::{OutgoingOp, PlayerState},
    track::Track,
};

pub const DEFAULT_VOLUME: u16 = 100;
pub const MAX_VOLUME: u16 = 1000;

const EVENT_CAPACITY: usize = 32;

/// Half of the voice handshake received so far.
#[derive(Debug, Default)]
struct PendingVoiceState {
    session_id: Option<String>,
    event: Option<VoiceServerUpdate>,
}

impl PendingVoiceState {
    fn complete(&self) -> Option<(String, VoiceServerUpdate)> {
        Some((self.session_id.clone()?, self.event.clone()?))
    }

    fn clear(&mut self) {
        self.session_id = None;
        self.event = None;
    }
}

#[derive(Debug)]
struct PlayerInner {
    channel_id: Option<ChannelId>,
    current: Option<Track>,
    filter: Option<Filter>,
    volume: u16,
    paused: bool,
    connected: bool,
    last_position: u64,
    last_update: Option<Instant>,
    voice_state: PendingVoiceState,
}

impl PlayerInner {
    fn is_playing(&self) -> bool {
        self.connected && self.current.is_some()
    }

    fn position(&self) -> u64 {
        let length = match &self.current {
            Some(track) if self.connected => track.length(),
            _ => return 0,
        };

        if self.paused {
            return self.last_position.min(length);
        }

        let elapsed = self
            .last_update
            .map(|at| at.elapsed().as_millis() as u64)
            .unwrap_or(0);
        let position = self.last_position.saturating_add(elapsed);

        if position > length {
            0
        } else {
            position
        }
    }

    fn reset_position(&mut self, position: u64) {
        self.last_position = position;
        self.last_update = Some(Instant::now());
    }
}

pub struct Player {
    guild_id: GuildId,
    node: Arc<dyn Node>,
    gateway: Arc<dyn VoiceGateway>,
    state: Mutex<PlayerInner>,
    events: broadcast::Sender<NodeEvent>,
}

impl Player {
    pub fn new(
        guild_id: GuildId,
        channel_id: ChannelId,
        node: Arc<dyn Node>,
        gateway: Arc<dyn VoiceGateway>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            guild_id,
            node,
            gateway,
            state: Mutex::new(PlayerInner {
                channel_id: Some(channel_id),
                current: None,
                filter: None,
                volume: DEFAULT_VOLUME,
                paused: false,
                connected: false,
                last_position: 0,
                last_update: None,
                voice_state: PendingVoiceState::default(),
            }),
            events,
        }
    }

    pub fn guild_id(&self) -> GuildId {
        self.guild_id
    }

    pub fn node(&self) -> &Arc<dyn Node> {
        &self.node
    }

    pub async fn channel_id(&self) -> Option<ChannelId> {
        self.state.lock().await.channel_id
    }

    pub async fn current(&self) -> Option<Track> {
        self.state.lock().await.current.clone()
    }

    pub async fn filter(&self) -> Option<Filter> {
        self.state.lock().await.filter.clone()
    }

    pub async fn volume(&self) -> u16 {
        self.state.lock().await.volume
    }

    pub async fn is_connected(&self) -> bool {
        self.state.lock().await.connected
    }

    pub async fn is_playing(&self) -> bool {
        self.state.lock().await.is_playing()
    }

    pub async fn is_paused(&self) -> bool {
        let state = self.state.lock().await;
        state.connected && state.paused
    }

    /// Position in the current track in milliseconds.
    pub async fn position(&self) -> u64 {
        self.state.lock().await.position()
    }

    /// Receives every event the node reports for this guild.
    pub fn subscribe(&self) -> broadcast::Receiver<NodeEvent> {
        self.events.subscribe()
    }

    fn guild(&self) -> String {
        self.guild_id.to_string()
    }

    /// Joins the bound voice channel and starts receiving node updates.
    pub async fn connect(self: &Arc<Self>) -> PlayerResult<()> {
        let channel_id = self.state.lock().await.channel_id.ok_or_else(|| {
            PlayerError::Gateway(format!("guild {} has no voice channel bound", self.guild_id))
        })?;

        // Voice events can arrive before the join resolves.
        self.node.register_player(Arc::clone(self)).await;

        if let Err(e) = self
            .gateway
            .update_voice_state(self.guild_id, Some(channel_id))
            .await
        {
            self.node.remove_player(self.guild_id).await;
            return Err(e);
        }

        self.state.lock().await.connected = true;
        info!(
            "Player for guild {} joined channel {} on node `{}`",
            self.guild_id,
            channel_id,
            self.node.identifier()
        );

        Ok(())
    }

    pub async fn update_state(&self, update: PlayerState) {
        let mut state = self.state.lock().await;
        state.connected = update.connected;
        state.reset_position(update.position);
        trace!(
            "Player update for guild {}: position {} connected {}",
            self.guild_id,
            update.position,
            update.connected
        );
    }

    pub async fn on_voice_server_update(&self, update: VoiceServerUpdate) -> PlayerResult<()> {
        let pending = {
            let mut state = self.state.lock().await;
            state.voice_state.event = Some(update);
            state.voice_state.complete()
        };

        self.dispatch_voice_update(pending).await
    }

    pub async fn on_voice_state_update(&self, update: VoiceStateUpdate) -> PlayerResult<()> {
        let pending = {
            let mut state = self.state.lock().await;
            state.voice_state.session_id = Some(update.session_id);

            match update.channel_id {
                Some(channel_id) => {
                    state.channel_id = Some(channel_id);
                    state.voice_state.complete()
                }
                None => {
                    state.channel_id = None;
                    state.voice_state.clear();
                    debug!("Voice state for guild {} cleared", self.guild_id);
                    return Ok(());
                }
            }
        };

        self.dispatch_voice_update(pending).await
    }

    async fn dispatch_voice_update(
        &self,
        pending: Option<(String, VoiceServerUpdate)>,
    ) -> PlayerResult<()> {
        let (session_id, event) = match pending {
            Some(handshake) => handshake,
            None => {
                trace!("Voice handshake for guild {} is incomplete", self.guild_id);
                return Ok(());
            }
        };

        self.node
            .send(OutgoingOp::VoiceUpdate {
                guild_id: self.guild(),
                session_id,
                event,
            })
            .await?;

        Ok(())
    }

    pub async fn dispatch_event(&self, event: NodeEvent) {
        if event.ends_track() {
            self.state.lock().await.current = None;
        }

        debug!("Guild {} received `{}`", self.guild_id, event.name());
        if self.events.send(event).is_err() {
            trace!("No subscribers for guild {}", self.guild_id);
        }
    }

    pub async fn get_tracks(&self, query: &str) -> PlayerResult<Vec<Track>> {
        Ok(self.node.get_tracks(query).await?)
    }

    /// Spotify tracks are matched on the node first; the match is what gets
    /// played and is kept in [`Track::resolved`].
    pub async fn play(&self, mut track: Track, start_position: u64) -> PlayerResult<Track> {
        let (track_id, end_time) = match track.search_query() {
            Some(query) => {
                let resolved = self
                    .node
                    .get_tracks(&query)
                    .await?
                    .into_iter()
                    .next()
                    .ok_or(PlayerError::NoMatches(query))?;
                let playable = (resolved.track_id.clone(), resolved.length());
                track.resolved = Some(Box::new(resolved));
                playable
            }
            None => (track.track_id.clone(), track.length()),
        };

        self.node
            .send(OutgoingOp::Play {
                guild_id: self.guild(),
                track: track_id,
                start_time: start_position,
                end_time,
                no_replace: false,
            })
            .await?;

        let mut state = self.state.lock().await;
        state.current = Some(track.clone());
        state.reset_position(start_position);

        Ok(track)
    }

    pub async fn seek(&self, position: i64) -> PlayerResult<u64> {
        let length = self
            .state
            .lock()
            .await
            .current
            .as_ref()
            .map(Track::length)
            .ok_or(PlayerError::NothingPlaying(self.guild_id))?;

        if position < 0 || position as u64 > length {
            return Err(PlayerError::InvalidPosition { position, length });
        }
        let position = position as u64;

        self.node
            .send(OutgoingOp::Seek {
                guild_id: self.guild(),
                position,
            })
            .await?;

        self.state.lock().await.reset_position(position);
        Ok(position)
    }

    pub async fn set_pause(&self, pause: bool) -> PlayerResult<bool> {
        self.node
            .send(OutgoingOp::Pause {
                guild_id: self.guild(),
                pause,
            })
            .await?;

        let mut state = self.state.lock().await;
        let position = state.position();
        state.reset_position(position);
        state.paused = pause;

        Ok(pause)
    }

    pub async fn set_volume(&self, volume: u16) -> PlayerResult<u16> {
        if volume > MAX_VOLUME {
            return Err(PlayerError::InvalidVolume(volume));
        }

        self.node
            .send(OutgoingOp::Volume {
                guild_id: self.guild(),
                volume,
            })
            .await?;

        self.state.lock().await.volume = volume;
        Ok(volume)
    }

    /// Re-seeks to the current position so the node applies the filter
    /// right away instead of after its buffer drains.
    pub async fn set_filter(&self, filter: Filter) -> PlayerResult<Filter> {
        self.node
            .send(OutgoingOp::Filters {
                guild_id: self.guild(),
                filter: filter.clone(),
            })
            .await?;

        let position = {
            let mut state = self.state.lock().await;
            state.filter = Some(filter.clone());
            if state.is_playing() {
                Some(state.position())
            } else {
                None
            }
        };

        if let Some(position) = position {
            let sent = self
                .node
                .send(OutgoingOp::Seek {
                    guild_id: self.guild(),
                    position,
                })
                .await;

            match sent {
                Ok(()) => self.state.lock().await.reset_position(position),
                Err(e) => warn!(
                    "Failed to re-seek guild {} after applying filter `{}`: {}",
                    self.guild_id,
                    filter.name(),
                    e
                ),
            }
        }

        Ok(filter)
    }

    pub async fn stop(&self) -> PlayerResult<()> {
        self.node
            .send(OutgoingOp::Stop {
                guild_id: self.guild(),
            })
            .await?;

        self.state.lock().await.current = None;
        Ok(())
    }

    /// Leaves voice and detaches from the node. The node keeps its player
    /// until [`Player::destroy`].
    pub async fn disconnect(&self) -> PlayerResult<()> {
        if let Err(e) = self.stop().await {
            warn!("Could not stop playback in guild {}: {}", self.guild_id, e);
            self.state.lock().await.current = None;
        }

        if let Err(e) = self.gateway.update_voice_state(self.guild_id, None).await {
            warn!("Could not leave voice in guild {}: {}", self.guild_id, e);
        }

        {
            let mut state = self.state.lock().await;
            state.channel_id = None;
            state.connected = false;
            state.voice_state.clear();
        }

        self.node.remove_player(self.guild_id).await;
        info!("Player for guild {} disconnected", self.guild_id);

        Ok(())
    }

    pub async fn destroy(&self) -> PlayerResult<()> {
        self.disconnect().await?;

        self.node
            .send(OutgoingOp::Destroy {
                guild_id: self.guild(),
            })
            .await?;

        Ok(())
    }
}

impl fmt::Debug for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Player");
        debug
            .field("guild_id", &self.guild_id)
            .field("node", &self.node.identifier());

        match self.state.try_lock() {
            Ok(state) => debug
                .field("connected", &state.connected)
                .field("playing", &state.is_playing())
                .finish(),
            Err(_) => debug.finish_non_exhaustive(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        gateway::VoiceStateUpdate,
        testing::{track, RecordingGateway, RecordingNode},
        track::SpotifyTrack,
    };
    use serenity::model::id::UserId;

    const GUILD: u64 = 81384788765712384;
    const CHANNEL: u64 = 81384788765712385;

    fn player_with(node: Arc<RecordingNode>, gateway: Arc<RecordingGateway>) -> Arc<Player> {
        Arc::new(Player::new(
            GuildId::new(GUILD),
            ChannelId::new(CHANNEL),
            node,
            gateway,
        ))
    }

    fn player(node: Arc<RecordingNode>) -> Arc<Player> {
        player_with(node, Arc::new(RecordingGateway::default()))
    }

    fn state_update(channel_id: Option<u64>) -> VoiceStateUpdate {
        VoiceStateUpdate {
            guild_id: Some(GuildId::new(GUILD)),
            channel_id: channel_id.map(ChannelId::new),
            user_id: UserId::new(1),
            session_id: "session".into(),
        }
    }

    fn server_update() -> VoiceServerUpdate {
        VoiceServerUpdate::new(GuildId::new(GUILD), "token", Some("eu.discord.media".into()))
    }

    async fn playing(node: &Arc<RecordingNode>, length: u64) -> Arc<Player> {
        let player = player(node.clone());
        player.connect().await.unwrap();
        player.play(track("a", length), 0).await.unwrap();
        player
            .update_state(PlayerState {
                time: 0,
                position: 1000,
                connected: true,
            })
            .await;
        player
    }

    #[tokio::test]
    async fn connect_joins_and_registers() {
        let node = Arc::new(RecordingNode::default());
        let gateway = Arc::new(RecordingGateway::default());
        let player = player_with(node.clone(), gateway.clone());

        player.connect().await.unwrap();

        assert!(player.is_connected().await);
        assert!(node.has_player(GuildId::new(GUILD)));
        assert_eq!(
            gateway.calls(),
            vec![(GuildId::new(GUILD), Some(ChannelId::new(CHANNEL)))]
        );
    }

    #[tokio::test]
    async fn failed_join_unregisters_the_player() {
        let node = Arc::new(RecordingNode::default());
        let player = player_with(node.clone(), Arc::new(RecordingGateway::failing()));

        assert!(matches!(player.connect().await, Err(PlayerError::Gateway(_))));
        assert!(!node.has_player(GuildId::new(GUILD)));
        assert!(!player.is_connected().await);
    }

    #[tokio::test]
    async fn voice_update_waits_for_both_halves() {
        let node = Arc::new(RecordingNode::default());
        let player = player(node.clone());

        player.on_voice_state_update(state_update(Some(CHANNEL))).await.unwrap();
        assert!(node.sent().is_empty());

        player.on_voice_server_update(server_update()).await.unwrap();
        assert_eq!(
            node.sent(),
            vec![OutgoingOp::VoiceUpdate {
                guild_id: GUILD.to_string(),
                session_id: "session".into(),
                event: server_update(),
            }]
        );
    }

    #[tokio::test]
    async fn server_update_first_then_state_update() {
        let node = Arc::new(RecordingNode::default());
        let player = player(node.clone());

        player.on_voice_server_update(server_update()).await.unwrap();
        assert!(node.sent().is_empty());

        player.on_voice_state_update(state_update(Some(42))).await.unwrap();
        assert_eq!(node.sent_names(), vec!["voiceUpdate"]);
        assert_eq!(player.channel_id().await, Some(ChannelId::new(42)));
    }

    #[tokio::test]
    async fn leaving_the_channel_clears_the_handshake() {
        let node = Arc::new(RecordingNode::default());
        let player = player(node.clone());

        player.on_voice_server_update(server_update()).await.unwrap();
        player.on_voice_state_update(state_update(None)).await.unwrap();

        assert_eq!(player.channel_id().await, None);
        assert!(node.sent().is_empty());

        // a fresh session id alone is not enough after a reset
        player.on_voice_state_update(state_update(Some(CHANNEL))).await.unwrap();
        assert!(node.sent().is_empty());
    }

    #[tokio::test]
    async fn play_sends_track_and_length() {
        let node = Arc::new(RecordingNode::default());
        let player = player(node.clone());
        player.connect().await.unwrap();

        let current = player.play(track("abc", 212000), 5000).await.unwrap();

        assert_eq!(current.track_id, "abc");
        assert!(player.is_playing().await);
        assert_eq!(
            node.sent(),
            vec![OutgoingOp::Play {
                guild_id: GUILD.to_string(),
                track: "abc".into(),
                start_time: 5000,
                end_time: 212000,
                no_replace: false,
            }]
        );
    }

    #[tokio::test]
    async fn spotify_tracks_are_resolved_before_playing() {
        let node = Arc::new(RecordingNode::with_tracks(vec![track("yt", 200000)]));
        let player = player(node.clone());
        let spotify = SpotifyTrack {
            name: "Windowlicker".into(),
            artists: "Aphex Twin".into(),
            length: 367000,
            id: "4bz7".into(),
            isrc: None,
            image: None,
            uri: None,
        };

        let current = player.play(Track::from(spotify), 0).await.unwrap();

        assert_eq!(
            node.queries.lock().unwrap().clone(),
            vec!["ytsearch:Aphex Twin - Windowlicker".to_owned()]
        );
        assert_eq!(current.resolved.as_ref().unwrap().track_id, "yt");
        assert!(matches!(
            &node.sent()[0],
            OutgoingOp::Play { track, end_time: 200000, .. } if track == "yt"
        ));
    }

    #[tokio::test]
    async fn spotify_track_without_match_is_an_error() {
        let node = Arc::new(RecordingNode::default());
        let player = player(node.clone());
        let spotify = SpotifyTrack {
            name: "Unknown".into(),
            artists: "Nobody".into(),
            length: 1000,
            id: "x".into(),
            isrc: None,
            image: None,
            uri: None,
        };

        let result = player.play(Track::from(spotify), 0).await;

        assert!(matches!(result, Err(PlayerError::NoMatches(_))));
        assert!(node.sent().is_empty());
        assert!(player.current().await.is_none());
    }

    #[tokio::test]
    async fn position_is_zero_when_idle() {
        let node = Arc::new(RecordingNode::default());
        let player = player(node);

        assert_eq!(player.position().await, 0);
        assert!(!player.is_playing().await);
    }

    #[tokio::test(start_paused = true)]
    async fn position_extrapolates_between_updates() {
        let node = Arc::new(RecordingNode::default());
        let player = playing(&node, 10_000).await;

        tokio::time::advance(Duration::from_millis(1500)).await;

        assert_eq!(player.position().await, 2500);
    }

    #[tokio::test(start_paused = true)]
    async fn position_past_the_end_reads_as_zero() {
        let node = Arc::new(RecordingNode::default());
        let player = playing(&node, 3000).await;

        tokio::time::advance(Duration::from_millis(2500)).await;

        assert_eq!(player.position().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn bogus_node_position_does_not_overflow() {
        let node = Arc::new(RecordingNode::default());
        let player = playing(&node, 3000).await;
        player
            .update_state(PlayerState {
                time: 0,
                position: u64::MAX,
                connected: true,
            })
            .await;

        tokio::time::advance(Duration::from_millis(10)).await;

        assert_eq!(player.position().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn paused_position_is_frozen() {
        let node = Arc::new(RecordingNode::default());
        let player = playing(&node, 10_000).await;

        tokio::time::advance(Duration::from_millis(500)).await;
        player.set_pause(true).await.unwrap();
        tokio::time::advance(Duration::from_millis(5000)).await;

        assert!(player.is_paused().await);
        assert_eq!(player.position().await, 1500);
    }

    #[tokio::test]
    async fn seek_validates_bounds() {
        let node = Arc::new(RecordingNode::default());
        let player = playing(&node, 10_000).await;

        assert!(matches!(
            player.seek(-1).await,
            Err(PlayerError::InvalidPosition { position: -1, length: 10_000 })
        ));
        assert!(matches!(
            player.seek(10_001).await,
            Err(PlayerError::InvalidPosition { .. })
        ));
        assert_eq!(player.seek(10_000).await.unwrap(), 10_000);
        assert_eq!(node.sent_names(), vec!["play", "seek"]);
    }

    #[tokio::test]
    async fn seek_without_a_track_fails() {
        let node = Arc::new(RecordingNode::default());
        let player = player(node.clone());

        assert!(matches!(
            player.seek(0).await,
            Err(PlayerError::NothingPlaying(_))
        ));
        assert!(node.sent().is_empty());
    }

    #[tokio::test]
    async fn pause_and_volume_are_mirrored() {
        let node = Arc::new(RecordingNode::default());
        let player = player(node.clone());
        player.connect().await.unwrap();

        assert!(player.set_pause(true).await.unwrap());
        assert_eq!(player.set_volume(250).await.unwrap(), 250);

        assert!(player.is_paused().await);
        assert_eq!(player.volume().await, 250);
        assert_eq!(
            node.sent(),
            vec![
                OutgoingOp::Pause {
                    guild_id: GUILD.to_string(),
                    pause: true
                },
                OutgoingOp::Volume {
                    guild_id: GUILD.to_string(),
                    volume: 250
                },
            ]
        );
    }

    #[tokio::test]
    async fn volume_above_limit_is_rejected() {
        let node = Arc::new(RecordingNode::default());
        let player = player(node.clone());

        assert!(matches!(
            player.set_volume(1001).await,
            Err(PlayerError::InvalidVolume(1001))
        ));
        assert_eq!(player.volume().await, DEFAULT_VOLUME);
        assert!(node.sent().is_empty());
    }

    #[tokio::test]
    async fn local_state_is_untouched_when_the_node_is_down() {
        let node = Arc::new(RecordingNode::offline());
        let player = player(node);

        assert!(player.set_volume(50).await.is_err());
        assert!(player.set_pause(true).await.is_err());
        assert!(player.play(track("a", 1000), 0).await.is_err());

        assert_eq!(player.volume().await, DEFAULT_VOLUME);
        assert!(player.current().await.is_none());
    }

    #[tokio::test]
    async fn filter_while_playing_reseeks() {
        let node = Arc::new(RecordingNode::default());
        let player = playing(&node, 10_000).await;

        let filter = player.set_filter(Filter::nightcore()).await.unwrap();

        assert_eq!(filter, Filter::nightcore());
        assert_eq!(player.filter().await, Some(Filter::nightcore()));
        assert_eq!(node.sent_names(), vec!["play", "filters", "seek"]);
    }

    #[tokio::test]
    async fn filter_is_kept_when_the_reseek_fails() {
        let node = Arc::new(RecordingNode::default());
        let player = playing(&node, 10_000).await;
        node.accept_only(1);

        let filter = player.set_filter(Filter::nightcore()).await.unwrap();

        assert_eq!(filter, Filter::nightcore());
        assert_eq!(player.filter().await, Some(Filter::nightcore()));
        assert_eq!(node.sent_names(), vec!["play", "filters"]);
    }

    #[tokio::test(start_paused = true)]
    async fn filter_reseeks_to_the_current_position() {
        let node = Arc::new(RecordingNode::default());
        let player = playing(&node, 10_000).await;
        player.set_pause(true).await.unwrap();

        player.set_filter(Filter::bass_boost()).await.unwrap();

        match node.sent().last() {
            Some(OutgoingOp::Seek { position, .. }) => assert_eq!(*position, 1000),
            other => panic!("unexpected op {:?}", other),
        }
    }

    #[tokio::test]
    async fn filter_while_idle_does_not_seek() {
        let node = Arc::new(RecordingNode::default());
        let player = player(node.clone());

        player.set_filter(Filter::vaporwave()).await.unwrap();

        assert_eq!(node.sent_names(), vec!["filters"]);
    }

    #[tokio::test]
    async fn track_end_clears_current() {
        let node = Arc::new(RecordingNode::default());
        let player = playing(&node, 10_000).await;
        let mut events = player.subscribe();

        player
            .dispatch_event(NodeEvent::TrackEndEvent {
                guild_id: GUILD.to_string(),
                track: Some("a".into()),
                reason: "FINISHED".into(),
            })
            .await;

        assert!(player.current().await.is_none());
        assert_eq!(events.recv().await.unwrap().name(), "track_end");
    }

    #[tokio::test]
    async fn destroy_stops_leaves_and_unregisters() {
        let node = Arc::new(RecordingNode::default());
        let gateway = Arc::new(RecordingGateway::default());
        let player = player_with(node.clone(), gateway.clone());
        player.connect().await.unwrap();
        player.play(track("a", 1000), 0).await.unwrap();

        player.destroy().await.unwrap();

        assert_eq!(node.sent_names(), vec!["play", "stop", "destroy"]);
        assert_eq!(gateway.calls().last(), Some(&(GuildId::new(GUILD), None)));
        assert!(!node.has_player(GuildId::new(GUILD)));
        assert!(!player.is_connected().await);
        assert_eq!(player.channel_id().await, None);
        assert!(player.current().await.is_none());
    }

    #[tokio::test]
    async fn debug_summarises_the_session() {
        let node = Arc::new(RecordingNode::default());
        let player = player(node);

        let rendered = format!("{:?}", player);

        assert!(rendered.contains("TEST"));
        assert!(rendered.contains("connected: false"));
    }
}
