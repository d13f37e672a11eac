//! Connection to a Lavalink node.
//!
//! [`Node`] is the seam players talk through. [`LavalinkNode`] is the real
//! thing: one websocket for commands and player updates, plus the REST
//! endpoint for loading tracks.

use std::{
    collections::HashMap,
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use futures::{Sink, SinkExt, Stream, StreamExt};
use serenity::model::id::{GuildId, UserId};
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::tungstenite::{
    self, client::IntoClientRequest, http::HeaderValue, protocol::Message,
};
use tracing::{debug, error, info, warn};

use crate::{
    error::{NodeError, NodeResult},
    player::Player,
    protocol::{IncomingOp, OutgoingOp, Stats},
    track::{LoadResult, LoadType, Track},
};

const CLIENT_NAME: &str = concat!("voicelink/", env!("CARGO_PKG_VERSION"));

#[async_trait]
pub trait Node: Send + Sync {
    fn identifier(&self) -> &str;

    async fn send(&self, op: OutgoingOp) -> NodeResult<()>;

    /// Loads tracks for an identifier, URL or `ytsearch:`-style query.
    async fn get_tracks(&self, query: &str) -> NodeResult<Vec<Track>>;

    /// Routes state updates and events for the player's guild to it.
    async fn register_player(&self, player: Arc<Player>);

    async fn remove_player(&self, guild_id: GuildId) -> Option<Arc<Player>>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeConfig {
    pub host: String,
    pub port: u16,
    pub password: String,
    pub identifier: String,
    pub secure: bool,
    pub num_shards: u64,
    pub resume_key: Option<String>,
    /// Seconds the node keeps players alive for a resume.
    pub resume_timeout: u64,
}

impl NodeConfig {
    pub fn websocket_uri(&self) -> String {
        let scheme = if self.secure { "wss" } else { "ws" };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }

    pub fn rest_uri(&self) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }
}

pub(crate) fn parse_guild_id(raw: &str) -> Option<GuildId> {
    raw.parse::<u64>().ok().filter(|id| *id != 0).map(GuildId::new)
}

pub struct LavalinkNode {
    config: NodeConfig,
    user_id: UserId,
    http: reqwest::Client,
    sender: mpsc::UnboundedSender<Message>,
    players: Mutex<HashMap<GuildId, Arc<Player>>>,
    stats: Mutex<Option<Stats>>,
    available: AtomicBool,
}

impl LavalinkNode {
    pub(crate) fn new(
        config: NodeConfig,
        user_id: UserId,
        sender: mpsc::UnboundedSender<Message>,
    ) -> Self {
        Self {
            config,
            user_id,
            http: reqwest::Client::new(),
            sender,
            players: Mutex::new(HashMap::new()),
            stats: Mutex::new(None),
            available: AtomicBool::new(true),
        }
    }

    /// Opens the websocket and spawns the tasks that pump it.
    pub async fn connect(config: NodeConfig, user_id: UserId) -> NodeResult<Arc<Self>> {
        let mut request = config.websocket_uri().into_client_request()?;
        let headers = request.headers_mut();
        headers.insert("Authorization", HeaderValue::from_str(&config.password)?);
        headers.insert("User-Id", HeaderValue::from_str(&user_id.to_string())?);
        headers.insert("Num-Shards", HeaderValue::from_str(&config.num_shards.to_string())?);
        headers.insert("Client-Name", HeaderValue::from_static(CLIENT_NAME));
        if let Some(key) = &config.resume_key {
            headers.insert("Resume-Key", HeaderValue::from_str(key)?);
        }

        let (stream, _) = tokio_tungstenite::connect_async(request).await?;
        info!("Connected to node `{}` at {}", config.identifier, config.websocket_uri());

        let (write, read) = stream.split();
        let (tx, rx) = mpsc::unbounded_channel();

        let node = Arc::new(LavalinkNode::new(config, user_id, tx));

        tokio::spawn(write_loop(node.config.identifier.clone(), write, rx));
        tokio::spawn(Arc::clone(&node).listen(read));

        node.configure_resuming().await?;

        Ok(node)
    }

    /// Asks the node to hold our players for `resume_timeout` seconds if a
    /// resume key is configured.
    async fn configure_resuming(&self) -> NodeResult<()> {
        let key = match &self.config.resume_key {
            Some(key) => key.clone(),
            None => return Ok(()),
        };

        self.send(OutgoingOp::ConfigureResuming {
            key,
            timeout: self.config.resume_timeout,
        })
        .await
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    /// Last `stats` frame the node sent.
    pub async fn stats(&self) -> Option<Stats> {
        self.stats.lock().await.clone()
    }

    pub async fn player(&self, guild_id: GuildId) -> Option<Arc<Player>> {
        self.players.lock().await.get(&guild_id).cloned()
    }

    pub async fn player_count(&self) -> usize {
        self.players.lock().await.len()
    }

    async fn listen<S>(self: Arc<Self>, mut read: S)
    where
        S: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
    {
        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Text(text)) => self.handle_frame(&text).await,
                Ok(Message::Close(frame)) => {
                    info!("Node `{}` closed the connection: {:?}", self.config.identifier, frame);
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    error!("Node `{}` websocket failed: {}", self.config.identifier, e);
                    break;
                }
            }
        }

        self.available.store(false, Ordering::SeqCst);
        warn!("Node `{}` is no longer available", self.config.identifier);
    }

    pub(crate) async fn handle_frame(&self, text: &str) {
        let op = match serde_json::from_str::<IncomingOp>(text) {
            Ok(op) => op,
            Err(e) => {
                warn!("Dropping malformed frame from node `{}`: {}", self.config.identifier, e);
                return;
            }
        };

        match op {
            IncomingOp::PlayerUpdate { guild_id, state } => {
                if let Some(player) = self.player_by_raw_id(&guild_id).await {
                    player.update_state(state).await;
                }
            }
            IncomingOp::Event(event) => {
                let player = match event.guild_id() {
                    Some(guild_id) => self.player_by_raw_id(guild_id).await,
                    None => {
                        warn!("Ignoring unknown event from node `{}`", self.config.identifier);
                        return;
                    }
                };

                if let Some(player) = player {
                    player.dispatch_event(event).await;
                }
            }
            IncomingOp::Stats(stats) => {
                *self.stats.lock().await = Some(stats);
            }
            IncomingOp::Unknown => {
                debug!("Ignoring unhandled op from node `{}`", self.config.identifier);
            }
        }
    }

    async fn player_by_raw_id(&self, raw: &str) -> Option<Arc<Player>> {
        match parse_guild_id(raw) {
            Some(guild_id) => self.player(guild_id).await,
            None => {
                warn!("Node `{}` sent an invalid guild id `{}`", self.config.identifier, raw);
                None
            }
        }
    }

    fn unavailable(&self) -> NodeError {
        NodeError::NodeNotAvailable(self.config.identifier.clone())
    }

    #[cfg(test)]
    pub(crate) fn mark_unavailable(&self) {
        self.available.store(false, Ordering::SeqCst);
    }
}

fn loaded_tracks(result: LoadResult, query: &str) -> NodeResult<Vec<Track>> {
    match result.load_type {
        LoadType::LoadFailed => Err(NodeError::LoadFailed(
            result
                .exception
                .and_then(|e| e.message)
                .unwrap_or_else(|| query.to_owned()),
        )),
        _ => Ok(result.tracks),
    }
}

async fn write_loop<S>(
    identifier: String,
    mut write: S,
    mut rx: mpsc::UnboundedReceiver<Message>,
) where
    S: Sink<Message, Error = tungstenite::Error> + Unpin,
{
    while let Some(message) = rx.recv().await {
        if let Err(e) = write.send(message).await {
            error!("Failed to write to node `{}`: {}", identifier, e);
            break;
        }
    }
}

#[async_trait]
impl Node for LavalinkNode {
    fn identifier(&self) -> &str {
        &self.config.identifier
    }

    async fn send(&self, op: OutgoingOp) -> NodeResult<()> {
        if !self.is_available() {
            return Err(self.unavailable());
        }

        let payload = serde_json::to_string(&op)?;
        debug!("Sending `{}` to node `{}`", op.name(), self.config.identifier);

        self.sender
            .send(Message::text(payload))
            .map_err(|_| self.unavailable())
    }

    async fn get_tracks(&self, query: &str) -> NodeResult<Vec<Track>> {
        let result: LoadResult = self
            .http
            .get(format!("{}/loadtracks", self.config.rest_uri()))
            .header("Authorization", &self.config.password)
            .query(&[("identifier", query)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        debug!(
            "Node `{}` loaded {} track(s) for `{}` ({:?})",
            self.config.identifier,
            result.tracks.len(),
            query,
            result.load_type
        );

        loaded_tracks(result, query)
    }

    async fn register_player(&self, player: Arc<Player>) {
        self.players.lock().await.insert(player.guild_id(), player);
    }

    async fn remove_player(&self, guild_id: GuildId) -> Option<Arc<Player>> {
        self.players.lock().await.remove(&guild_id)
    }
}

impl fmt::Debug for LavalinkNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LavalinkNode")
            .field("identifier", &self.config.identifier)
            .field("uri", &self.config.websocket_uri())
            .field("available", &self.is_available())
            .finish()
    }
}
