//! Error types for the voice proxy and its node connection.

use serenity::model::id::GuildId;
use thiserror::Error;

/// Errors raised while talking to a Lavalink node.
#[derive(Error, Debug)]
pub enum NodeError {
    /// The websocket is closed or was never opened.
    #[error("Node `{0}` is not available")]
    NodeNotAvailable(String),

    /// Websocket handshake or transport failure
    #[error("Websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// REST request to the node failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Frame could not be encoded or decoded
    #[error("Invalid payload: {0}")]
    Json(#[from] serde_json::Error),

    /// Header value could not be built from the configuration
    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] tokio_tungstenite::tungstenite::http::header::InvalidHeaderValue),

    /// The node could not load the requested identifier.
    #[error("Track loading failed: {0}")]
    LoadFailed(String),
}

/// Errors raised by [`Player`](crate::player::Player) operations.
#[derive(Error, Debug)]
pub enum PlayerError {
    #[error(transparent)]
    Node(#[from] NodeError),

    #[error("Seek position {position} must be between 0 and the track length {length}")]
    InvalidPosition { position: i64, length: u64 },

    #[error("Volume {0} is out of range (0-1000)")]
    InvalidVolume(u16),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Nothing is playing in guild {0}")]
    NothingPlaying(GuildId),

    /// A Spotify track could not be matched to a playable track.
    #[error("No playable match for `{0}`")]
    NoMatches(String),

    #[error("Voice gateway error: {0}")]
    Gateway(String),
}

pub type NodeResult<T> = Result<T, NodeError>;
pub type PlayerResult<T> = Result<T, PlayerError>;
