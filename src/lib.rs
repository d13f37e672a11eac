//! Voice session proxy between Discord voice channels and a Lavalink node.
//!
//! The node does the audio work. A [`player::Player`] mirrors its state for
//! one guild, turns calls into node ops and relays the voice handshake from
//! Discord to the node.

pub mod config;
pub mod error;
pub mod events;
pub mod filters;
pub mod gateway;
pub mod logging;
pub mod node;
pub mod player;
pub mod protocol;
pub mod track;

#[cfg(test)]
mod testing;

pub use error::{NodeError, PlayerError};
pub use node::{LavalinkNode, Node, NodeConfig};
pub use player::Player;
