use std::sync::Arc;

use serenity::{
    async_trait,
    client::{Context, EventHandler},
    framework::{standard::Configuration, StandardFramework},
    http::Http,
    model::{event::VoiceServerUpdateEvent, gateway::Ready, prelude::VoiceState},
    prelude::GatewayIntents,
    Client,
};
use songbird::{SerenityInit, Songbird};
use tracing::info;
use voicelink::{config::AppConfig, logging, LavalinkNode};

mod audio;
mod general;

pub struct Handler {
    node: Arc<LavalinkNode>,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _: Context, ready: Ready) {
        info!("{} is connected!", ready.user.name);
    }

    async fn voice_state_update(&self, ctx: Context, old: Option<VoiceState>, new: VoiceState) {
        audio::voice_state_update(&ctx, &self.node, &old, &new).await;
    }

    async fn voice_server_update(&self, _: Context, event: VoiceServerUpdateEvent) {
        audio::voice_server_update(&self.node, &event).await;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load();
    logging::setup_tracing_subscriber(&config)?;

    // The node wants our user id before the gateway is up.
    let http = Http::new(&config.token);
    let bot_id = http.get_current_user().await?.id;

    let node = LavalinkNode::connect(config.node(), bot_id).await?;

    let framework = StandardFramework::new()
        .group(&general::GENERAL_GROUP)
        .group(&audio::MUSIC_GROUP)
        .help(&general::HELP)
        .after(general::after);
    framework.configure(Configuration::new().prefix(config.prefix.clone()));

    // Gateway-only songbird: it sends our voice state, the node does the rest.
    let songbird = Songbird::serenity();

    let intents = GatewayIntents::non_privileged() | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&config.token, intents)
        .event_handler(Handler { node: node.clone() })
        .framework(framework)
        .register_songbird_with(songbird)
        .await?;

    audio::config(&client, node).await;

    client.start().await?;

    Ok(())
}
