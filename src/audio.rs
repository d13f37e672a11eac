use serenity::{
    client::Context,
    framework::standard::{
        macros::{command, group},
        Args, CommandError, CommandResult,
    },
    http::Http,
    model::{
        channel::Message,
        event::VoiceServerUpdateEvent,
        id::{ChannelId, GuildId},
        mention::Mentionable,
        prelude::VoiceState,
    },
    prelude::TypeMapKey,
    Client,
};
use std::{sync::Arc, time::Duration};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{error, info, warn};
use voicelink::{
    events::{NodeEvent, TrackException},
    filters::Filter,
    gateway::{VoiceServerUpdate, VoiceStateUpdate},
    LavalinkNode, Player, PlayerError,
};

struct Lavalink;

impl TypeMapKey for Lavalink {
    type Value = Arc<LavalinkNode>;
}

pub async fn config(client: &Client, node: Arc<LavalinkNode>) {
    let mut data = client.data.write().await;
    data.insert::<Lavalink>(node);
}

pub async fn voice_state_update(
    ctx: &Context,
    node: &LavalinkNode,
    _: &Option<VoiceState>,
    new: &VoiceState,
) {
    let guild_id = match new.guild_id {
        Some(guild_id) => guild_id,
        None => return,
    };

    let player = match node.player(guild_id).await {
        Some(player) => player,
        None => return,
    };

    if new.user_id == node.user_id() {
        if let Err(e) = player
            .on_voice_state_update(VoiceStateUpdate::from(new))
            .await
        {
            error!("Failed to relay voice state for guild {}: {}", guild_id, e);
        }
        return;
    }

    // Someone else moved; leave if nobody is left to listen.
    let channel_id = match player.channel_id().await {
        Some(channel_id) => channel_id,
        None => return,
    };

    let alone = ctx
        .cache
        .guild(guild_id)
        .map(|guild| {
            !guild
                .voice_states
                .values()
                .any(|state| {
                    state.channel_id == Some(channel_id) && state.user_id != node.user_id()
                })
        })
        .unwrap_or(false);

    if alone {
        info!(
            "Leaving channel {} in guild {}, nobody is listening",
            channel_id, guild_id
        );
        if let Err(e) = player.destroy().await {
            warn!("Failed to destroy player for guild {}: {}", guild_id, e);
        }
    }
}

pub async fn voice_server_update(node: &LavalinkNode, event: &VoiceServerUpdateEvent) {
    let (guild_id, update) = match (event.guild_id, VoiceServerUpdate::from_event(event)) {
        (Some(guild_id), Some(update)) => (guild_id, update),
        _ => return,
    };

    if let Some(player) = node.player(guild_id).await {
        if let Err(e) = player.on_voice_server_update(update).await {
            error!("Failed to relay voice server for guild {}: {}", guild_id, e);
        }
    }
}

#[group]
#[commands(join, leave, play, pause, resume, stop, seek, volume, filter, now)]
struct Music;

async fn lavalink(ctx: &Context) -> Result<Arc<LavalinkNode>, CommandError> {
    let data = ctx.data.read().await;
    data.get::<Lavalink>()
        .cloned()
        .ok_or_else(|| "Lavalink node is not configured".into())
}

async fn current_player(
    ctx: &Context,
    msg: &Message,
) -> Result<Option<Arc<Player>>, CommandError> {
    let node = lavalink(ctx).await?;

    Ok(match msg.guild_id {
        Some(guild_id) => node.player(guild_id).await,
        None => None,
    })
}

fn format_millis(millis: u64) -> String {
    let seconds = millis / 1000;
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[command]
#[only_in(guilds)]
#[description = "Makes the bot join your voice channel"]
async fn join(ctx: &Context, msg: &Message) -> CommandResult {
    let guild_id = match msg.guild_id {
        Some(guild_id) => guild_id,
        None => return Ok(()),
    };

    let channel_id = msg.guild(&ctx.cache).and_then(|guild| {
        guild
            .voice_states
            .get(&msg.author.id)
            .and_then(|voice_state| voice_state.channel_id)
    });

    let channel_id = match channel_id {
        Some(channel_id) => channel_id,
        None => {
            msg.reply(
                &ctx.http,
                "You need to be in a voice channel to use this command",
            )
            .await?;
            return Ok(());
        }
    };

    let node = lavalink(ctx).await?;

    if node.player(guild_id).await.is_some() {
        msg.reply(&ctx.http, "Already connected, use `leave` first")
            .await?;
        return Ok(());
    }

    let voice_manager = songbird::get(ctx)
        .await
        .ok_or("Songbird is not registered")?;

    let player = Arc::new(Player::new(guild_id, channel_id, node, voice_manager));

    let message = match player.connect().await {
        Ok(()) => {
            tokio::spawn(announce(
                ctx.http.clone(),
                guild_id,
                msg.channel_id,
                player.subscribe(),
            ));
            format!("Successfully joined {}", channel_id.mention())
        }
        Err(e) => {
            warn!("Joining {} failed: {}", channel_id, e);
            format!("Error joining {}", channel_id.mention())
        }
    };

    msg.reply(&ctx.http, message).await?;

    Ok(())
}

/// Reports playback in the channel `join` was used in.
async fn announce(
    http: Arc<Http>,
    guild_id: GuildId,
    channel_id: ChannelId,
    mut events: broadcast::Receiver<NodeEvent>,
) {
    loop {
        let text = match events.recv().await {
            Ok(event) => match announcement(guild_id, event) {
                Some(text) => text,
                None => continue,
            },
            Err(RecvError::Lagged(skipped)) => {
                warn!("Dropped {} events for guild {}", skipped, guild_id);
                continue;
            }
            Err(RecvError::Closed) => break,
        };

        if let Err(e) = channel_id.say(&http, text).await {
            error!("Could not announce in {}: {}", channel_id, e);
        }
    }
}

fn announcement(guild_id: GuildId, event: NodeEvent) -> Option<String> {
    match event {
        NodeEvent::TrackStartEvent { .. } => Some("Started playing".to_owned()),
        NodeEvent::TrackExceptionEvent { exception, .. } => Some(match exception {
            TrackException::Detailed { message, .. } => format!(
                "Playback failed: {}",
                message.unwrap_or_else(|| "unknown error".to_owned())
            ),
            TrackException::Message(message) => format!("Playback failed: {}", message),
        }),
        NodeEvent::TrackStuckEvent { threshold_ms, .. } => Some(format!(
            "Track got stuck for {} and stopped",
            format_millis(threshold_ms)
        )),
        NodeEvent::WebSocketClosedEvent { code, reason, .. } => {
            warn!(
                "Voice connection for guild {} closed ({}): {}",
                guild_id, code, reason
            );
            None
        }
        _ => None,
    }
}

#[command]
#[only_in(guilds)]
#[description = "Makes the bot leave your voice channel"]
async fn leave(ctx: &Context, msg: &Message) -> CommandResult {
    if let Some(player) = current_player(ctx, msg).await? {
        player.destroy().await?;
        msg.reply(&ctx.http, "Left the voice channel").await?;
    } else {
        msg.reply(&ctx.http, "Not in a voice channel").await?;
    }

    Ok(())
}

#[command]
#[only_in(guilds)]
#[description = "Plays a track from a URL or a search"]
#[usage = "<url or search>"]
async fn play(ctx: &Context, msg: &Message, args: Args) -> CommandResult {
    let query = args.rest().trim();

    if query.is_empty() {
        msg.reply(&ctx.http, "Tell me what to play").await?;
        return Ok(());
    }

    let player = match current_player(ctx, msg).await? {
        Some(player) => player,
        None => {
            msg.reply(&ctx.http, "Use `join` first").await?;
            return Ok(());
        }
    };

    let identifier = if query.starts_with("http://") || query.starts_with("https://") {
        query.to_owned()
    } else {
        format!("ytsearch:{}", query)
    };

    let track = match player.get_tracks(&identifier).await?.into_iter().next() {
        Some(track) => track,
        None => {
            msg.reply(&ctx.http, format!("Nothing found for `{}`", query))
                .await?;
            return Ok(());
        }
    };

    let track = player.play(track, 0).await?;

    msg.reply(
        &ctx.http,
        format!(
            "Now playing `{}` ({})",
            track.title(),
            format_millis(track.length())
        ),
    )
    .await?;

    Ok(())
}

#[command]
#[only_in(guilds)]
#[description = "Pauses the current track"]
async fn pause(ctx: &Context, msg: &Message) -> CommandResult {
    set_pause(ctx, msg, true).await
}

#[command]
#[only_in(guilds)]
#[description = "Resumes the current track"]
async fn resume(ctx: &Context, msg: &Message) -> CommandResult {
    set_pause(ctx, msg, false).await
}

async fn set_pause(ctx: &Context, msg: &Message, pause: bool) -> CommandResult {
    let player = match current_player(ctx, msg).await? {
        Some(player) => player,
        None => {
            msg.reply(&ctx.http, "Not in a voice channel").await?;
            return Ok(());
        }
    };

    if !player.is_playing().await {
        msg.reply(&ctx.http, "Nothing is playing").await?;
        return Ok(());
    }

    player.set_pause(pause).await?;
    let reply = if pause { "Paused" } else { "Resumed" };
    msg.reply(&ctx.http, reply).await?;

    Ok(())
}

#[command]
#[only_in(guilds)]
#[description = "Stops the current track"]
async fn stop(ctx: &Context, msg: &Message) -> CommandResult {
    if let Some(player) = current_player(ctx, msg).await? {
        player.stop().await?;
        msg.reply(&ctx.http, "Stopped").await?;
    } else {
        msg.reply(&ctx.http, "Not in a voice channel").await?;
    }

    Ok(())
}

#[command]
#[only_in(guilds)]
#[description = "Jumps to a point in the current track"]
#[usage = "<seconds>"]
async fn seek(ctx: &Context, msg: &Message, mut args: Args) -> CommandResult {
    let seconds = args.single::<f64>()?;

    let player = match current_player(ctx, msg).await? {
        Some(player) => player,
        None => {
            msg.reply(&ctx.http, "Not in a voice channel").await?;
            return Ok(());
        }
    };

    let position = Duration::from_secs_f64(seconds.max(0.0)).as_millis() as i64;
    let reply = match player.seek(position).await {
        Ok(position) => format!("Seeked to {}", format_millis(position)),
        Err(PlayerError::InvalidPosition { length, .. }) => {
            format!("The track is only {} long", format_millis(length))
        }
        Err(PlayerError::NothingPlaying(_)) => "Nothing is playing".to_owned(),
        Err(e) => return Err(e.into()),
    };

    msg.reply(&ctx.http, reply).await?;

    Ok(())
}

#[command]
#[only_in(guilds)]
#[description = "Sets the volume"]
#[usage = "<0-1000>"]
async fn volume(ctx: &Context, msg: &Message, mut args: Args) -> CommandResult {
    let volume = args.single::<u16>()?;

    let player = match current_player(ctx, msg).await? {
        Some(player) => player,
        None => {
            msg.reply(&ctx.http, "Not in a voice channel").await?;
            return Ok(());
        }
    };

    let reply = match player.set_volume(volume).await {
        Ok(volume) => format!("Volume set to {}", volume),
        Err(PlayerError::InvalidVolume(_)) => "Volume must be between 0 and 1000".to_owned(),
        Err(e) => return Err(e.into()),
    };

    msg.reply(&ctx.http, reply).await?;

    Ok(())
}

#[command]
#[only_in(guilds)]
#[description = "Applies a filter: nightcore, vaporwave, bassboost, karaoke, 8d or off"]
#[usage = "<filter>"]
async fn filter(ctx: &Context, msg: &Message, args: Args) -> CommandResult {
    let name = args.rest().trim().to_lowercase();

    let filter = match Filter::preset(&name) {
        Some(filter) => filter,
        None => {
            msg.reply(
                &ctx.http,
                "Available filters: nightcore, vaporwave, bassboost, karaoke, 8d, off",
            )
            .await?;
            return Ok(());
        }
    };

    if let Some(player) = current_player(ctx, msg).await? {
        let filter = player.set_filter(filter).await?;
        msg.reply(&ctx.http, format!("Applied `{}`", filter.name()))
            .await?;
    } else {
        msg.reply(&ctx.http, "Not in a voice channel").await?;
    }

    Ok(())
}

#[command]
#[only_in(guilds)]
#[description = "Shows the current track and position"]
async fn now(ctx: &Context, msg: &Message) -> CommandResult {
    let player = match current_player(ctx, msg).await? {
        Some(player) => player,
        None => {
            msg.reply(&ctx.http, "Not in a voice channel").await?;
            return Ok(());
        }
    };

    let reply = match player.current().await {
        Some(track) => format!(
            "`{}` by {} [{} / {}]{}",
            track.title(),
            track.info.author,
            format_millis(player.position().await),
            format_millis(track.length()),
            if player.is_paused().await { " (paused)" } else { "" }
        ),
        None => "Nothing is playing".to_owned(),
    };

    msg.reply(&ctx.http, reply).await?;

    Ok(())
}
