use clap::Parser;
use tracing::Level;
use uuid::Uuid;

use crate::node::NodeConfig;

/// Configuration for the bot. Every option can also come from the
/// environment or a `.env` file.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct AppConfig {
    /// Discord bot token
    #[clap(long, env = "DISCORD_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Command prefix
    #[clap(long, env = "BOT_PREFIX", default_value = "!")]
    pub prefix: String,

    #[clap(long = "lavalink-host", env = "LAVALINK_HOST", default_value = "127.0.0.1")]
    pub lavalink_host: String,

    #[clap(long = "lavalink-port", env = "LAVALINK_PORT", default_value = "2333")]
    pub lavalink_port: u16,

    #[clap(
        long = "lavalink-password",
        env = "LAVALINK_PASSWORD",
        default_value = "youshallnotpass",
        hide_env_values = true
    )]
    pub lavalink_password: String,

    /// Use wss:// and https:// for the node
    #[clap(long = "lavalink-secure", env = "LAVALINK_SECURE")]
    pub lavalink_secure: bool,

    /// Name the node is logged under
    #[clap(long = "lavalink-identifier", env = "LAVALINK_IDENTIFIER", default_value = "MAIN")]
    pub lavalink_identifier: String,

    /// Lets the node keep players alive across a reconnect. `auto`
    /// generates a fresh key on every start.
    #[clap(long = "resume-key", env = "LAVALINK_RESUME_KEY")]
    pub resume_key: Option<String>,

    /// Seconds the node waits for a resume
    #[clap(long = "resume-timeout", env = "LAVALINK_RESUME_TIMEOUT", default_value = "60")]
    pub resume_timeout: u64,

    #[clap(long, env = "DISCORD_SHARDS", default_value = "1")]
    pub shards: u64,

    #[clap(short, long = "log-level", env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl AppConfig {
    /// Reads `.env`, then the command line and environment.
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        Self::parse()
    }

    pub fn node(&self) -> NodeConfig {
        NodeConfig {
            host: self.lavalink_host.clone(),
            port: self.lavalink_port,
            password: self.lavalink_password.clone(),
            identifier: self.lavalink_identifier.clone(),
            secure: self.lavalink_secure,
            num_shards: self.shards,
            resume_key: self.resume_key(),
            resume_timeout: self.resume_timeout,
        }
    }

    fn resume_key(&self) -> Option<String> {
        match self.resume_key.as_deref() {
            Some("auto") => Some(Uuid::new_v4().simple().to_string()),
            other => other.map(str::to_owned),
        }
    }

    pub fn get_log_level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}
