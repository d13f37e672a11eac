use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

use crate::config::AppConfig;

/// `RUST_LOG` wins over the configured level when it is set.
pub fn setup_tracing_subscriber(config: &AppConfig) -> Result<(), SetGlobalDefaultError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{},serenity=warn,songbird=warn,tungstenite=warn",
            config.get_log_level()
        ))
    });

    let stdout_layer = tracing_subscriber::fmt::layer().with_ansi(true);

    let registry = tracing_subscriber::registry().with(filter).with(stdout_layer);

    tracing::subscriber::set_global_default(registry)?;

    tracing::debug!("Set up tracing subscriber");
    Ok(())
}
