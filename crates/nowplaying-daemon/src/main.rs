mod error;
mod format;
mod http;
mod metadata;
mod mpv;
mod status;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use nowplaying_proto::config::Config;
use tracing::{debug, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::metadata::LoftyTagReader;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let data_dir = nowplaying_proto::platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let log_path = data_dir.join("daemon.log");

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false);
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new("info,mpv_nowplaying=debug")
                }),
        )
        .init();

    info!("Log file: {:?}", log_path);

    let config = Config::load()?;
    info!("Config loaded from: {:?}", Config::config_path());
    info!("mpv socket: {:?}", config.mpv.socket_path);
    debug!("query order: {:?}", status::PIPELINE.map(|step| step.property));

    let state = http::HttpState {
        mpv: Arc::new(config.mpv.clone()),
        tags: Arc::new(LoftyTagReader::new()),
    };

    http::serve(&config.http, state).await
}
