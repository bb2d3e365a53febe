//! CLI command implementations

use std::net::{IpAddr, SocketAddr};

use anyhow::{Context, bail};
use clap::{Args, Subcommand};
use hlsrelay_core::{
    DiscoveryEngine, HttpSegmentProbe, RelayConfig, RelayController, SegmentId,
    SegmentUrlTemplate,
};
use hlsrelay_web::run_server;

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run the relay HTTP server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: IpAddr,
        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
        /// Segment id to start discovering from
        #[arg(long)]
        current_id: Option<SegmentId>,
        /// Start the discovery ticker immediately
        #[arg(long, requires = "current_id")]
        autostart: bool,
        #[command(flatten)]
        origin: OriginArgs,
    },
    /// Look up the segment following a known one, once
    Probe {
        /// Known segment id, or the full URL of a known segment
        current: String,
        #[command(flatten)]
        origin: OriginArgs,
    },
}

/// Origin overrides applied on top of `HLSRELAY_*` environment settings.
#[derive(Args, Debug, Default)]
pub struct OriginArgs {
    /// Directory URL holding the segments
    #[arg(long)]
    base_url: Option<String>,
    /// Segment file name prefix
    #[arg(long)]
    file_prefix: Option<String>,
    /// Segment file extension
    #[arg(long)]
    extension: Option<String>,
    /// Expected id increment between segments
    #[arg(long)]
    stride: Option<u64>,
}

impl OriginArgs {
    fn apply(self, config: &mut RelayConfig) {
        if let Some(base_url) = self.base_url {
            config.origin.base_url = base_url;
        }
        if let Some(file_prefix) = self.file_prefix {
            config.origin.file_prefix = file_prefix;
        }
        if let Some(extension) = self.extension {
            config.origin.extension = extension;
        }
        if let Some(stride) = self.stride {
            config.discovery.stride = stride;
        }
    }
}

/// Handle the CLI command
///
/// # Errors
/// Returns appropriate error based on the command that fails
pub async fn handle_command(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Serve {
            host,
            port,
            current_id,
            autostart,
            origin,
        } => serve(SocketAddr::new(host, port), current_id, autostart, origin).await,
        Commands::Probe { current, origin } => probe(&current, origin).await,
    }
}

fn load_config(origin: OriginArgs) -> anyhow::Result<RelayConfig> {
    let mut config = RelayConfig::from_env();
    origin.apply(&mut config);
    config.validate()?;
    Ok(config)
}

/// Run the relay server until Ctrl-C
///
/// # Errors
/// - Configuration is invalid
/// - The listen address cannot be bound
pub async fn serve(
    addr: SocketAddr,
    current_id: Option<SegmentId>,
    autostart: bool,
    origin: OriginArgs,
) -> anyhow::Result<()> {
    let config = load_config(origin)?;
    tracing::info!(
        origin = %config.origin.base_url,
        prefix = %config.origin.file_prefix,
        stride = config.discovery.stride,
        "Relay configured"
    );

    let relay = RelayController::from_config(config)?;
    if let Some(id) = current_id {
        relay.set_current_id(id);
        if autostart {
            relay.start()?;
            println!("Discovery started from segment {id}");
        }
    }

    run_server(relay, addr, shutdown_signal())
        .await
        .with_context(|| format!("failed to serve on {addr}"))?;
    Ok(())
}

/// Run one discovery pass and print the result
///
/// # Errors
/// - `current` is neither a segment id nor a URL matching the template
/// - No candidate segment exists on the origin
pub async fn probe(current: &str, origin: OriginArgs) -> anyhow::Result<()> {
    let config = load_config(origin)?;
    let template = SegmentUrlTemplate::from_origin(&config.origin);

    let current_id = if current.contains("://") {
        template
            .id_from_url(current)
            .with_context(|| format!("{current} does not match the segment URL template"))?
    } else {
        current.parse::<SegmentId>()?
    };

    let engine = DiscoveryEngine::new(
        HttpSegmentProbe::new(&config)?,
        template,
        &config.discovery,
    );

    let candidates: Vec<String> = engine
        .candidates(current_id)
        .iter()
        .map(ToString::to_string)
        .collect();
    println!("Probing after {current_id}: {}", candidates.join(", "));

    match engine.discover_next(Some(current_id)).await {
        Some(next) => {
            println!("Next segment: {next}");
            println!("  {}", engine.template().url_for(next));
            Ok(())
        }
        None => bail!("no segment found after {current_id}"),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_args_override_config() {
        let mut config = RelayConfig::default();
        let args = OriginArgs {
            base_url: Some("http://cdn.test/hls/".to_string()),
            file_prefix: None,
            extension: Some(".m4s".to_string()),
            stride: Some(4000),
        };

        args.apply(&mut config);

        assert_eq!(config.origin.base_url, "http://cdn.test/hls/");
        assert_eq!(config.origin.file_prefix, "segment_");
        assert_eq!(config.origin.extension, ".m4s");
        assert_eq!(config.discovery.stride, 4000);
    }

    #[test]
    fn test_empty_origin_args_keep_config() {
        let mut config = RelayConfig::default();
        OriginArgs::default().apply(&mut config);

        assert_eq!(config.origin.base_url, RelayConfig::default().origin.base_url);
        assert_eq!(config.discovery.stride, 5000);
    }
}
