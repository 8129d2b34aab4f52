//! Remote frame buffer headless viewer: entry point.
//!
//! Connects to a frame producer over WebSocket and runs one client session
//! with headless surfaces: frames are applied at the client's own pace and
//! confirmed back to the producer, exactly as a visual client would.
//!
//! # Usage
//!
//! ```text
//! rfb-viewer --url <URL> [OPTIONS]
//!
//! Options:
//!   --url          <URL>   Producer WebSocket URL (ws:// or wss://)
//!   --config       <PATH>  TOML file with client timings and display defaults
//!   --surfaces     <N>     Number of headless surfaces [default: 1]
//!   --log-level    <LEVEL> Log filter, overrides RUST_LOG
//!   --dump-dir     <PATH>  Write every applied binary frame to this directory
//!   --width        <PX>    Viewport width [default: 800]
//!   --height       <PX>    Viewport height [default: 600]
//!   --pixel-ratio  <R>     Physical-to-logical pixel ratio [default: 1]
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable           | Option          |
//! |--------------------|-----------------|
//! | `RFB_URL`          | `--url`         |
//! | `RFB_CONFIG`       | `--config`      |
//! | `RFB_SURFACES`     | `--surfaces`    |
//! | `RFB_LOG`          | `--log-level`   |
//! | `RFB_DUMP_DIR`     | `--dump-dir`    |
//! | `RFB_WIDTH`        | `--width`       |
//! | `RFB_HEIGHT`       | `--height`      |
//! | `RFB_PIXEL_RATIO`  | `--pixel-ratio` |
//!
//! CLI args take precedence when both are present.

use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rfb_core::RfbConfig;
use rfb_viewer::domain::{ViewerConfig, ViewportSize};
use rfb_viewer::infrastructure::run_viewer;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Headless remote frame buffer viewer.
#[derive(Debug, Parser)]
#[command(
    name = "rfb-viewer",
    about = "Headless remote frame buffer viewer over WebSocket",
    version
)]
struct Cli {
    /// WebSocket URL of the frame producer.
    #[arg(long, env = "RFB_URL")]
    url: String,

    /// TOML file with client timings and display defaults.
    ///
    /// Missing sections and fields fall back to built-in defaults.
    #[arg(long, env = "RFB_CONFIG")]
    config: Option<PathBuf>,

    /// Number of headless surfaces to attach.
    #[arg(long, default_value_t = 1, env = "RFB_SURFACES")]
    surfaces: usize,

    /// Log filter directive (e.g. `debug`, `rfb_core=trace`).
    ///
    /// Takes precedence over `RUST_LOG`.
    #[arg(long, env = "RFB_LOG")]
    log_level: Option<String>,

    /// Directory every applied binary frame is written to.
    #[arg(long, env = "RFB_DUMP_DIR")]
    dump_dir: Option<PathBuf>,

    /// Viewport width in logical pixels.
    #[arg(long, default_value_t = 800.0, env = "RFB_WIDTH")]
    width: f64,

    /// Viewport height in logical pixels.
    #[arg(long, default_value_t = 600.0, env = "RFB_HEIGHT")]
    height: f64,

    /// Physical-to-logical pixel ratio of the simulated display.
    #[arg(long, default_value_t = 1.0, env = "RFB_PIXEL_RATIO")]
    pixel_ratio: f64,
}

impl Cli {
    /// Converts the parsed CLI arguments into a [`ViewerConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not a WebSocket URL, the viewport is
    /// not positive, the config file cannot be loaded, or the dump directory
    /// cannot be created.
    fn into_viewer_config(self) -> anyhow::Result<ViewerConfig> {
        anyhow::ensure!(
            self.url.starts_with("ws://") || self.url.starts_with("wss://"),
            "invalid producer URL '{}': expected ws:// or wss://",
            self.url
        );
        anyhow::ensure!(
            self.width > 0.0 && self.height > 0.0 && self.pixel_ratio > 0.0,
            "viewport {}x{}@{} must be positive",
            self.width,
            self.height,
            self.pixel_ratio
        );

        let core = match &self.config {
            Some(path) => RfbConfig::load(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => RfbConfig::default(),
        };

        if let Some(dir) = &self.dump_dir {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create dump directory {}", dir.display()))?;
        }

        Ok(ViewerConfig {
            url: self.url,
            core,
            surfaces: self.surfaces,
            dump_dir: self.dump_dir,
            viewport: ViewportSize {
                width: self.width,
                height: self.height,
                pixel_ratio: self.pixel_ratio,
            },
        })
    }

    fn env_filter(&self) -> EnvFilter {
        match &self.log_level {
            Some(directive) => EnvFilter::new(directive),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Program entry point.
///
/// 1. Parse CLI arguments (`--log-level` must be known before logging starts).
/// 2. Initialise `tracing_subscriber`.
/// 3. Build a [`ViewerConfig`].
/// 4. Spawn a Ctrl+C handler that clears the shared `running` flag.
/// 5. Run the viewer session until the producer hangs up or Ctrl+C.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt().with_env_filter(cli.env_filter()).init();

    let config = cli.into_viewer_config()?;

    info!(
        "rfb-viewer starting: url={}, surfaces={}, dump_dir={:?}",
        config.url, config.surfaces, config.dump_dir
    );

    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C, closing session");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => {
                tracing::error!("failed to listen for Ctrl+C signal: {e}");
            }
        }
    });

    run_viewer(config, running).await?;

    info!("rfb-viewer stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
