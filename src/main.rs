//! oxidized-apple - achievement media integration
//!
//! Main entry point: initializes logging, loads the configuration,
//! and runs the media pipeline over any image paths given on the
//! command line, using the null service and drive backends.

use anyhow::anyhow;
use oa_core::Config;
use oa_integration::MediaRunner;
use oa_media::{MediaKind, NullAchievementService, NullMediaSubsystem};
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting oxidized-apple achievement integration");

    let config = Config::load().map_err(|e| anyhow!("failed to load config: {e}"))?;

    let mut runner = MediaRunner::new(
        &config,
        Box::new(NullAchievementService),
        Box::new(NullMediaSubsystem),
    );
    runner.init();

    for arg in std::env::args().skip(1) {
        let path = PathBuf::from(arg);
        let kind = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("hdv") => MediaKind::HardDisk,
            _ => MediaKind::Floppy,
        };
        match runner.insert_media(&path, kind) {
            Ok(()) => tracing::info!(
                "Loaded {} image, current title: {:?}",
                kind,
                runner.tracker().estimated_title()
            ),
            Err(e) => tracing::warn!("Skipping {}: {}", path.display(), e),
        }
    }

    Ok(())
}
