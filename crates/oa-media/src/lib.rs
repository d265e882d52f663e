//! Media-title lifecycle tracking for oxidized-apple
//!
//! This crate owns the state machine that decides which loaded media
//! image is "the" active title as far as the achievement service is
//! concerned: staging a candidate load, committing or aborting it, and
//! reconciling the loaded slots across eject and machine-reset events.

pub mod descriptor;
pub mod service;
pub mod subsystem;
pub mod tracker;

pub use descriptor::{MediaDescriptor, MediaKind, TitleId, MAX_DISPLAY_NAME};
pub use service::{AchievementService, NullAchievementService, NullTitleSink, TitleSink};
pub use subsystem::{MediaSubsystem, NullMediaSubsystem};
pub use tracker::{LoadState, MediaTracker};
