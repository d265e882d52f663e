//! Achievement service seam
//!
//! The achievement service itself (login, hardcore policy storage,
//! identification hashing) is an external black box. The tracker only
//! relies on the narrow contract below.

use crate::descriptor::TitleId;

/// Contract the tracker relies on from the achievement service
pub trait AchievementService {
    /// Resolve a media image to a title id, 0 if unrecognized
    fn identify(&mut self, payload: &[u8]) -> TitleId;

    /// Begin an achievement session for the given title
    fn activate(&mut self, title: TitleId);

    /// The machine was reset
    fn notify_reset(&mut self);

    /// No title is loaded anymore
    fn notify_no_title(&mut self);

    /// Whether hardcore mode currently constrains loaded media
    fn is_hardcore_active(&self) -> bool;

    /// Ask whether `action` may proceed despite hardcore constraints.
    /// Returns true when the user approved the override.
    fn warn_before_overriding_hardcore(&mut self, action: &str) -> bool;

    /// Ask whether quitting the application is currently permitted
    fn confirm_quit_permitted(&mut self) -> bool;
}

/// Receiver for title-bar updates whenever the displayed title changes
pub trait TitleSink {
    fn update_title(&mut self, title: &str);
}

/// Achievement service that recognizes nothing and approves everything
#[derive(Debug, Default)]
pub struct NullAchievementService;

impl AchievementService for NullAchievementService {
    fn identify(&mut self, _payload: &[u8]) -> TitleId {
        0
    }

    fn activate(&mut self, _title: TitleId) {}

    fn notify_reset(&mut self) {}

    fn notify_no_title(&mut self) {}

    fn is_hardcore_active(&self) -> bool {
        false
    }

    fn warn_before_overriding_hardcore(&mut self, _action: &str) -> bool {
        true
    }

    fn confirm_quit_permitted(&mut self) -> bool {
        true
    }
}

/// Title sink that discards updates
#[derive(Debug, Default)]
pub struct NullTitleSink;

impl TitleSink for NullTitleSink {
    fn update_title(&mut self, _title: &str) {}
}
