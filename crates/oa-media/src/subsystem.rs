//! Media subsystem seam
//!
//! The emulator's disk and hard-disk controller cards sit behind this
//! trait. They request loads and report ejects/resets; the tracker only
//! calls back into them to force an eviction during reset reconciliation.

use crate::descriptor::MediaKind;
use std::path::Path;

/// Contract for the emulator's disk/hard-disk drives
pub trait MediaSubsystem {
    /// Physically insert an image into the drive for `kind`.
    /// Returns false when the drive rejects the image.
    fn insert(&mut self, path: &Path, kind: MediaKind) -> bool;

    /// Whether the drive for `kind` currently holds no media
    /// (floppy drive empty, hard disk unplugged)
    fn is_drive_empty(&self, kind: MediaKind) -> bool;

    /// Eject the media for `kind` without asking
    fn force_eject(&mut self, kind: MediaKind);
}

/// Media subsystem with no physical drives attached
#[derive(Debug, Default)]
pub struct NullMediaSubsystem;

impl MediaSubsystem for NullMediaSubsystem {
    fn insert(&mut self, _path: &Path, _kind: MediaKind) -> bool {
        true
    }

    fn is_drive_empty(&self, _kind: MediaKind) -> bool {
        false
    }

    fn force_eject(&mut self, _kind: MediaKind) {}
}
