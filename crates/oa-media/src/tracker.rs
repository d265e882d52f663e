//! Media-title lifecycle tracker
//!
//! Owns the three descriptor slots (floppy, hard disk, staging) and
//! mediates between the emulator's drives and the achievement service:
//! a load is staged, then committed into its slot or aborted; ejects
//! and machine resets reconcile which slot is the active title. The
//! tracker exclusively owns every payload buffer; the active title is
//! tracked as a slot index, never a reference into the slots.

use crate::descriptor::{MediaDescriptor, MediaKind, TitleId};
use crate::service::{AchievementService, TitleSink};
use crate::subsystem::MediaSubsystem;
use oa_core::config::MediaConfig;
use oa_core::error::MediaError;
use oa_core::Result;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Container formats the identification routine cannot parse
const REJECTED_CONTAINER_EXTENSIONS: [&str; 2] = ["zip", "gz"];

/// Reason shown when a load would break the hardcore single-title rule
const HARDCORE_OVERRIDE_ACTION: &str =
    "load a new title without ejecting all images and resetting the machine";

/// State of the in-flight load attempt
///
/// Transitions: `Idle` --stage--> `Staged` --commit/abort--> `Idle`.
/// The `activate` flag is decided at stage time: it is false only when
/// the staged image resolved to the title that is already active, so a
/// multi-disk swap of the same game keeps its achievement session.
#[derive(Debug)]
pub enum LoadState {
    Idle,
    Staged {
        media: MediaDescriptor,
        activate: bool,
    },
}

/// Tracks which loaded media image is the active title
pub struct MediaTracker {
    /// Loaded floppy image
    floppy: MediaDescriptor,
    /// Loaded hard-disk image
    hard_disk: MediaDescriptor,
    /// In-flight load attempt
    staging: LoadState,
    /// Which slot holds the active title, if any
    active: Option<MediaKind>,
    /// Memoized answer to the quit-permission check
    quit_confirmed: Option<bool>,
    /// Re-activate on every commit, even for same-title reloads
    reload_multi_disk: bool,
    /// Achievement service backend
    service: Box<dyn AchievementService>,
    /// Title-bar update receiver
    titlebar: Box<dyn TitleSink>,
}

impl MediaTracker {
    /// Create a tracker with empty slots
    pub fn new(
        config: &MediaConfig,
        service: Box<dyn AchievementService>,
        titlebar: Box<dyn TitleSink>,
    ) -> Self {
        Self {
            floppy: MediaDescriptor::empty(),
            hard_disk: MediaDescriptor::empty(),
            staging: LoadState::Idle,
            active: None,
            quit_confirmed: None,
            reload_multi_disk: config.reload_multi_disk,
            service,
            titlebar,
        }
    }

    fn slot(&self, kind: MediaKind) -> &MediaDescriptor {
        match kind {
            MediaKind::Floppy => &self.floppy,
            MediaKind::HardDisk => &self.hard_disk,
        }
    }

    fn slot_mut(&mut self, kind: MediaKind) -> &mut MediaDescriptor {
        match kind {
            MediaKind::Floppy => &mut self.floppy,
            MediaKind::HardDisk => &mut self.hard_disk,
        }
    }

    /// Which slot holds the active title, if any
    pub fn active_kind(&self) -> Option<MediaKind> {
        self.active
    }

    /// Whether any loaded image is currently the active title
    pub fn is_title_loaded(&self) -> bool {
        self.active.is_some()
    }

    /// Whether the slot for `kind` holds media
    pub fn is_loaded(&self, kind: MediaKind) -> bool {
        !self.slot(kind).is_empty()
    }

    /// Whether a load attempt is in flight
    pub fn is_staging(&self) -> bool {
        matches!(self.staging, LoadState::Staged { .. })
    }

    /// Best-effort name of the title currently of interest: the staged
    /// image if a load is in flight, otherwise the active slot's name
    pub fn estimated_title(&self) -> &str {
        if let LoadState::Staged { media, .. } = &self.staging {
            if !media.is_empty() {
                return &media.display_name;
            }
        }
        match self.active {
            Some(kind) => &self.slot(kind).display_name,
            None => "",
        }
    }

    /// Stage a candidate media image
    ///
    /// Reads the image, asks the achievement service to identify it,
    /// and parks the result in the staging slot for a later `commit`.
    /// Fails without touching any persisted slot when the path is
    /// unreadable, the extension names a compressed container, or the
    /// service refuses a hardcore override for a conflicting title.
    pub fn stage(&mut self, path: &Path, kind: MediaKind) -> Result<()> {
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            if REJECTED_CONTAINER_EXTENSIONS
                .iter()
                .any(|rejected| ext.eq_ignore_ascii_case(rejected))
            {
                debug!("Rejecting compressed container: {}", path.display());
                return Err(MediaError::UnsupportedContainer(ext.to_ascii_lowercase()).into());
            }
        }

        let payload = fs::read(path).map_err(|e| {
            warn!("Failed to read media image {}: {}", path.display(), e);
            MediaError::Unreadable(path.to_path_buf())
        })?;

        let display_name = MediaDescriptor::display_name_for(path);
        let title_id = self.service.identify(&payload);
        debug!(
            "Staged candidate \"{}\" ({} bytes, {}, title {})",
            display_name,
            payload.len(),
            kind,
            title_id
        );

        // A second distinct title alongside the active one needs the
        // service's blessing while hardcore constraints apply.
        let conflicts = match self.active {
            Some(active_kind) => {
                let active = self.slot(active_kind);
                !active.is_empty() && (active.title_id != title_id || active.kind != kind)
            }
            None => false,
        };
        if conflicts
            && !self
                .service
                .warn_before_overriding_hardcore(HARDCORE_OVERRIDE_ACTION)
        {
            info!("Load of \"{}\" vetoed by hardcore policy", display_name);
            return Err(MediaError::HardcoreVetoed(HARDCORE_OVERRIDE_ACTION.to_string()).into());
        }

        let same_title = match self.active {
            Some(active_kind) => {
                let active = self.slot(active_kind);
                active.title_id > 0 && active.title_id == title_id
            }
            None => false,
        };
        let activate = self.reload_multi_disk || !same_title;

        self.staging = LoadState::Staged {
            media: MediaDescriptor {
                payload,
                display_name,
                title_id,
                kind,
            },
            activate,
        };
        Ok(())
    }

    /// Discard the staged image, if any
    pub fn abort(&mut self) {
        if let LoadState::Staged { media, .. } = &self.staging {
            debug!("Discarding staged image \"{}\"", media.display_name);
        }
        self.staging = LoadState::Idle;
    }

    /// Commit the staged image into its slot and make it the active
    /// title. No-op when nothing is staged.
    pub fn commit(&mut self) {
        let LoadState::Staged { media, activate } =
            std::mem::replace(&mut self.staging, LoadState::Idle)
        else {
            debug!("Commit with nothing staged, ignoring");
            return;
        };

        let kind = media.kind;
        let title_id = media.title_id;
        let name = media.display_name.clone();

        // Overwriting the slot releases whatever payload was there.
        *self.slot_mut(kind) = media;
        self.active = Some(kind);
        self.titlebar.update_title(&name);
        info!("Committed {} image \"{}\" (title {})", kind, name, title_id);

        if activate {
            self.service.activate(title_id);
        }
    }

    /// Handle an eject for `kind`
    ///
    /// Releases the slot; when the other slot still holds media and
    /// hardcore mode is inactive, that slot becomes the active title
    /// and is re-activated with the service. When no media remains
    /// anywhere, the service is told exactly once that no title is
    /// loaded.
    pub fn close(&mut self, kind: MediaKind) {
        if self.slot(kind).is_empty() && self.active != Some(kind) {
            debug!("Close for already-empty {} slot, ignoring", kind);
            return;
        }

        if self.active == Some(kind) {
            self.active = None;
        }
        self.slot_mut(kind).clear();
        info!("Closed {} image", kind);

        let other = kind.other();
        if !self.slot(other).is_empty() && !self.service.is_hardcore_active() {
            self.active = Some(other);
            let (name, title_id) = {
                let promoted = self.slot(other);
                (promoted.display_name.clone(), promoted.title_id)
            };
            info!("Promoted remaining {} image \"{}\"", other, name);
            self.titlebar.update_title(&name);
            self.service.activate(title_id);
        }

        if self.floppy.is_empty()
            && self.hard_disk.is_empty()
            && matches!(self.staging, LoadState::Idle)
        {
            self.titlebar.update_title("");
            self.service.notify_no_title();
        }
    }

    /// Reconcile slot state after a machine reset
    ///
    /// Hardcore mode forbids two loaded titles: when both slots hold
    /// media, the slot not matching the active title is force-ejected
    /// through the media subsystem (the hard disk when no title is
    /// active, so the floppy stays inserted). Afterwards, a surviving
    /// slot is re-activated if no title is active, floppy first. The
    /// reset notification is forwarded last, once local state is
    /// consistent.
    pub fn reconcile_on_reset(&mut self, subsystem: &mut dyn MediaSubsystem) {
        if self.service.is_hardcore_active()
            && !self.floppy.is_empty()
            && !self.hard_disk.is_empty()
        {
            let victim = match self.active {
                Some(MediaKind::Floppy) => MediaKind::HardDisk,
                Some(MediaKind::HardDisk) => MediaKind::Floppy,
                None => MediaKind::HardDisk,
            };
            warn!(
                "Hardcore mode forbids two loaded titles, evicting {} image",
                victim
            );
            subsystem.force_eject(victim);
            self.close(victim);
        }

        if self.active.is_none() {
            let survivor = if !self.floppy.is_empty() {
                Some(MediaKind::Floppy)
            } else if !self.hard_disk.is_empty() {
                Some(MediaKind::HardDisk)
            } else {
                None
            };
            if let Some(kind) = survivor {
                self.active = Some(kind);
                let (name, title_id) = {
                    let slot = self.slot(kind);
                    (slot.display_name.clone(), slot.title_id)
                };
                info!("Re-activating {} image \"{}\" after reset", kind, name);
                self.titlebar.update_title(&name);
                self.service.activate(title_id);
            }
        }

        self.service.notify_reset();
    }

    /// Ask once whether quitting is permitted; the answer is latched
    /// for the lifetime of the tracker.
    pub fn confirm_quit(&mut self) -> bool {
        if let Some(confirmed) = self.quit_confirmed {
            return confirmed;
        }
        let confirmed = self.service.confirm_quit_permitted();
        self.quit_confirmed = Some(confirmed);
        confirmed
    }

    /// Forget a previous quit answer so the next `confirm_quit` asks
    /// the service again (used when a session is re-initialized)
    pub fn rearm_quit_confirmation(&mut self) {
        self.quit_confirmed = None;
    }
}
