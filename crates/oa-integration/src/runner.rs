//! Media runner tying the lifecycle tracker to the emulator drives
//!
//! The runner owns the tracker and the media subsystem and enforces
//! the load order the drives expect: a candidate image is staged and
//! identified first, then physically inserted, then committed as the
//! active title. A failed physical insert aborts the staged descriptor
//! and leaves every persisted slot untouched.

use oa_core::config::Config;
use oa_core::error::MediaError;
use oa_core::Result;
use oa_media::{AchievementService, MediaKind, MediaSubsystem, MediaTracker, TitleSink};
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Title string shared with the window layer
pub type SharedTitle = Arc<RwLock<String>>;

/// Title sink that publishes updates into the shared title cell
struct SharedTitleSink {
    title: SharedTitle,
}

impl TitleSink for SharedTitleSink {
    fn update_title(&mut self, title: &str) {
        *self.title.write() = title.to_string();
    }
}

/// Owns the tracker and the drives it reconciles against
pub struct MediaRunner {
    /// Media-title lifecycle tracker
    tracker: MediaTracker,
    /// Emulator disk/hard-disk drives
    drives: Box<dyn MediaSubsystem>,
    /// Title currently shown by the window layer
    title: SharedTitle,
    /// Whether the achievement session was initialized
    initialized: bool,
}

impl MediaRunner {
    /// Create a runner around a service backend and a set of drives
    pub fn new(
        config: &Config,
        service: Box<dyn AchievementService>,
        drives: Box<dyn MediaSubsystem>,
    ) -> Self {
        let title: SharedTitle = Arc::new(RwLock::new(String::new()));
        let tracker = MediaTracker::new(
            &config.media,
            service,
            Box::new(SharedTitleSink {
                title: title.clone(),
            }),
        );
        Self {
            tracker,
            drives,
            title,
            initialized: false,
        }
    }

    /// Initialize the achievement session
    ///
    /// The heavyweight setup runs on the first call only; every call
    /// re-arms the quit latch so a re-initialized session asks for
    /// quit permission again.
    pub fn init(&mut self) {
        if !self.initialized {
            info!("Initializing achievement session");
            self.initialized = true;
        }
        self.tracker.rearm_quit_confirmation();
    }

    /// Whether the session was initialized
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Load a media image: stage, physically insert, then commit
    pub fn insert_media(&mut self, path: &Path, kind: MediaKind) -> Result<()> {
        self.tracker.stage(path, kind)?;

        if !self.drives.insert(path, kind) {
            warn!("{} drive rejected image {}", kind, path.display());
            self.tracker.abort();
            return Err(MediaError::DriveRejected(path.to_path_buf()).into());
        }

        self.tracker.commit();
        Ok(())
    }

    /// Handle an eject reported by the drives
    pub fn eject_media(&mut self, kind: MediaKind) {
        self.tracker.close(kind);
    }

    /// Handle a machine reset
    ///
    /// A reset can race an eject: when a drive reports itself empty
    /// while the tracker still holds media for it, the implicit close
    /// is emitted first, then the slots are reconciled.
    pub fn handle_reset(&mut self) {
        for kind in [MediaKind::Floppy, MediaKind::HardDisk] {
            if self.tracker.is_loaded(kind) && self.drives.is_drive_empty(kind) {
                debug!("Reset raced an eject, closing {} image", kind);
                self.tracker.close(kind);
            }
        }
        self.tracker.reconcile_on_reset(self.drives.as_mut());
    }

    /// Ask whether quitting is permitted; memoized by the tracker
    pub fn confirm_quit(&mut self) -> bool {
        self.tracker.confirm_quit()
    }

    /// Handle to the title string shown by the window layer
    pub fn shared_title(&self) -> SharedTitle {
        self.title.clone()
    }

    /// The lifecycle tracker
    pub fn tracker(&self) -> &MediaTracker {
        &self.tracker
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oa_core::error::IntegrationError;
    use oa_media::TitleId;
    use std::cell::RefCell;
    use std::path::PathBuf;
    use std::rc::Rc;
    use tempfile::TempDir;

    #[derive(Default)]
    struct ServiceLog {
        activations: Vec<TitleId>,
        reset_count: u32,
        no_title_count: u32,
        quit_requests: u32,
        hardcore: bool,
    }

    #[derive(Clone)]
    struct FakeService {
        log: Rc<RefCell<ServiceLog>>,
    }

    impl AchievementService for FakeService {
        fn identify(&mut self, payload: &[u8]) -> TitleId {
            payload.first().copied().unwrap_or(0) as TitleId
        }

        fn activate(&mut self, title: TitleId) {
            self.log.borrow_mut().activations.push(title);
        }

        fn notify_reset(&mut self) {
            self.log.borrow_mut().reset_count += 1;
        }

        fn notify_no_title(&mut self) {
            self.log.borrow_mut().no_title_count += 1;
        }

        fn is_hardcore_active(&self) -> bool {
            self.log.borrow().hardcore
        }

        fn warn_before_overriding_hardcore(&mut self, _action: &str) -> bool {
            true
        }

        fn confirm_quit_permitted(&mut self) -> bool {
            self.log.borrow_mut().quit_requests += 1;
            true
        }
    }

    #[derive(Default)]
    struct DriveState {
        empty: Vec<MediaKind>,
        reject_insert: bool,
        inserted: Vec<(PathBuf, MediaKind)>,
        ejected: Vec<MediaKind>,
    }

    #[derive(Clone)]
    struct FakeDrives {
        state: Rc<RefCell<DriveState>>,
    }

    impl MediaSubsystem for FakeDrives {
        fn insert(&mut self, path: &Path, kind: MediaKind) -> bool {
            let mut state = self.state.borrow_mut();
            if state.reject_insert {
                return false;
            }
            state.inserted.push((path.to_path_buf(), kind));
            true
        }

        fn is_drive_empty(&self, kind: MediaKind) -> bool {
            self.state.borrow().empty.contains(&kind)
        }

        fn force_eject(&mut self, kind: MediaKind) {
            self.state.borrow_mut().ejected.push(kind);
        }
    }

    struct Fixture {
        runner: MediaRunner,
        log: Rc<RefCell<ServiceLog>>,
        drives: Rc<RefCell<DriveState>>,
        dir: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            let log = Rc::new(RefCell::new(ServiceLog::default()));
            let drives = Rc::new(RefCell::new(DriveState::default()));
            let runner = MediaRunner::new(
                &Config::default(),
                Box::new(FakeService { log: log.clone() }),
                Box::new(FakeDrives {
                    state: drives.clone(),
                }),
            );
            Self {
                runner,
                log,
                drives,
                dir: TempDir::new().expect("Failed to create temp dir"),
            }
        }

        fn image(&self, name: &str, title_id: u8) -> PathBuf {
            let path = self.dir.path().join(name);
            std::fs::write(&path, vec![title_id; 64]).expect("Failed to write image");
            path
        }
    }

    #[test]
    fn test_insert_pipeline_commits() {
        let mut fx = Fixture::new();
        let path = fx.image("Game A.dsk", 42);

        fx.runner.insert_media(&path, MediaKind::Floppy).unwrap();

        assert!(fx.runner.tracker().is_loaded(MediaKind::Floppy));
        assert_eq!(fx.runner.tracker().active_kind(), Some(MediaKind::Floppy));
        assert_eq!(fx.log.borrow().activations, vec![42]);
        assert_eq!(fx.drives.borrow().inserted.len(), 1);
        assert_eq!(&*fx.runner.shared_title().read(), "Game A");
    }

    #[test]
    fn test_insert_failure_aborts_staging() {
        let mut fx = Fixture::new();
        fx.drives.borrow_mut().reject_insert = true;
        let path = fx.image("Game A.dsk", 42);

        let err = fx.runner.insert_media(&path, MediaKind::Floppy).unwrap_err();
        assert!(matches!(
            err,
            IntegrationError::Media(MediaError::DriveRejected(_))
        ));

        assert!(!fx.runner.tracker().is_staging());
        assert!(!fx.runner.tracker().is_loaded(MediaKind::Floppy));
        assert!(fx.log.borrow().activations.is_empty());
    }

    #[test]
    fn test_reset_emits_implicit_close() {
        let mut fx = Fixture::new();
        let path = fx.image("Game A.dsk", 42);
        fx.runner.insert_media(&path, MediaKind::Floppy).unwrap();

        // The drive lost its media before the reset arrived
        fx.drives.borrow_mut().empty.push(MediaKind::Floppy);
        fx.runner.handle_reset();

        assert!(!fx.runner.tracker().is_loaded(MediaKind::Floppy));
        assert_eq!(fx.runner.tracker().active_kind(), None);
        assert_eq!(fx.log.borrow().no_title_count, 1);
        assert_eq!(fx.log.borrow().reset_count, 1);
        assert_eq!(&*fx.runner.shared_title().read(), "");
    }

    #[test]
    fn test_reset_keeps_loaded_media() {
        let mut fx = Fixture::new();
        let path = fx.image("Game A.dsk", 42);
        fx.runner.insert_media(&path, MediaKind::Floppy).unwrap();

        fx.runner.handle_reset();

        assert!(fx.runner.tracker().is_loaded(MediaKind::Floppy));
        assert_eq!(fx.runner.tracker().active_kind(), Some(MediaKind::Floppy));
        assert_eq!(fx.log.borrow().no_title_count, 0);
        assert_eq!(fx.log.borrow().reset_count, 1);
    }

    #[test]
    fn test_hardcore_reset_evicts_through_drives() {
        let mut fx = Fixture::new();
        let floppy = fx.image("Game A.dsk", 42);
        let hard_disk = fx.image("Game B.hdv", 43);
        fx.runner.insert_media(&hard_disk, MediaKind::HardDisk).unwrap();
        fx.runner.insert_media(&floppy, MediaKind::Floppy).unwrap();
        fx.log.borrow_mut().hardcore = true;

        fx.runner.handle_reset();

        assert_eq!(fx.drives.borrow().ejected, vec![MediaKind::HardDisk]);
        assert!(!fx.runner.tracker().is_loaded(MediaKind::HardDisk));
        assert_eq!(fx.runner.tracker().active_kind(), Some(MediaKind::Floppy));
    }

    #[test]
    fn test_init_is_memoized_and_rearms_quit_latch() {
        let mut fx = Fixture::new();
        assert!(!fx.runner.is_initialized());

        fx.runner.init();
        assert!(fx.runner.is_initialized());

        assert!(fx.runner.confirm_quit());
        assert!(fx.runner.confirm_quit());
        assert_eq!(fx.log.borrow().quit_requests, 1);

        // Re-initializing the session asks for quit permission again
        fx.runner.init();
        assert!(fx.runner.confirm_quit());
        assert_eq!(fx.log.borrow().quit_requests, 2);
    }
}
