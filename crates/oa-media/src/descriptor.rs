//! Media descriptor records
//!
//! A descriptor is one loaded (or staged) media image: its payload,
//! a bounded display label, and the title the achievement service
//! resolved it to.

use std::path::Path;

/// Opaque title identifier assigned by the achievement service.
/// Zero means unidentified/none.
pub type TitleId = u32;

/// Maximum length of a descriptor's display name, in characters.
pub const MAX_DISPLAY_NAME: usize = 1023;

/// Kind of removable media a descriptor holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Floppy,
    HardDisk,
}

impl MediaKind {
    /// The other media kind
    pub fn other(self) -> Self {
        match self {
            Self::Floppy => Self::HardDisk,
            Self::HardDisk => Self::Floppy,
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Floppy => write!(f, "floppy"),
            Self::HardDisk => write!(f, "hard disk"),
        }
    }
}

/// One loaded or staged media image
///
/// A descriptor is logically empty iff `payload` is empty; `clear`
/// returns it to the canonical empty state before reuse.
#[derive(Debug, Clone)]
pub struct MediaDescriptor {
    /// Raw image contents
    pub payload: Vec<u8>,
    /// Display label derived from the source file's stem
    pub display_name: String,
    /// Title resolved by the achievement service, 0 if none
    pub title_id: TitleId,
    /// Which drive this image belongs to
    pub kind: MediaKind,
}

impl MediaDescriptor {
    /// Create a canonical empty descriptor
    pub fn empty() -> Self {
        Self {
            payload: Vec::new(),
            display_name: String::new(),
            title_id: 0,
            kind: MediaKind::Floppy,
        }
    }

    /// Whether this descriptor holds no media
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Size of the payload in bytes
    pub fn byte_len(&self) -> usize {
        self.payload.len()
    }

    /// Release the payload and return the record to the canonical
    /// empty state
    pub fn clear(&mut self) {
        *self = Self::empty();
    }

    /// Derive a bounded display name from a media image path
    pub fn display_name_for(path: &Path) -> String {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        truncate_chars(stem, MAX_DISPLAY_NAME)
    }
}

impl Default for MediaDescriptor {
    fn default() -> Self {
        Self::empty()
    }
}

/// Truncate to at most `max` characters on a char boundary
fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_empty_descriptor_is_canonical() {
        let desc = MediaDescriptor::empty();
        assert!(desc.is_empty());
        assert_eq!(desc.byte_len(), 0);
        assert_eq!(desc.display_name, "");
        assert_eq!(desc.title_id, 0);
        assert_eq!(desc.kind, MediaKind::Floppy);
    }

    #[test]
    fn test_clear_resets_all_fields() {
        let mut desc = MediaDescriptor {
            payload: vec![0xAA; 140 * 1024],
            display_name: "Choplifter".to_string(),
            title_id: 42,
            kind: MediaKind::HardDisk,
        };
        desc.clear();
        assert!(desc.is_empty());
        assert_eq!(desc.display_name, "");
        assert_eq!(desc.title_id, 0);
        assert_eq!(desc.kind, MediaKind::Floppy);
    }

    #[test]
    fn test_display_name_uses_file_stem() {
        let path = PathBuf::from("/images/Prince of Persia (disk 1).dsk");
        assert_eq!(
            MediaDescriptor::display_name_for(&path),
            "Prince of Persia (disk 1)"
        );
    }

    #[test]
    fn test_display_name_is_bounded() {
        let long = "a".repeat(MAX_DISPLAY_NAME + 200);
        let path = PathBuf::from(format!("/images/{}.dsk", long));
        let name = MediaDescriptor::display_name_for(&path);
        assert_eq!(name.chars().count(), MAX_DISPLAY_NAME);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let s = "héllo wörld";
        assert_eq!(truncate_chars(s, 4), "héll");
        assert_eq!(truncate_chars(s, 100), s);
    }

    #[test]
    fn test_kind_other() {
        assert_eq!(MediaKind::Floppy.other(), MediaKind::HardDisk);
        assert_eq!(MediaKind::HardDisk.other(), MediaKind::Floppy);
    }
}
