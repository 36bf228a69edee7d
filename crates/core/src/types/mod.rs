//! Domain types for vidshell
//!
//! - `media`: media items, their stable ids and the supported extension set
//! - `playlist`: the ordered playlist and its current-item cursor
//! - `common`: time formatting and shared traits

mod common;
mod media;
mod playlist;

pub use common::{format_clock, Validator};
pub use media::{is_supported_video, ItemId, MediaItem, SUPPORTED_EXTENSIONS};
pub use playlist::{EditActions, Playlist, PlaylistEntry, RemovedEntry};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_types_are_exported() {
        let _id: ItemId = ItemId::new();
        let _playlist: Playlist = Playlist::new();
        let _item: MediaItem = MediaItem::from_path("clip.mp4");
    }

    #[test]
    fn test_clock_formatting() {
        assert_eq!(format_clock(3_665_000), "01:01:05");
    }
}
