//! Playlist domain model
//!
//! The playlist keeps an ordered list of entries and an optional "current" cursor. The cursor
//! is stored as the current entry's [`ItemId`], not as a number, so every mutation that keeps
//! the entry also keeps the cursor on it. The numeric index is derived on demand.

use crate::error::{AppError, Result};
use crate::types::{ItemId, MediaItem, Validator};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// An item together with the identity it was given on insert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    pub id: ItemId,
    pub item: MediaItem,
}

/// Result of a successful removal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedEntry {
    pub entry: PlaylistEntry,
    /// True if the removed entry was the current one
    pub was_current: bool,
}

/// Which list-editing actions apply to a selected row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditActions {
    pub can_move_up: bool,
    pub can_move_down: bool,
    pub can_remove: bool,
}

/// Ordered, path-unique sequence of media items with a current-item cursor
#[derive(Debug, Clone, Default)]
pub struct Playlist {
    entries: Vec<PlaylistEntry>,
    current: Option<ItemId>,
}

impl Playlist {
    /// Creates an empty playlist
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in play order
    pub fn entries(&self) -> &[PlaylistEntry] {
        &self.entries
    }

    /// Items in play order
    pub fn items(&self) -> impl Iterator<Item = &MediaItem> {
        self.entries.iter().map(|e| &e.item)
    }

    pub fn get(&self, index: usize) -> Option<&PlaylistEntry> {
        self.entries.get(index)
    }

    /// Index of the entry with the given identity
    pub fn index_of(&self, id: ItemId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    /// Index of the entry with the given path
    pub fn position_of_path(&self, path: &Path) -> Option<usize> {
        self.entries.iter().position(|e| e.item.path == path)
    }

    pub fn contains_path(&self, path: &Path) -> bool {
        self.position_of_path(path).is_some()
    }

    /// Appends `item` unless its path is already present
    ///
    /// Returns the new entry's id, or `None` when the path was a duplicate and nothing changed.
    pub fn add(&mut self, item: MediaItem) -> Option<ItemId> {
        if self.contains_path(&item.path) {
            return None;
        }
        let id = ItemId::new();
        self.entries.push(PlaylistEntry { id, item });
        Some(id)
    }

    /// Removes the entry at `index`
    ///
    /// Removing the current entry clears the cursor; removing any other entry leaves the
    /// cursor on the same entry.
    pub fn remove_at(&mut self, index: usize) -> Result<RemovedEntry> {
        if index >= self.entries.len() {
            return Err(AppError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }

        let entry = self.entries.remove(index);
        let was_current = self.current == Some(entry.id);
        if was_current || self.entries.is_empty() {
            self.current = None;
        }

        Ok(RemovedEntry { entry, was_current })
    }

    /// Swaps the entry at `index` with the one above it; returns false when out of bounds
    pub fn move_up(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.entries.len() {
            return false;
        }
        self.entries.swap(index - 1, index);
        true
    }

    /// Swaps the entry at `index` with the one below it; returns false when out of bounds
    pub fn move_down(&mut self, index: usize) -> bool {
        if index + 1 >= self.entries.len() {
            return false;
        }
        self.entries.swap(index, index + 1);
        true
    }

    /// Removes every entry and clears the cursor
    pub fn clear(&mut self) {
        self.entries.clear();
        self.current = None;
    }

    /// Index of the current entry
    pub fn current_index(&self) -> Option<usize> {
        self.current.and_then(|id| self.index_of(id))
    }

    pub fn current_id(&self) -> Option<ItemId> {
        self.current
    }

    pub fn current_entry(&self) -> Option<&PlaylistEntry> {
        self.current_index().and_then(|i| self.entries.get(i))
    }

    /// Makes the entry at `index` current
    pub fn set_current(&mut self, index: usize) -> Result<&PlaylistEntry> {
        let len = self.entries.len();
        let entry = self
            .entries
            .get(index)
            .ok_or(AppError::IndexOutOfRange { index, len })?;
        self.current = Some(entry.id);
        Ok(entry)
    }

    pub fn clear_current(&mut self) {
        self.current = None;
    }

    /// Index that manual "next" moves to, wrapping to the start
    ///
    /// No index, or the last index, wraps to `0`. Returns `None` only for an empty playlist.
    pub fn next_index_after(&self, index: Option<usize>) -> Option<usize> {
        if self.entries.is_empty() {
            return None;
        }
        match index {
            Some(i) if i + 1 < self.entries.len() => Some(i + 1),
            _ => Some(0),
        }
    }

    /// Returns true if `index` is the last valid index
    pub fn is_last(&self, index: usize) -> bool {
        !self.entries.is_empty() && index == self.entries.len() - 1
    }

    /// Which editing actions apply to the selected row
    pub fn edit_actions(&self, selected: Option<usize>) -> EditActions {
        match selected {
            Some(i) if i < self.entries.len() => EditActions {
                can_move_up: i > 0,
                can_move_down: i + 1 < self.entries.len(),
                can_remove: true,
            },
            _ => EditActions::default(),
        }
    }
}

impl Validator for Playlist {
    fn validate(&self) -> std::result::Result<(), Vec<String>> {
        let mut errors = Vec::new();

        let mut seen = HashSet::new();
        for entry in &self.entries {
            if !seen.insert(&entry.item.path) {
                errors.push(format!("Duplicate path: {}", entry.item.path.display()));
            }
        }

        if let Some(id) = self.current {
            if self.index_of(id).is_none() {
                errors.push(format!("Current entry {} is not in the playlist", id));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playlist_of(names: &[&str]) -> Playlist {
        let mut playlist = Playlist::new();
        for name in names {
            playlist.add(MediaItem::from_path(format!("/videos/{}", name)));
        }
        playlist
    }

    fn names(playlist: &Playlist) -> Vec<String> {
        playlist.items().map(|i| i.display_name.clone()).collect()
    }

    #[test]
    fn test_add_appends_in_order() {
        let playlist = playlist_of(&["a.mp4", "b.mp4", "c.mp4"]);
        assert_eq!(names(&playlist), vec!["a.mp4", "b.mp4", "c.mp4"]);
        assert_eq!(playlist.current_index(), None);
    }

    #[test]
    fn test_add_duplicate_is_noop() {
        let mut playlist = playlist_of(&["a.mp4", "b.mp4"]);
        let result = playlist.add(MediaItem::from_path("/videos/a.mp4"));
        assert!(result.is_none());
        assert_eq!(playlist.len(), 2);
        assert!(playlist.is_valid());
    }

    #[test]
    fn test_remove_current_clears_cursor() {
        let mut playlist = playlist_of(&["a.mp4", "b.mp4", "c.mp4"]);
        playlist.set_current(1).unwrap();

        let removed = playlist.remove_at(1).unwrap();
        assert!(removed.was_current);
        assert_eq!(removed.entry.item.display_name, "b.mp4");
        assert_eq!(playlist.current_index(), None);
    }

    #[test]
    fn test_remove_before_current_shifts_index() {
        let mut playlist = playlist_of(&["a.mp4", "b.mp4", "c.mp4"]);
        playlist.set_current(2).unwrap();

        let removed = playlist.remove_at(0).unwrap();
        assert!(!removed.was_current);
        assert_eq!(playlist.current_index(), Some(1));
        assert_eq!(playlist.current_entry().unwrap().item.display_name, "c.mp4");
    }

    #[test]
    fn test_remove_after_current_keeps_index() {
        let mut playlist = playlist_of(&["a.mp4", "b.mp4", "c.mp4"]);
        playlist.set_current(0).unwrap();

        playlist.remove_at(2).unwrap();
        assert_eq!(playlist.current_index(), Some(0));
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut playlist = playlist_of(&["a.mp4"]);
        let err = playlist.remove_at(1).unwrap_err();
        assert!(matches!(err, AppError::IndexOutOfRange { index: 1, len: 1 }));
        assert_eq!(playlist.len(), 1);
    }

    #[test]
    fn test_remove_last_entry_empties_cursor() {
        let mut playlist = playlist_of(&["a.mp4"]);
        playlist.set_current(0).unwrap();
        playlist.remove_at(0).unwrap();
        assert!(playlist.is_empty());
        assert_eq!(playlist.current_index(), None);
    }

    #[test]
    fn test_move_up_tracks_current_item() {
        let mut playlist = playlist_of(&["a.mp4", "b.mp4", "c.mp4"]);
        playlist.set_current(1).unwrap();

        assert!(playlist.move_up(1));
        assert_eq!(names(&playlist), vec!["b.mp4", "a.mp4", "c.mp4"]);
        assert_eq!(playlist.current_index(), Some(0));

        // Moving the neighbour below the current entry shifts the cursor down
        assert!(playlist.move_up(1));
        assert_eq!(names(&playlist), vec!["a.mp4", "b.mp4", "c.mp4"]);
        assert_eq!(playlist.current_index(), Some(1));
    }

    #[test]
    fn test_move_down_tracks_current_item() {
        let mut playlist = playlist_of(&["a.mp4", "b.mp4", "c.mp4"]);
        playlist.set_current(0).unwrap();

        assert!(playlist.move_down(0));
        assert_eq!(playlist.current_index(), Some(1));
        assert_eq!(playlist.current_entry().unwrap().item.display_name, "a.mp4");
    }

    #[test]
    fn test_move_out_of_bounds_is_noop() {
        let mut playlist = playlist_of(&["a.mp4", "b.mp4"]);
        assert!(!playlist.move_up(0));
        assert!(!playlist.move_down(1));
        assert!(!playlist.move_up(7));
        assert!(!playlist.move_down(7));
        assert_eq!(names(&playlist), vec!["a.mp4", "b.mp4"]);
    }

    #[test]
    fn test_next_index_after_wraps() {
        let playlist = playlist_of(&["a.mp4", "b.mp4", "c.mp4"]);
        assert_eq!(playlist.next_index_after(None), Some(0));
        assert_eq!(playlist.next_index_after(Some(0)), Some(1));
        assert_eq!(playlist.next_index_after(Some(1)), Some(2));
        assert_eq!(playlist.next_index_after(Some(2)), Some(0));
    }

    #[test]
    fn test_next_index_after_empty() {
        let playlist = Playlist::new();
        assert_eq!(playlist.next_index_after(None), None);
        assert_eq!(playlist.next_index_after(Some(0)), None);
    }

    #[test]
    fn test_set_current_out_of_range() {
        let mut playlist = playlist_of(&["a.mp4"]);
        assert!(playlist.set_current(3).is_err());
        assert_eq!(playlist.current_index(), None);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut playlist = playlist_of(&["a.mp4", "b.mp4"]);
        playlist.set_current(1).unwrap();
        playlist.clear();
        assert!(playlist.is_empty());
        assert_eq!(playlist.current_id(), None);
    }

    #[test]
    fn test_edit_actions() {
        let playlist = playlist_of(&["a.mp4", "b.mp4", "c.mp4"]);

        assert_eq!(playlist.edit_actions(None), EditActions::default());
        assert_eq!(
            playlist.edit_actions(Some(0)),
            EditActions {
                can_move_up: false,
                can_move_down: true,
                can_remove: true
            }
        );
        assert_eq!(
            playlist.edit_actions(Some(1)),
            EditActions {
                can_move_up: true,
                can_move_down: true,
                can_remove: true
            }
        );
        assert_eq!(
            playlist.edit_actions(Some(2)),
            EditActions {
                can_move_up: true,
                can_move_down: false,
                can_remove: true
            }
        );
        assert_eq!(playlist.edit_actions(Some(3)), EditActions::default());
    }

    #[test]
    fn test_is_last() {
        let playlist = playlist_of(&["a.mp4", "b.mp4"]);
        assert!(!playlist.is_last(0));
        assert!(playlist.is_last(1));
        assert!(!Playlist::new().is_last(0));
    }
}
