use std::collections::HashMap;

use crate::plex_rs::library::PlexLibraryTrack;
use crate::ports::sync_log::SyncLog;
use crate::sync::key::{MatchKey, generate_key};

/// Resolves the (artist, album, title) triple Plex tracks are matched on.
///
/// - artist: `originalTitle` (the performing artist on compilations), falling back
///   to `grandparentTitle` when empty.
/// - title: `title`, falling back to `titleSort` when empty.
/// - album: `parentTitle` as-is.
pub fn track_identity(track: &PlexLibraryTrack) -> (&str, &str, &str) {
    let artist = match track.original_title.as_deref() {
        Some(original) if !original.is_empty() => original,
        _ => track.artist.as_deref().unwrap_or_default(),
    };
    let title = if track.title.is_empty() {
        track.title_sort.as_deref().unwrap_or_default()
    } else {
        track.title.as_str()
    };
    let album = track.album.as_deref().unwrap_or_default();

    (artist, album, title)
}

pub fn track_key(track: &PlexLibraryTrack) -> MatchKey {
    let (artist, album, title) = track_identity(track);
    generate_key(artist, album, title)
}

/// In-memory lookup from [`MatchKey`] to a Plex track, built once per run.
#[derive(Debug, Default)]
pub struct LibraryIndex {
    tracks: HashMap<MatchKey, PlexLibraryTrack>,
    collisions: usize,
}

impl LibraryIndex {
    /// Index `tracks` by key. A later track whose key collides with an earlier one
    /// replaces it.
    pub fn build(tracks: Vec<PlexLibraryTrack>, log: &dyn SyncLog) -> Self {
        let mut index = Self {
            tracks: HashMap::with_capacity(tracks.len()),
            collisions: 0,
        };

        for track in tracks {
            let key = track_key(&track);
            if let Some(previous) = index.tracks.insert(key.clone(), track) {
                index.collisions += 1;
                log.debug(format_args!(
                    "Key {} collides, replacing Plex track {} with a later one",
                    key, previous.rating_key
                ));
            }
        }

        log.info(format_args!(
            "Built lookup map with {} keys ({} collisions)",
            index.tracks.len(),
            index.collisions
        ));
        index
    }

    pub fn get(&self, key: &MatchKey) -> Option<&PlexLibraryTrack> {
        self.tracks.get(key)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn collisions(&self) -> usize {
        self.collisions
    }
}
