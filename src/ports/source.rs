use std::sync::Arc;

use crate::itunes::{ItunesPlaylist, ItunesTrack};

/// Port trait for the read-only exported library the sync reads from.
///
/// Implemented by `itunes::ItunesLibrary`.
pub trait SourceLibrary {
    /// All playlists, in library order.
    fn playlists(&self) -> &[ItunesPlaylist];

    /// Every track in the library.
    fn tracks(&self) -> &[Arc<ItunesTrack>];

    /// Tracks whose artist field equals `artist` exactly.
    fn tracks_for_artist(&self, artist: &str) -> &[Arc<ItunesTrack>];

    fn playlist(&self, title: &str) -> Option<&ItunesPlaylist> {
        self.playlists().iter().find(|p| p.title == title)
    }
}
