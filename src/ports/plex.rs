use color_eyre::eyre::Result;

use crate::plex_rs::library::{MediaKind, PlexAlbum, PlexArtist, PlexLibraryTrack};
use crate::plex_rs::playlist::PlexPlaylist;

/// Result of looking up a playlist by title. A missing playlist is an expected outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaylistLookup {
    Found(PlexPlaylist),
    NotFound,
}

/// A library item whose user rating can be edited.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingTarget {
    pub kind: MediaKind,
    pub rating_key: String,
}

impl RatingTarget {
    pub fn track(track: &PlexLibraryTrack) -> Self {
        Self {
            kind: MediaKind::Track,
            rating_key: track.rating_key.clone(),
        }
    }

    pub fn album(album: &PlexAlbum) -> Self {
        Self {
            kind: MediaKind::Album,
            rating_key: album.rating_key.clone(),
        }
    }

    pub fn artist(artist: &PlexArtist) -> Self {
        Self {
            kind: MediaKind::Artist,
            rating_key: artist.rating_key.clone(),
        }
    }
}

/// Port trait wrapping the Plex library operations used by the sync engine.
///
/// Implementations are bound to one server and music section. They live in
/// `services::plex` (production, dry run) or test mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PlexClient: Send + Sync {
    async fn search_tracks(&self) -> Result<Vec<PlexLibraryTrack>>;

    async fn search_albums(&self) -> Result<Vec<PlexAlbum>>;

    async fn search_artists(&self) -> Result<Vec<PlexArtist>>;

    async fn find_playlist_by_title(&self, title: &str) -> Result<PlaylistLookup>;

    async fn delete_playlist(&self, playlist: &PlexPlaylist) -> Result<()>;

    /// Create a playlist holding `items` in the given order.
    async fn create_playlist(&self, title: &str, items: &[PlexLibraryTrack])
    -> Result<PlexPlaylist>;

    /// Set the user rating (0-10 scale) of a track, album or artist.
    async fn edit_rating(&self, target: RatingTarget, value: f64) -> Result<()>;
}
