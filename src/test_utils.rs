use std::fmt;
use std::sync::{Arc, Mutex};

use color_eyre::eyre::{Result, eyre};
use log::Level;

use crate::itunes::ItunesTrack;
use crate::plex_rs::library::{MediaKind, PlexAlbum, PlexArtist, PlexLibraryTrack};
use crate::plex_rs::playlist::PlexPlaylist;
use crate::ports::plex::{PlaylistLookup, PlexClient, RatingTarget};
use crate::ports::sync_log::SyncLog;

/// Sync log sink that keeps every message for assertions.
#[derive(Debug, Default)]
pub struct RecordingLog {
    records: Mutex<Vec<(Level, String)>>,
}

impl RecordingLog {
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.records
            .lock()
            .unwrap()
            .iter()
            .any(|(l, message)| *l == level && message.contains(needle))
    }
}

impl SyncLog for RecordingLog {
    fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        self.records.lock().unwrap().push((level, args.to_string()));
    }
}

pub fn source_track(
    artist: &str,
    album: &str,
    title: &str,
    rating: Option<u32>,
) -> Arc<ItunesTrack> {
    Arc::new(ItunesTrack {
        track_id: 0,
        title: title.into(),
        artist: artist.into(),
        album: album.into(),
        rating,
    })
}

pub fn plex_track(rating_key: &str, artist: &str, album: &str, title: &str) -> PlexLibraryTrack {
    PlexLibraryTrack {
        rating_key: rating_key.into(),
        title: title.into(),
        title_sort: None,
        artist: Some(artist.into()),
        original_title: None,
        album: Some(album.into()),
        user_rating: None,
    }
}

pub fn plex_album(rating_key: &str, title: &str, artist: &str) -> PlexAlbum {
    PlexAlbum {
        rating_key: rating_key.into(),
        title: title.into(),
        artist: Some(artist.into()),
        user_rating: None,
    }
}

pub fn plex_artist(rating_key: &str, title: &str) -> PlexArtist {
    PlexArtist {
        rating_key: rating_key.into(),
        title: title.into(),
        user_rating: None,
    }
}

pub fn plex_playlist(rating_key: &str, title: &str) -> PlexPlaylist {
    PlexPlaylist {
        rating_key: rating_key.into(),
        title: title.into(),
        playlist_type: "audio".into(),
        smart: Some(false),
        leaf_count: None,
    }
}

#[derive(Debug, Default)]
struct FakePlexState {
    tracks: Vec<PlexLibraryTrack>,
    albums: Vec<PlexAlbum>,
    artists: Vec<PlexArtist>,
    playlists: Vec<(PlexPlaylist, Vec<String>)>,
    next_playlist_id: u32,
    edits: usize,
}

/// In-memory Plex server that applies playlist and rating writes to its own state.
#[derive(Debug, Default)]
pub struct FakePlex {
    state: Mutex<FakePlexState>,
}

impl FakePlex {
    pub fn new(
        tracks: Vec<PlexLibraryTrack>,
        albums: Vec<PlexAlbum>,
        artists: Vec<PlexArtist>,
    ) -> Self {
        Self {
            state: Mutex::new(FakePlexState {
                tracks,
                albums,
                artists,
                ..FakePlexState::default()
            }),
        }
    }

    pub fn insert_playlist(&self, playlist: PlexPlaylist, items: Vec<String>) {
        self.state.lock().unwrap().playlists.push((playlist, items));
    }

    pub fn playlist_items(&self, title: &str) -> Option<Vec<String>> {
        self.state
            .lock()
            .unwrap()
            .playlists
            .iter()
            .find(|(p, _)| p.title == title)
            .map(|(_, items)| items.clone())
    }

    pub fn playlist_count(&self) -> usize {
        self.state.lock().unwrap().playlists.len()
    }

    pub fn rating(&self, rating_key: &str) -> Option<f64> {
        let state = self.state.lock().unwrap();
        let tracks = state.tracks.iter().map(|t| (&t.rating_key, t.user_rating));
        let albums = state.albums.iter().map(|a| (&a.rating_key, a.user_rating));
        let artists = state.artists.iter().map(|a| (&a.rating_key, a.user_rating));

        tracks
            .chain(albums)
            .chain(artists)
            .find(|(key, _)| *key == rating_key)
            .and_then(|(_, rating)| rating)
    }

    pub fn edit_count(&self) -> usize {
        self.state.lock().unwrap().edits
    }
}

#[async_trait::async_trait]
impl PlexClient for FakePlex {
    async fn search_tracks(&self) -> Result<Vec<PlexLibraryTrack>> {
        Ok(self.state.lock().unwrap().tracks.clone())
    }

    async fn search_albums(&self) -> Result<Vec<PlexAlbum>> {
        Ok(self.state.lock().unwrap().albums.clone())
    }

    async fn search_artists(&self) -> Result<Vec<PlexArtist>> {
        Ok(self.state.lock().unwrap().artists.clone())
    }

    async fn find_playlist_by_title(&self, title: &str) -> Result<PlaylistLookup> {
        let state = self.state.lock().unwrap();
        Ok(state
            .playlists
            .iter()
            .find(|(p, _)| p.title == title)
            .map(|(p, _)| PlaylistLookup::Found(p.clone()))
            .unwrap_or(PlaylistLookup::NotFound))
    }

    async fn delete_playlist(&self, playlist: &PlexPlaylist) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let before = state.playlists.len();
        state
            .playlists
            .retain(|(p, _)| p.rating_key != playlist.rating_key);
        if state.playlists.len() == before {
            return Err(eyre!("Playlist {} does not exist", playlist.rating_key));
        }
        Ok(())
    }

    async fn create_playlist(
        &self,
        title: &str,
        items: &[PlexLibraryTrack],
    ) -> Result<PlexPlaylist> {
        let mut state = self.state.lock().unwrap();
        state.next_playlist_id += 1;
        let playlist = plex_playlist(&format!("pl{}", state.next_playlist_id), title);
        let keys = items.iter().map(|t| t.rating_key.clone()).collect();
        state.playlists.push((playlist.clone(), keys));
        Ok(playlist)
    }

    async fn edit_rating(&self, target: RatingTarget, value: f64) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let slot = match target.kind {
            MediaKind::Track => state
                .tracks
                .iter_mut()
                .find(|t| t.rating_key == target.rating_key)
                .map(|t| &mut t.user_rating),
            MediaKind::Album => state
                .albums
                .iter_mut()
                .find(|a| a.rating_key == target.rating_key)
                .map(|a| &mut a.user_rating),
            MediaKind::Artist => state
                .artists
                .iter_mut()
                .find(|a| a.rating_key == target.rating_key)
                .map(|a| &mut a.user_rating),
        };
        let slot = slot.ok_or_else(|| eyre!("No {} {}", target.kind, target.rating_key))?;
        *slot = Some(value);
        state.edits += 1;
        Ok(())
    }
}
