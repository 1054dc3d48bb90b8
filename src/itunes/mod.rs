//! Loader for the iTunes "Music Library.xml" export.
//!
//! The export is an XML property list: a `Tracks` dictionary keyed by track id and a
//! `Playlists` array whose entries reference tracks through `Playlist Items`.

pub mod error;
pub mod plist;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::itunes::error::LibraryParseError;
use crate::itunes::plist::{PlistDict, PlistValue, parse_document};
use crate::ports::source::SourceLibrary;

/// A track from the exported library. Missing text fields are empty strings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItunesTrack {
    pub track_id: i64,
    pub title: String,
    pub artist: String,
    pub album: String,
    /// Raw rating on the 0-100 scale, `None` when the track is unrated.
    pub rating: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct ItunesPlaylist {
    pub title: String,
    /// Set for playlists generated by iTunes itself (library, purchased, podcasts...).
    pub distinguished: bool,
    pub tracks: Vec<Arc<ItunesTrack>>,
}

impl ItunesPlaylist {
    pub fn is_distinguished(&self) -> bool {
        self.distinguished
    }
}

#[derive(Debug, Default)]
pub struct ItunesLibrary {
    tracks: Vec<Arc<ItunesTrack>>,
    playlists: Vec<ItunesPlaylist>,
    by_artist: HashMap<String, Vec<Arc<ItunesTrack>>>,
}

impl ItunesLibrary {
    pub fn new(tracks: Vec<Arc<ItunesTrack>>, playlists: Vec<ItunesPlaylist>) -> Self {
        let mut by_artist: HashMap<String, Vec<Arc<ItunesTrack>>> = HashMap::new();
        for track in &tracks {
            by_artist
                .entry(track.artist.clone())
                .or_default()
                .push(Arc::clone(track));
        }

        Self {
            tracks,
            playlists,
            by_artist,
        }
    }

    /// Read and parse a library export from disk.
    pub fn load(path: &Path) -> Result<Self, LibraryParseError> {
        let xml = std::fs::read_to_string(path).map_err(|source| LibraryParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&xml)
    }

    pub fn parse(xml: &str) -> Result<Self, LibraryParseError> {
        let PlistValue::Dict(root) = parse_document(xml)? else {
            return Err(LibraryParseError::MissingKey("top level dictionary"));
        };

        let track_dicts = root
            .dict("Tracks")
            .ok_or(LibraryParseError::MissingKey("Tracks"))?;

        let mut tracks = Vec::new();
        let mut by_id: HashMap<i64, Arc<ItunesTrack>> = HashMap::new();
        for (key, value) in track_dicts.iter() {
            let PlistValue::Dict(dict) = value else {
                log::warn!("Skipping malformed track entry {}", key);
                continue;
            };
            let track = Arc::new(parse_track(dict)?);
            by_id.insert(track.track_id, Arc::clone(&track));
            tracks.push(track);
        }

        let playlists = root
            .array("Playlists")
            .unwrap_or_default()
            .iter()
            .filter_map(|value| match value {
                PlistValue::Dict(dict) => Some(parse_playlist(dict, &by_id)),
                _ => None,
            })
            .collect::<Vec<_>>();

        log::info!(
            "Parsed iTunes library: {} tracks, {} playlists",
            tracks.len(),
            playlists.len()
        );

        Ok(Self::new(tracks, playlists))
    }
}

fn parse_track(dict: &PlistDict) -> Result<ItunesTrack, LibraryParseError> {
    let text = |key: &str| dict.string(key).unwrap_or_default().to_string();

    let rating = dict
        .integer("Rating")
        .map(|raw| {
            u32::try_from(raw).map_err(|_| LibraryParseError::InvalidValue {
                kind: "rating",
                value: raw.to_string(),
            })
        })
        .transpose()?;

    Ok(ItunesTrack {
        track_id: dict
            .integer("Track ID")
            .ok_or(LibraryParseError::MissingKey("Track ID"))?,
        title: text("Name"),
        artist: text("Artist"),
        album: text("Album"),
        rating,
    })
}

fn parse_playlist(dict: &PlistDict, by_id: &HashMap<i64, Arc<ItunesTrack>>) -> ItunesPlaylist {
    let title = dict.string("Name").unwrap_or_default().to_string();
    let distinguished =
        dict.contains_key("Distinguished Kind") || dict.bool("Master").unwrap_or(false);

    let mut tracks = Vec::new();
    for item in dict.array("Playlist Items").unwrap_or_default() {
        let PlistValue::Dict(item) = item else {
            continue;
        };
        let Some(track_id) = item.integer("Track ID") else {
            continue;
        };
        match by_id.get(&track_id) {
            Some(track) => tracks.push(Arc::clone(track)),
            None => log::warn!(
                "Playlist '{}' references unknown track id {}, dropping it",
                title,
                track_id
            ),
        }
    }

    ItunesPlaylist {
        title,
        distinguished,
        tracks,
    }
}

impl SourceLibrary for ItunesLibrary {
    fn playlists(&self) -> &[ItunesPlaylist] {
        &self.playlists
    }

    fn tracks(&self) -> &[Arc<ItunesTrack>] {
        &self.tracks
    }

    fn tracks_for_artist(&self, artist: &str) -> &[Arc<ItunesTrack>] {
        self.by_artist
            .get(artist)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
