use std::fmt;

use color_eyre::eyre::{Result, WrapErr};
use log::Level;

use crate::ports::plex::PlexClient;
use crate::ports::source::SourceLibrary;
use crate::ports::sync_log::SyncLog;
use crate::sync::index::LibraryIndex;
use crate::sync::playlists::{PlaylistFilter, PlaylistSyncReport, sync_playlists};
use crate::sync::ratings::{
    RatingSyncReport, sync_album_ratings, sync_artist_ratings, sync_track_ratings,
};

#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub sync_playlists: bool,
    pub sync_ratings: bool,
    /// Source playlist whose tracks provide per-track ratings.
    pub music_playlist: String,
    pub filter: PlaylistFilter,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            sync_playlists: true,
            sync_ratings: true,
            music_playlist: "Music".to_string(),
            filter: PlaylistFilter::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub indexed_tracks: usize,
    pub key_collisions: usize,
    pub playlists: Option<PlaylistSyncReport>,
    pub track_ratings: Option<RatingSyncReport>,
    pub album_ratings: Option<RatingSyncReport>,
    pub artist_ratings: Option<RatingSyncReport>,
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "indexed {} Plex tracks ({} key collisions)",
            self.indexed_tracks, self.key_collisions
        )?;
        if let Some(p) = &self.playlists {
            write!(
                f,
                "; playlists: {} created ({} replaced), {} skipped, {} without matches, {} unmatched items",
                p.created, p.replaced, p.skipped, p.without_matches, p.unmatched_items
            )?;
        }
        for (label, ratings) in [
            ("track", &self.track_ratings),
            ("album", &self.album_ratings),
            ("artist", &self.artist_ratings),
        ] {
            if let Some(r) = ratings {
                write!(
                    f,
                    "; {} ratings: {} applied, {} unchanged, {} unmatched, {} unrated",
                    label, r.applied, r.unchanged, r.unmatched, r.unrated
                )?;
            }
        }
        Ok(())
    }
}

/// Run one full reconciliation pass and log its outcome.
///
/// Any error aborts the pass. Changes already sent to Plex are not rolled back;
/// rerunning the pass converges to the same end state.
pub async fn run(
    source: &dyn SourceLibrary,
    client: &dyn PlexClient,
    options: &SyncOptions,
    log: &dyn SyncLog,
) -> Result<SyncReport> {
    match run_sync(source, client, options, log).await {
        Ok(report) => {
            log.info(format_args!("Sync finished: {}", report));
            Ok(report)
        }
        Err(err) => {
            log.log(Level::Error, format_args!("Sync failed: {:?}", err));
            Err(err)
        }
    }
}

/// Build the index, mirror playlists, then propagate track, album and artist ratings.
pub async fn run_sync(
    source: &dyn SourceLibrary,
    client: &dyn PlexClient,
    options: &SyncOptions,
    log: &dyn SyncLog,
) -> Result<SyncReport> {
    log.info(format_args!("Fetching all Plex library tracks"));
    let tracks = client
        .search_tracks()
        .await
        .wrap_err("Failed to fetch Plex tracks")?;
    let index = LibraryIndex::build(tracks, log);
    if index.is_empty() {
        log.warn(format_args!("Plex music section returned no tracks, nothing will match"));
    }

    let mut report = SyncReport {
        indexed_tracks: index.len(),
        key_collisions: index.collisions(),
        ..SyncReport::default()
    };

    if options.sync_playlists {
        report.playlists = Some(
            sync_playlists(source.playlists(), &index, client, &options.filter, log).await?,
        );
    }

    if options.sync_ratings {
        let rated_tracks = match source.playlist(&options.music_playlist) {
            Some(playlist) => playlist.tracks.as_slice(),
            None => {
                log.warn(format_args!(
                    "Playlist '{}' not found, reading track ratings from the whole library",
                    options.music_playlist
                ));
                source.tracks()
            }
        };
        report.track_ratings =
            Some(sync_track_ratings(rated_tracks, &index, client, log).await?);

        let albums = client
            .search_albums()
            .await
            .wrap_err("Failed to fetch Plex albums")?;
        report.album_ratings =
            Some(sync_album_ratings(source.tracks(), &albums, client, log).await?);

        let artists = client
            .search_artists()
            .await
            .wrap_err("Failed to fetch Plex artists")?;
        report.artist_ratings = Some(sync_artist_ratings(source, &artists, client, log).await?);
    }

    Ok(report)
}
