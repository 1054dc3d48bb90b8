use std::collections::HashSet;

use color_eyre::eyre::{Result, WrapErr};

use crate::itunes::ItunesPlaylist;
use crate::plex_rs::playlist::PlexPlaylist;
use crate::ports::plex::{PlaylistLookup, PlexClient};
use crate::ports::sync_log::SyncLog;
use crate::sync::index::LibraryIndex;
use crate::sync::key::generate_key;

pub const DEFAULT_EXCLUDED_PREFIX: &str = "z";
pub const DEFAULT_EXCLUDED_TITLES: [&str; 4] = ["Library", "Recently Added", "1 Star", "2 Stars"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionReason {
    EmptyTitle,
    Prefix,
    Distinguished,
    ExcludedTitle,
}

/// Decides which source playlists are mirrored to Plex.
#[derive(Debug, Clone)]
pub struct PlaylistFilter {
    excluded_prefix: String,
    excluded_titles: HashSet<String>,
}

impl Default for PlaylistFilter {
    fn default() -> Self {
        Self::new(
            DEFAULT_EXCLUDED_PREFIX,
            DEFAULT_EXCLUDED_TITLES.iter().map(|t| t.to_string()),
        )
    }
}

impl PlaylistFilter {
    pub fn new(prefix: &str, titles: impl IntoIterator<Item = String>) -> Self {
        Self {
            excluded_prefix: prefix.to_string(),
            excluded_titles: titles.into_iter().collect(),
        }
    }

    /// Returns why `playlist` is excluded, or `None` when it should be synced.
    ///
    /// An empty prefix disables the prefix rule.
    pub fn exclusion(&self, playlist: &ItunesPlaylist) -> Option<ExclusionReason> {
        if playlist.title.is_empty() {
            Some(ExclusionReason::EmptyTitle)
        } else if !self.excluded_prefix.is_empty()
            && playlist.title.starts_with(&self.excluded_prefix)
        {
            Some(ExclusionReason::Prefix)
        } else if playlist.is_distinguished() {
            Some(ExclusionReason::Distinguished)
        } else if self.excluded_titles.contains(&playlist.title) {
            Some(ExclusionReason::ExcludedTitle)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlaylistOutcome {
    Skipped(ExclusionReason),
    Created {
        playlist: PlexPlaylist,
        matched: usize,
        unmatched: usize,
    },
    /// None of the playlist's tracks exist in Plex, so nothing was created.
    NoMatches { unmatched: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaylistSyncReport {
    pub created: usize,
    pub skipped: usize,
    pub without_matches: usize,
    pub replaced: usize,
    pub matched_items: usize,
    pub unmatched_items: usize,
}

/// Mirror every eligible source playlist to Plex, one at a time.
pub async fn sync_playlists(
    playlists: &[ItunesPlaylist],
    index: &LibraryIndex,
    client: &dyn PlexClient,
    filter: &PlaylistFilter,
    log: &dyn SyncLog,
) -> Result<PlaylistSyncReport> {
    let mut report = PlaylistSyncReport::default();

    for playlist in playlists {
        let (outcome, replaced) = sync_playlist(playlist, index, client, filter, log)
            .await
            .wrap_err_with(|| format!("Failed to sync playlist '{}'", playlist.title))?;

        if replaced {
            report.replaced += 1;
        }
        match outcome {
            PlaylistOutcome::Skipped(_) => report.skipped += 1,
            PlaylistOutcome::Created {
                matched, unmatched, ..
            } => {
                report.created += 1;
                report.matched_items += matched;
                report.unmatched_items += unmatched;
            }
            PlaylistOutcome::NoMatches { unmatched } => {
                report.without_matches += 1;
                report.unmatched_items += unmatched;
            }
        }
    }

    Ok(report)
}

/// Replace the Plex copy of a single source playlist.
///
/// Any existing Plex playlist with the same title is deleted first, then a new one
/// is created from the tracks that resolve through `index`, in source order.
/// Returns the outcome and whether an existing Plex playlist was deleted.
pub async fn sync_playlist(
    playlist: &ItunesPlaylist,
    index: &LibraryIndex,
    client: &dyn PlexClient,
    filter: &PlaylistFilter,
    log: &dyn SyncLog,
) -> Result<(PlaylistOutcome, bool)> {
    if let Some(reason) = filter.exclusion(playlist) {
        log.debug(format_args!(
            "Skipping playlist '{}' ({:?})",
            playlist.title, reason
        ));
        return Ok((PlaylistOutcome::Skipped(reason), false));
    }

    log.info(format_args!("Starting sync of playlist '{}'", playlist.title));

    // Recreating is cheaper in API calls than diffing the existing membership.
    let replaced = match client.find_playlist_by_title(&playlist.title).await? {
        PlaylistLookup::Found(existing) => {
            client.delete_playlist(&existing).await.wrap_err_with(|| {
                format!("Failed to delete Plex playlist {}", existing.rating_key)
            })?;
            true
        }
        PlaylistLookup::NotFound => {
            log.info(format_args!(
                "Playlist '{}' not found in Plex, creating a new one",
                playlist.title
            ));
            false
        }
    };

    let mut items = Vec::with_capacity(playlist.tracks.len());
    let mut unmatched = 0;
    for track in &playlist.tracks {
        let key = generate_key(&track.artist, &track.album, &track.title);
        match index.get(&key) {
            Some(plex_track) => items.push(plex_track.clone()),
            None => {
                unmatched += 1;
                log.warn(format_args!(
                    "{} not found in Plex library, skipping item in '{}'",
                    key, playlist.title
                ));
            }
        }
    }

    if items.is_empty() {
        log.warn(format_args!(
            "No tracks of playlist '{}' matched Plex, not creating it",
            playlist.title
        ));
        return Ok((PlaylistOutcome::NoMatches { unmatched }, replaced));
    }

    let created = client.create_playlist(&playlist.title, &items).await?;
    log.info(format_args!(
        "Finished sync of playlist '{}': {} tracks, {} unmatched",
        playlist.title,
        items.len(),
        unmatched
    ));

    Ok((
        PlaylistOutcome::Created {
            playlist: created,
            matched: items.len(),
            unmatched,
        },
        replaced,
    ))
}
