use std::collections::HashMap;
use std::sync::Arc;

use color_eyre::eyre::{Result, WrapErr};

use crate::itunes::ItunesTrack;
use crate::plex_rs::library::{PlexAlbum, PlexArtist};
use crate::plex_rs::rating::format_rating;
use crate::ports::plex::{PlexClient, RatingTarget};
use crate::ports::source::SourceLibrary;
use crate::ports::sync_log::SyncLog;
use crate::sync::index::LibraryIndex;
use crate::sync::key::generate_key;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RatingOutcome {
    Applied(f64),
    /// Plex already holds this value, so no edit was sent.
    Unchanged(f64),
    /// No Plex item (for tracks) or no source tracks (for albums and artists).
    Unmatched,
    Unrated,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RatingSyncReport {
    pub applied: usize,
    pub unchanged: usize,
    pub unmatched: usize,
    pub unrated: usize,
}

impl RatingSyncReport {
    fn record(&mut self, outcome: RatingOutcome) {
        match outcome {
            RatingOutcome::Applied(_) => self.applied += 1,
            RatingOutcome::Unchanged(_) => self.unchanged += 1,
            RatingOutcome::Unmatched => self.unmatched += 1,
            RatingOutcome::Unrated => self.unrated += 1,
        }
    }
}

/// Convert a 0-100 source rating to the Plex 0-10 scale.
pub fn to_plex_scale(raw: u32) -> f64 {
    f64::from(raw) / 10.0
}

/// Mean rating of `tracks` on the Plex scale, rounded to one decimal.
///
/// Unrated tracks count as 0. Returns `None` for an empty set.
pub fn aggregate_rating<'a>(tracks: impl IntoIterator<Item = &'a ItunesTrack>) -> Option<f64> {
    let (sum, count) = tracks.into_iter().fold((0u64, 0u64), |(sum, count), track| {
        (sum + u64::from(track.rating.unwrap_or(0)), count + 1)
    });
    if count == 0 {
        return None;
    }

    let value = (sum as f64 / count as f64) / 10.0;
    // Rounds the exact binary value, ties to even: 8.25 -> 8.2, 8.45 (8.4499..) -> 8.4.
    format_rating(value).parse().ok()
}

fn same_rating(current: Option<f64>, value: f64) -> bool {
    current.is_some_and(|current| (current - value).abs() < 1e-6)
}

async fn apply_rating(
    client: &dyn PlexClient,
    target: RatingTarget,
    label: &str,
    current: Option<f64>,
    value: f64,
    log: &dyn SyncLog,
) -> Result<RatingOutcome> {
    if same_rating(current, value) {
        log.debug(format_args!("{} already rated {:.1}", label, value));
        return Ok(RatingOutcome::Unchanged(value));
    }

    client
        .edit_rating(target, value)
        .await
        .wrap_err_with(|| format!("Failed to set rating of {}", label))?;
    log.debug(format_args!("Rated {} {:.1}", label, value));
    Ok(RatingOutcome::Applied(value))
}

/// Copy a single source track rating onto its Plex track.
///
/// Unrated tracks and tracks rated 0 are never written.
pub async fn sync_track_rating(
    track: &ItunesTrack,
    index: &LibraryIndex,
    client: &dyn PlexClient,
    log: &dyn SyncLog,
) -> Result<RatingOutcome> {
    let key = generate_key(&track.artist, &track.album, &track.title);

    let Some(raw) = track.rating.filter(|raw| *raw > 0) else {
        log.warn(format_args!("{} not rated in iTunes, skipping item", key));
        return Ok(RatingOutcome::Unrated);
    };

    let Some(plex_track) = index.get(&key) else {
        log.warn(format_args!("{} not found in Plex library, skipping item", key));
        return Ok(RatingOutcome::Unmatched);
    };

    apply_rating(
        client,
        RatingTarget::track(plex_track),
        &format!("track {}", key),
        plex_track.user_rating,
        to_plex_scale(raw),
        log,
    )
    .await
}

pub async fn sync_track_ratings(
    tracks: &[Arc<ItunesTrack>],
    index: &LibraryIndex,
    client: &dyn PlexClient,
    log: &dyn SyncLog,
) -> Result<RatingSyncReport> {
    log.info(format_args!("Starting sync of {} track ratings", tracks.len()));

    let mut report = RatingSyncReport::default();
    for track in tracks {
        report.record(sync_track_rating(track, index, client, log).await?);
    }

    log.info(format_args!(
        "Finished sync of track ratings: {} applied, {} unchanged",
        report.applied, report.unchanged
    ));
    Ok(report)
}

/// Rate each Plex album with the mean rating of its source tracks.
///
/// A source track belongs to an album when its album title and artist equal the
/// Plex album's title and album artist. Albums without source tracks are untouched.
pub async fn sync_album_ratings(
    tracks: &[Arc<ItunesTrack>],
    albums: &[PlexAlbum],
    client: &dyn PlexClient,
    log: &dyn SyncLog,
) -> Result<RatingSyncReport> {
    log.info(format_args!("Starting sync of {} album ratings", albums.len()));

    let mut by_album: HashMap<(&str, &str), Vec<&ItunesTrack>> = HashMap::new();
    for track in tracks {
        by_album
            .entry((track.album.as_str(), track.artist.as_str()))
            .or_default()
            .push(track);
    }

    let mut report = RatingSyncReport::default();
    for album in albums {
        let artist = album.artist.as_deref().unwrap_or_default();
        let value = by_album
            .get(&(album.title.as_str(), artist))
            .and_then(|tracks| aggregate_rating(tracks.iter().copied()));

        let outcome = match value {
            Some(value) => {
                apply_rating(
                    client,
                    RatingTarget::album(album),
                    &format!("album '{}' by '{}'", album.title, artist),
                    album.user_rating,
                    value,
                    log,
                )
                .await?
            }
            None => {
                log.debug(format_args!(
                    "Album '{}' by '{}' has no iTunes tracks, leaving it untouched",
                    album.title, artist
                ));
                RatingOutcome::Unmatched
            }
        };
        report.record(outcome);
    }

    log.info(format_args!(
        "Finished sync of album ratings: {} applied, {} unchanged",
        report.applied, report.unchanged
    ));
    Ok(report)
}

/// Rate each Plex artist with the mean rating of the source tracks credited to it.
pub async fn sync_artist_ratings(
    source: &dyn SourceLibrary,
    artists: &[PlexArtist],
    client: &dyn PlexClient,
    log: &dyn SyncLog,
) -> Result<RatingSyncReport> {
    log.info(format_args!("Starting sync of {} artist ratings", artists.len()));

    let mut report = RatingSyncReport::default();
    for artist in artists {
        let tracks = source.tracks_for_artist(&artist.title);

        let outcome = match aggregate_rating(tracks.iter().map(Arc::as_ref)) {
            Some(value) => {
                apply_rating(
                    client,
                    RatingTarget::artist(artist),
                    &format!("artist '{}'", artist.title),
                    artist.user_rating,
                    value,
                    log,
                )
                .await?
            }
            None => {
                log.debug(format_args!(
                    "Artist '{}' has no iTunes tracks, leaving it untouched",
                    artist.title
                ));
                RatingOutcome::Unmatched
            }
        };
        report.record(outcome);
    }

    log.info(format_args!(
        "Finished sync of artist ratings: {} applied, {} unchanged",
        report.applied, report.unchanged
    ));
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::itunes::{ItunesLibrary, ItunesTrack};
    use crate::plex_rs::library::MediaKind;
    use crate::ports::plex::MockPlexClient;
    use crate::test_utils::{RecordingLog, plex_album, plex_artist, plex_track, source_track};

    fn rated(ratings: &[Option<u32>]) -> Vec<ItunesTrack> {
        ratings
            .iter()
            .enumerate()
            .map(|(i, rating)| ItunesTrack {
                track_id: i as i64,
                title: format!("Track {}", i),
                artist: "Artist".into(),
                album: "Album".into(),
                rating: *rating,
                ..ItunesTrack::default()
            })
            .collect()
    }

    #[test]
    fn test_to_plex_scale_keeps_fraction() {
        assert_eq!(to_plex_scale(100), 10.0);
        assert_eq!(to_plex_scale(85), 8.5);
        assert_eq!(to_plex_scale(0), 0.0);
    }

    #[test]
    fn test_aggregate_rating_mean() {
        let tracks = rated(&[Some(100), Some(80), Some(60)]);
        assert_eq!(aggregate_rating(&tracks), Some(8.0));
    }

    #[test]
    fn test_aggregate_rating_counts_unrated_as_zero() {
        let tracks = rated(&[Some(100), None]);
        assert_eq!(aggregate_rating(&tracks), Some(5.0));
    }

    #[test]
    fn test_aggregate_rating_rounds_to_one_decimal() {
        let tracks = rated(&[Some(100), Some(80), Some(70)]);
        // mean 83.33 -> 8.3
        assert_eq!(aggregate_rating(&tracks), Some(8.3));
    }

    #[test]
    fn test_aggregate_rating_rounds_on_the_float_value() {
        // 8.25 is exact and ties to even.
        assert_eq!(aggregate_rating(&rated(&[Some(80), Some(85)])), Some(8.2));
        // 8.45 is stored just below the tie.
        assert_eq!(aggregate_rating(&rated(&[Some(80), Some(89)])), Some(8.4));
        assert_eq!(
            aggregate_rating(&rated(&[Some(100), Some(80), Some(80), Some(70)])),
            Some(8.2)
        );
    }

    #[test]
    fn test_aggregate_rating_empty() {
        assert_eq!(aggregate_rating(&Vec::<ItunesTrack>::new()), None);
    }

    #[tokio::test]
    async fn test_track_rating_applied_with_fraction() {
        let log = RecordingLog::default();
        let index = LibraryIndex::build(vec![plex_track("7", "Blur", "Parklife", "Parklife")], &log);
        let mut client = MockPlexClient::new();
        client
            .expect_edit_rating()
            .withf(|target, value| {
                target.kind == MediaKind::Track && target.rating_key == "7" && *value == 9.0
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let track = source_track("Blur", "Parklife", "Parklife", Some(90));
        let outcome = sync_track_rating(&track, &index, &client, &log)
            .await
            .unwrap();

        assert_eq!(outcome, RatingOutcome::Applied(9.0));
    }

    #[tokio::test]
    async fn test_zero_and_absent_ratings_never_written() {
        let log = RecordingLog::default();
        let index = LibraryIndex::build(vec![plex_track("7", "Blur", "Parklife", "Parklife")], &log);
        let mut client = MockPlexClient::new();
        client.expect_edit_rating().never();

        let zero = source_track("Blur", "Parklife", "Parklife", Some(0));
        let absent = source_track("Blur", "Parklife", "Parklife", None);
        let tracks = vec![zero, absent];

        let report = sync_track_ratings(&tracks, &index, &client, &log)
            .await
            .unwrap();

        assert_eq!(report.unrated, 2);
        assert_eq!(report.applied, 0);
        assert!(log.contains(log::Level::Warn, "not rated"));
    }

    #[tokio::test]
    async fn test_unmatched_track_is_skipped() {
        let log = RecordingLog::default();
        let index = LibraryIndex::build(Vec::new(), &log);
        let mut client = MockPlexClient::new();
        client.expect_edit_rating().never();

        let track = source_track("Blur", "Parklife", "Parklife", Some(80));
        let outcome = sync_track_rating(&track, &index, &client, &log)
            .await
            .unwrap();

        assert_eq!(outcome, RatingOutcome::Unmatched);
        assert!(log.contains(log::Level::Warn, "BlurParklifeParklife not found"));
    }

    #[tokio::test]
    async fn test_existing_equal_rating_is_not_resent() {
        let log = RecordingLog::default();
        let mut plex = plex_track("7", "Blur", "Parklife", "Parklife");
        plex.user_rating = Some(8.0);
        let index = LibraryIndex::build(vec![plex], &log);
        let mut client = MockPlexClient::new();
        client.expect_edit_rating().never();

        let track = source_track("Blur", "Parklife", "Parklife", Some(80));
        let outcome = sync_track_rating(&track, &index, &client, &log)
            .await
            .unwrap();

        assert_eq!(outcome, RatingOutcome::Unchanged(8.0));
    }

    #[tokio::test]
    async fn test_album_ratings() {
        let log = RecordingLog::default();
        let tracks = vec![
            source_track("AC/DC", "Back in Black", "Hells Bells", Some(100)),
            source_track("AC/DC", "Back in Black", "Shoot to Thrill", Some(80)),
            source_track("AC/DC", "Back in Black", "Given the Dog a Bone", Some(60)),
            source_track("Blur", "Parklife", "Parklife", Some(100)),
            source_track("Blur", "Parklife", "Tracy Jacks", None),
        ];
        let albums = vec![
            plex_album("a1", "Back in Black", "AC/DC"),
            plex_album("a2", "Parklife", "Blur"),
            plex_album("a3", "Parklife", "Someone Else"),
            plex_album("a4", "Highway to Hell", "AC/DC"),
        ];

        let mut client = MockPlexClient::new();
        client
            .expect_edit_rating()
            .withf(|target, value| target.rating_key == "a1" && *value == 8.0)
            .times(1)
            .returning(|_, _| Ok(()));
        client
            .expect_edit_rating()
            .withf(|target, value| target.rating_key == "a2" && *value == 5.0)
            .times(1)
            .returning(|_, _| Ok(()));

        let report = sync_album_ratings(&tracks, &albums, &client, &log)
            .await
            .unwrap();

        assert_eq!(report.applied, 2);
        assert_eq!(report.unmatched, 2);
    }

    #[tokio::test]
    async fn test_artist_ratings_use_source_grouping() {
        let log = RecordingLog::default();
        let library = ItunesLibrary::new(
            vec![
                source_track("Blur", "Parklife", "Parklife", Some(100)),
                source_track("Blur", "Leisure", "There's No Other Way", Some(60)),
                source_track("Oasis", "Definitely Maybe", "Supersonic", None),
            ],
            Vec::new(),
        );
        let artists = vec![
            plex_artist("r1", "Blur"),
            plex_artist("r2", "Oasis"),
            plex_artist("r3", "Pulp"),
        ];

        let mut client = MockPlexClient::new();
        client
            .expect_edit_rating()
            .withf(|target, value| {
                target.kind == MediaKind::Artist && target.rating_key == "r1" && *value == 8.0
            })
            .times(1)
            .returning(|_, _| Ok(()));
        client
            .expect_edit_rating()
            .withf(|target, value| target.rating_key == "r2" && *value == 0.0)
            .times(1)
            .returning(|_, _| Ok(()));

        let report = sync_artist_ratings(&library, &artists, &client, &log)
            .await
            .unwrap();

        assert_eq!(report.applied, 2);
        assert_eq!(report.unmatched, 1);
    }

    #[tokio::test]
    async fn test_edit_failure_is_fatal() {
        let log = RecordingLog::default();
        let tracks = vec![source_track("Blur", "Parklife", "Parklife", Some(100))];
        let albums = vec![plex_album("a2", "Parklife", "Blur")];

        let mut client = MockPlexClient::new();
        client
            .expect_edit_rating()
            .returning(|_, _| Err(color_eyre::eyre::eyre!("401 Unauthorized")));

        let err = sync_album_ratings(&tracks, &albums, &client, &log)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("album 'Parklife' by 'Blur'"));
    }
}
