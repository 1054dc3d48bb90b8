use color_eyre::eyre::Result;

use crate::plex_rs::library::{PlexAlbum, PlexArtist, PlexLibraryTrack};
use crate::plex_rs::playlist::PlexPlaylist;
use crate::ports::plex::{PlaylistLookup, PlexClient, RatingTarget};

/// Rating key given to playlists that were only pretended to be created.
pub const DRY_RUN_PLAYLIST_KEY: &str = "dry-run";

/// Wraps a [`PlexClient`] so reads reach the server and writes are only logged.
pub struct DryRunPlexClient<C: PlexClient> {
    inner: C,
}

impl<C: PlexClient> DryRunPlexClient<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }
}

#[async_trait::async_trait]
impl<C: PlexClient> PlexClient for DryRunPlexClient<C> {
    async fn search_tracks(&self) -> Result<Vec<PlexLibraryTrack>> {
        self.inner.search_tracks().await
    }

    async fn search_albums(&self) -> Result<Vec<PlexAlbum>> {
        self.inner.search_albums().await
    }

    async fn search_artists(&self) -> Result<Vec<PlexArtist>> {
        self.inner.search_artists().await
    }

    async fn find_playlist_by_title(&self, title: &str) -> Result<PlaylistLookup> {
        self.inner.find_playlist_by_title(title).await
    }

    async fn delete_playlist(&self, playlist: &PlexPlaylist) -> Result<()> {
        log::info!(
            "[dry run] Would delete playlist '{}' ({})",
            playlist.title,
            playlist.rating_key
        );
        Ok(())
    }

    async fn create_playlist(
        &self,
        title: &str,
        items: &[PlexLibraryTrack],
    ) -> Result<PlexPlaylist> {
        log::info!(
            "[dry run] Would create playlist '{}' with {} items",
            title,
            items.len()
        );
        Ok(PlexPlaylist {
            rating_key: DRY_RUN_PLAYLIST_KEY.to_string(),
            title: title.to_string(),
            playlist_type: "audio".to_string(),
            smart: Some(false),
            leaf_count: Some(items.len() as u32),
        })
    }

    async fn edit_rating(&self, target: RatingTarget, value: f64) -> Result<()> {
        log::info!(
            "[dry run] Would rate {} {} as {:.1}",
            target.kind,
            target.rating_key,
            value
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::plex::MockPlexClient;
    use crate::test_utils::{plex_playlist, plex_track};

    #[tokio::test]
    async fn test_reads_pass_through() {
        let mut inner = MockPlexClient::new();
        inner
            .expect_search_tracks()
            .times(1)
            .returning(|| Ok(vec![plex_track("1", "Blur", "Parklife", "Girls & Boys")]));
        inner
            .expect_find_playlist_by_title()
            .times(1)
            .returning(|_| Ok(PlaylistLookup::Found(plex_playlist("9", "Road Trip"))));

        let client = DryRunPlexClient::new(inner);

        assert_eq!(client.search_tracks().await.unwrap().len(), 1);
        assert_eq!(
            client.find_playlist_by_title("Road Trip").await.unwrap(),
            PlaylistLookup::Found(plex_playlist("9", "Road Trip"))
        );
    }

    #[tokio::test]
    async fn test_writes_are_not_sent() {
        let mut inner = MockPlexClient::new();
        inner.expect_delete_playlist().never();
        inner.expect_create_playlist().never();
        inner.expect_edit_rating().never();

        let client = DryRunPlexClient::new(inner);
        let items = vec![
            plex_track("1", "Blur", "Parklife", "Girls & Boys"),
            plex_track("2", "Blur", "Parklife", "Parklife"),
        ];

        client
            .delete_playlist(&plex_playlist("9", "Road Trip"))
            .await
            .unwrap();
        let created = client.create_playlist("Road Trip", &items).await.unwrap();
        client
            .edit_rating(RatingTarget::track(&items[0]), 8.0)
            .await
            .unwrap();

        assert_eq!(created.rating_key, DRY_RUN_PLAYLIST_KEY);
        assert_eq!(created.title, "Road Trip");
        assert_eq!(created.leaf_count, Some(2));
    }
}
