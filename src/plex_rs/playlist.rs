use color_eyre::eyre::{OptionExt, Result, WrapErr};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::plex_rs::library::PlexResponse;

/// Maximum number of rating keys sent in a single playlist item URI.
pub const PLAYLIST_URI_CHUNK: usize = 200;

/* ---------- Identity (machineIdentifier) ---------- */

#[derive(Debug, Clone, Deserialize)]
pub struct PlexIdentityResponse {
    #[serde(rename = "MediaContainer")]
    pub media_container: PlexIdentity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlexIdentity {
    #[serde(rename = "machineIdentifier")]
    pub machine_identifier: String,
}

/// Endpoint: `GET /identity`
pub async fn get_machine_identifier(
    client: &Client,
    base_url: &Url,
    user_token: &str,
) -> Result<String> {
    let url = base_url.join("identity")?;

    let res = client
        .get(url)
        .header("Accept", "application/json")
        .header("X-Plex-Token", user_token)
        .send()
        .await?
        .error_for_status()?
        .json::<PlexIdentityResponse>()
        .await
        .wrap_err("Failed to deserialize Plex identity response")?;

    Ok(res.media_container.machine_identifier)
}

/* ---------- Playlists ---------- */

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlexPlaylist {
    #[serde(rename = "ratingKey")]
    pub rating_key: String,

    pub title: String,

    #[serde(rename = "playlistType")]
    pub playlist_type: String,

    #[serde(default)]
    pub smart: Option<bool>,

    #[serde(rename = "leafCount", default)]
    pub leaf_count: Option<u32>,
}

/// Endpoint: `GET /playlists?playlistType=audio`
pub async fn get_playlists(
    client: &Client,
    base_url: &Url,
    user_token: &str,
) -> Result<Vec<PlexPlaylist>> {
    let url = base_url.join("playlists?playlistType=audio")?;

    let res = client
        .get(url)
        .header("Accept", "application/json")
        .header("X-Plex-Token", user_token)
        .send()
        .await?
        .error_for_status()?
        .json::<PlexResponse<PlexPlaylist>>()
        .await
        .wrap_err("Failed to deserialize Plex playlists response")?;

    Ok(res.media_container.metadata)
}

pub fn is_music_playlist(p: &PlexPlaylist) -> bool {
    p.playlist_type == "audio"
}

/// Builds the library URI Plex expects when adding items to a playlist.
///
/// Several items can share one URI by comma-joining their rating keys.
pub fn library_items_uri(machine_identifier: &str, rating_keys: &[&str]) -> String {
    format!(
        "server://{}/com.plexapp.plugins.library/library/metadata/{}",
        machine_identifier,
        rating_keys.join(",")
    )
}

/// Splits `rating_keys` into playlist item URIs of at most [`PLAYLIST_URI_CHUNK`] keys
/// each, keeping their order.
pub fn playlist_item_uris(machine_identifier: &str, rating_keys: &[&str]) -> Vec<String> {
    rating_keys
        .chunks(PLAYLIST_URI_CHUNK)
        .map(|chunk| library_items_uri(machine_identifier, chunk))
        .collect()
}

/* ---------- Create, extend and delete ---------- */

/// Create a non-smart audio playlist seeded with `rating_keys`.
///
/// Plex rejects a create call without items, so `rating_keys` must not be empty.
/// Keys beyond the first [`PLAYLIST_URI_CHUNK`] are appended with follow-up calls.
///
/// Endpoint: `POST /playlists?type=audio&title=..&smart=0&uri=..`
pub async fn create_music_playlist(
    client: &Client,
    base_url: &Url,
    user_token: &str,
    machine_identifier: &str,
    title: &str,
    rating_keys: &[&str],
) -> Result<PlexPlaylist> {
    let mut uris = playlist_item_uris(machine_identifier, rating_keys).into_iter();
    let first = uris
        .next()
        .ok_or_eyre("Cannot create a Plex playlist without items")?;

    let mut url = base_url.join("playlists")?;
    url.query_pairs_mut()
        .append_pair("type", "audio")
        .append_pair("title", title)
        .append_pair("smart", "0")
        .append_pair("uri", &first);

    let res = client
        .post(url)
        .header("Accept", "application/json")
        .header("X-Plex-Token", user_token)
        .send()
        .await?
        .error_for_status()?
        .json::<PlexResponse<PlexPlaylist>>()
        .await
        .wrap_err("Failed to deserialize create playlist response")?;

    let playlist = res
        .media_container
        .metadata
        .into_iter()
        .next()
        .ok_or_eyre("Create playlist response had no Metadata")?;

    for uri in uris {
        add_items_to_playlist(client, base_url, user_token, &playlist.rating_key, &uri).await?;
    }

    Ok(playlist)
}

/// Endpoint: `PUT /playlists/{id}/items?uri=..`
pub async fn add_items_to_playlist(
    client: &Client,
    base_url: &Url,
    user_token: &str,
    playlist_id: &str,
    items_uri: &str,
) -> Result<()> {
    let mut url = base_url.join(&format!("playlists/{}/items", playlist_id))?;
    url.query_pairs_mut().append_pair("uri", items_uri);

    client
        .put(url)
        .header("X-Plex-Token", user_token)
        .send()
        .await?
        .error_for_status()
        .wrap_err("Failed to add items to playlist")?;

    Ok(())
}

/// Endpoint: `DELETE /playlists/{id}`
pub async fn delete_playlist(
    client: &Client,
    base_url: &Url,
    user_token: &str,
    playlist_id: &str,
) -> Result<()> {
    let url = base_url.join(&format!("playlists/{}", playlist_id))?;

    client
        .delete(url)
        .header("X-Plex-Token", user_token)
        .send()
        .await?
        .error_for_status()
        .wrap_err("Failed to delete playlist")?;

    Ok(())
}
