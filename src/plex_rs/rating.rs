use color_eyre::eyre::{Result, WrapErr};
use reqwest::Client;
use url::Url;

use crate::plex_rs::library::MediaKind;

/// Formats a 0-10 rating the way Plex stores it (one decimal place).
pub fn format_rating(value: f64) -> String {
    format!("{:.1}", value)
}

/// Set the user rating of a library item.
///
/// Endpoint
/// - `PUT /library/sections/{section}/all?type={kind}&id={ratingKey}&userRating.value={value}`
///
/// `value` is on the Plex 0-10 scale.
pub async fn edit_user_rating(
    client: &Client,
    base_url: &Url,
    user_token: &str,
    music_section_id: &str,
    kind: MediaKind,
    rating_key: &str,
    value: f64,
) -> Result<()> {
    let mut url = base_url.join(&format!("library/sections/{}/all", music_section_id))?;
    url.query_pairs_mut()
        .append_pair("type", &kind.type_id().to_string())
        .append_pair("id", rating_key)
        .append_pair("userRating.value", &format_rating(value));

    client
        .put(url)
        .header("X-Plex-Token", user_token)
        .send()
        .await?
        .error_for_status()
        .wrap_err_with(|| format!("Failed to edit rating of {} {}", kind, rating_key))?;

    Ok(())
}
