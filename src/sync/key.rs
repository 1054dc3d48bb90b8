use std::fmt;

/// Identity used to correlate the same recording across both libraries.
///
/// Built from artist, album and title concatenated in that order with every
/// character outside `[A-Za-z0-9]` removed. Matching is case-sensitive and distinct
/// triples may produce the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MatchKey(String);

impl fmt::Display for MatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn generate_key(artist: &str, album: &str, title: &str) -> MatchKey {
    MatchKey(
        [artist, album, title]
            .into_iter()
            .flat_map(str::chars)
            .filter(char::is_ascii_alphanumeric)
            .collect(),
    )
}
