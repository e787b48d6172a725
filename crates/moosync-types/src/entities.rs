//! Library entities as they travel between host and extension.
//!
//! Field names follow the host's JSON exactly (`album_coverPath_high`,
//! `_id`, `playbackUrl`, ...). Optional fields are omitted when unset so
//! that the host sees `undefined` rather than `null`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ─── Entities ───────────────────────────────────────────────────────────

/// An album.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Album {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album_name: Option<String>,
    #[serde(rename = "album_coverPath_high", skip_serializing_if = "Option::is_none")]
    pub album_cover_path_high: Option<String>,
    #[serde(rename = "album_coverPath_low", skip_serializing_if = "Option::is_none")]
    pub album_cover_path_low: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album_song_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album_artist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album_extra_info: Option<String>,
}

/// Per-extension metadata attached to an artist, keyed by package name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtistExtraInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<BTreeMap<String, Option<BTreeMap<String, Option<String>>>>>,
}

/// An artist. Empty ids are omitted so the struct doubles as a query filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Artist {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub artist_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist_name: Option<String>,
    #[serde(rename = "artist_coverPath", skip_serializing_if = "Option::is_none")]
    pub artist_cover_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist_song_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist_extra_info: Option<ArtistExtraInfo>,
}

/// A genre.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Genre {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub genre_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub genre_name: String,
    pub genre_song_count: u64,
}

/// A playlist.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Playlist {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub playlist_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub playlist_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playlist_desc: Option<String>,
    #[serde(rename = "playlist_coverPath", skip_serializing_if = "Option::is_none")]
    pub playlist_cover_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playlist_song_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playlist_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
}

/// Player backend required to play a song.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PlayerType {
    #[default]
    Local,
    Youtube,
    Spotify,
    Url,
    Dash,
    Hls,
}

/// State the host player can be in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PlayerState {
    Playing,
    Paused,
    #[default]
    Stopped,
    Loading,
}

/// Release year, which the host stores either as a number or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SongYear {
    Number(i64),
    Text(String),
}

/// A song.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Song {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    pub title: String,
    #[serde(rename = "song_coverPath_low", skip_serializing_if = "Option::is_none")]
    pub song_cover_path_low: Option<String>,
    #[serde(rename = "song_coverPath_high", skip_serializing_if = "Option::is_none")]
    pub song_cover_path_high: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album: Option<Album>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artists: Option<Vec<Artist>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<SongYear>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lyrics: Option<String>,
    #[serde(rename = "releaseType", skip_serializing_if = "Option::is_none")]
    pub release_type: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codec: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
    pub duration: f64,
    #[serde(rename = "sampleRate", skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deviceno: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "playbackUrl", skip_serializing_if = "Option::is_none")]
    pub playback_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_added: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(rename = "type")]
    pub player_type: PlayerType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_no: Option<u32>,
}

impl Song {
    /// Create a song with the fields the host requires.
    pub fn new(id: impl Into<String>, title: impl Into<String>, player_type: PlayerType) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            player_type,
            ..Self::default()
        }
    }
}

// ─── Query options ──────────────────────────────────────────────────────

/// Which extension a searchable song belongs to: any, none, or a package name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtensionRef {
    Any(bool),
    Package(String),
}

/// Song fields an extension may search on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchableSong {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "playbackUrl", skip_serializing_if = "Option::is_none")]
    pub playback_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deviceno: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub player_type: Option<PlayerType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<ExtensionRef>,
    #[serde(rename = "showInLibrary", skip_serializing_if = "Option::is_none")]
    pub show_in_library: Option<bool>,
}

/// Sort results by a song field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongSortOptions {
    /// Name of the `Song` field to sort on, as it appears on the wire.
    #[serde(rename = "type")]
    pub field: String,
    pub asc: bool,
}

/// One sort key or several.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SongSortBy {
    Single(SongSortOptions),
    Many(Vec<SongSortOptions>),
}

/// Options for `getSong`.
///
/// Wrap a term in `%` to match substrings, e.g. `%aaa%` in `song.title`.
/// `inclusive` joins the filters with AND instead of OR; `invert` returns
/// everything that does not match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SongApiOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub song: Option<SearchableSong>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album: Option<Album>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<Artist>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<Genre>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playlist: Option<Playlist>,
    #[serde(rename = "sortBy", skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SongSortBy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inclusive: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invert: Option<bool>,
}

/// Either every entity of a kind (`true`) or the ones matching a filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityFilter<T> {
    All(bool),
    Matching(T),
}

/// The entity kind an `getEntity` call targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntitySelector {
    Artist(EntityFilter<Artist>),
    Album(EntityFilter<Album>),
    Genre(EntityFilter<Genre>),
    Playlist(EntityFilter<Playlist>),
}

/// Options for `getEntity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityApiOptions {
    #[serde(flatten)]
    pub selector: EntitySelector,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inclusive: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invert: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_song_wire_names() {
        let mut song = Song::new("abc", "Title", PlayerType::Youtube);
        song.playback_url = Some("https://x/y".into());
        song.song_cover_path_high = Some("cover.png".into());

        let json = serde_json::to_value(&song).unwrap();
        assert_eq!(json["_id"], "abc");
        assert_eq!(json["type"], "YOUTUBE");
        assert_eq!(json["playbackUrl"], "https://x/y");
        assert_eq!(json["song_coverPath_high"], "cover.png");
        assert!(json.get("album").is_none());
        assert!(json.get("lyrics").is_none());
    }

    #[test]
    fn test_song_parses_sparse_host_payload() {
        let song: Song = serde_json::from_value(json!({
            "_id": "1",
            "title": "t",
            "duration": 12.5,
            "type": "LOCAL",
            "year": "1999",
            "artists": [{ "artist_id": "a1", "artist_name": "A" }]
        }))
        .unwrap();
        assert_eq!(song.id, "1");
        assert_eq!(song.year, Some(SongYear::Text("1999".into())));
        assert_eq!(song.artists.unwrap()[0].artist_name.as_deref(), Some("A"));
    }

    #[test]
    fn test_year_accepts_number() {
        let song: Song = serde_json::from_value(json!({ "_id": "1", "year": 2001 })).unwrap();
        assert_eq!(song.year, Some(SongYear::Number(2001)));
    }

    #[test]
    fn test_artist_filter_omits_empty_id() {
        let filter = Artist {
            artist_name: Some("%abc%".into()),
            ..Artist::default()
        };
        assert_eq!(
            serde_json::to_value(&filter).unwrap(),
            json!({ "artist_name": "%abc%" })
        );
    }

    #[test]
    fn test_entity_options_flatten_selector() {
        let opts = EntityApiOptions {
            selector: EntitySelector::Playlist(EntityFilter::All(true)),
            inclusive: None,
            invert: Some(false),
        };
        assert_eq!(
            serde_json::to_value(&opts).unwrap(),
            json!({ "playlist": true, "invert": false })
        );
    }

    #[test]
    fn test_song_options_sort_by_single_or_many() {
        let opts: SongApiOptions = serde_json::from_value(json!({
            "sortBy": [{ "type": "title", "asc": true }]
        }))
        .unwrap();
        assert!(matches!(opts.sort_by, Some(SongSortBy::Many(ref v)) if v.len() == 1));

        let opts: SongApiOptions = serde_json::from_value(json!({
            "sortBy": { "type": "date_added", "asc": false }
        }))
        .unwrap();
        assert!(matches!(opts.sort_by, Some(SongSortBy::Single(_))));
    }

    #[test]
    fn test_player_state_wire_names() {
        assert_eq!(
            serde_json::to_value(PlayerState::Loading).unwrap(),
            json!("LOADING")
        );
        let state: PlayerState = serde_json::from_value(json!("PAUSED")).unwrap();
        assert_eq!(state, PlayerState::Paused);
    }
}
