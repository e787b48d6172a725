//! Argument and return types of extension events and host commands.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::entities::{Album, Artist, Genre, Playlist, Song};

// ─── Accounts ───────────────────────────────────────────────────────────

/// An account an extension exposes to the host's account switcher.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDetails {
    pub id: String,
    pub package_name: String,
    pub name: String,
    pub bg_color: String,
    pub icon: String,
    pub logged_in: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Payload of `performAccountLogin`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountLoginArgs {
    pub package_name: String,
    pub account_id: String,
    pub login_status: bool,
}

// ─── Preferences ────────────────────────────────────────────────────────

/// Payload of `onPreferencesChanged`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceArgs {
    pub key: String,
    #[serde(default)]
    pub value: Value,
}

/// Argument of the preference commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceData<T = Value> {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<T>,
    #[serde(rename = "defaultValue", skip_serializing_if = "Option::is_none")]
    pub default_value: Option<T>,
}

impl<T> PreferenceData<T> {
    /// A lookup of `key` with no default.
    pub fn key(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
            default_value: None,
        }
    }

    /// A lookup of `key` falling back to `default`.
    pub fn with_default(key: impl Into<String>, default: Option<T>) -> Self {
        Self {
            key: key.into(),
            value: None,
            default_value: default,
        }
    }

    /// An assignment of `value` to `key`.
    pub fn set(key: impl Into<String>, value: T) -> Self {
        Self {
            key: key.into(),
            value: Some(value),
            default_value: None,
        }
    }
}

/// Response of `getPreferenceValue` / `getSecureValue`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceValue<T = Value> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<T>,
}

// ─── Library requests ───────────────────────────────────────────────────

/// Argument of `addToPlaylist`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddToPlaylistRequest {
    #[serde(rename = "playlistID")]
    pub playlist_id: String,
    pub songs: Vec<Song>,
}

/// One entry of a context menu an extension contributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextMenuReturnType {
    pub name: String,
    pub icon: String,
    pub action_id: String,
}

// ─── Event results ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchReturnType {
    pub songs: Vec<Song>,
    pub artists: Vec<Artist>,
    pub playlists: Vec<Playlist>,
    pub albums: Vec<Album>,
    pub genres: Vec<Genre>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationsReturnType {
    pub songs: Vec<Song>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaylistsReturnType {
    pub playlists: Vec<Playlist>,
}

/// A page of songs. `next_page_token` is echoed back by the host on the
/// next request and omitted entirely on the last page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SongsWithPageTokenReturnType {
    pub songs: Vec<Song>,
    #[serde(rename = "nextPageToken", skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaybackDetailsReturnType {
    pub duration: f64,
    pub url: String,
}

/// Result of `getStreamUrl`: inline audio bytes or a URL to fetch them from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StreamUrlReturnType {
    Data {
        #[serde(rename = "mimeType", default, skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
        data: Vec<u8>,
    },
    Redirect {
        #[serde(rename = "mimeType", default, skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
        #[serde(rename = "redirectUrl")]
        redirect_url: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SongReturnType {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub song: Option<Song>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaylistAndSongsReturnType {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playlist: Option<Playlist>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub songs: Option<Vec<Song>>,
}

// ─── Paged arguments ────────────────────────────────────────────────────

/// Argument of the paginated song events.
///
/// The host sends either the bare item or an `[item, token]` pair once a
/// previous page returned a `nextPageToken`.
#[derive(Debug, Clone, PartialEq)]
pub struct PagedQuery<T> {
    pub item: T,
    pub next_page_token: Option<Value>,
}

impl<T> PagedQuery<T> {
    pub fn first(item: T) -> Self {
        Self {
            item,
            next_page_token: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PagedQueryRepr<T> {
    Pair(T, Option<Value>),
    Bare(T),
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for PagedQuery<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match PagedQueryRepr::deserialize(deserializer)? {
            PagedQueryRepr::Pair(item, token) => Self {
                item,
                next_page_token: token.filter(|t| !t.is_null()),
            },
            PagedQueryRepr::Bare(item) => Self::first(item),
        })
    }
}

impl<T: Serialize> Serialize for PagedQuery<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.next_page_token {
            Some(token) => (&self.item, token).serialize(serializer),
            None => self.item.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ── Pagination ────────────────────────────────────────────────────

    #[test]
    fn test_paged_query_bare_item() {
        let q: PagedQuery<String> = serde_json::from_str("\"playlist-1\"").unwrap();
        assert_eq!(q.item, "playlist-1");
        assert!(q.next_page_token.is_none());
    }

    #[test]
    fn test_paged_query_with_token() {
        let q: PagedQuery<String> = serde_json::from_str(r#"["playlist-1", "page-2"]"#).unwrap();
        assert_eq!(q.item, "playlist-1");
        assert_eq!(q.next_page_token, Some(json!("page-2")));
    }

    #[test]
    fn test_paged_query_null_token_is_first_page() {
        let q: PagedQuery<String> = serde_json::from_str(r#"["playlist-1", null]"#).unwrap();
        assert!(q.next_page_token.is_none());
    }

    #[test]
    fn test_paged_query_entity_item() {
        let q: PagedQuery<Artist> =
            serde_json::from_value(json!([{ "artist_id": "a1" }, 3])).unwrap();
        assert_eq!(q.item.artist_id, "a1");
        assert_eq!(q.next_page_token, Some(json!(3)));

        let q: PagedQuery<Album> = serde_json::from_value(json!({ "album_id": "x" })).unwrap();
        assert_eq!(q.item.album_id.as_deref(), Some("x"));
    }

    #[test]
    fn test_paged_query_serializes_like_host() {
        assert_eq!(
            serde_json::to_value(PagedQuery::first("p")).unwrap(),
            json!("p")
        );
        let q = PagedQuery {
            item: "p",
            next_page_token: Some(json!("t")),
        };
        assert_eq!(serde_json::to_value(q).unwrap(), json!(["p", "t"]));
    }

    // ── Results ───────────────────────────────────────────────────────

    #[test]
    fn test_songs_page_omits_missing_token() {
        let page = SongsWithPageTokenReturnType::default();
        assert_eq!(serde_json::to_string(&page).unwrap(), r#"{"songs":[]}"#);
    }

    #[test]
    fn test_stream_url_variants() {
        let redirect = StreamUrlReturnType::Redirect {
            mime_type: None,
            redirect_url: "https://cdn/x.mp3".into(),
        };
        assert_eq!(
            serde_json::to_value(&redirect).unwrap(),
            json!({ "redirectUrl": "https://cdn/x.mp3" })
        );

        let data: StreamUrlReturnType =
            serde_json::from_value(json!({ "mimeType": "audio/ogg", "data": [1, 2] })).unwrap();
        assert!(matches!(data, StreamUrlReturnType::Data { ref data, .. } if data == &[1, 2]));
    }

    #[test]
    fn test_account_details_camel_case() {
        let acc = AccountDetails {
            id: "a".into(),
            package_name: "moosync.sample".into(),
            name: "Sample".into(),
            bg_color: "#000".into(),
            icon: "".into(),
            logged_in: true,
            username: None,
        };
        let json = serde_json::to_value(&acc).unwrap();
        assert_eq!(json["packageName"], "moosync.sample");
        assert_eq!(json["loggedIn"], true);
        assert!(json.get("username").is_none());
    }

    // ── Preferences ───────────────────────────────────────────────────

    #[test]
    fn test_preference_data_default_value_name() {
        let data = PreferenceData::with_default("volume", Some(json!(50)));
        assert_eq!(
            serde_json::to_value(&data).unwrap(),
            json!({ "key": "volume", "defaultValue": 50 })
        );
    }

    #[test]
    fn test_preference_value_missing() {
        let v: PreferenceValue<String> = serde_json::from_str("{}").unwrap();
        assert!(v.value.is_none());
    }

    #[test]
    fn test_add_to_playlist_wire_name() {
        let req = AddToPlaylistRequest {
            playlist_id: "p1".into(),
            songs: vec![],
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({ "playlistID": "p1", "songs": [] })
        );
    }
}
