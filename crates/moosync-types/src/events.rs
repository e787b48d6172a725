//! Extension events, the closed set of callbacks the host can invoke.

use std::str::FromStr;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::entities::{Album, Artist, PlayerState, Playlist, Song};
use crate::extensions::{
    AccountDetails, AccountLoginArgs, ContextMenuReturnType, PagedQuery,
    PlaybackDetailsReturnType, PlaylistAndSongsReturnType, PlaylistsReturnType, PreferenceArgs,
    RecommendationsReturnType, SearchReturnType, SongReturnType, SongsWithPageTokenReturnType,
    StreamUrlReturnType,
};
use crate::scopes::ProviderScope;

/// Typed description of one event: what the host sends and what it expects back.
pub trait ExtensionEvent {
    const NAME: EventName;
    type Args: DeserializeOwned;
    type Output: Serialize;
}

/// Returned when parsing a string that names no known event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown extension event: {0}")]
pub struct UnknownEventError(pub String);

macro_rules! extension_events {
    ($(
        $(#[$meta:meta])*
        $variant:ident = $wire:literal, $scope:expr, ($args:ty) -> $output:ty;
    )*) => {
        /// Name of an event an extension can handle.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum EventName {
            $(
                $(#[$meta])*
                #[serde(rename = $wire)]
                $variant,
            )*
        }

        /// Wire names of every event, in declaration order.
        pub const KNOWN_EVENTS: &[&str] = &[$($wire),*];

        impl EventName {
            pub const ALL: &'static [EventName] = &[$(EventName::$variant),*];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(EventName::$variant => $wire,)*
                }
            }

            /// Provider scope implied by handling this event, if any.
            pub fn scope(self) -> Option<ProviderScope> {
                match self {
                    $(EventName::$variant => $scope,)*
                }
            }
        }

        impl FromStr for EventName {
            type Err = UnknownEventError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok(EventName::$variant),)*
                    other => Err(UnknownEventError(other.to_string())),
                }
            }
        }

        /// One descriptor type per event, for use with typed registration.
        pub mod event {
            use super::*;

            $(
                $(#[$meta])*
                #[derive(Debug, Clone, Copy, Default)]
                pub struct $variant;

                impl ExtensionEvent for $variant {
                    const NAME: EventName = EventName::$variant;
                    type Args = $args;
                    type Output = $output;
                }
            )*
        }
    };
}

use ProviderScope as S;

extension_events! {
    GetAccounts = "getAccounts", Some(S::Accounts), (()) -> Vec<AccountDetails>;
    PerformAccountLogin = "performAccountLogin", Some(S::Accounts), (AccountLoginArgs) -> String;
    OnOauthSuccess = "onOauthSuccess", Some(S::Accounts), (String) -> ();
    OnScrobble = "onScrobble", Some(S::Scrobbles), (Song) -> ();
    OnPlaylistRemoved = "onPlaylistRemoved", Some(S::Playlists), (Playlist) -> ();
    OnPlaylistAdded = "onPlaylistAdded", Some(S::Playlists), (Playlist) -> ();
    OnSongRemoved = "onSongRemoved", None, (Song) -> ();
    OnSongAdded = "onSongAdded", None, (Song) -> ();
    OnPreferencesChanged = "onPreferencesChanged", None, (PreferenceArgs) -> ();
    OnSeeked = "onSeeked", Some(S::PlaybackDetails), (f64) -> ();
    OnSongChanged = "onSongChanged", Some(S::PlaybackDetails), (Option<Song>) -> ();
    OnPlayerStateChanged = "onPlayerStateChanged", Some(S::PlaybackDetails), (PlayerState) -> ();
    OnQueueChanged = "onQueueChanged", Some(S::PlaybackDetails), (Value) -> ();
    OnVolumeChanged = "onVolumeChanged", Some(S::PlaybackDetails), (Option<f64>) -> ();
    GetPlaylists = "getPlaylists", Some(S::Playlists), (()) -> PlaylistsReturnType;
    GetPlaylistContent = "getPlaylistContent", Some(S::PlaylistSongs),
        (PagedQuery<String>) -> SongsWithPageTokenReturnType;
    GetPlaylistFromUrl = "getPlaylistFromUrl", Some(S::PlaylistFromUrl),
        (String) -> PlaylistAndSongsReturnType;
    GetPlaybackDetails = "getPlaybackDetails", Some(S::PlaybackDetails),
        (Song) -> PlaybackDetailsReturnType;
    GetSearch = "getSearch", Some(S::Search), (String) -> SearchReturnType;
    GetRecommendations = "getRecommendations", Some(S::Recommendations),
        (()) -> RecommendationsReturnType;
    GetSongFromUrl = "getSongFromUrl", Some(S::SongFromUrl), (String) -> SongReturnType;
    GetStreamUrl = "getStreamUrl", None, (String) -> StreamUrlReturnType;
    GetArtistSongs = "getArtistSongs", Some(S::ArtistSongs),
        (PagedQuery<Artist>) -> SongsWithPageTokenReturnType;
    GetAlbumSongs = "getAlbumSongs", Some(S::AlbumSongs),
        (PagedQuery<Album>) -> SongsWithPageTokenReturnType;
    GetSongFromId = "getSongFromId", None, (String) -> SongReturnType;
    GetSongContextMenu = "getSongContextMenu", Some(S::SongContextMenu),
        (Vec<Song>) -> Vec<ContextMenuReturnType>;
    GetPlaylistContextMenu = "getPlaylistContextMenu", Some(S::PlaylistContextMenu),
        (Playlist) -> Vec<ContextMenuReturnType>;
    OnContextMenuAction = "onContextMenuAction", None, (String) -> ();
    GetLyrics = "getLyrics", Some(S::Lyrics), (Song) -> String;
    /// Answered automatically from the registered events unless handled explicitly.
    GetProviderScopes = "getProviderScopes", None, (()) -> Vec<ProviderScope>;
    /// Older name of `getSearch`.
    Search = "search", None, (String) -> SearchReturnType;
    /// Older name of `getStreamUrl`.
    HandleCustomRequest = "handleCustomRequest", None, (String) -> StreamUrlReturnType;
    /// Older name of `onScrobble`.
    Scrobble = "scrobble", None, (Song) -> ();
    /// Older name of `onOauthSuccess`.
    OauthCallback = "oauthCallback", None, (String) -> ();
}

impl EventName {
    /// The current event a legacy name stands for; other events map to themselves.
    pub fn canonical(self) -> EventName {
        match self {
            EventName::Search => EventName::GetSearch,
            EventName::HandleCustomRequest => EventName::GetStreamUrl,
            EventName::Scrobble => EventName::OnScrobble,
            EventName::OauthCallback => EventName::OnOauthSuccess,
            other => other,
        }
    }

    pub fn is_legacy(self) -> bool {
        self.canonical() != self
    }
}

impl std::fmt::Display for EventName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
