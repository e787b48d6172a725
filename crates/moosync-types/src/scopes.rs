//! Provider scopes an extension advertises to the host.

use serde::{Deserialize, Serialize};

/// A capability the host may query an extension for.
///
/// Ordering follows declaration order, which is also the order scopes are
/// reported in when derived from registered events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProviderScope {
    Search,
    Playlists,
    PlaylistSongs,
    ArtistSongs,
    AlbumSongs,
    Recommendations,
    Scrobbles,
    PlaylistFromUrl,
    SongFromUrl,
    PlaybackDetails,
    Lyrics,
    SongContextMenu,
    PlaylistContextMenu,
    Accounts,
}

impl ProviderScope {
    /// Every scope, in declaration order.
    pub const ALL: [ProviderScope; 14] = [
        Self::Search,
        Self::Playlists,
        Self::PlaylistSongs,
        Self::ArtistSongs,
        Self::AlbumSongs,
        Self::Recommendations,
        Self::Scrobbles,
        Self::PlaylistFromUrl,
        Self::SongFromUrl,
        Self::PlaybackDetails,
        Self::Lyrics,
        Self::SongContextMenu,
        Self::PlaylistContextMenu,
        Self::Accounts,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Playlists => "playlists",
            Self::PlaylistSongs => "playlistSongs",
            Self::ArtistSongs => "artistSongs",
            Self::AlbumSongs => "albumSongs",
            Self::Recommendations => "recommendations",
            Self::Scrobbles => "scrobbles",
            Self::PlaylistFromUrl => "playlistFromUrl",
            Self::SongFromUrl => "songFromUrl",
            Self::PlaybackDetails => "playbackDetails",
            Self::Lyrics => "lyrics",
            Self::SongContextMenu => "songContextMenu",
            Self::PlaylistContextMenu => "playlistContextMenu",
            Self::Accounts => "accounts",
        }
    }
}

impl std::fmt::Display for ProviderScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
