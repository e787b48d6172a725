//! Extism exports: one wrapper per extension event plus the bootstrap used
//! by [`extension!`](crate::extension).

use std::cell::RefCell;
use std::rc::Rc;

use extism_pdk::{plugin_fn, FnResult};

use crate::bridge::{ExtismHost, HostBridge};
use crate::config::EdkConfig;
use crate::dispatch::{Export, Extension};

thread_local! {
    static INSTALLED: RefCell<Option<Rc<Extension>>> = const { RefCell::new(None) };
}

/// Make `extension` the one answering host calls for this instance.
pub fn install(extension: Extension) {
    INSTALLED.with(|slot| *slot.borrow_mut() = Some(Rc::new(extension)));
}

fn installed() -> Option<Rc<Extension>> {
    INSTALLED.with(|slot| slot.borrow().clone())
}

/// Body of the generated `entry` export.
#[doc(hidden)]
pub fn start<F>(ctor: F) -> i32
where
    F: FnOnce(Rc<dyn HostBridge>) -> Extension,
{
    let host: Rc<dyn HostBridge> = Rc::new(ExtismHost);
    let config = EdkConfig::from_bridge(host.as_ref());
    crate::logging::init(&config);

    let extension = ctor(host);
    tracing::info!(extension = %extension.name(), "extension started");
    install(extension);
    0
}

fn dispatch(export: Export, input: &[u8]) -> String {
    match installed() {
        Some(extension) => extension.handle_bytes(export, input),
        None => {
            tracing::error!(export = %export, "called before an extension was installed");
            "null".to_string()
        }
    }
}

macro_rules! wrappers {
    ($($fn_name:ident => $export:ident,)*) => {
        $(
            #[plugin_fn]
            pub fn $fn_name(input: Vec<u8>) -> FnResult<String> {
                Ok(dispatch(Export::$export, &input))
            }
        )*
    };
}

wrappers! {
    get_provider_scopes_wrapper => GetProviderScopes,
    get_playlists_wrapper => GetPlaylists,
    get_playlist_content_wrapper => GetPlaylistContent,
    get_playlist_from_url_wrapper => GetPlaylistFromUrl,
    get_playback_details_wrapper => GetPlaybackDetails,
    search_wrapper => Search,
    get_recommendations_wrapper => GetRecommendations,
    get_song_from_url_wrapper => GetSongFromUrl,
    handle_custom_request_wrapper => HandleCustomRequest,
    get_artist_songs_wrapper => GetArtistSongs,
    get_album_songs_wrapper => GetAlbumSongs,
    get_song_from_id_wrapper => GetSongFromId,
    on_queue_changed_wrapper => OnQueueChanged,
    on_volume_changed_wrapper => OnVolumeChanged,
    on_player_state_changed_wrapper => OnPlayerStateChanged,
    on_song_changed_wrapper => OnSongChanged,
    on_seeked_wrapper => OnSeeked,
    on_preferences_changed_wrapper => OnPreferencesChanged,
    on_song_added_wrapper => OnSongAdded,
    on_song_removed_wrapper => OnSongRemoved,
    on_playlist_added_wrapper => OnPlaylistAdded,
    on_playlist_removed_wrapper => OnPlaylistRemoved,
    get_accounts_wrapper => GetAccounts,
    perform_account_login_wrapper => PerformAccountLogin,
    scrobble_wrapper => Scrobble,
    oauth_callback_wrapper => OauthCallback,
    get_song_context_menu_wrapper => GetSongContextMenu,
    get_playlist_context_menu_wrapper => GetPlaylistContextMenu,
    on_context_menu_action_wrapper => OnContextMenuAction,
    get_lyrics_wrapper => GetLyrics,
}
