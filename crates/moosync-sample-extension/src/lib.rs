//! Internet radio for Moosync.
//!
//! A small extension built on `moosync-edk`: a fixed catalog of stations
//! browsable as playlists, artists and albums, a directory account with an
//! OAuth login, context menu actions that import stations into the library,
//! and now-playing announcements over a host socket.

pub mod catalog;
pub mod radio;

use std::rc::Rc;

use moosync_edk::{Extension, HostBridge};
use moosync_types::event;

use crate::radio::Radio;

pub const PACKAGE_NAME: &str = "moosync.sample.radio";

/// Wire each event to the `Radio` method of the same purpose.
macro_rules! route {
    ($builder:expr, $radio:expr, { $($event:ident => $method:ident,)* }) => {
        $builder
            $(.on::<event::$event, _, _>({
                let radio = Rc::clone(&$radio);
                move |args| {
                    let radio = Rc::clone(&radio);
                    async move { radio.$method(args) }
                }
            }))*
    };
}

/// Build the extension on top of `host`.
pub fn build(host: Rc<dyn HostBridge>) -> Extension {
    let builder = Extension::builder(PACKAGE_NAME, host);
    let radio = Rc::new(Radio::new(builder.api()));

    route!(builder, radio, {
        GetAccounts => accounts,
        PerformAccountLogin => login,
        OnOauthSuccess => oauth_success,
        OnScrobble => scrobble,
        OnPlaylistRemoved => playlist_removed,
        OnPlaylistAdded => playlist_added,
        OnSongRemoved => song_removed,
        OnSongAdded => song_added,
        OnPreferencesChanged => preferences_changed,
        OnSeeked => seeked,
        OnSongChanged => song_changed,
        OnPlayerStateChanged => player_state_changed,
        OnQueueChanged => queue_changed,
        OnVolumeChanged => volume_changed,
        GetPlaylists => playlists,
        GetPlaylistContent => playlist_content,
        GetPlaylistFromUrl => playlist_from_url,
        GetPlaybackDetails => playback_details,
        GetSearch => search,
        GetRecommendations => recommendations,
        GetSongFromUrl => song_from_url,
        GetStreamUrl => stream_url,
        GetArtistSongs => artist_songs,
        GetAlbumSongs => album_songs,
        GetSongFromId => song_from_id,
        GetSongContextMenu => song_context_menu,
        GetPlaylistContextMenu => playlist_context_menu,
        OnContextMenuAction => context_menu_action,
        GetLyrics => lyrics,
    })
    .build()
}

moosync_edk::extension!(build);
