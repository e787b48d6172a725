//! Export dispatch: turns a host call of an exported wrapper into a
//! handler invocation and a JSON reply.

use std::future::Future;
use std::rc::Rc;

use moosync_types::{EventName, ExtensionEvent};
use serde_json::Value;

use crate::api::Api;
use crate::bridge::HostBridge;
use crate::config::EdkConfig;
use crate::error::Result;
use crate::registry::EventRegistry;

// ─── Exports ────────────────────────────────────────────────────────────

macro_rules! exports {
    ($($variant:ident = $symbol:literal => $primary:ident $(| $legacy:ident)?;)*) => {
        /// A function the guest exports for the host to call.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Export {
            $($variant,)*
        }

        impl Export {
            pub const ALL: &'static [Export] = &[$(Export::$variant),*];

            /// Exported symbol name.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Export::$variant => $symbol,)*
                }
            }

            /// The event this export serves.
            pub fn event(self) -> EventName {
                match self {
                    $(Export::$variant => EventName::$primary,)*
                }
            }

            /// Older event name the export still answers for.
            pub fn legacy_event(self) -> Option<EventName> {
                match self {
                    $(Export::$variant => exports!(@legacy $($legacy)?),)*
                }
            }

            pub fn from_symbol(symbol: &str) -> Option<Export> {
                match symbol {
                    $($symbol => Some(Export::$variant),)*
                    _ => None,
                }
            }
        }
    };
    (@legacy $legacy:ident) => { Some(EventName::$legacy) };
    (@legacy) => { None };
}

exports! {
    GetProviderScopes = "get_provider_scopes_wrapper" => GetProviderScopes;
    GetPlaylists = "get_playlists_wrapper" => GetPlaylists;
    GetPlaylistContent = "get_playlist_content_wrapper" => GetPlaylistContent;
    GetPlaylistFromUrl = "get_playlist_from_url_wrapper" => GetPlaylistFromUrl;
    GetPlaybackDetails = "get_playback_details_wrapper" => GetPlaybackDetails;
    Search = "search_wrapper" => GetSearch | Search;
    GetRecommendations = "get_recommendations_wrapper" => GetRecommendations;
    GetSongFromUrl = "get_song_from_url_wrapper" => GetSongFromUrl;
    HandleCustomRequest = "handle_custom_request_wrapper" => GetStreamUrl | HandleCustomRequest;
    GetArtistSongs = "get_artist_songs_wrapper" => GetArtistSongs;
    GetAlbumSongs = "get_album_songs_wrapper" => GetAlbumSongs;
    GetSongFromId = "get_song_from_id_wrapper" => GetSongFromId;
    OnQueueChanged = "on_queue_changed_wrapper" => OnQueueChanged;
    OnVolumeChanged = "on_volume_changed_wrapper" => OnVolumeChanged;
    OnPlayerStateChanged = "on_player_state_changed_wrapper" => OnPlayerStateChanged;
    OnSongChanged = "on_song_changed_wrapper" => OnSongChanged;
    OnSeeked = "on_seeked_wrapper" => OnSeeked;
    OnPreferencesChanged = "on_preferences_changed_wrapper" => OnPreferencesChanged;
    OnSongAdded = "on_song_added_wrapper" => OnSongAdded;
    OnSongRemoved = "on_song_removed_wrapper" => OnSongRemoved;
    OnPlaylistAdded = "on_playlist_added_wrapper" => OnPlaylistAdded;
    OnPlaylistRemoved = "on_playlist_removed_wrapper" => OnPlaylistRemoved;
    GetAccounts = "get_accounts_wrapper" => GetAccounts;
    PerformAccountLogin = "perform_account_login_wrapper" => PerformAccountLogin;
    Scrobble = "scrobble_wrapper" => OnScrobble | Scrobble;
    OauthCallback = "oauth_callback_wrapper" => OnOauthSuccess | OauthCallback;
    GetSongContextMenu = "get_song_context_menu_wrapper" => GetSongContextMenu;
    GetPlaylistContextMenu = "get_playlist_context_menu_wrapper" => GetPlaylistContextMenu;
    OnContextMenuAction = "on_context_menu_action_wrapper" => OnContextMenuAction;
    GetLyrics = "get_lyrics_wrapper" => GetLyrics;
}

impl std::fmt::Display for Export {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Extension ──────────────────────────────────────────────────────────

/// A built extension: its handlers plus the API handle they call back through.
#[derive(Debug)]
pub struct Extension {
    name: String,
    registry: EventRegistry,
    api: Api,
}

impl Extension {
    /// Start building an extension, reading kit config from the host.
    pub fn builder(name: impl Into<String>, bridge: Rc<dyn HostBridge>) -> ExtensionBuilder {
        ExtensionBuilder::new(name, bridge)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn api(&self) -> &Api {
        &self.api
    }

    pub fn registry(&self) -> &EventRegistry {
        &self.registry
    }

    /// The event an export is routed to: its primary event when handled,
    /// else its legacy alias when that is handled, else the primary.
    pub fn resolve(&self, export: Export) -> EventName {
        let primary = export.event();
        match export.legacy_event() {
            Some(legacy) if !self.registry.contains(primary) && self.registry.contains(legacy) => {
                legacy
            }
            _ => primary,
        }
    }

    /// Parse the raw input and run the handler behind `export`.
    ///
    /// Absent or blank input reaches the handler as `None`.
    pub async fn call(&self, export: Export, input: Option<&str>) -> Result<Option<Value>> {
        let params = match input.map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(serde_json::from_str::<Value>(raw)?),
            _ => None,
        };
        let event = self.resolve(export);
        tracing::debug!(export = %export, event = %event, "dispatching export");
        self.registry.invoke(event, params).await
    }

    /// Run `export` to completion and produce the string written back to
    /// the host: the handler's JSON result, or `null` when it produced
    /// nothing or failed.
    pub fn handle(&self, export: Export, input: Option<&str>) -> String {
        match futures::executor::block_on(self.call(export, input)) {
            Ok(Some(value)) => value.to_string(),
            Ok(None) => Value::Null.to_string(),
            Err(e) => {
                tracing::error!(
                    extension = %self.name,
                    export = %export,
                    "event handler failed: {e}"
                );
                Value::Null.to_string()
            }
        }
    }

    /// [`handle`](Extension::handle) for raw input bytes as the host passes
    /// them. Input that is not UTF-8 is logged and answered with `null`.
    pub fn handle_bytes(&self, export: Export, input: &[u8]) -> String {
        match std::str::from_utf8(input) {
            Ok(raw) => self.handle(export, Some(raw)),
            Err(e) => {
                tracing::error!(
                    extension = %self.name,
                    export = %export,
                    "input is not valid UTF-8: {e}"
                );
                Value::Null.to_string()
            }
        }
    }
}

// ─── Builder ────────────────────────────────────────────────────────────

pub struct ExtensionBuilder {
    name: String,
    registry: EventRegistry,
    api: Api,
}

impl ExtensionBuilder {
    pub fn new(name: impl Into<String>, bridge: Rc<dyn HostBridge>) -> Self {
        let config = EdkConfig::from_bridge(bridge.as_ref());
        Self::with_config(name, bridge, config)
    }

    pub fn with_config(
        name: impl Into<String>,
        bridge: Rc<dyn HostBridge>,
        config: EdkConfig,
    ) -> Self {
        Self {
            name: name.into(),
            registry: EventRegistry::new(),
            api: Api::new(bridge, config),
        }
    }

    /// A handle handlers can capture to call back into the host.
    pub fn api(&self) -> Api {
        self.api.clone()
    }

    /// Handle event `E` with a typed handler.
    pub fn on<E, F, Fut>(mut self, handler: F) -> Self
    where
        E: ExtensionEvent + 'static,
        F: Fn(E::Args) -> Fut + 'static,
        Fut: Future<Output = Result<E::Output>> + 'static,
    {
        self.registry.on::<E, F, Fut>(handler);
        self
    }

    /// Handle `name` with an untyped JSON handler.
    pub fn on_raw<F, Fut>(mut self, name: EventName, handler: F) -> Self
    where
        F: Fn(Option<Value>) -> Fut + 'static,
        Fut: Future<Output = Result<Option<Value>>> + 'static,
    {
        self.registry.register(name, handler);
        self
    }

    pub fn build(self) -> Extension {
        tracing::info!(
            extension = %self.name,
            events = ?self.registry.events().collect::<Vec<_>>(),
            "extension built"
        );
        Extension {
            name: self.name,
            registry: self.registry,
            api: self.api,
        }
    }
}
