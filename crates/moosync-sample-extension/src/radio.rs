//! Event handlers of the radio extension.
//!
//! Each method takes the event's decoded argument and returns its typed
//! result; `lib.rs` wires them to the events.

use std::rc::Rc;

use moosync_edk::polyfill::{
    btoa, digest, fetch, Callback, CustomEvent, DigestAlgorithm, Event, EventInit, EventListener,
    EventTarget, RequestInit,
};
use moosync_edk::{Api, EdkError, ExtensionLogger, Result};
use moosync_types::{
    AccountDetails, AccountLoginArgs, AddToPlaylistRequest, Album, Artist, ContextMenuReturnType,
    EntityApiOptions, EntityFilter, EntitySelector, ExtensionRef, Genre, PagedQuery,
    PlaybackDetailsReturnType, PlayerState, Playlist, PlaylistAndSongsReturnType,
    PlaylistsReturnType, PreferenceArgs, PreferenceData, RecommendationsReturnType,
    SearchReturnType, SearchableSong, Song, SongApiOptions, SongReturnType,
    SongsWithPageTokenReturnType, StreamUrlReturnType,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::catalog::{self, CatalogError, Station, STATIONS, STATION_SCHEME};
use crate::PACKAGE_NAME;

pub const ACCOUNT_ID: &str = "radio-directory";
pub const TOKEN_KEY: &str = "directory_token";
pub const LAST_SCROBBLE_KEY: &str = "last_scrobble";
pub const ANNOUNCE_SOCKET_KEY: &str = "announce_socket";
pub const OAUTH_PATH: &str = "radio-directory";
pub const AUTH_URL: &str = "https://directory.example.com/oauth/authorize";

pub const ACTION_IMPORT: &str = "import_stations";
pub const ACTION_FORGET: &str = "forget_current";
pub const ACTION_REFRESH: &str = "refresh_artwork";

/// Songs per page for the paginated song events.
pub const PAGE_SIZE: usize = 2;

const SONG_CHANGED: &str = "songchanged";

/// Metadata served by station directories at `https://` URLs.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StationInfo {
    name: String,
    stream_url: String,
    #[serde(default)]
    genre: Option<String>,
}

pub struct Radio {
    api: Api,
    log: ExtensionLogger,
    bus: EventTarget,
}

impl Radio {
    pub fn new(api: Api) -> Self {
        let bus = EventTarget::new();
        bus.add_event_listener(
            SONG_CHANGED,
            Callback::object(Rc::new(Announcer { api: api.clone() })),
            false,
        );
        Self {
            log: ExtensionLogger::new("radio", api.clone()),
            api,
            bus,
        }
    }

    // ── Accounts ──────────────────────────────────────────────────────

    pub fn accounts(&self, _: ()) -> Result<Vec<AccountDetails>> {
        let token = self.api.get_secure_value::<String>(TOKEN_KEY, None)?;
        Ok(vec![AccountDetails {
            id: ACCOUNT_ID.to_string(),
            package_name: PACKAGE_NAME.to_string(),
            name: "Radio Directory".to_string(),
            bg_color: "#1d3557".to_string(),
            icon: String::new(),
            logged_in: token.is_some(),
            username: token.map(|_| "listener".to_string()),
        }])
    }

    pub fn login(&self, args: AccountLoginArgs) -> Result<String> {
        if args.account_id != ACCOUNT_ID {
            return Err(EdkError::handler(format!("unknown account {}", args.account_id)));
        }

        if !args.login_status {
            self.api
                .set_secure(PreferenceData::set(TOKEN_KEY, Value::Null))?;
            self.api.update_accounts()?;
            return Ok("Logged out".to_string());
        }

        let existing: Option<String> = self.api.get_secure(PreferenceData::key(TOKEN_KEY))?;
        if existing.is_some() {
            return Ok("Already logged in".to_string());
        }

        self.api.register_oauth(OAUTH_PATH)?;
        let state = btoa(&format!("{}:{}", args.package_name, args.account_id))?;
        self.api.open_external_url(&format!(
            "{AUTH_URL}?client_id={PACKAGE_NAME}&redirect_uri=moosync://{OAUTH_PATH}&state={state}"
        ))?;
        Ok("Opened login page in browser".to_string())
    }

    pub fn oauth_success(&self, url: String) -> Result<()> {
        let Some(code) = url
            .split_once("code=")
            .and_then(|(_, rest)| rest.split('&').next())
            .filter(|code| !code.is_empty())
        else {
            self.log.warn(format_args!("OAuth callback without a code: {url}"));
            return Ok(());
        };

        self.api.set_secure(PreferenceData::set(TOKEN_KEY, json!(code)))?;
        self.api.update_accounts()?;
        self.log.info("logged in to the radio directory");
        Ok(())
    }

    pub fn scrobble(&self, song: Song) -> Result<()> {
        let at = self.api.system_time()?;
        self.api.set_preference(PreferenceData::set(
            LAST_SCROBBLE_KEY,
            json!({ "id": song.id, "title": song.title, "at": at }),
        ))
    }

    // ── Library and player notifications ──────────────────────────────

    pub fn playlist_added(&self, playlist: Playlist) -> Result<()> {
        self.log
            .info(format_args!("playlist added: {}", playlist.playlist_name));
        Ok(())
    }

    pub fn playlist_removed(&self, playlist: Playlist) -> Result<()> {
        self.log
            .info(format_args!("playlist removed: {}", playlist.playlist_name));
        Ok(())
    }

    pub fn song_added(&self, song: Song) -> Result<()> {
        self.log.debug(format_args!("song added: {}", song.title));
        Ok(())
    }

    pub fn song_removed(&self, song: Song) -> Result<()> {
        self.log.debug(format_args!("song removed: {}", song.title));
        Ok(())
    }

    pub fn preferences_changed(&self, args: PreferenceArgs) -> Result<()> {
        if args.key == ANNOUNCE_SOCKET_KEY {
            self.log
                .info(format_args!("now playing announcements go to {}", args.value));
        } else {
            self.log.debug(format_args!("preference {} changed", args.key));
        }
        Ok(())
    }

    pub fn seeked(&self, time: f64) -> Result<()> {
        let state = self.api.get_player_state()?;
        let position = self.api.get_time()?;
        self.log.debug(format_args!(
            "seeked to {time}s while {state:?}, host reports {position}s"
        ));
        Ok(())
    }

    /// Announces the new song to listeners on the internal bus.
    pub fn song_changed(&self, song: Option<Song>) -> Result<()> {
        let event = CustomEvent::new(SONG_CHANGED, EventInit::default(), song);
        self.bus.dispatch_event(&event);
        Ok(())
    }

    pub fn player_state_changed(&self, state: PlayerState) -> Result<()> {
        self.log.info(format_args!("player is now {state:?}"));
        Ok(())
    }

    pub fn queue_changed(&self, queue: Value) -> Result<()> {
        let queue = if queue.is_null() {
            self.api.get_queue()?
        } else {
            queue
        };
        let entries = queue
            .get("songQueue")
            .and_then(Value::as_array)
            .map_or(0, Vec::len);
        self.log.debug(format_args!("queue changed: {entries} entries"));
        Ok(())
    }

    pub fn volume_changed(&self, volume: Option<f64>) -> Result<()> {
        let volume = match volume {
            Some(volume) => volume,
            None => self.api.get_volume()?,
        };
        self.log.debug(format_args!("volume is {volume}"));
        Ok(())
    }

    // ── Browsing ──────────────────────────────────────────────────────

    pub fn playlists(&self, _: ()) -> Result<PlaylistsReturnType> {
        Ok(PlaylistsReturnType {
            playlists: catalog::genres()
                .into_iter()
                .map(catalog::genre_playlist)
                .collect(),
        })
    }

    pub fn playlist_content(
        &self,
        query: PagedQuery<String>,
    ) -> Result<SongsWithPageTokenReturnType> {
        let genre = catalog::genre_for_url(&query.item).map_err(EdkError::handler)?;
        Ok(page(
            catalog::in_genre(genre).map(Station::song).collect(),
            query.next_page_token.as_ref(),
        ))
    }

    pub fn playlist_from_url(&self, url: String) -> Result<PlaylistAndSongsReturnType> {
        match catalog::genre_for_url(&url) {
            Ok(genre) => Ok(PlaylistAndSongsReturnType {
                playlist: Some(catalog::genre_playlist(genre)),
                songs: Some(catalog::in_genre(genre).map(Station::song).collect()),
            }),
            Err(CatalogError::UnsupportedUrl(_)) => Ok(PlaylistAndSongsReturnType::default()),
            Err(e) => Err(EdkError::handler(e)),
        }
    }

    pub fn artist_songs(&self, query: PagedQuery<Artist>) -> Result<SongsWithPageTokenReturnType> {
        let network = query.item.artist_name.unwrap_or_default();
        let songs = STATIONS
            .iter()
            .filter(|s| s.network.eq_ignore_ascii_case(&network))
            .map(Station::song)
            .collect();
        Ok(page(songs, query.next_page_token.as_ref()))
    }

    pub fn album_songs(&self, query: PagedQuery<Album>) -> Result<SongsWithPageTokenReturnType> {
        let genre = query
            .item
            .album_id
            .as_deref()
            .and_then(|id| id.strip_prefix("radio-genre:"))
            .unwrap_or_default();
        let songs = catalog::in_genre(genre).map(Station::song).collect();
        Ok(page(songs, query.next_page_token.as_ref()))
    }

    pub fn search(&self, term: String) -> Result<SearchReturnType> {
        let stations = catalog::search(&term);
        let mut songs: Vec<Song> = stations.iter().map(|s| s.song()).collect();

        let saved = self.api.get_song(SongApiOptions {
            song: Some(SearchableSong {
                title: Some(format!("%{term}%")),
                extension: Some(ExtensionRef::Package(PACKAGE_NAME.to_string())),
                ..SearchableSong::default()
            }),
            ..SongApiOptions::default()
        })?;
        for song in saved {
            if !songs.iter().any(|s| s.id == song.id) {
                songs.push(song);
            }
        }

        let mut networks: Vec<&str> = stations.iter().map(|s| s.network).collect();
        networks.dedup();
        let term = term.trim().to_lowercase();
        Ok(SearchReturnType {
            songs,
            artists: networks.into_iter().map(catalog::network_artist).collect(),
            playlists: catalog::genres()
                .into_iter()
                .filter(|g| !term.is_empty() && g.contains(&term))
                .map(catalog::genre_playlist)
                .collect(),
            ..SearchReturnType::default()
        })
    }

    /// Stations in genres the user's library already has, excluding the
    /// one playing. Falls back to every other station.
    pub fn recommendations(&self, _: ()) -> Result<RecommendationsReturnType> {
        let genres: Vec<Genre> = self.api.get_entity(EntityApiOptions {
            selector: EntitySelector::Genre(EntityFilter::All(true)),
            inclusive: None,
            invert: None,
        })?;
        let playing = self.api.get_current_song()?.map(|s| s.id);

        let liked: Vec<String> = genres.iter().map(|g| g.genre_name.to_lowercase()).collect();
        let others = STATIONS
            .iter()
            .filter(|s| playing.as_deref() != Some(s.url().as_str()));
        let mut songs: Vec<Song> = others
            .clone()
            .filter(|s| liked.iter().any(|g| g == s.genre))
            .map(Station::song)
            .collect();
        if songs.is_empty() {
            songs = others.map(Station::song).collect();
        }
        Ok(RecommendationsReturnType { songs })
    }

    // ── Playback ──────────────────────────────────────────────────────

    pub fn song_from_id(&self, id: String) -> Result<SongReturnType> {
        Ok(SongReturnType {
            song: catalog::station_for_url(&id).ok().map(Station::song),
        })
    }

    /// `radio://` URLs come from the catalog; `https://` URLs are looked
    /// up as station directory entries.
    pub fn song_from_url(&self, url: String) -> Result<SongReturnType> {
        if url.starts_with(STATION_SCHEME) {
            return self.song_from_id(url);
        }
        if !url.starts_with("https://") {
            return Ok(SongReturnType::default());
        }

        let response = fetch(
            self.api.bridge(),
            &url,
            RequestInit::default().header("Accept", "application/json"),
        )?;
        let info: StationInfo = response.json()?;
        let mut song = Song::new(url.clone(), info.name, moosync_types::PlayerType::Url);
        song.url = Some(url);
        song.playback_url = Some(info.stream_url);
        song.genre = info.genre.map(|g| vec![g]);
        song.duration = -1.0;
        Ok(SongReturnType { song: Some(song) })
    }

    pub fn playback_details(&self, song: Song) -> Result<PlaybackDetailsReturnType> {
        let url = match catalog::station_for_url(&song.id) {
            Ok(station) => station.stream_url.to_string(),
            Err(e) => song.playback_url.ok_or_else(|| EdkError::handler(e))?,
        };
        Ok(PlaybackDetailsReturnType { duration: 0.0, url })
    }

    pub fn stream_url(&self, url: String) -> Result<StreamUrlReturnType> {
        let station = catalog::station_for_url(&url).map_err(EdkError::handler)?;
        Ok(StreamUrlReturnType::Redirect {
            mime_type: Some("audio/mpeg".to_string()),
            redirect_url: station.stream_url.to_string(),
        })
    }

    /// Station notes saved as lyrics, keyed by a hash of the song id.
    pub fn lyrics(&self, song: Song) -> Result<String> {
        let key = lyrics_key(&self.api, &song.id)?;
        let notes: Option<String> = self
            .api
            .get_preference(PreferenceData::with_default(key, Some(json!(""))))?;
        Ok(notes.unwrap_or_default())
    }

    // ── Context menus ─────────────────────────────────────────────────

    pub fn song_context_menu(&self, songs: Vec<Song>) -> Result<Vec<ContextMenuReturnType>> {
        if !songs.iter().any(|s| s.id.starts_with(STATION_SCHEME)) {
            return Ok(Vec::new());
        }
        Ok(vec![
            menu_item("Add all stations to library", ACTION_IMPORT),
            menu_item("Forget current station", ACTION_FORGET),
        ])
    }

    pub fn playlist_context_menu(&self, playlist: Playlist) -> Result<Vec<ContextMenuReturnType>> {
        if playlist.extension.as_deref() != Some(PACKAGE_NAME) {
            return Ok(Vec::new());
        }
        Ok(vec![menu_item("Refresh station artwork", ACTION_REFRESH)])
    }

    pub fn context_menu_action(&self, action: String) -> Result<()> {
        match action.as_str() {
            ACTION_IMPORT => self.import_stations(),
            ACTION_FORGET => self.forget_current(),
            ACTION_REFRESH => self.refresh_current(),
            other => {
                self.log.warn(format_args!("unknown context menu action {other}"));
                Ok(())
            }
        }
    }

    fn import_stations(&self) -> Result<()> {
        let stored = self
            .api
            .add_songs(STATIONS.iter().map(Station::song).collect())?;
        let songs: Vec<Song> = stored.into_iter().flatten().collect();

        let playlist_id = self.api.add_playlist(Playlist {
            playlist_name: "Radio stations".to_string(),
            extension: Some(PACKAGE_NAME.to_string()),
            ..Playlist::default()
        })?;
        self.log
            .info(format_args!("imported {} stations", songs.len()));
        self.api
            .add_to_playlist(AddToPlaylistRequest { playlist_id, songs })
    }

    fn forget_current(&self) -> Result<()> {
        match self.api.get_current_song()? {
            Some(song) if song.id.starts_with(STATION_SCHEME) => self.api.remove_song(song),
            _ => Ok(()),
        }
    }

    fn refresh_current(&self) -> Result<()> {
        let Some(mut song) = self.api.get_current_song()? else {
            return Ok(());
        };
        let Ok(station) = catalog::station_for_url(&song.id) else {
            return Ok(());
        };
        song.song_cover_path_high = Some(format!(
            "https://directory.example.com/art/{}.png",
            station.id
        ));
        self.api.update_song(song)
    }
}

// ─── Now playing announcements ──────────────────────────────────────────

/// Writes the new song to the socket named by the `announce_socket`
/// preference, when set.
struct Announcer {
    api: Api,
}

impl Announcer {
    fn announce(&self, song: &Song) -> Result<()> {
        let Some(path) = self
            .api
            .get_preference_value::<String>(ANNOUNCE_SOCKET_KEY, None)?
        else {
            return Ok(());
        };

        let sock = self.api.open_sock(&path)?;
        let at = self.api.system_time()?;
        let line = format!("{}\n", json!({ "id": song.id, "title": song.title, "at": at }));
        self.api.write_sock(sock, line.as_bytes())?;
        let ack = self.api.read_sock(sock, 0)?;
        tracing::debug!(
            sock_id = sock.id(),
            ack = %String::from_utf8_lossy(&ack),
            "announced now playing"
        );
        Ok(())
    }
}

impl EventListener for Announcer {
    fn handle_event(&self, event: &Event) {
        let Some(Some(song)) = event.detail::<Option<Song>>() else {
            return;
        };
        if let Err(e) = self.announce(song) {
            tracing::warn!(song = %song.id, "now playing announcement failed: {e}");
        }
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────

/// One page of `songs` starting at the offset carried by `token`.
fn page(songs: Vec<Song>, token: Option<&Value>) -> SongsWithPageTokenReturnType {
    let offset = token.and_then(Value::as_u64).unwrap_or(0) as usize;
    let end = offset.saturating_add(PAGE_SIZE).min(songs.len());
    SongsWithPageTokenReturnType {
        songs: songs.get(offset..end).map(<[Song]>::to_vec).unwrap_or_default(),
        next_page_token: (end < songs.len()).then(|| json!(end)),
    }
}

fn menu_item(name: &str, action_id: &str) -> ContextMenuReturnType {
    ContextMenuReturnType {
        name: name.to_string(),
        icon: String::new(),
        action_id: action_id.to_string(),
    }
}

/// Preference key holding notes for `song_id`.
pub fn lyrics_key(api: &Api, song_id: &str) -> Result<String> {
    let hash = digest(api.bridge(), DigestAlgorithm::Sha256, song_id)?;
    let hex: String = hash.iter().map(|b| format!("{b:02x}")).collect();
    Ok(format!("notes_{hex}"))
}
