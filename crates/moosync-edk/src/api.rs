//! Command API for typed calls from an extension back into the host.
//!
//! Every call is a [`MainCommand`] serialized to its single-key envelope and
//! sent through `send_main_command`. The host's reply is parsed as JSON; a
//! malformed reply is an error for the caller, never silently swallowed.

use std::rc::Rc;

use moosync_types::{
    AddToPlaylistRequest, EntityApiOptions, MainCommand, PlayerState, Playlist, PreferenceData,
    PreferenceValue, Song, SongApiOptions,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::bridge::HostBridge;
use crate::config::EdkConfig;
use crate::error::{EdkError, Result};

/// Opaque id of a socket opened through the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SocketHandle(i64);

impl SocketHandle {
    pub fn id(self) -> i64 {
        self.0
    }
}

/// Handle for calling into the host. Cheap to clone.
#[derive(Clone)]
pub struct Api {
    bridge: Rc<dyn HostBridge>,
    config: Rc<EdkConfig>,
}

impl std::fmt::Debug for Api {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Api")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Api {
    pub fn new(bridge: Rc<dyn HostBridge>, config: EdkConfig) -> Self {
        Self {
            bridge,
            config: Rc::new(config),
        }
    }

    pub fn bridge(&self) -> &dyn HostBridge {
        self.bridge.as_ref()
    }

    pub fn config(&self) -> &EdkConfig {
        &self.config
    }

    // ─── Raw channel ────────────────────────────────────────────────────

    /// Send a command and return the host's reply as JSON.
    ///
    /// An empty reply is read as `null`.
    pub fn send(&self, command: &MainCommand) -> Result<Value> {
        let envelope = command.to_envelope()?;
        if self.config.log_commands {
            tracing::info!(command = %command.tag(), %envelope, "sending command to host");
        }

        let reply = self.bridge.send_main_command(&envelope)?;
        if reply.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&reply).map_err(|e| {
            tracing::warn!(command = %command.tag(), "host reply is not valid JSON: {e}");
            EdkError::Serialization(e)
        })
    }

    /// Send a command and decode the reply; `null` decodes to `T::default()`.
    fn request<T: DeserializeOwned + Default>(&self, command: MainCommand) -> Result<T> {
        match self.send(&command)? {
            Value::Null => Ok(T::default()),
            value => Ok(serde_json::from_value(value)?),
        }
    }

    fn notify(&self, command: MainCommand) -> Result<()> {
        self.send(&command).map(|_| ())
    }

    // ─── Library ────────────────────────────────────────────────────────

    /// Query songs from the host library.
    pub fn get_song(&self, options: SongApiOptions) -> Result<Vec<Song>> {
        self.request(MainCommand::GetSong(options))
    }

    /// Query artists, albums, genres or playlists. `T` is the entity type
    /// matching the selector in `options`.
    pub fn get_entity<T: DeserializeOwned>(&self, options: EntityApiOptions) -> Result<Vec<T>> {
        self.request(MainCommand::GetEntity(options))
    }

    /// Add songs to the library. Each slot holds the stored song, or `None`
    /// when the host rejected it.
    pub fn add_songs(&self, songs: Vec<Song>) -> Result<Vec<Option<Song>>> {
        self.request(MainCommand::AddSongs(songs))
    }

    pub fn remove_song(&self, song: Song) -> Result<()> {
        self.notify(MainCommand::RemoveSong(song))
    }

    pub fn update_song(&self, song: Song) -> Result<()> {
        self.notify(MainCommand::UpdateSong(song))
    }

    /// Create a playlist and return its id.
    pub fn add_playlist(&self, playlist: Playlist) -> Result<String> {
        self.request(MainCommand::AddPlaylist(playlist))
    }

    pub fn add_to_playlist(&self, request: AddToPlaylistRequest) -> Result<()> {
        self.notify(MainCommand::AddToPlaylist(request))
    }

    // ─── Player ─────────────────────────────────────────────────────────

    pub fn get_current_song(&self) -> Result<Option<Song>> {
        self.request(MainCommand::GetCurrentSong())
    }

    pub fn get_player_state(&self) -> Result<PlayerState> {
        self.request(MainCommand::GetPlayerState())
    }

    pub fn get_volume(&self) -> Result<f64> {
        self.request(MainCommand::GetVolume())
    }

    /// Current playback position in seconds.
    pub fn get_time(&self) -> Result<f64> {
        self.request(MainCommand::GetTime())
    }

    pub fn get_queue(&self) -> Result<Value> {
        self.request(MainCommand::GetQueue())
    }

    // ─── Preferences ────────────────────────────────────────────────────

    pub fn get_preference<T: DeserializeOwned>(&self, data: PreferenceData) -> Result<Option<T>> {
        self.request(MainCommand::GetPreference(data))
    }

    pub fn set_preference(&self, data: PreferenceData) -> Result<()> {
        self.notify(MainCommand::SetPreference(data))
    }

    pub fn get_secure<T: DeserializeOwned>(&self, data: PreferenceData) -> Result<Option<T>> {
        self.request(MainCommand::GetSecure(data))
    }

    pub fn set_secure(&self, data: PreferenceData) -> Result<()> {
        self.notify(MainCommand::SetSecure(data))
    }

    /// Read preference `key`, falling back to `default` on the host side.
    pub fn get_preference_value<T>(&self, key: &str, default: Option<T>) -> Result<Option<T>>
    where
        T: Serialize + DeserializeOwned,
    {
        let data = preference_lookup(key, default)?;
        self.unwrap_value(MainCommand::GetPreferenceValue(data))
    }

    /// Read secure preference `key`, falling back to `default` on the host side.
    pub fn get_secure_value<T>(&self, key: &str, default: Option<T>) -> Result<Option<T>>
    where
        T: Serialize + DeserializeOwned,
    {
        let data = preference_lookup(key, default)?;
        self.unwrap_value(MainCommand::GetSecureValue(data))
    }

    fn unwrap_value<T: DeserializeOwned>(&self, command: MainCommand) -> Result<Option<T>> {
        match self.send(&command)? {
            Value::Null => Ok(None),
            value => Ok(serde_json::from_value::<PreferenceValue<T>>(value)?.value),
        }
    }

    // ─── Accounts & UI ──────────────────────────────────────────────────

    /// Register `path` as the OAuth redirect path for this extension.
    pub fn register_oauth(&self, path: &str) -> Result<()> {
        self.notify(MainCommand::RegisterOAuth(path.to_string()))
    }

    pub fn open_external_url(&self, url: &str) -> Result<()> {
        self.notify(MainCommand::OpenExternalUrl(url.to_string()))
    }

    /// Ask the host to re-query `getAccounts`.
    pub fn update_accounts(&self) -> Result<()> {
        self.notify(MainCommand::UpdateAccounts())
    }

    // ─── Sockets & time ─────────────────────────────────────────────────

    pub fn open_sock(&self, path: &str) -> Result<SocketHandle> {
        let id = self.bridge.open_clientfd(path)?;
        if id < 0 {
            return Err(EdkError::Socket(format!("failed to open {path} ({id})")));
        }
        tracing::debug!(path = %path, sock_id = id, "socket opened");
        Ok(SocketHandle(id))
    }

    /// Write `buf`; returns what the host reports as written.
    pub fn write_sock(&self, sock: SocketHandle, buf: &[u8]) -> Result<i64> {
        let written = self.bridge.write_sock(sock.0, buf)?;
        if written < 0 {
            return Err(EdkError::Socket(format!(
                "write to socket {} failed ({written})",
                sock.0
            )));
        }
        Ok(written)
    }

    /// Read up to `len` bytes. Zero or anything above the configured limit
    /// reads the limit.
    pub fn read_sock(&self, sock: SocketHandle, len: u64) -> Result<Vec<u8>> {
        let limit = self.config.socket_read_limit;
        let len = if len == 0 || len > limit { limit } else { len };
        self.bridge.read_sock(sock.0, len)
    }

    /// Seconds since the Unix epoch, from the host clock.
    pub fn system_time(&self) -> Result<u64> {
        self.bridge.system_time()
    }
}

fn preference_lookup<T: Serialize>(key: &str, default: Option<T>) -> Result<PreferenceData> {
    let default = default.map(|d| serde_json::to_value(d)).transpose()?;
    Ok(PreferenceData::with_default(key, default))
}
