//! Commands an extension sends to the host.
//!
//! A command travels as a single-key JSON object whose key is the PascalCase
//! command name and whose value is the argument, or `[]` when the command
//! takes none: `{"GetSong": {...}}`, `{"GetCurrentSong": []}`. This is
//! serde's externally tagged representation, with zero-argument commands
//! written as empty tuple variants.

use serde::{Deserialize, Serialize};

use crate::entities::{EntityApiOptions, Playlist, Song, SongApiOptions};
use crate::extensions::{AddToPlaylistRequest, PreferenceData};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MainCommand {
    GetSong(SongApiOptions),
    GetEntity(EntityApiOptions),
    GetCurrentSong(),
    GetPlayerState(),
    GetVolume(),
    GetTime(),
    GetQueue(),
    GetPreference(PreferenceData),
    GetPreferenceValue(PreferenceData),
    SetPreference(PreferenceData),
    GetSecure(PreferenceData),
    GetSecureValue(PreferenceData),
    SetSecure(PreferenceData),
    AddSongs(Vec<Song>),
    RemoveSong(Song),
    UpdateSong(Song),
    AddPlaylist(Playlist),
    AddToPlaylist(AddToPlaylistRequest),
    RegisterOAuth(String),
    OpenExternalUrl(String),
    UpdateAccounts(),
}

impl MainCommand {
    /// The API method name that issues this command.
    pub fn method_name(&self) -> &'static str {
        match self {
            Self::GetSong(_) => "getSong",
            Self::GetEntity(_) => "getEntity",
            Self::GetCurrentSong() => "getCurrentSong",
            Self::GetPlayerState() => "getPlayerState",
            Self::GetVolume() => "getVolume",
            Self::GetTime() => "getTime",
            Self::GetQueue() => "getQueue",
            Self::GetPreference(_) => "getPreference",
            Self::GetPreferenceValue(_) => "getPreferenceValue",
            Self::SetPreference(_) => "setPreference",
            Self::GetSecure(_) => "getSecure",
            Self::GetSecureValue(_) => "getSecureValue",
            Self::SetSecure(_) => "setSecure",
            Self::AddSongs(_) => "addSongs",
            Self::RemoveSong(_) => "removeSong",
            Self::UpdateSong(_) => "updateSong",
            Self::AddPlaylist(_) => "addPlaylist",
            Self::AddToPlaylist(_) => "addToPlaylist",
            Self::RegisterOAuth(_) => "registerOAuth",
            Self::OpenExternalUrl(_) => "openExternalUrl",
            Self::UpdateAccounts() => "updateAccounts",
        }
    }

    /// The envelope key: the method name with its first character upper-cased.
    pub fn tag(&self) -> String {
        camel_to_pascal(self.method_name())
    }

    /// Serialize into the single-key envelope sent to the host.
    pub fn to_envelope(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Upper-case the first character of a camelCase identifier.
pub fn camel_to_pascal(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
