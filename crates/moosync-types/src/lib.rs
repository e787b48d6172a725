//! Moosync extension wire types.
//!
//! Data shared between the Moosync host and extensions running in its WASM
//! sandbox: library entities, the closed set of host events an extension can
//! handle, the provider scopes those events imply, and the command envelope
//! extensions use to call back into the host.

pub mod commands;
pub mod entities;
pub mod events;
pub mod extensions;
pub mod scopes;

pub use commands::{camel_to_pascal, MainCommand};
pub use entities::{
    Album, Artist, ArtistExtraInfo, EntityApiOptions, EntityFilter, EntitySelector, ExtensionRef,
    Genre, PlayerState, PlayerType, Playlist, SearchableSong, Song, SongApiOptions, SongSortBy,
    SongSortOptions, SongYear,
};
pub use events::{event, EventName, ExtensionEvent, UnknownEventError, KNOWN_EVENTS};
pub use extensions::{
    AccountDetails, AccountLoginArgs, AddToPlaylistRequest, ContextMenuReturnType, PagedQuery,
    PlaybackDetailsReturnType, PlaylistAndSongsReturnType, PlaylistsReturnType, PreferenceArgs,
    PreferenceData, PreferenceValue, RecommendationsReturnType, SearchReturnType, SongReturnType,
    SongsWithPageTokenReturnType, StreamUrlReturnType,
};
pub use scopes::ProviderScope;
