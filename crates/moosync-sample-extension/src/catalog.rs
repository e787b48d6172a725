//! Built-in station list.
//!
//! Every station is exposed as a `URL` song whose id and URL use the
//! `radio://station/<id>` scheme; genres are exposed as playlists
//! (`radio://genre/<genre>`) and networks as artists.

use moosync_types::{Album, Artist, PlayerType, Playlist, Song};
use thiserror::Error;

use crate::PACKAGE_NAME;

pub const STATION_SCHEME: &str = "radio://station/";
pub const GENRE_SCHEME: &str = "radio://genre/";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("unknown station: {0}")]
    UnknownStation(String),

    #[error("unknown genre: {0}")]
    UnknownGenre(String),

    #[error("not a radio URL: {0}")]
    UnsupportedUrl(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Station {
    pub id: &'static str,
    pub name: &'static str,
    pub genre: &'static str,
    pub network: &'static str,
    pub stream_url: &'static str,
}

pub const STATIONS: &[Station] = &[
    Station {
        id: "groove-salad",
        name: "Groove Salad",
        genre: "ambient",
        network: "SomaFM",
        stream_url: "https://ice1.somafm.com/groovesalad-128-mp3",
    },
    Station {
        id: "drone-zone",
        name: "Drone Zone",
        genre: "ambient",
        network: "SomaFM",
        stream_url: "https://ice1.somafm.com/dronezone-128-mp3",
    },
    Station {
        id: "deep-space-one",
        name: "Deep Space One",
        genre: "ambient",
        network: "SomaFM",
        stream_url: "https://ice1.somafm.com/deepspaceone-128-mp3",
    },
    Station {
        id: "radio-paradise",
        name: "Radio Paradise Main Mix",
        genre: "eclectic",
        network: "Radio Paradise",
        stream_url: "https://stream.radioparadise.com/mp3-192",
    },
    Station {
        id: "paradise-mellow",
        name: "Radio Paradise Mellow Mix",
        genre: "eclectic",
        network: "Radio Paradise",
        stream_url: "https://stream.radioparadise.com/mellow-192",
    },
    Station {
        id: "fip-jazz",
        name: "FIP Jazz",
        genre: "jazz",
        network: "Radio France",
        stream_url: "https://icecast.radiofrance.fr/fipjazz-midfi.mp3",
    },
];

pub fn genres() -> Vec<&'static str> {
    let mut genres: Vec<_> = STATIONS.iter().map(|s| s.genre).collect();
    genres.dedup();
    genres
}

pub fn station(id: &str) -> Result<&'static Station, CatalogError> {
    STATIONS
        .iter()
        .find(|s| s.id == id)
        .ok_or_else(|| CatalogError::UnknownStation(id.to_string()))
}

/// The station a `radio://station/<id>` URL (or bare id) points at.
pub fn station_for_url(url: &str) -> Result<&'static Station, CatalogError> {
    station(url.strip_prefix(STATION_SCHEME).unwrap_or(url))
}

pub fn genre_for_url(url: &str) -> Result<&'static str, CatalogError> {
    let genre = url
        .strip_prefix(GENRE_SCHEME)
        .ok_or_else(|| CatalogError::UnsupportedUrl(url.to_string()))?;
    genres()
        .into_iter()
        .find(|g| *g == genre)
        .ok_or_else(|| CatalogError::UnknownGenre(genre.to_string()))
}

pub fn in_genre(genre: &str) -> impl Iterator<Item = &'static Station> + '_ {
    STATIONS.iter().filter(move |s| s.genre == genre)
}

/// Case-insensitive match on name, genre or network.
pub fn search(term: &str) -> Vec<&'static Station> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return Vec::new();
    }
    STATIONS
        .iter()
        .filter(|s| {
            s.name.to_lowercase().contains(&term)
                || s.genre.contains(&term)
                || s.network.to_lowercase().contains(&term)
        })
        .collect()
}

// ─── Conversions ────────────────────────────────────────────────────────

impl Station {
    pub fn url(&self) -> String {
        format!("{STATION_SCHEME}{}", self.id)
    }

    pub fn song(&self) -> Song {
        let mut song = Song::new(self.url(), self.name, PlayerType::Url);
        song.url = Some(self.url());
        song.playback_url = Some(self.stream_url.to_string());
        song.genre = Some(vec![self.genre.to_string()]);
        song.artists = Some(vec![network_artist(self.network)]);
        song.album = Some(genre_album(self.genre));
        song.duration = -1.0;
        song
    }
}

pub fn genre_playlist(genre: &str) -> Playlist {
    Playlist {
        playlist_id: format!("{GENRE_SCHEME}{genre}"),
        playlist_name: format!("{} radio", capitalize(genre)),
        playlist_song_count: Some(in_genre(genre).count() as u64),
        extension: Some(PACKAGE_NAME.to_string()),
        ..Playlist::default()
    }
}

pub fn network_artist(network: &str) -> Artist {
    Artist {
        artist_id: format!("radio-network:{}", network.to_lowercase().replace(' ', "-")),
        artist_name: Some(network.to_string()),
        ..Artist::default()
    }
}

pub fn genre_album(genre: &str) -> Album {
    Album {
        album_id: Some(format!("radio-genre:{genre}")),
        album_name: Some(capitalize(genre)),
        ..Album::default()
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_station_ids_are_unique() {
        let mut ids: Vec<_> = STATIONS.iter().map(|s| s.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), STATIONS.len());
    }

    #[test]
    fn test_genres_in_catalog_order() {
        assert_eq!(genres(), vec!["ambient", "eclectic", "jazz"]);
    }

    #[test]
    fn test_station_for_url() {
        assert_eq!(station_for_url("radio://station/fip-jazz").unwrap().name, "FIP Jazz");
        assert_eq!(station_for_url("drone-zone").unwrap().genre, "ambient");
        assert_eq!(
            station_for_url("radio://station/nope"),
            Err(CatalogError::UnknownStation("nope".into()))
        );
    }

    #[test]
    fn test_genre_for_url() {
        assert_eq!(genre_for_url("radio://genre/jazz").unwrap(), "jazz");
        assert!(matches!(
            genre_for_url("https://example.com"),
            Err(CatalogError::UnsupportedUrl(_))
        ));
        assert!(matches!(
            genre_for_url("radio://genre/polka"),
            Err(CatalogError::UnknownGenre(_))
        ));
    }

    #[test]
    fn test_search() {
        let names: Vec<_> = search("PARADISE").iter().map(|s| s.id).collect();
        assert_eq!(names, vec!["radio-paradise", "paradise-mellow"]);
        assert_eq!(search("jazz").len(), 1);
        assert!(search("  ").is_empty());
    }

    #[test]
    fn test_station_song() {
        let song = station("groove-salad").unwrap().song();
        assert_eq!(song.id, "radio://station/groove-salad");
        assert_eq!(song.player_type, PlayerType::Url);
        assert_eq!(
            song.playback_url.as_deref(),
            Some("https://ice1.somafm.com/groovesalad-128-mp3")
        );
        assert_eq!(song.album.and_then(|a| a.album_name).as_deref(), Some("Ambient"));
    }

    #[test]
    fn test_genre_playlist() {
        let playlist = genre_playlist("ambient");
        assert_eq!(playlist.playlist_id, "radio://genre/ambient");
        assert_eq!(playlist.playlist_name, "Ambient radio");
        assert_eq!(playlist.playlist_song_count, Some(3));
    }
}
