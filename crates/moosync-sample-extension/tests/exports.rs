// Drives the radio extension the way the host does: raw JSON into an
// export, raw JSON back out.

use std::rc::Rc;

use moosync_edk::testing::MockHost;
use moosync_edk::{Export, Extension};
use moosync_sample_extension::{build, PACKAGE_NAME};
use moosync_types::ProviderScope;
use serde_json::{json, Value};

fn extension() -> (Rc<MockHost>, Extension) {
    let host = Rc::new(MockHost::new().with_config("log_commands", "false"));
    let extension = build(host.clone());
    (host, extension)
}

fn call(extension: &Extension, export: Export, input: Option<&str>) -> Value {
    serde_json::from_str(&extension.handle(export, input)).unwrap()
}

#[test]
fn test_every_export_is_handled() {
    let (_, extension) = extension();
    assert_eq!(extension.name(), PACKAGE_NAME);
    for &export in Export::ALL {
        let event = extension.resolve(export);
        assert!(
            extension.registry().contains(event) || export == Export::GetProviderScopes,
            "{export} has no handler"
        );
    }
}

#[test]
fn test_provider_scopes_cover_everything() {
    let (_, extension) = extension();
    let scopes = call(&extension, Export::GetProviderScopes, None);
    let expected: Vec<&str> = ProviderScope::ALL.iter().map(|s| s.as_str()).collect();
    assert_eq!(scopes, json!(expected));
}

#[test]
fn test_playlist_content_pages() {
    let (_, extension) = extension();

    let first = call(
        &extension,
        Export::GetPlaylistContent,
        Some(r#""radio://genre/ambient""#),
    );
    assert_eq!(first["songs"].as_array().map(Vec::len), Some(2));
    assert_eq!(first["nextPageToken"], json!(2));

    let second = call(
        &extension,
        Export::GetPlaylistContent,
        Some(r#"["radio://genre/ambient", 2]"#),
    );
    assert_eq!(second["songs"][0]["_id"], "radio://station/deep-space-one");
    assert!(second.get("nextPageToken").is_none());
}

#[test]
fn test_unknown_playlist_answers_null() {
    let (_, extension) = extension();
    let out = extension.handle(Export::GetPlaylistContent, Some(r#""radio://genre/polka""#));
    assert_eq!(out, "null");
}

#[test]
fn test_search_export_reaches_current_handler() {
    let (host, extension) = extension();
    host.respond(
        "GetSong",
        json!([{ "_id": "saved-1", "title": "Jazz classics", "type": "URL" }]),
    );

    let out = call(&extension, Export::Search, Some(r#""jazz""#));
    let ids: Vec<&str> = out["songs"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|s| s["_id"].as_str())
        .collect();
    assert_eq!(ids, vec!["radio://station/fip-jazz", "saved-1"]);
    assert_eq!(out["playlists"][0]["playlist_id"], "radio://genre/jazz");
    assert_eq!(out["artists"][0]["artist_name"], "Radio France");

    let query = host.last_sent().unwrap();
    assert_eq!(query["GetSong"]["song"]["title"], "%jazz%");
    assert_eq!(query["GetSong"]["song"]["extension"], PACKAGE_NAME);
}

#[test]
fn test_notifications_answer_null() {
    let (host, extension) = extension();
    let song = json!({ "_id": "radio://station/fip-jazz", "title": "FIP Jazz", "type": "URL" });

    for (export, input) in [
        (Export::Scrobble, song.to_string()),
        (Export::OnSongAdded, song.to_string()),
        (Export::OnPlayerStateChanged, json!("PLAYING").to_string()),
        (Export::OnVolumeChanged, "50".to_string()),
        (Export::OnSeeked, "12.5".to_string()),
    ] {
        assert_eq!(extension.handle(export, Some(&input)), "null", "{export}");
    }

    let tags: Vec<String> = host.sent_commands().iter().map(|c| c.tag()).collect();
    assert!(tags.contains(&"SetPreference".to_string()));
    assert!(tags.contains(&"GetPlayerState".to_string()));
}

#[test]
fn test_stream_url_export() {
    let (_, extension) = extension();
    let out = call(
        &extension,
        Export::HandleCustomRequest,
        Some(r#""radio://station/groove-salad""#),
    );
    assert_eq!(
        out,
        json!({
            "mimeType": "audio/mpeg",
            "redirectUrl": "https://ice1.somafm.com/groovesalad-128-mp3"
        })
    );
}

#[test]
fn test_oauth_callback_export() {
    let (host, extension) = extension();
    let out = extension.handle(
        Export::OauthCallback,
        Some(r#""moosync://radio-directory?code=xyz""#),
    );
    assert_eq!(out, "null");
    assert_eq!(
        host.sent_commands().last().map(|c| c.tag()),
        Some("UpdateAccounts".to_string())
    );
}

#[test]
fn test_playlist_context_menu_only_for_own_playlists() {
    let (_, extension) = extension();
    let own = json!({ "playlist_id": "radio://genre/jazz", "extension": PACKAGE_NAME });
    let foreign = json!({ "playlist_id": "p1", "playlist_name": "Mine" });

    let menu = call(&extension, Export::GetPlaylistContextMenu, Some(&own.to_string()));
    assert_eq!(menu[0]["action_id"], "refresh_artwork");

    let menu = call(&extension, Export::GetPlaylistContextMenu, Some(&foreign.to_string()));
    assert_eq!(menu, json!([]));
}
