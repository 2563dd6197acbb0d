mod common;

use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use band_site::model::{Page, PlayerStatus};
use common::{controller, spawn_server};

async fn catalog_server() -> String {
    spawn_server(Router::new().route(
        "/api/music",
        get(|| async {
            Json(json!([
                {
                    "_id": "s1",
                    "title": "Ruta 40",
                    "artist": "La Banda",
                    "audioUrl": "https://cdn.example/ruta40.mp3",
                    "duration": "3:42"
                },
                {
                    "_id": "s2",
                    "title": "Otra",
                    "artist": "La Banda",
                    "audioUrl": "https://cdn.example/otra.mp3",
                    "duration": "2:10"
                }
            ]))
        }),
    ))
    .await
}

#[tokio::test]
async fn catalog_playlist_changes_reach_the_player() {
    let base = catalog_server().await;
    let (controller, model) = controller(&base);
    let generation = model.lock().await.navigate(Page::MusicCatalog).await;
    controller.load_songs(Page::MusicCatalog, generation).await;

    // Playing a song that is not in the playlist adds it first
    model.lock().await.move_selection_down().await;
    controller.play_selected_song().await;
    let state = controller.tick_player().await;
    assert_eq!(state.status, PlayerStatus::Playing);
    assert_eq!(state.track.map(|t| t.id.0), Some("s2".to_string()));
    assert_eq!(state.index, Some(0));
    assert_eq!(state.playlist_len, 1);

    model.lock().await.move_selection_up().await;
    controller.toggle_selected_in_playlist().await;
    controller.play_selected_song().await;
    let state = controller.tick_player().await;
    assert_eq!(state.track.map(|t| t.id.0), Some("s1".to_string()));
    assert_eq!(state.index, Some(1));
    assert_eq!(state.playlist_len, 2);

    // Dropping the current song falls back to the first entry
    controller.toggle_selected_in_playlist().await;
    let state = controller.tick_player().await;
    assert_eq!(state.track.map(|t| t.id.0), Some("s2".to_string()));
    assert_eq!(state.playlist_len, 1);

    model.lock().await.move_selection_down().await;
    controller.toggle_selected_in_playlist().await;
    assert!(model.lock().await.get_playlist().await.is_empty());

    let state = controller.tick_player().await;
    assert_eq!(state.status, PlayerStatus::Empty);
    assert!(state.track.is_none());

    controller.toggle_playback().await;
    let state = controller.tick_player().await;
    assert_eq!(state.status, PlayerStatus::Empty);
    assert!(model.lock().await.get_ui_state().await.notice.is_none());
}

#[tokio::test]
async fn toggling_twice_leaves_the_playlist_unchanged() {
    let base = catalog_server().await;
    let (controller, model) = controller(&base);
    let generation = model.lock().await.navigate(Page::MusicCatalog).await;
    controller.load_songs(Page::MusicCatalog, generation).await;

    controller.toggle_selected_in_playlist().await;
    assert_eq!(model.lock().await.get_playlist().await.len(), 1);
    // Adding alone does not start playback
    assert_eq!(controller.tick_player().await.status, PlayerStatus::Empty);

    controller.toggle_selected_in_playlist().await;
    assert!(model.lock().await.get_playlist().await.is_empty());
    let content = model.lock().await.get_content_state().await;
    assert!(content.songs.iter().all(|e| !e.is_pending()));
}
