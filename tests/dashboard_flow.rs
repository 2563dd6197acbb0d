mod common;

use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::json;

use band_site::model::{Event, EventId, NoticeKind, Page, Role, Track, TrackId};
use common::{admin_session, controller, spawn_server};

fn listed_event() -> Event {
    Event {
        id: Some(EventId("e1".to_string())),
        title: "Show en La Plata".to_string(),
        date: "2031-04-12".to_string(),
        ..Event::default()
    }
}

#[tokio::test]
async fn failed_event_create_keeps_list_and_shows_error() {
    let base = spawn_server(Router::new().route(
        "/api/eventos/crear",
        post(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "Base de datos caída" })),
            )
        }),
    ))
    .await;
    let (controller, model) = controller(&base);
    {
        let model = model.lock().await;
        model.set_session(Some(admin_session())).await;
        model.set_events(vec![listed_event()]).await;
    }

    controller.open_new_event_form().await;
    {
        let model = model.lock().await;
        model
            .update_form(|f| {
                f.set("titulo", "Nuevo show");
                f.set("fecha", "2031-06-01");
            })
            .await;
    }
    controller.save_event_form().await;

    let model = model.lock().await;
    let events = model.get_events().await;
    assert_eq!(events, vec![listed_event()]);

    let notice = model.get_ui_state().await.notice.unwrap();
    assert_eq!(notice.kind, NoticeKind::Error);
    assert!(notice.text.contains("Base de datos caída"));

    // The form stays open for another try
    let form = model.get_form().await.unwrap();
    assert_eq!(form.value("titulo"), "Nuevo show");
    assert!(!form.submitting);
}

#[tokio::test]
async fn created_event_goes_to_the_top_of_the_list() {
    let base = spawn_server(Router::new().route(
        "/api/eventos/crear",
        post(|Json(mut body): Json<serde_json::Value>| async move {
            body["_id"] = json!("e2");
            (StatusCode::CREATED, Json(json!({ "evento": body })))
        }),
    ))
    .await;
    let (controller, model) = controller(&base);
    {
        let model = model.lock().await;
        model.set_session(Some(admin_session())).await;
        model.set_events(vec![listed_event()]).await;
    }

    controller.open_new_event_form().await;
    model
        .lock()
        .await
        .update_form(|f| {
            f.set("titulo", "Nuevo show");
            f.set("fecha", "2031-06-01");
            f.set("precio", "12000");
        })
        .await;
    controller.save_event_form().await;

    let model = model.lock().await;
    let events = model.get_events().await;
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].id, Some(EventId("e2".to_string())));
    assert_eq!(events[0].price, 12000.0);
    assert!(model.get_form().await.is_none());
}

#[tokio::test]
async fn invalid_event_form_never_reaches_the_server() {
    // Nothing listens here; a request would come back as a network error
    let (controller, model) = controller("http://127.0.0.1:9");
    model.lock().await.set_session(Some(admin_session())).await;

    controller.open_new_event_form().await;
    model
        .lock()
        .await
        .update_form(|f| {
            f.set("titulo", "Sin fecha");
            f.set("fecha", "12/06/2031");
        })
        .await;
    controller.save_event_form().await;

    let notice = model.lock().await.get_ui_state().await.notice.unwrap();
    assert_eq!(notice.kind, NoticeKind::Error);
    assert!(notice.text.contains("fecha"));
}

#[tokio::test]
async fn confirmed_delete_removes_event() {
    let base = spawn_server(Router::new().route(
        "/api/eventos/:id",
        delete(|| async { Json(json!({ "mensaje": "Evento eliminado correctamente" })) }),
    ))
    .await;
    let (controller, model) = controller(&base);
    {
        let model = model.lock().await;
        model.set_session(Some(admin_session())).await;
        model.set_events(vec![listed_event()]).await;
    }

    controller.delete_event(&EventId("e1".to_string())).await;

    let model = model.lock().await;
    assert!(model.get_events().await.is_empty());
    let notice = model.get_ui_state().await.notice.unwrap();
    assert_eq!(notice.kind, NoticeKind::Success);
    assert_eq!(notice.text, "Evento eliminado correctamente");
}

#[tokio::test]
async fn admin_pages_redirect_guests_to_login() {
    let (controller, model) = controller("http://127.0.0.1:9");

    controller.go_to(Page::Dashboard).await;

    let model = model.lock().await;
    assert_eq!(model.current_page().await, Page::Login);
    assert!(model.has_error().await);
    assert!(model.get_form().await.is_some());
}

#[tokio::test]
async fn login_form_starts_a_session() {
    let base = spawn_server(
        Router::new()
            .route(
                "/api/auth/login",
                post(|| async { Json(json!({ "token": "tok", "role": "superadmin", "nombre": "Sol" })) }),
            )
            .route("/api/eventos", get(|| async { Json(json!([])) })),
    )
    .await;
    let (controller, model) = controller(&base);

    controller.go_to(Page::Login).await;
    model
        .lock()
        .await
        .update_form(|f| {
            f.set("email", "sol@banda.com");
            f.set("password", "clave-larga");
        })
        .await;
    controller.submit_auth_form().await;

    let model = model.lock().await;
    let session = model.get_session().await.unwrap();
    assert_eq!(session.role, Role::SuperAdmin);
    assert_eq!(session.email, "sol@banda.com");
    assert_eq!(model.current_page().await, Page::Home);
}

#[tokio::test]
async fn deleting_a_song_refetches_the_catalog() {
    let remaining = json!([{
        "_id": "s2",
        "title": "Otra",
        "artist": "La Banda",
        "audioUrl": "https://cdn.example/otra.mp3"
    }]);
    let base = spawn_server(
        Router::new()
            .route("/api/music/:id", delete(|| async { StatusCode::NO_CONTENT }))
            .route(
                "/api/music",
                get(move || {
                    let body = remaining.clone();
                    async move { Json(body) }
                }),
            ),
    )
    .await;
    let (controller, model) = controller(&base);
    let track = |id: &str| Track {
        id: TrackId(id.to_string()),
        title: format!("Song {id}"),
        artist: "La Banda".to_string(),
        album: None,
        audio_url: format!("https://cdn.example/{id}.mp3"),
        cover_url: None,
        duration: "3:00".to_string(),
    };
    {
        let model = model.lock().await;
        model.set_session(Some(admin_session())).await;
        model.navigate(Page::MusicAdmin).await;
        model.set_songs(vec![track("s1"), track("s2")]).await;
    }

    controller.delete_song(&TrackId("s1".to_string())).await;

    let content = model.lock().await.get_content_state().await;
    let ids: Vec<&str> = content.songs.iter().map(|e| e.track.id.0.as_str()).collect();
    assert_eq!(ids, ["s2"]);
}
