//! Mock server and controller wiring shared by the integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::sync::Mutex;

use band_site::audio::{media_event_channel, AudioOutput, ClockOutput};
use band_site::controller::AppController;
use band_site::model::{AppModel, BandApiClient, Role, Session};
use band_site::player::PlayerEngine;

/// Serves `router` on an ephemeral port and returns its origin
pub async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

pub fn client(base: &str) -> BandApiClient {
    BandApiClient::new(base, Duration::from_secs(5)).unwrap()
}

pub fn admin_session() -> Session {
    Session {
        token: "admin-token".to_string(),
        role: Role::Admin,
        email: "admin@banda.com".to_string(),
        name: "Admin".to_string(),
    }
}

pub fn controller(base: &str) -> (AppController, Arc<Mutex<AppModel>>) {
    let (events_tx, _events_rx) = media_event_channel();
    let output: Box<dyn AudioOutput> = Box::new(ClockOutput::new(events_tx));
    let player = PlayerEngine::new(output, 80);
    let model = Arc::new(Mutex::new(AppModel::new()));
    let controller = AppController::new(model.clone(), Arc::new(Mutex::new(player)), client(base));
    (controller, model)
}
