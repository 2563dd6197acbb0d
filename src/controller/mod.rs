//! Controller module - Application logic and event handling
//!
//! This module contains the application controller that handles user input,
//! coordinates between the model, the player engine and the remote API.
//! It is organized into submodules by responsibility:
//!
//! - `input`: Key event handling
//! - `playback`: Player control methods
//! - `navigation`: Page switching, page loads and the music catalog
//! - `dashboard`: Event create/update/delete
//! - `music_admin`: Song upload/update/delete
//! - `account`: Login, register, confirm code and logout
//! - `player_events`: Media event listener

mod input;
mod playback;
mod navigation;
mod dashboard;
mod music_admin;
mod account;
mod player_events;

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::auth::AuthError;
use crate::error::ApiError;
use crate::model::AppModel;
use crate::player::PlayerEngine;

#[derive(Clone)]
pub struct AppController {
    pub(crate) model: Arc<Mutex<AppModel>>,
    pub(crate) player: Arc<Mutex<PlayerEngine>>,
    pub(crate) api: crate::model::BandApiClient,
}

impl AppController {
    pub fn new(
        model: Arc<Mutex<AppModel>>,
        player: Arc<Mutex<PlayerEngine>>,
        api: crate::model::BandApiClient,
    ) -> Self {
        Self { model, player, api }
    }

    pub(crate) fn format_error(error: &ApiError) -> String {
        if let Some(message) = error.server_message() {
            return message.to_string();
        }
        match error {
            ApiError::Network(e) if e.is_timeout() => {
                "El servidor tardó demasiado en responder.".to_string()
            }
            ApiError::Network(_) => "Error de conexión con el servidor".to_string(),
            ApiError::Status { status, .. } => match status.as_u16() {
                401 => "Sesión inválida. Volvé a iniciar sesión.".to_string(),
                403 => "No tenés permisos para esta acción.".to_string(),
                404 => "No se encontró el recurso.".to_string(),
                429 => "Demasiadas solicitudes. Esperá un momento.".to_string(),
                code if code >= 500 => format!("El servidor falló ({code})."),
                code => format!("Error del servidor ({code})."),
            },
            ApiError::Malformed(_) => "Respuesta inesperada del servidor".to_string(),
            ApiError::File { path, .. } => {
                format!("No se pudo leer {}", path.display())
            }
        }
    }

    pub(crate) fn format_auth_error(error: &AuthError) -> String {
        match error {
            AuthError::Invalid(e) => e.to_string(),
            AuthError::Api(e) => Self::format_error(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn server_message_wins_over_status_text() {
        let error = ApiError::Status {
            status: StatusCode::BAD_REQUEST,
            message: Some("Faltan campos".into()),
        };
        assert_eq!(AppController::format_error(&error), "Faltan campos");
    }

    #[test]
    fn status_codes_map_to_readable_text() {
        let error = ApiError::Status {
            status: StatusCode::FORBIDDEN,
            message: None,
        };
        assert_eq!(AppController::format_error(&error), "No tenés permisos para esta acción.");
        let error = ApiError::Status {
            status: StatusCode::BAD_GATEWAY,
            message: None,
        };
        assert_eq!(AppController::format_error(&error), "El servidor falló (502).");
    }
}
