//! JSON-over-HTTP client for the band's remote API

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use super::content::{Event, EventId, SongList, Track, TrackId};
use super::session::{LoginResponse, Session};
use crate::error::ApiError;

/// Song fields sent as multipart; files are read when the request is built
#[derive(Clone, Debug, PartialEq)]
pub struct SongUpload {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub duration: String,
    pub audio: Option<PathBuf>,
    pub cover: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EventList {
    Bare(Vec<Event>),
    Wrapped { eventos: Vec<Event> },
}

#[derive(Debug, Deserialize)]
struct EventEnvelope {
    evento: Event,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SongEnvelope {
    Bare(Track),
    Spanish { cancion: Track },
    English { song: Track },
}

#[derive(Debug, Default, Deserialize)]
struct MessageBody {
    #[serde(default, alias = "message")]
    mensaje: Option<String>,
}

/// Remote API client; cheap to clone
#[derive(Clone, Debug)]
pub struct BandApiClient {
    http: reqwest::Client,
    base: String,
}

impl BandApiClient {
    pub fn new(base: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("band-site/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(ApiError::Network)?;
        Ok(Self {
            http,
            base: base.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base, path)
    }

    fn authorized(request: RequestBuilder, session: Option<&Session>) -> RequestBuilder {
        match session {
            Some(session) => request.bearer_auth(&session.token),
            None => request,
        }
    }

    /// Sends and returns the raw body of a 2xx response
    async fn send(request: RequestBuilder) -> Result<Vec<u8>, ApiError> {
        let response = request.send().await.map_err(ApiError::Network)?;
        let status = response.status();
        let body = response.bytes().await.map_err(ApiError::Network)?.to_vec();
        if !status.is_success() {
            return Err(ApiError::Status {
                status,
                message: server_message(&body),
            });
        }
        Ok(body)
    }

    fn parse<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
        serde_json::from_slice(body).map_err(ApiError::Malformed)
    }

    // ========================================================================
    // Events
    // ========================================================================

    pub async fn list_events(&self) -> Result<Vec<Event>, ApiError> {
        crate::log_api_request!("list_events");
        let result = async {
            let body = Self::send(self.http.get(self.url("eventos"))).await?;
            let list: EventList = Self::parse(&body)?;
            Ok::<_, ApiError>(match list {
                EventList::Bare(events) => events,
                EventList::Wrapped { eventos } => eventos,
            })
        }
        .await;
        crate::log_api_result!("list_events", result);
        result
    }

    pub async fn create_event(&self, session: Option<&Session>, event: &Event) -> Result<Event, ApiError> {
        crate::log_api_request!("create_event", title = %event.title);
        let request = Self::authorized(self.http.post(self.url("eventos/crear")), session).json(event);
        let result = async {
            let body = Self::send(request).await?;
            Ok::<_, ApiError>(Self::parse::<EventEnvelope>(&body)?.evento)
        }
        .await;
        crate::log_api_result!("create_event", result);
        result
    }

    pub async fn update_event(
        &self,
        session: Option<&Session>,
        id: &EventId,
        event: &Event,
    ) -> Result<Event, ApiError> {
        crate::log_api_request!("update_event", id = %id);
        let request =
            Self::authorized(self.http.put(self.url(&format!("eventos/{id}"))), session).json(event);
        let result = async {
            let body = Self::send(request).await?;
            Ok::<_, ApiError>(Self::parse::<EventEnvelope>(&body)?.evento)
        }
        .await;
        crate::log_api_result!("update_event", result);
        result
    }

    /// Returns the server's confirmation message, if it sent one
    pub async fn delete_event(&self, session: Option<&Session>, id: &EventId) -> Result<Option<String>, ApiError> {
        crate::log_api_request!("delete_event", id = %id);
        let request = Self::authorized(self.http.delete(self.url(&format!("eventos/{id}"))), session);
        let result = Self::send(request).await.map(|body| message_of(&body));
        crate::log_api_result!("delete_event", result);
        result
    }

    // ========================================================================
    // Songs
    // ========================================================================

    pub async fn list_songs(&self) -> Result<Vec<Track>, ApiError> {
        crate::log_api_request!("list_songs");
        let result = async {
            let body = Self::send(self.http.get(self.url("music"))).await?;
            Ok::<_, ApiError>(Self::parse::<SongList>(&body)?.into_tracks())
        }
        .await;
        crate::log_api_result!("list_songs", result);
        result
    }

    /// The stored track, when the server echoes one back
    pub async fn upload_song(&self, session: Option<&Session>, song: &SongUpload) -> Result<Option<Track>, ApiError> {
        crate::log_api_request!("upload_song", title = %song.title);
        let result = async {
            let form = song_form(song).await?;
            let request = Self::authorized(self.http.post(self.url("music")), session).multipart(form);
            let body = Self::send(request).await?;
            Ok::<_, ApiError>(echoed_track(&body))
        }
        .await;
        crate::log_api_result!("upload_song", result);
        result
    }

    pub async fn update_song(
        &self,
        session: Option<&Session>,
        id: &TrackId,
        song: &SongUpload,
    ) -> Result<Option<Track>, ApiError> {
        crate::log_api_request!("update_song", id = %id);
        let result = async {
            let form = song_form(song).await?;
            let request =
                Self::authorized(self.http.put(self.url(&format!("music/{id}"))), session).multipart(form);
            let body = Self::send(request).await?;
            Ok::<_, ApiError>(echoed_track(&body))
        }
        .await;
        crate::log_api_result!("update_song", result);
        result
    }

    pub async fn delete_song(&self, session: Option<&Session>, id: &TrackId) -> Result<(), ApiError> {
        crate::log_api_request!("delete_song", id = %id);
        let request = Self::authorized(self.http.delete(self.url(&format!("music/{id}"))), session);
        let result = Self::send(request).await.map(|_| ());
        crate::log_api_result!("delete_song", result);
        result
    }

    // ========================================================================
    // Auth
    // ========================================================================

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        crate::log_api_request!("login", email = %email);
        let request = self
            .http
            .post(self.url("auth/login"))
            .json(&json!({ "email": email, "password": password }));
        let result = async { Self::parse::<LoginResponse>(&Self::send(request).await?) }.await;
        crate::log_api_result!("login", result);
        result
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<Option<String>, ApiError> {
        crate::log_api_request!("register", email = %email);
        let request = self
            .http
            .post(self.url("auth/register"))
            .json(&json!({ "nombre": name, "email": email, "password": password }));
        let result = Self::send(request).await.map(|body| message_of(&body));
        crate::log_api_result!("register", result);
        result
    }

    pub async fn confirm_code(&self, email: &str, code: &str) -> Result<Option<String>, ApiError> {
        crate::log_api_request!("confirm_code", email = %email);
        let request = self
            .http
            .post(self.url("auth/confirmar-codigo"))
            .json(&json!({ "email": email, "codigo": code }));
        let result = Self::send(request).await.map(|body| message_of(&body));
        crate::log_api_result!("confirm_code", result);
        result
    }
}

fn message_of(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<MessageBody>(body)
        .unwrap_or_default()
        .mensaje
        .filter(|m| !m.trim().is_empty())
}

/// `{message}`, `{mensaje}` or `{error}` from an error body
fn server_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    ["message", "mensaje", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(|v| v.as_str()))
        .map(str::to_string)
        .filter(|m| !m.trim().is_empty())
}

fn echoed_track(body: &[u8]) -> Option<Track> {
    match serde_json::from_slice::<SongEnvelope>(body).ok()? {
        SongEnvelope::Bare(track) => Some(track),
        SongEnvelope::Spanish { cancion } => Some(cancion),
        SongEnvelope::English { song } => Some(song),
    }
}

fn mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    Some(match ext.as_str() {
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "flac" => "audio/flac",
        "m4a" | "aac" => "audio/aac",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        _ => return None,
    })
}

async fn file_part(path: &Path) -> Result<Part, ApiError> {
    let data = tokio::fs::read(path).await.map_err(|source| ApiError::File {
        path: path.to_path_buf(),
        source,
    })?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    let part = Part::bytes(data).file_name(file_name);
    match mime_for(path) {
        Some(mime) => part.mime_str(mime).map_err(ApiError::Network),
        None => Ok(part),
    }
}

async fn song_form(song: &SongUpload) -> Result<Form, ApiError> {
    let mut form = Form::new()
        .text("title", song.title.clone())
        .text("artist", song.artist.clone())
        .text("album", song.album.clone())
        .text("duration", song.duration.clone());
    if let Some(audio) = &song.audio {
        form = form.part("audio", file_part(audio).await?);
    }
    if let Some(cover) = &song.cover {
        form = form.part("cover", file_part(cover).await?);
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_read_in_either_language() {
        assert_eq!(server_message(r#"{"message":"Credenciales inválidas"}"#.as_bytes()).as_deref(), Some("Credenciales inválidas"));
        assert_eq!(server_message(r#"{"mensaje":"Código incorrecto"}"#.as_bytes()).as_deref(), Some("Código incorrecto"));
        assert_eq!(server_message(b"<html>502</html>"), None);
        assert_eq!(server_message(br#"{"message":""}"#), None);
    }

    #[test]
    fn echoed_track_accepts_wrappers_and_tolerates_garbage() {
        let track = r#"{"_id":"1","title":"a","artist":"b","audioUrl":"u"}"#;
        assert!(echoed_track(track.as_bytes()).is_some());
        assert!(echoed_track(format!(r#"{{"cancion":{track}}}"#).as_bytes()).is_some());
        assert!(echoed_track(br#"{"ok":true}"#).is_none());
        assert!(echoed_track(b"").is_none());
    }

    #[test]
    fn base_url_is_normalized() {
        let client = BandApiClient::new("http://localhost:4000/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.url("eventos"), "http://localhost:4000/api/eventos");
    }

    #[test]
    fn mime_guess_by_extension() {
        assert_eq!(mime_for(Path::new("/tmp/a.MP3")), Some("audio/mpeg"));
        assert_eq!(mime_for(Path::new("/tmp/cover.png")), Some("image/png"));
        assert_eq!(mime_for(Path::new("/tmp/readme")), None);
    }
}
