//! Text-entry forms: login, register, confirm code, event and song editors

use std::path::PathBuf;

use chrono::NaiveDate;

use super::api_client::SongUpload;
use super::content::{Event, EventId, Track, TrackId};
use crate::error::ValidationError;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Rendered masked
    Secret,
    /// Flipped with Space instead of typed into
    Toggle,
    /// Local file path
    Path,
}

#[derive(Clone, Debug)]
pub struct FormField {
    pub key: &'static str,
    pub label: &'static str,
    pub value: String,
    pub kind: FieldKind,
}

impl FormField {
    fn new(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            label,
            value: String::new(),
            kind,
        }
    }

    fn with(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn is_on(&self) -> bool {
        self.value == "true"
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum FormKind {
    Login,
    Register,
    ConfirmCode { email: String },
    Event { editing: Option<EventId> },
    Song { editing: Option<TrackId> },
}

#[derive(Clone, Debug)]
pub struct FormState {
    pub kind: FormKind,
    pub fields: Vec<FormField>,
    pub focused: usize,
    /// Keystrokes go into the focused field while set
    pub editing: bool,
    pub submitting: bool,
}

impl FormState {
    fn new(kind: FormKind, fields: Vec<FormField>) -> Self {
        Self {
            kind,
            fields,
            focused: 0,
            editing: false,
            submitting: false,
        }
    }

    pub fn login() -> Self {
        Self::new(
            FormKind::Login,
            vec![
                FormField::new("email", "Email", FieldKind::Text),
                FormField::new("password", "Contraseña", FieldKind::Secret),
            ],
        )
    }

    pub fn register() -> Self {
        Self::new(
            FormKind::Register,
            vec![
                FormField::new("nombre", "Nombre", FieldKind::Text),
                FormField::new("email", "Email", FieldKind::Text),
                FormField::new("password", "Contraseña", FieldKind::Secret),
            ],
        )
    }

    pub fn confirm_code(email: &str) -> Self {
        Self::new(
            FormKind::ConfirmCode {
                email: email.to_string(),
            },
            vec![FormField::new("codigo", "Código", FieldKind::Text)],
        )
    }

    fn event_fields(event: &Event) -> Vec<FormField> {
        let price = if event.price == 0.0 {
            String::new()
        } else {
            event.price.to_string()
        };
        vec![
            FormField::new("titulo", "Título", FieldKind::Text).with(&event.title),
            FormField::new("fecha", "Fecha (AAAA-MM-DD)", FieldKind::Text)
                .with(event.date.get(..10).unwrap_or(&event.date)),
            FormField::new("hora", "Hora", FieldKind::Text).with(&event.time),
            FormField::new("lugar", "Lugar", FieldKind::Text).with(&event.venue),
            FormField::new("ciudad", "Ciudad", FieldKind::Text).with(&event.city),
            FormField::new("descripcion", "Descripción", FieldKind::Text).with(&event.description),
            FormField::new("precio", "Precio", FieldKind::Text).with(price),
            FormField::new("imagen", "Imagen (URL)", FieldKind::Text).with(&event.image),
            FormField::new("categoria", "Categoría", FieldKind::Text).with(&event.category),
            FormField::new("disponible", "Disponible", FieldKind::Toggle)
                .with(event.available.to_string()),
            FormField::new("entradas", "Entradas", FieldKind::Text)
                .with(event.tickets.map(|t| t.to_string()).unwrap_or_default()),
        ]
    }

    pub fn new_event() -> Self {
        Self::new(
            FormKind::Event { editing: None },
            Self::event_fields(&Event::default()),
        )
    }

    pub fn edit_event(event: &Event) -> Self {
        Self::new(
            FormKind::Event {
                editing: event.id.clone(),
            },
            Self::event_fields(event),
        )
    }

    fn song_fields(track: Option<&Track>) -> Vec<FormField> {
        vec![
            FormField::new("title", "Título", FieldKind::Text)
                .with(track.map(|t| t.title.as_str()).unwrap_or_default()),
            FormField::new("artist", "Artista", FieldKind::Text)
                .with(track.map(|t| t.artist.as_str()).unwrap_or_default()),
            FormField::new("album", "Álbum", FieldKind::Text)
                .with(track.and_then(|t| t.album.as_deref()).unwrap_or_default()),
            FormField::new("duration", "Duración (m:ss)", FieldKind::Text)
                .with(track.map(|t| t.duration.as_str()).unwrap_or_default()),
            FormField::new("audio", "Archivo de audio", FieldKind::Path),
            FormField::new("cover", "Portada", FieldKind::Path),
        ]
    }

    pub fn new_song() -> Self {
        Self::new(FormKind::Song { editing: None }, Self::song_fields(None))
    }

    pub fn edit_song(track: &Track) -> Self {
        Self::new(
            FormKind::Song {
                editing: Some(track.id.clone()),
            },
            Self::song_fields(Some(track)),
        )
    }

    pub fn value(&self, key: &str) -> &str {
        self.fields
            .iter()
            .find(|f| f.key == key)
            .map(|f| f.value.as_str())
            .unwrap_or_default()
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        if let Some(field) = self.fields.iter_mut().find(|f| f.key == key) {
            field.value = value.into();
        }
    }

    pub fn focused_field(&self) -> Option<&FormField> {
        self.fields.get(self.focused)
    }

    pub fn focus_next(&mut self) {
        if !self.fields.is_empty() {
            self.focused = (self.focused + 1) % self.fields.len();
        }
    }

    pub fn focus_prev(&mut self) {
        if !self.fields.is_empty() {
            self.focused = (self.focused + self.fields.len() - 1) % self.fields.len();
        }
    }

    pub fn insert_char(&mut self, c: char) {
        if let Some(field) = self.fields.get_mut(self.focused) {
            match field.kind {
                FieldKind::Toggle => {
                    if c == ' ' {
                        field.value = (!field.is_on()).to_string();
                    }
                }
                _ => field.value.push(c),
            }
        }
    }

    pub fn backspace(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focused) {
            if field.kind != FieldKind::Toggle {
                field.value.pop();
            }
        }
    }

    /// Trimmed, with blank treated as absent
    fn optional(&self, key: &str) -> Option<String> {
        let value = self.value(key).trim();
        (!value.is_empty()).then(|| value.to_string())
    }

    fn required(&self, key: &'static str) -> Result<String, ValidationError> {
        self.optional(key).ok_or(ValidationError::Required(key))
    }

    pub fn login_credentials(&self) -> Result<(String, String), ValidationError> {
        let email = self.value("email").trim().to_string();
        let password = self.value("password").to_string();
        validate_login(&email, &password)?;
        Ok((email, password))
    }

    pub fn registration(&self) -> Result<(String, String, String), ValidationError> {
        let name = self.required("nombre")?;
        let email = self.required("email")?;
        if self.value("password").is_empty() {
            return Err(ValidationError::Required("password"));
        }
        Ok((name, email, self.value("password").to_string()))
    }

    pub fn confirmation_code(&self) -> Result<String, ValidationError> {
        self.required("codigo")
    }

    /// Builds the event payload; the id comes from the form kind
    pub fn to_event(&self) -> Result<Event, ValidationError> {
        let title = self.required("titulo")?;
        let date = self.required("fecha")?;
        NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|_| ValidationError::Invalid {
            field: "fecha",
            reason: "usá AAAA-MM-DD".to_string(),
        })?;

        let price = match self.optional("precio") {
            None => 0.0,
            Some(raw) => raw
                .parse::<f64>()
                .ok()
                .filter(|p| p.is_finite() && *p >= 0.0)
                .ok_or_else(|| ValidationError::Invalid {
                    field: "precio",
                    reason: format!("`{raw}` no es un precio"),
                })?,
        };

        let tickets = match self.optional("entradas") {
            None => None,
            Some(raw) => Some(raw.parse::<u32>().map_err(|_| ValidationError::Invalid {
                field: "entradas",
                reason: format!("`{raw}` no es un número entero"),
            })?),
        };

        let id = match &self.kind {
            FormKind::Event { editing } => editing.clone(),
            _ => None,
        };

        Ok(Event {
            id,
            title,
            date,
            time: self.optional("hora").unwrap_or_default(),
            venue: self.optional("lugar").unwrap_or_default(),
            city: self.optional("ciudad").unwrap_or_default(),
            description: self.optional("descripcion").unwrap_or_default(),
            price,
            image: self.optional("imagen").unwrap_or_default(),
            category: self.optional("categoria").unwrap_or_default(),
            tickets,
            available: self
                .fields
                .iter()
                .find(|f| f.key == "disponible")
                .is_none_or(FormField::is_on),
        })
    }

    /// Title and artist are always required; an audio file only on create
    pub fn to_song_upload(&self) -> Result<SongUpload, ValidationError> {
        let title = self.required("title")?;
        let artist = self.required("artist")?;
        let creating = matches!(self.kind, FormKind::Song { editing: None });
        let audio = self.optional("audio").map(PathBuf::from);
        if creating && audio.is_none() {
            return Err(ValidationError::Required("audio"));
        }
        Ok(SongUpload {
            title,
            artist,
            album: self.optional("album").unwrap_or_default(),
            duration: self.optional("duration").unwrap_or_default(),
            audio,
            cover: self.optional("cover").map(PathBuf::from),
        })
    }
}

/// Email shaped `x@y.z` and a password of at least six characters
pub fn validate_login(email: &str, password: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::Required("email"));
    }
    if !looks_like_email(email) {
        return Err(ValidationError::InvalidEmail);
    }
    if password.is_empty() {
        return Err(ValidationError::Required("password"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort(MIN_PASSWORD_LEN));
    }
    Ok(())
}

fn looks_like_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !local.is_empty() && !host.is_empty() && !tld.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::playlist::tests::track;

    #[test]
    fn login_validation() {
        assert_eq!(validate_login("", "123456"), Err(ValidationError::Required("email")));
        assert_eq!(validate_login("nope", "123456"), Err(ValidationError::InvalidEmail));
        assert_eq!(validate_login("a@b", "123456"), Err(ValidationError::InvalidEmail));
        assert_eq!(
            validate_login("a@b.co", "12345"),
            Err(ValidationError::PasswordTooShort(6))
        );
        assert!(validate_login("fan@sin-gravedad.com.ar", "123456").is_ok());
    }

    #[test]
    fn typing_and_toggling() {
        let mut form = FormState::new_event();
        for c in "Show".chars() {
            form.insert_char(c);
        }
        form.backspace();
        assert_eq!(form.value("titulo"), "Sho");

        form.focused = form.fields.iter().position(|f| f.key == "disponible").unwrap();
        form.insert_char('x');
        assert_eq!(form.value("disponible"), "true");
        form.insert_char(' ');
        assert_eq!(form.value("disponible"), "false");
    }

    #[test]
    fn event_form_builds_payload() {
        let mut form = FormState::new_event();
        form.set("titulo", "Gira 2025");
        form.set("fecha", "2025-08-30");
        form.set("precio", "20000");
        form.set("entradas", "150");
        let event = form.to_event().unwrap();
        assert_eq!(event.id, None);
        assert_eq!(event.price, 20000.0);
        assert_eq!(event.tickets, Some(150));
        assert!(event.available);
    }

    #[test]
    fn event_form_rejects_bad_input() {
        let mut form = FormState::new_event();
        assert_eq!(form.to_event(), Err(ValidationError::Required("titulo")));
        form.set("titulo", "X");
        form.set("fecha", "30/08/2025");
        assert!(matches!(
            form.to_event(),
            Err(ValidationError::Invalid { field: "fecha", .. })
        ));
        form.set("fecha", "2025-08-30");
        form.set("precio", "gratis");
        assert!(matches!(
            form.to_event(),
            Err(ValidationError::Invalid { field: "precio", .. })
        ));
    }

    #[test]
    fn editing_an_event_keeps_its_id() {
        let event = Event {
            id: Some(EventId("e1".into())),
            title: "Old".into(),
            date: "2025-11-08T00:00:00.000Z".into(),
            ..Event::default()
        };
        let form = FormState::edit_event(&event);
        assert_eq!(form.value("fecha"), "2025-11-08");
        assert_eq!(form.to_event().unwrap().id, Some(EventId("e1".into())));
    }

    #[test]
    fn song_upload_requires_audio_only_on_create() {
        let mut form = FormState::new_song();
        form.set("title", "Nueva");
        form.set("artist", "Sin Gravedad");
        assert_eq!(form.to_song_upload().err(), Some(ValidationError::Required("audio")));

        let edit = FormState::edit_song(&track("a"));
        let upload = edit.to_song_upload().unwrap();
        assert_eq!(upload.title, "Song a");
        assert!(upload.audio.is_none());
    }
}
