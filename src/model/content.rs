//! Remote content: songs, concert events and their catalog wrappers

use std::fmt;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Deserializer, Serialize};

pub const UNKNOWN_DURATION: &str = "0:00";

/// Server-assigned song identity
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(pub String);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TrackId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A playable song as returned by `/api/music`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    #[serde(rename = "_id", alias = "id")]
    pub id: TrackId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub album: Option<String>,
    #[serde(default)]
    pub audio_url: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub cover_url: Option<String>,
    #[serde(default = "unknown_duration")]
    pub duration: String,
}

impl Track {
    /// Parses the `m:ss` (or `h:mm:ss`) display duration
    pub fn duration_secs(&self) -> Option<u64> {
        parse_clock(&self.duration)
    }

    /// Case-insensitive match against title, artist and album
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&query)
            || self.artist.to_lowercase().contains(&query)
            || self
                .album
                .as_deref()
                .is_some_and(|album| album.to_lowercase().contains(&query))
    }
}

fn unknown_duration() -> String {
    UNKNOWN_DURATION.to_string()
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

pub fn parse_clock(text: &str) -> Option<u64> {
    let mut total: u64 = 0;
    let mut parts = 0;
    for part in text.trim().split(':') {
        let value: u64 = part.trim().parse().ok()?;
        total = total.checked_mul(60)?.checked_add(value)?;
        parts += 1;
    }
    (1..=3).contains(&parts).then_some(total)
}

pub fn format_clock(secs: u64) -> String {
    let minutes = secs / 60;
    let seconds = secs % 60;
    format!("{}:{:02}", minutes, seconds)
}

/// `/api/music` answers either a bare array or `{ canciones: [...] }`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SongList {
    Bare(Vec<Track>),
    Wrapped { canciones: Vec<Track> },
}

impl SongList {
    pub fn into_tracks(self) -> Vec<Track> {
        match self {
            SongList::Bare(tracks) => tracks,
            SongList::Wrapped { canciones } => canciones,
        }
    }
}

/// Server-assigned event identity
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub String);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A concert record (`/api/eventos`); the wire format uses Spanish keys
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "_id", alias = "id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EventId>,
    #[serde(rename = "titulo", default)]
    pub title: String,
    #[serde(rename = "fecha", default)]
    pub date: String,
    #[serde(rename = "hora", default)]
    pub time: String,
    #[serde(rename = "lugar", default)]
    pub venue: String,
    #[serde(rename = "ciudad", default)]
    pub city: String,
    #[serde(rename = "descripcion", default)]
    pub description: String,
    #[serde(rename = "precio", default, deserialize_with = "lenient_price")]
    pub price: f64,
    #[serde(rename = "imagen", default)]
    pub image: String,
    #[serde(rename = "categoria", default)]
    pub category: String,
    /// Remaining tickets, when the server tracks them
    #[serde(rename = "entradas", default, skip_serializing_if = "Option::is_none")]
    pub tickets: Option<u32>,
    #[serde(rename = "disponible", default = "available_by_default")]
    pub available: bool,
}

fn available_by_default() -> bool {
    true
}

impl Default for Event {
    fn default() -> Self {
        Self {
            id: None,
            title: String::new(),
            date: String::new(),
            time: String::new(),
            venue: String::new(),
            city: String::new(),
            description: String::new(),
            price: 0.0,
            image: String::new(),
            category: String::new(),
            tickets: None,
            available: true,
        }
    }
}

/// Accepts `20000`, `20000.5`, `"20000"`, `""` and `null`
fn lenient_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(0.0),
        serde_json::Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| D::Error::custom("price out of range")),
        serde_json::Value::String(s) if s.trim().is_empty() => Ok(0.0),
        serde_json::Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| D::Error::custom(format!("invalid price `{s}`"))),
        other => Err(D::Error::custom(format!("invalid price {other}"))),
    }
}

impl Event {
    /// The calendar day, accepting both `2025-08-30` and full ISO timestamps
    pub fn day(&self) -> Option<NaiveDate> {
        let head = self.date.get(..10).unwrap_or(&self.date);
        NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
    }

    pub fn formatted_date(&self) -> String {
        match self.day() {
            Some(day) => format_long_date(day),
            None => self.date.clone(),
        }
    }

    pub fn formatted_price(&self) -> String {
        format_price_ars(self.price)
    }

    pub fn location(&self) -> String {
        match (self.venue.is_empty(), self.city.is_empty()) {
            (false, false) => format!("{}, {}", self.venue, self.city),
            (false, true) => self.venue.clone(),
            (true, false) => self.city.clone(),
            (true, true) => String::new(),
        }
    }
}

/// Events on or after `today`, soonest first
pub fn upcoming_events(events: &[Event], today: NaiveDate, limit: usize) -> Vec<Event> {
    let mut upcoming: Vec<Event> = events
        .iter()
        .filter(|e| e.day().is_some_and(|d| d >= today))
        .cloned()
        .collect();
    upcoming.sort_by_key(|e| e.day());
    upcoming.truncate(limit);
    upcoming
}

const WEEKDAYS_ES: [&str; 7] = [
    "lunes", "martes", "miércoles", "jueves", "viernes", "sábado", "domingo",
];

const MONTHS_ES: [&str; 12] = [
    "enero", "febrero", "marzo", "abril", "mayo", "junio", "julio", "agosto",
    "septiembre", "octubre", "noviembre", "diciembre",
];

/// `sábado, 30 de agosto de 2025`
pub fn format_long_date(day: NaiveDate) -> String {
    let weekday = WEEKDAYS_ES[weekday_index(day.weekday())];
    let month = MONTHS_ES[day.month0() as usize];
    format!("{}, {} de {} de {}", weekday, day.day(), month, day.year())
}

fn weekday_index(weekday: Weekday) -> usize {
    weekday.num_days_from_monday() as usize
}

/// `$ 20.000` (whole pesos, `.` as thousands separator)
pub fn format_price_ars(price: f64) -> String {
    let rounded = price.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    if rounded < 0 {
        format!("-$ {}", grouped)
    } else {
        format!("$ {}", grouped)
    }
}

/// What a catalog row is doing right now
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ItemAction {
    #[default]
    Idle,
    Pending(PendingAction),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PendingAction {
    Adding,
    Removing,
    Deleting,
}

/// A catalog row: the track plus its per-item action state
#[derive(Clone, Debug)]
pub struct CatalogEntry {
    pub track: Track,
    pub action: ItemAction,
}

impl CatalogEntry {
    pub fn new(track: Track) -> Self {
        Self {
            track,
            action: ItemAction::Idle,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.action, ItemAction::Pending(_))
    }
}

/// Fetched remote content shown by the pages
#[derive(Clone, Debug, Default)]
pub struct ContentState {
    pub events: Vec<Event>,
    pub songs: Vec<CatalogEntry>,
    pub events_loaded: bool,
    pub songs_loaded: bool,
}

impl ContentState {
    /// Songs matching `query`, in server order
    pub fn filtered_songs<'a>(&'a self, query: &'a str) -> impl Iterator<Item = &'a CatalogEntry> + 'a {
        self.songs.iter().filter(move |entry| entry.track.matches(query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_accepts_mongo_id_and_missing_optionals() {
        let json = r#"{
            "_id": "abc",
            "title": "Gravedad Cero",
            "artist": "Sin Gravedad",
            "album": "",
            "audioUrl": "https://cdn.example/a.mp3"
        }"#;
        let track: Track = serde_json::from_str(json).unwrap();
        assert_eq!(track.id, TrackId::from("abc"));
        assert_eq!(track.album, None);
        assert_eq!(track.cover_url, None);
        assert_eq!(track.duration, "0:00");
    }

    #[test]
    fn song_without_artist_keeps_the_rest_of_the_list() {
        let body = r#"[
            {"_id":"1","title":"a","artist":"b","audioUrl":"u"},
            {"_id":"2","title":"Sin artista","audioUrl":"v"}
        ]"#;
        let tracks = serde_json::from_str::<SongList>(body).unwrap().into_tracks();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[1].title, "Sin artista");
        assert_eq!(tracks[1].artist, "");
    }

    #[test]
    fn song_list_accepts_both_shapes() {
        let bare = r#"[{"_id":"1","title":"a","artist":"b","audioUrl":"u"}]"#;
        let wrapped = r#"{"canciones":[{"_id":"1","title":"a","artist":"b","audioUrl":"u"}]}"#;
        let bare: SongList = serde_json::from_str(bare).unwrap();
        let wrapped: SongList = serde_json::from_str(wrapped).unwrap();
        assert_eq!(bare.into_tracks().len(), 1);
        assert_eq!(wrapped.into_tracks().len(), 1);
    }

    #[test]
    fn event_reads_spanish_keys_and_string_price() {
        let json = r#"{
            "_id": "e1",
            "titulo": "Acústico Especial",
            "fecha": "2025-11-08T00:00:00.000Z",
            "hora": "21:30",
            "lugar": "Teatro Colón",
            "ciudad": "Buenos Aires",
            "precio": "22000",
            "categoria": "Acústico",
            "disponible": false
        }"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.id, Some(EventId("e1".into())));
        assert_eq!(event.price, 22000.0);
        assert!(!event.available);
        assert_eq!(event.day(), NaiveDate::from_ymd_opt(2025, 11, 8));
        assert_eq!(event.location(), "Teatro Colón, Buenos Aires");
    }

    #[test]
    fn new_event_serializes_without_id() {
        let event = Event {
            title: "Show".into(),
            price: 100.0,
            ..Event::default()
        };
        let value = serde_json::to_value(&event).unwrap();
        assert!(value.get("_id").is_none());
        assert_eq!(value["titulo"], "Show");
        assert_eq!(value["disponible"], true);
    }

    #[test]
    fn formats_dates_and_prices_like_es_ar() {
        let day = NaiveDate::from_ymd_opt(2025, 8, 30).unwrap();
        assert_eq!(format_long_date(day), "sábado, 30 de agosto de 2025");
        assert_eq!(format_price_ars(20000.0), "$ 20.000");
        assert_eq!(format_price_ars(1234567.4), "$ 1.234.567");
        assert_eq!(format_price_ars(999.0), "$ 999");
    }

    #[test]
    fn clock_parsing() {
        assert_eq!(parse_clock("3:45"), Some(225));
        assert_eq!(parse_clock("1:02:03"), Some(3723));
        assert_eq!(parse_clock("abc"), None);
        assert_eq!(parse_clock(""), None);
        assert_eq!(format_clock(225), "3:45");
    }

    #[test]
    fn upcoming_skips_past_and_sorts() {
        let mk = |date: &str| Event {
            date: date.into(),
            ..Event::default()
        };
        let events = vec![mk("2025-12-31"), mk("2025-01-01"), mk("2025-09-15"), mk("bad")];
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let upcoming = upcoming_events(&events, today, 5);
        let dates: Vec<_> = upcoming.iter().map(|e| e.date.as_str()).collect();
        assert_eq!(dates, ["2025-09-15", "2025-12-31"]);
    }

    #[test]
    fn track_search_matches_album() {
        let track = Track {
            id: "1".into(),
            title: "Luz".into(),
            artist: "Sin Gravedad".into(),
            album: Some("Órbita".into()),
            audio_url: "u".into(),
            cover_url: None,
            duration: "3:00".into(),
        };
        assert!(track.matches("órb"));
        assert!(track.matches("GRAVEDAD"));
        assert!(!track.matches("zzz"));
        assert!(track.matches("  "));
    }
}
