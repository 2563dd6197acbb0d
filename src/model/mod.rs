//! Model module - Application state and data types
//!
//! - `types`: pages, notices and UI state
//! - `content`: songs, concert events and their presentation helpers
//! - `playlist`: the user-curated playlist
//! - `playback`: player snapshots and timing
//! - `session`: authenticated session and role gating
//! - `form`: text-entry forms and their validation
//! - `api_client`: remote API client
//! - `app_model`: main application model with state management methods

mod types;
mod content;
pub(crate) mod playlist;
mod playback;
mod session;
mod form;
mod api_client;
mod app_model;

pub use types::{Notice, NoticeKind, Page, PendingConfirm, UiState, NOTICE_TTL};

pub use content::{
    format_clock, format_long_date, format_price_ars, parse_clock, upcoming_events,
    CatalogEntry, ContentState, Event, EventId, ItemAction, PendingAction, SongList, Track,
    TrackId, UNKNOWN_DURATION,
};

pub use playlist::{PlaylistEntry, PlaylistStore};

pub use playback::{PlaybackTiming, PlayerState, PlayerStatus};

pub use session::{can_access, LoginResponse, Role, Session};

pub use form::{validate_login, FieldKind, FormField, FormKind, FormState, MIN_PASSWORD_LEN};

pub use api_client::{BandApiClient, SongUpload};

pub use app_model::{visible_upcoming, AppModel, HOME_EVENT_LIMIT};
