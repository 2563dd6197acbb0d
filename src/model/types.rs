//! Core type definitions for the application

use std::time::{Duration, Instant};

use super::content::{EventId, TrackId};

/// How long a notice stays up before clearing itself
pub const NOTICE_TTL: Duration = Duration::from_secs(5);

/// A client-visible route
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Page {
    #[default]
    Home,
    MusicCatalog,
    Events,
    About,
    Dashboard,
    MusicAdmin,
    Login,
    Register,
    ConfirmCode,
}

impl Page {
    /// Order of the navigation bar; Register and ConfirmCode are reached from Login
    pub const NAV: [Page; 7] = [
        Page::Home,
        Page::MusicCatalog,
        Page::Events,
        Page::About,
        Page::Dashboard,
        Page::MusicAdmin,
        Page::Login,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Page::Home => "Inicio",
            Page::MusicCatalog => "Escuchanos",
            Page::Events => "Eventos",
            Page::About => "Nosotros",
            Page::Dashboard => "Dashboard",
            Page::MusicAdmin => "Reproductor",
            Page::Login => "Login",
            Page::Register => "Registro",
            Page::ConfirmCode => "Confirmar cuenta",
        }
    }

    pub fn requires_admin(self) -> bool {
        matches!(self, Page::Dashboard | Page::MusicAdmin)
    }

    /// Pages that show a selectable list
    pub fn has_list(self) -> bool {
        matches!(
            self,
            Page::Home | Page::MusicCatalog | Page::Events | Page::Dashboard | Page::MusicAdmin
        )
    }

    fn nav_position(self) -> usize {
        match self {
            // Auth sub-pages sit where Login does
            Page::Register | Page::ConfirmCode => Page::NAV.len() - 1,
            page => Page::NAV.iter().position(|p| *p == page).unwrap_or(0),
        }
    }

    pub fn next(self) -> Self {
        Page::NAV[(self.nav_position() + 1) % Page::NAV.len()]
    }

    pub fn prev(self) -> Self {
        let len = Page::NAV.len();
        Page::NAV[(self.nav_position() + len - 1) % len]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A dismissible status message
#[derive(Clone, Debug)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    pub at: Instant,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
            at: Instant::now(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
            at: Instant::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.at.elapsed() >= NOTICE_TTL
    }
}

/// Destructive actions waiting for a y/n answer
#[derive(Clone, Debug, PartialEq)]
pub enum PendingConfirm {
    DeleteEvent { id: EventId, title: String },
    DeleteSong { id: TrackId, title: String },
}

impl PendingConfirm {
    pub fn prompt(&self) -> String {
        match self {
            PendingConfirm::DeleteEvent { title, .. } => {
                format!("¿Seguro que querés borrar el evento \"{title}\"?")
            }
            PendingConfirm::DeleteSong { title, .. } => {
                format!("¿Eliminar la canción \"{title}\"?")
            }
        }
    }
}

/// UI state for the application
#[derive(Clone, Debug, Default)]
pub struct UiState {
    pub page: Page,
    pub selected: usize,
    pub notice: Option<Notice>,
    pub confirm: Option<PendingConfirm>,
    pub show_help: bool,
    pub loading: bool,
    pub search_query: String,
    pub search_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nav_cycles_both_ways() {
        let mut page = Page::Home;
        for _ in 0..Page::NAV.len() {
            page = page.next();
        }
        assert_eq!(page, Page::Home);
        assert_eq!(Page::Home.prev(), Page::Login);
        assert_eq!(Page::Register.next(), Page::Home);
    }

    #[test]
    fn fresh_notice_is_not_expired() {
        assert!(!Notice::error("boom").is_expired());
        let old = Notice {
            at: Instant::now() - NOTICE_TTL,
            ..Notice::success("ok")
        };
        assert!(old.is_expired());
    }
}
