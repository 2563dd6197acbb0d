//! Layout rendering (navigation bar, session box, playlist sidebar)

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, ListItem, Paragraph},
    Frame,
};
use ratatui::widgets::Padding;

use crate::model::{can_access, Page, PlayerState, Session, Track};
use super::utils::{calculate_num_width, render_scrollable_list, truncate_string};

pub fn render_top_bar(frame: &mut Frame, area: Rect, page: Page, session: Option<&Session>) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),     // Page tabs
            Constraint::Length(30), // Session
        ])
        .split(area);

    // Register and confirm live under the Login tab
    let active = match page {
        Page::Register | Page::ConfirmCode => Page::Login,
        other => other,
    };

    let mut spans = Vec::new();
    for nav in Page::NAV {
        if !can_access(session, nav) || (nav == Page::Login && session.is_some()) {
            continue;
        }
        let style = if nav == active {
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(format!(" {} ", nav.title()), style));
        spans.push(Span::raw(" "));
    }

    let tabs = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Banda ")
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(tabs, chunks[0]);

    let (text, style) = match session {
        Some(session) => (
            format!("👤 {} ({})", session.name, session.role),
            Style::default().fg(Color::Cyan),
        ),
        None => ("Invitado".to_string(), Style::default().fg(Color::DarkGray)),
    };
    let session_box = Paragraph::new(text)
        .style(style)
        .block(Block::default().borders(Borders::ALL).title(" Sesión "));
    frame.render_widget(session_box, chunks[1]);
}

pub fn render_playlist(frame: &mut Frame, area: Rect, playlist: &[Track], player: &PlayerState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Playlist ({}) ", playlist.len()))
        .padding(Padding::horizontal(1));

    if playlist.is_empty() {
        let empty = Paragraph::new("Agregá canciones desde Escuchanos con A")
            .style(Style::default().fg(Color::DarkGray))
            .wrap(ratatui::widgets::Wrap { trim: true })
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let num_width = calculate_num_width(playlist.len());
    let title_width = (area.width.saturating_sub(4) as usize).saturating_sub(num_width + 2);

    let items: Vec<ListItem> = playlist
        .iter()
        .enumerate()
        .map(|(i, track)| {
            let is_current = player.index == Some(i);
            let marker = if is_current { "▶" } else { " " };
            let style = if is_current {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(format!(
                "{}{:<num_width$}{}",
                marker,
                i + 1,
                truncate_string(&track.title, title_width),
                num_width = num_width
            ))
            .style(style)
        })
        .collect();

    render_scrollable_list(frame, area, items, player.index.unwrap_or(0), block);
}
