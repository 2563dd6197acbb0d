//! Page rendering (home, catalog, events, admin pages and forms)

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, ListItem, Paragraph, Wrap},
    Frame,
};
use ratatui::widgets::Padding;

use crate::model::{
    visible_upcoming, CatalogEntry, Event, FieldKind, FormKind, FormState, ItemAction, Page,
    PendingAction, Track,
};
use super::utils::{border_style, calculate_num_width, centered_rect, render_scrollable_list, truncate_string};
use super::ViewData;

pub fn render_page(frame: &mut Frame, area: Rect, data: &ViewData) {
    let ui = data.ui_state;
    let page = ui.page;

    if ui.loading && page.has_list() {
        let loading = Paragraph::new("Cargando...")
            .style(Style::default().fg(Color::Yellow))
            .block(page_block(page));
        frame.render_widget(loading, area);
        return;
    }

    match page {
        Page::Home => render_home(frame, area, data),
        Page::MusicCatalog => render_catalog(frame, area, data),
        Page::Events => render_events(frame, area, &data.content.events, ui.selected, false),
        Page::About => render_about(frame, area),
        Page::Dashboard => render_events(frame, area, &data.content.events, ui.selected, true),
        Page::MusicAdmin => render_music_admin(frame, area, data),
        Page::Login | Page::Register | Page::ConfirmCode => match data.form {
            Some(form) => render_auth_form(frame, area, page, form),
            None => frame.render_widget(Paragraph::new("").block(page_block(page)), area),
        },
    }
}

fn page_block(page: Page) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", page.title()))
        .padding(Padding::horizontal(1))
        .border_style(border_style(true))
}

fn render_home(frame: &mut Frame, area: Rect, data: &ViewData) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Hero
            Constraint::Min(0),    // Upcoming shows
        ])
        .split(area);

    let hero = Paragraph::new(vec![
        Line::from(Span::styled(
            "Bienvenidos",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )),
        Line::from("Escuchá nuestra música y enterate de los próximos shows."),
        Line::from(Span::styled(
            "Enter: ver todos los eventos",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .block(page_block(Page::Home));
    frame.render_widget(hero, chunks[0]);

    let upcoming = visible_upcoming(&data.content.events);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Próximos shows ")
        .padding(Padding::horizontal(1));

    if upcoming.is_empty() {
        let text = if data.content.events_loaded {
            "No hay shows programados por ahora."
        } else {
            ""
        };
        let empty = Paragraph::new(text)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, chunks[1]);
        return;
    }

    let width = chunks[1].width.saturating_sub(4) as usize;
    let items = event_items(&upcoming, data.ui_state.selected, width, false);
    render_scrollable_list(frame, chunks[1], items, data.ui_state.selected, block);
}

fn render_about(frame: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(Span::styled(
            "Sobre nosotros",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Somos una banda independiente. Tocamos en vivo, grabamos nuestras canciones"),
        Line::from("y las compartimos acá para que las escuches cuando quieras."),
        Line::from(""),
        Line::from("Seguinos en los próximos shows desde la página de Eventos."),
    ];
    let about = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .block(page_block(Page::About));
    frame.render_widget(about, area);
}

fn event_items(events: &[Event], selected: usize, width: usize, admin: bool) -> Vec<ListItem<'static>> {
    let num_width = calculate_num_width(events.len());
    let price_width = 12;
    let date_width = 34.min(width / 3);
    let remaining = width.saturating_sub(1 + num_width + date_width + price_width + 9);
    let title_width = remaining / 2;
    let place_width = remaining.saturating_sub(title_width);

    events
        .iter()
        .enumerate()
        .map(|(i, event)| {
            let style = if i == selected {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else if !event.available {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
            };
            let price = if event.available {
                event.formatted_price()
            } else {
                "Agotado".to_string()
            };
            let id_hint = match (&event.id, admin) {
                (None, true) => " (sin id)",
                _ => "",
            };
            ListItem::new(format!(
                " {:<num_width$}   {}   {}   {}   {:>price_width$}{}",
                i + 1,
                truncate_string(&event.formatted_date(), date_width),
                truncate_string(&event.title, title_width),
                truncate_string(&event.location(), place_width),
                price,
                id_hint,
                num_width = num_width,
                price_width = price_width,
            ))
            .style(style)
        })
        .collect()
}

fn render_events(frame: &mut Frame, area: Rect, events: &[Event], selected: usize, admin: bool) {
    let page = if admin { Page::Dashboard } else { Page::Events };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // List
            Constraint::Length(7), // Detail
        ])
        .split(area);

    let mut block = page_block(page);
    if admin {
        block = block.title_bottom(
            Line::from(" C: crear | E: editar | X: eliminar | F5: recargar ").right_aligned(),
        );
    }

    if events.is_empty() {
        let empty = Paragraph::new("No hay eventos publicados.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let width = chunks[0].width.saturating_sub(4) as usize;
    let items = event_items(events, selected, width, admin);
    render_scrollable_list(frame, chunks[0], items, selected, block);

    if let Some(event) = events.get(selected) {
        render_event_detail(frame, chunks[1], event);
    }
}

fn render_event_detail(frame: &mut Frame, area: Rect, event: &Event) {
    let mut lines = vec![Line::from(vec![
        Span::styled(event.title.clone(), Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw(format!("  {} {}", event.formatted_date(), event.time)),
    ])];
    let mut facts = vec![event.location()];
    if !event.category.is_empty() {
        facts.push(event.category.clone());
    }
    if let Some(tickets) = event.tickets {
        facts.push(format!("{} entradas", tickets));
    }
    lines.push(Line::from(facts.join(" · ")));
    if !event.description.is_empty() {
        lines.push(Line::from(event.description.clone()));
    }

    let detail = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" Detalle ").padding(Padding::horizontal(1)));
    frame.render_widget(detail, area);
}

fn action_marker(entry: &CatalogEntry, in_playlist: bool) -> &'static str {
    match entry.action {
        ItemAction::Pending(PendingAction::Adding) => "agregando...",
        ItemAction::Pending(PendingAction::Removing) => "quitando...",
        ItemAction::Pending(PendingAction::Deleting) => "borrando...",
        ItemAction::Idle if in_playlist => "✓ en playlist",
        ItemAction::Idle => "",
    }
}

fn song_items<'a>(
    entries: impl Iterator<Item = &'a CatalogEntry>,
    count: usize,
    selected: usize,
    playing: Option<&Track>,
    playlist: &[Track],
    width: usize,
) -> Vec<ListItem<'static>> {
    let num_width = calculate_num_width(count);
    let duration_width = 6;
    let marker_width = 14;
    let fixed_width = 1 + num_width + 3 + 3 + 3 + duration_width + 3 + marker_width;
    let remaining = width.saturating_sub(fixed_width);
    let title_width = (remaining * 55) / 100;
    let artist_width = remaining.saturating_sub(title_width);

    let mut items = vec![ListItem::new(format!(
        " {:<num_width$}   {:<title_width$}   {:<artist_width$}   {:>duration_width$}",
        "#",
        "Título",
        "Artista",
        "Dur.",
        num_width = num_width,
        title_width = title_width,
        artist_width = artist_width,
        duration_width = duration_width,
    ))
    .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))];

    items.extend(entries.enumerate().map(|(i, entry)| {
        let track = &entry.track;
        let is_playing = playing.is_some_and(|p| p.id == track.id);
        let in_playlist = playlist.iter().any(|t| t.id == track.id);
        let style = if i == selected {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else if is_playing {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else if entry.is_pending() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };
        let playing_indicator = if is_playing { "▶" } else { " " };

        ListItem::new(format!(
            "{}{:<num_width$}   {}   {}   {:>duration_width$}   {}",
            playing_indicator,
            i + 1,
            truncate_string(&track.title, title_width),
            truncate_string(&track.artist, artist_width),
            track.duration,
            action_marker(entry, in_playlist),
            num_width = num_width,
            duration_width = duration_width,
        ))
        .style(style)
    }));
    items
}

fn render_catalog(frame: &mut Frame, area: Rect, data: &ViewData) {
    let songs = &data.content.songs;
    let block = page_block(Page::MusicCatalog).title_bottom(
        Line::from(" Enter: reproducir | A: agregar/quitar de la playlist ").right_aligned(),
    );

    if songs.is_empty() {
        let text = if data.content.songs_loaded {
            "Todavía no hay canciones."
        } else {
            ""
        };
        let empty = Paragraph::new(text)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let width = area.width.saturating_sub(4) as usize;
    let selected = data.ui_state.selected;
    let items = song_items(
        songs.iter(),
        songs.len(),
        selected,
        data.player.track.as_ref(),
        data.playlist,
        width,
    );
    render_scrollable_list(frame, area, items, selected + 1, block);
}

fn render_music_admin(frame: &mut Frame, area: Rect, data: &ViewData) {
    let ui = data.ui_state;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Search
            Constraint::Min(0),    // Songs
        ])
        .split(area);

    let search_text = if ui.search_query.is_empty() && !ui.search_active {
        "/ para buscar por título, artista o álbum".to_string()
    } else {
        ui.search_query.clone()
    };
    let search = Paragraph::new(search_text)
        .style(if ui.search_active {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray)
        })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Buscar ")
                .padding(Padding::horizontal(1))
                .border_style(border_style(ui.search_active)),
        );
    frame.render_widget(search, chunks[0]);

    let block = page_block(Page::MusicAdmin).title_bottom(
        Line::from(" C: subir | E: editar | X: eliminar | F5: recargar ").right_aligned(),
    );

    let count = data.content.filtered_songs(&ui.search_query).count();
    if count == 0 {
        let text = if !ui.search_query.is_empty() {
            "Ninguna canción coincide con la búsqueda."
        } else if data.content.songs_loaded {
            "Todavía no hay canciones."
        } else {
            ""
        };
        let empty = Paragraph::new(text)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, chunks[1]);
        return;
    }

    let width = chunks[1].width.saturating_sub(4) as usize;
    let items = song_items(
        data.content.filtered_songs(&ui.search_query),
        count,
        ui.selected,
        data.player.track.as_ref(),
        data.playlist,
        width,
    );
    render_scrollable_list(frame, chunks[1], items, ui.selected + 1, block);
}

fn form_lines(form: &FormState, label_width: usize) -> Vec<Line<'static>> {
    form.fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let focused = i == form.focused;
            let value = match field.kind {
                FieldKind::Secret => "•".repeat(field.value.chars().count()),
                FieldKind::Toggle => {
                    if field.is_on() { "[x]".to_string() } else { "[ ]".to_string() }
                }
                FieldKind::Text | FieldKind::Path => field.value.clone(),
            };
            let cursor = if focused && form.editing && field.kind != FieldKind::Toggle {
                "▏"
            } else {
                ""
            };
            let label_style = if focused {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Cyan)
            };
            Line::from(vec![
                Span::styled(format!("{:>label_width$}: ", field.label, label_width = label_width), label_style),
                Span::raw(value),
                Span::styled(cursor, Style::default().fg(Color::Green)),
            ])
        })
        .collect()
}

fn form_footer(form: &FormState) -> Line<'static> {
    let text = if form.submitting {
        " Enviando... "
    } else if form.editing {
        " Tab/↑↓: campo | Enter: enviar | Esc: salir "
    } else {
        " Enter o I: escribir "
    };
    Line::from(text).right_aligned()
}

fn render_auth_form(frame: &mut Frame, area: Rect, page: Page, form: &FormState) {
    let mut lines = Vec::new();
    match &form.kind {
        FormKind::Login => {
            lines.push(Line::from(Span::styled(
                "Ingresá con tu cuenta",
                Style::default().add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(Span::styled(
                "¿No tenés cuenta? C para registrarte",
                Style::default().fg(Color::DarkGray),
            )));
        }
        FormKind::Register => {
            lines.push(Line::from(Span::styled(
                "Creá tu cuenta",
                Style::default().add_modifier(Modifier::BOLD),
            )));
        }
        FormKind::ConfirmCode { email } => {
            lines.push(Line::from(format!("Ingresá el código que enviamos a {}", email)));
        }
        _ => {}
    }
    lines.push(Line::from(""));
    lines.extend(form_lines(form, 12));

    let widget = Paragraph::new(lines).block(page_block(page).title_bottom(form_footer(form)));
    frame.render_widget(widget, area);
}

pub fn render_form_popup(frame: &mut Frame, form: &FormState) {
    let title = match &form.kind {
        FormKind::Event { editing: Some(_) } => " Editar evento ",
        FormKind::Event { editing: None } => " Nuevo evento ",
        FormKind::Song { editing: Some(_) } => " Editar canción ",
        _ => " Subir canción ",
    };

    let popup_area = centered_rect(70, form.fields.len() as u16 + 2, frame.area());
    frame.render_widget(Clear, popup_area);

    let widget = Paragraph::new(form_lines(form, 16)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(title)
            .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .title_bottom(form_footer(form))
            .padding(Padding::horizontal(1))
            .style(Style::default().bg(Color::Black)),
    );
    frame.render_widget(widget, popup_area);
}
