//! Overlay rendering (notice, confirmation prompt, help popup)

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::model::{Notice, NoticeKind, PendingConfirm};
use super::utils::centered_rect;

pub fn render_notice(frame: &mut Frame, notice: &Notice) {
    let area = frame.area();

    let popup_width = 52.min(area.width.saturating_sub(4));
    let inner_width = popup_width.saturating_sub(4).max(1) as usize;
    let line_count = notice.text.chars().count().div_ceil(inner_width) as u16;
    let popup_height = 2 + line_count.max(1);

    // Bottom right, above the player bar
    let mut popup_area = centered_rect(popup_width, popup_height, area);
    popup_area.x = area.width.saturating_sub(popup_area.width + 1);
    popup_area.y = area.height.saturating_sub(popup_area.height + 3);

    let (color, title) = match notice.kind {
        NoticeKind::Success => (Color::Green, " Listo "),
        NoticeKind::Error => (Color::Red, " Error (Esc para cerrar) "),
    };

    frame.render_widget(Clear, popup_area);

    let widget = Paragraph::new(notice.text.clone())
        .style(Style::default().fg(color))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(title)
                .title_style(Style::default().fg(color).add_modifier(Modifier::BOLD))
                .style(Style::default().bg(Color::Black)),
        );
    frame.render_widget(widget, popup_area);
}

pub fn render_confirm(frame: &mut Frame, confirm: &PendingConfirm) {
    let popup_area = centered_rect(56, 6, frame.area());
    frame.render_widget(Clear, popup_area);

    let lines = vec![
        Line::from(confirm.prompt()),
        Line::from(""),
        Line::from(vec![
            Span::styled("Y/Enter", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::raw(" confirmar   "),
            Span::styled("N/Esc", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::raw(" cancelar"),
        ]),
    ];

    let widget = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Confirmar ")
            .title_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            .style(Style::default().bg(Color::Black)),
    );
    frame.render_widget(widget, popup_area);
}

pub fn render_help_popup(frame: &mut Frame) {
    let keybindings = vec![
        ("", "── Navegación ──"),
        ("Tab / Shift+Tab", "Cambiar de página"),
        ("↑ / ↓", "Mover selección"),
        ("F5", "Recargar página"),
        ("O", "Cerrar sesión"),
        ("", ""),
        ("", "── Reproductor ──"),
        ("Space", "Reproducir / Pausar"),
        ("N / P", "Siguiente / Anterior"),
        ("S", "Aleatorio"),
        ("R", "Repetir"),
        ("+ / -", "Volumen"),
        ("M", "Silenciar"),
        (", / .", "Retroceder / Avanzar 10s"),
        ("0-9", "Saltar al 0%-90%"),
        ("", ""),
        ("", "── Páginas ──"),
        ("Enter", "Escuchanos: reproducir"),
        ("A", "Escuchanos: agregar / quitar"),
        ("C / E / X", "Admin: crear / editar / borrar"),
        ("/", "Reproductor: buscar"),
        ("I / Enter", "Formularios: escribir"),
        ("", ""),
        ("", "── General ──"),
        ("H / ?", "Mostrar esta ayuda"),
        ("Q", "Salir"),
    ];

    let popup_area = centered_rect(62, keybindings.len() as u16 + 2, frame.area());
    frame.render_widget(Clear, popup_area);

    let lines: Vec<Line> = keybindings
        .iter()
        .map(|(key, desc)| {
            if key.is_empty() {
                // Section header or empty line
                Line::from(Span::styled(
                    format!("{:^38}", desc),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(vec![
                    Span::styled(
                        format!("{:>18}", key),
                        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("  "),
                    Span::styled(desc.to_string(), Style::default().fg(Color::White)),
                ])
            }
        })
        .collect();

    let help_text = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Ayuda (H o Esc para cerrar) ")
                .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                .style(Style::default().bg(Color::Black)),
        )
        .style(Style::default().bg(Color::Black));

    frame.render_widget(help_text, popup_area);
}
