//! Player bar rendering

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Gauge},
    Frame,
};

use crate::model::{format_clock, PlayerState, PlayerStatus};

pub fn render_player_bar(frame: &mut Frame, area: Rect, player: &PlayerState) {
    let status_text = match (&player.track, player.status) {
        (None, _) | (_, PlayerStatus::Empty) => " Playlist vacía".to_string(),
        (Some(track), PlayerStatus::Playing) => format!(" ▶ {} | {}", track.title, track.artist),
        (Some(track), _) => format!("⏸  {} | {}", track.title, track.artist),
    };

    let shuffle_text = if player.shuffle { "Aleatorio: Sí" } else { "Aleatorio: No" };
    let repeat_text = if player.repeat { "Repetir: Sí" } else { "Repetir: No" };
    let volume_text = if player.muted {
        "Vol: silencio".to_string()
    } else {
        format!("Vol: {}%", player.volume_percent())
    };

    let time_str = if player.track.is_some() {
        format!(
            "{} / {}",
            format_clock(player.elapsed.as_secs()),
            format_clock(player.duration.as_secs())
        )
    } else {
        String::new()
    };

    let title = format!("{} ", status_text);
    let controls_info = format!(" {} | {} | {} ", shuffle_text, repeat_text, volume_text);

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .title_bottom(Line::from(controls_info).right_aligned()),
        )
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(player.progress_ratio())
        .label(time_str);

    frame.render_widget(gauge, area);
}
