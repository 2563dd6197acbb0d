//! Utility functions for rendering UI components

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, List, ListItem, ListState},
    Frame,
};

pub fn render_scrollable_list(
    frame: &mut Frame,
    area: Rect,
    items: Vec<ListItem>,
    selected_index: usize,
    block: Block,
) {
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default()); // Highlight handled by item styles

    let mut list_state = ListState::default();
    list_state.select(Some(selected_index));

    frame.render_stateful_widget(list, area, &mut list_state);
}

/// Calculate width needed for index column (log10(n) + padding)
pub fn calculate_num_width(item_count: usize) -> usize {
    if item_count == 0 {
        2
    } else {
        let digits = (item_count as f64).log10().floor() as usize + 1;
        digits + 1
    }
}

pub fn truncate_string(s: &str, max_width: usize) -> String {
    if s.chars().count() > max_width {
        let truncated: String = s.chars().take(max_width.saturating_sub(3)).collect();
        format!("{:<width$}", format!("{}...", truncated), width = max_width)
    } else {
        format!("{:<width$}", s, width = max_width)
    }
}

pub fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    }
}

/// A `width` x `height` box centered in `area`, shrunk to fit
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_long_text_with_ellipsis() {
        assert_eq!(truncate_string("Fuego en la ruta", 10), "Fuego e...");
        assert_eq!(truncate_string("Luz", 6), "Luz   ");
    }

    #[test]
    fn num_width_grows_with_digits() {
        assert_eq!(calculate_num_width(0), 2);
        assert_eq!(calculate_num_width(9), 2);
        assert_eq!(calculate_num_width(120), 4);
    }

    #[test]
    fn centered_rect_fits_inside_small_areas() {
        let area = Rect::new(0, 0, 40, 10);
        let popup = centered_rect(80, 30, area);
        assert!(popup.width <= 36);
        assert!(popup.height <= 8);
        assert_eq!(popup.x, (40 - popup.width) / 2);
    }
}
