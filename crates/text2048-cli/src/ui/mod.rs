//! Ratatui widgets for the board and the episode statistics.

use ratatui::{layout::Rect, widgets::Block as BlockWidget};

pub use self::{board_display::*, game_display::*, key_binding_display::*, stats_display::*};

mod board_display;
mod game_display;
mod key_binding_display;
mod stats_display;

mod style {
    use ratatui::style::{Color, Style};

    pub const DEFAULT: Style = Style::new().fg(Color::White).bg(Color::Black);
    pub const EMPTY: Style = Style::new().fg(Color::DarkGray).bg(Color::Black);

    const TILE_BACKGROUNDS: [Color; 11] = [
        Color::Rgb(238, 228, 218),
        Color::Rgb(237, 224, 200),
        Color::Rgb(242, 177, 121),
        Color::Rgb(245, 149, 99),
        Color::Rgb(246, 124, 95),
        Color::Rgb(246, 94, 59),
        Color::Rgb(237, 207, 114),
        Color::Rgb(237, 204, 97),
        Color::Rgb(237, 200, 80),
        Color::Rgb(237, 197, 63),
        Color::Rgb(237, 194, 46),
    ];

    /// Style of a non-empty tile. Tiles past 2048 share one style.
    pub fn tile(exponent: u8) -> Style {
        let index = usize::from(exponent.saturating_sub(1));
        match TILE_BACKGROUNDS.get(index) {
            Some(bg) => {
                let fg = if exponent <= 2 {
                    Color::Rgb(119, 110, 101)
                } else {
                    Color::White
                };
                Style::new().fg(fg).bg(*bg)
            }
            None => Style::new().fg(Color::White).bg(Color::Rgb(60, 58, 50)),
        }
    }
}

fn block_vertical_margin(block: Option<&BlockWidget>) -> u16 {
    let dummy_rect = Rect::new(0, 0, 100, 100);
    let inner_rect = block.map_or(dummy_rect, |block| block.inner(dummy_rect));
    dummy_rect.height - inner_rect.height
}

fn block_horizontal_margin(block: Option<&BlockWidget>) -> u16 {
    let dummy_rect = Rect::new(0, 0, 100, 100);
    let inner_rect = block.map_or(dummy_rect, |block| block.inner(dummy_rect));
    dummy_rect.width - inner_rect.width
}
