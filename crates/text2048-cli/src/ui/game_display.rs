use ratatui::{
    layout::{Constraint, Flex, Layout},
    prelude::{Buffer, Rect},
    style::{Color, Style},
    text::{Line, Text},
    widgets::{Block, Clear, Widget},
};
use text2048_engine::{GameState, GameStats};

use super::{BoardDisplay, StatsDisplay, style};

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum PlayStatus {
    Playing,
    Paused,
    GameOver,
}

impl PlayStatus {
    pub fn toggle_pause(self) -> Self {
        match self {
            Self::Playing => Self::Paused,
            Self::Paused => Self::Playing,
            Self::GameOver => Self::GameOver,
        }
    }
}

/// Board and statistics side by side, with a banner while paused or over.
#[derive(Debug)]
pub struct GameDisplay<'a> {
    state: &'a GameState,
    stats: &'a GameStats,
    status: PlayStatus,
    title: &'a str,
}

impl<'a> GameDisplay<'a> {
    pub fn new(state: &'a GameState, stats: &'a GameStats, status: PlayStatus) -> Self {
        Self {
            state,
            stats,
            status,
            title: "2048",
        }
    }

    pub fn title(self, title: &'a str) -> Self {
        Self { title, ..self }
    }
}

impl Widget for GameDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border = match self.status {
            PlayStatus::Playing => Color::White,
            PlayStatus::Paused => Color::Yellow,
            PlayStatus::GameOver => Color::Red,
        };
        let panel = |title: &'static str| {
            Block::bordered()
                .title(Line::from(title).centered())
                .border_style(Style::new().fg(border))
                .style(style::DEFAULT)
        };

        let board = BoardDisplay::new(self.state.board()).block(
            Block::bordered()
                .title(Line::from(self.title).centered())
                .border_style(Style::new().fg(border))
                .style(style::DEFAULT),
        );
        let stats = StatsDisplay::new(self.state, self.stats).block(panel("STATS"));

        let [board_column, stats_column] = Layout::horizontal([
            Constraint::Length(board.width()),
            Constraint::Length(stats.width()),
        ])
        .flex(Flex::Center)
        .spacing(1)
        .areas(area);
        let [board_area] = Layout::vertical([Constraint::Length(board.height())]).areas(board_column);
        let [stats_area] = Layout::vertical([Constraint::Length(stats.height())]).areas(stats_column);

        let board_width = board.width();
        board.render(board_area, buf);
        stats.render(stats_area, buf);

        let banner = match self.status {
            PlayStatus::Playing => None,
            PlayStatus::Paused => Some(("PAUSED", Style::new().fg(Color::Black).bg(Color::Yellow))),
            PlayStatus::GameOver => Some(("GAME OVER", Style::new().fg(Color::White).bg(Color::Red))),
        };
        if let Some((text, style)) = banner {
            let block = Block::new().style(style);
            let area = board_area.centered(Constraint::Length(board_width), Constraint::Length(3));
            let inner = block.inner(area);
            Clear.render(area, buf);
            block.render(area, buf);
            Text::styled(text, style)
                .centered()
                .render(inner.centered_vertically(Constraint::Length(1)), buf);
        }
    }
}
