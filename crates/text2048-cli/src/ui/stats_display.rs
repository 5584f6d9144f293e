use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    text::Line,
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};
use text2048_engine::{GameState, GameStats};

use super::style;

/// Score, move count and largest tile of the running episode.
#[derive(Debug)]
pub struct StatsDisplay<'a> {
    state: &'a GameState,
    stats: &'a GameStats,
    block: Option<BlockWidget<'a>>,
}

type RowValue = fn(&GameState, &GameStats) -> String;

const ROWS: &[(&str, RowValue)] = &[
    ("SCORE:", |state, _| state.score().to_string()),
    ("MOVES:", |state, _| state.moves().to_string()),
    ("MAX TILE:", |state, _| state.board().max_tile().to_string()),
    ("MERGES:", |_, stats| stats.merges().to_string()),
    ("WASTED:", |_, stats| stats.ineffective_moves().to_string()),
];

impl<'a> StatsDisplay<'a> {
    pub fn new(state: &'a GameState, stats: &'a GameStats) -> Self {
        Self {
            state,
            stats,
            block: None,
        }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        22 + super::block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        u16::try_from(ROWS.len()).unwrap_or(u16::MAX)
            + super::block_vertical_margin(self.block.as_ref())
    }
}

impl Widget for StatsDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let rows = Layout::vertical(ROWS.iter().map(|_| Constraint::Length(1))).split(area);
        for ((label, value), row_area) in ROWS.iter().zip(rows.iter()) {
            let [label_area, value_area] =
                row_area.layout(&Layout::horizontal([Constraint::Fill(1), Constraint::Fill(1)]));
            Line::styled(*label, style::DEFAULT)
                .left_aligned()
                .render(label_area, buf);
            Line::styled(value(self.state, self.stats), style::DEFAULT)
                .right_aligned()
                .render(value_area, buf);
        }
    }
}
