use ratatui::{
    layout::{Constraint, Layout},
    prelude::{Buffer, Rect},
    text::Line,
    widgets::{Block as BlockWidget, BlockExt as _, Paragraph, Widget},
};
use text2048_engine::{Board, tile_value};

use super::style;

const CELL_WIDTH: u16 = 7;
const CELL_HEIGHT: u16 = 3;

/// The tile grid, one boxed cell per tile.
#[derive(Debug)]
pub struct BoardDisplay<'a> {
    board: &'a Board,
    block: Option<BlockWidget<'a>>,
}

impl<'a> BoardDisplay<'a> {
    pub fn new(board: &'a Board) -> Self {
        Self { board, block: None }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    fn side(&self) -> u16 {
        u16::try_from(self.board.size()).unwrap_or(u16::MAX)
    }

    pub fn width(&self) -> u16 {
        self.side() * CELL_WIDTH + super::block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        self.side() * CELL_HEIGHT + super::block_vertical_margin(self.block.as_ref())
    }
}

/// Text shown in a tile, `·` for an empty cell.
fn tile_label(exponent: u8) -> String {
    if exponent == 0 {
        "·".to_owned()
    } else {
        tile_value(exponent).to_string()
    }
}

impl Widget for BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let size = self.board.size();
        let rows = Layout::vertical((0..size).map(|_| Constraint::Length(CELL_HEIGHT))).split(area);
        for (row_area, row) in rows.iter().zip(self.board.rows()) {
            let cells =
                Layout::horizontal((0..size).map(|_| Constraint::Length(CELL_WIDTH))).split(*row_area);
            for (cell_area, &exponent) in cells.iter().zip(row) {
                let style = if exponent == 0 {
                    style::EMPTY
                } else {
                    style::tile(exponent)
                };
                let label = Line::from(tile_label(exponent)).centered();
                Paragraph::new(vec![Line::default(), label])
                    .style(style)
                    .render(*cell_area, buf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_label() {
        assert_eq!(tile_label(0), "·");
        assert_eq!(tile_label(1), "2");
        assert_eq!(tile_label(11), "2048");
    }

    #[test]
    fn test_render_shows_tiles() {
        let board = Board::from_rows(&[[2, 0], [0, 2048]]).unwrap();
        let widget = BoardDisplay::new(&board).block(BlockWidget::bordered());
        let area = Rect::new(0, 0, widget.width(), widget.height());
        assert_eq!(area.width, 2 * CELL_WIDTH + 2);
        assert_eq!(area.height, 2 * CELL_HEIGHT + 2);

        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);
        let text = buf
            .content()
            .iter()
            .map(ratatui::buffer::Cell::symbol)
            .collect::<String>();
        assert!(text.contains("2048"));
        assert!(text.contains('·'));
    }
}
