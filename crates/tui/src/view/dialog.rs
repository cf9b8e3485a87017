use crate::handlers::confirm::{handle_dialog_key, DialogResponse, CANCEL_INDEX, CONFIRM_INDEX};
use crossterm::event::{KeyEvent, KeyEventKind};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph, Widget};

use super::text::{truncate_to_width, wrap_text};
use super::{DialogCursor, DialogProps, DialogRenderer};

const DIALOG_MAX_WIDTH: u16 = 56;
const DIALOG_MIN_WIDTH: u16 = 16;
const HINT: &str = "y/Enter confirm  n/Esc cancel";
const ACCENT: Color = Color::Cyan;
const DANGER: Color = Color::Red;
const FADED: Color = Color::DarkGray;
const FOOTER_ROWS: usize = 3;

/// Centered bordered popup with a description and two buttons.
///
/// Stacked dialogs are shifted one cell down and right per level so the
/// older ones stay visible behind the newest.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultDialogRenderer;

impl DefaultDialogRenderer {
    fn popup_area(area: Rect, content_height: u16, stack_index: usize) -> Rect {
        let width = area.width.min(DIALOG_MAX_WIDTH);
        let height = content_height.saturating_add(2).min(area.height);
        let offset = u16::try_from(stack_index).unwrap_or(u16::MAX);
        let max_x = area.width.saturating_sub(width);
        let max_y = area.height.saturating_sub(height);
        let x = (max_x / 2).saturating_add(offset).min(max_x);
        let y = (max_y / 2).saturating_add(offset).min(max_y);
        Rect::new(area.x + x, area.y + y, width, height)
    }

    fn button<'a>(label: &str, selected: bool, danger: bool) -> Span<'a> {
        let mut style = Style::default();
        if danger {
            style = style.fg(DANGER);
        }
        if selected {
            style = style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
        }
        Span::styled(format!("[ {label} ]"), style)
    }
}

impl DialogRenderer for DefaultDialogRenderer {
    fn render(&self, props: &DialogProps<'_>, cursor: &DialogCursor, area: Rect, buf: &mut Buffer) {
        let visible = props.open || props.closing;
        if !visible || area.width < DIALOG_MIN_WIDTH || area.height < 5 {
            return;
        }
        let inner_width = area.width.min(DIALOG_MAX_WIDTH).saturating_sub(4) as usize;
        // Borders take two rows; the blank line, buttons and hint always fit.
        let body_rows = (area.height as usize)
            .saturating_sub(2)
            .saturating_sub(FOOTER_ROWS);

        let mut lines: Vec<Line> = wrap_text(props.description, inner_width)
            .into_iter()
            .take(body_rows)
            .map(Line::from)
            .collect();
        lines.push(Line::default());
        lines.push(Line::from(vec![
            Self::button(
                props.cancel_text,
                props.open && cursor.selected == CANCEL_INDEX,
                false,
            ),
            Span::raw("  "),
            Self::button(
                props.confirm_text,
                props.open && cursor.selected == CONFIRM_INDEX,
                props.warning,
            ),
        ]));
        lines.push(Line::from(Span::styled(
            truncate_to_width(HINT, inner_width),
            Style::default().add_modifier(Modifier::DIM),
        )));

        let content_height = u16::try_from(lines.len()).unwrap_or(u16::MAX);
        let popup = Self::popup_area(area, content_height, props.stack_index);
        let border = match (props.closing, props.warning) {
            (true, _) => FADED,
            (false, true) => DANGER,
            (false, false) => ACCENT,
        };
        let title_text = if props.warning {
            format!(" ! {} ", props.title)
        } else {
            format!(" {} ", props.title)
        };
        let title = Span::styled(
            truncate_to_width(&title_text, popup.width.saturating_sub(2) as usize),
            Style::default().fg(border).add_modifier(Modifier::BOLD),
        );
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(Line::from(title))
            .padding(Padding::horizontal(1));
        let base = if props.closing {
            Style::default().add_modifier(Modifier::DIM)
        } else {
            Style::default()
        };

        Clear.render(popup, buf);
        Paragraph::new(Text::from(lines))
            .style(base)
            .block(block)
            .render(popup, buf);
    }

    fn handle_key(
        &self,
        props: &DialogProps<'_>,
        cursor: &mut DialogCursor,
        key: KeyEvent,
    ) -> bool {
        if !props.open || key.kind == KeyEventKind::Release {
            return false;
        }
        let update = handle_dialog_key(key.code, key.modifiers, cursor.selected);
        cursor.selected = update.selected;
        match update.response {
            Some(DialogResponse::Confirm) => props.on_confirm(),
            Some(DialogResponse::Cancel) => props.on_cancel(),
            Some(DialogResponse::Dismiss) => props.on_open_change(false),
            None => {}
        }
        update.consume
    }
}
