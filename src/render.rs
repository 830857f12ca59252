//! Renderer: owns the terminal canvas.
//!
//! The screen is partitioned into a scrolling output region on top and
//! a pinned bottom block: an optional suggestion overlay stacked above
//! a bordered input area. The renderer is the only component that
//! writes to the [`Console`]; everything else requests state
//! transitions through its methods.
//!
//! Invariant: the reserved suggestion-row count always matches the
//! rows most recently drawn or cleared. A missed clear leaves orphaned
//! glyphs on screen, so every path that shrinks the overlay clears the
//! outgoing rows before repainting.

use crate::console::Console;
use crate::suggest::{SuggestionItem, MAX_SUGGESTIONS};
use crossterm::style::Stylize;
use std::io;
use unicode_width::UnicodeWidthStr;

/// Input area: top border + prompt line + bottom border + margin.
const INPUT_AREA_ROWS: u16 = 4;

/// Prompt glyphs drawn before the edit buffer.
const PROMPT: &str = "\u{276f} ";

/// Column where suggestion descriptions start, relative to the label.
const LABEL_GUTTER: usize = 24;

/// Owns terminal geometry, the scroll region, the reserved
/// suggestion-row count, and the exclusive-mode flag.
pub struct Renderer {
    console: Box<dyn Console>,
    rows: u16,
    cols: u16,
    reserved: u16,
    exclusive: bool,
}

impl Renderer {
    /// Create a renderer over a console, measuring its size.
    pub fn new(console: Box<dyn Console>) -> io::Result<Self> {
        let (cols, rows) = console.size()?;
        Ok(Self {
            console,
            rows,
            cols,
            reserved: 0,
            exclusive: false,
        })
    }

    /// Current row count.
    pub fn rows(&self) -> u16 {
        self.rows
    }

    /// Current column count.
    pub fn cols(&self) -> u16 {
        self.cols
    }

    /// Rows currently reserved for the suggestion overlay.
    pub fn reserved_rows(&self) -> u16 {
        self.reserved
    }

    /// True while a full-screen caller owns the canvas.
    pub fn is_exclusive(&self) -> bool {
        self.exclusive
    }

    /// Display width of the prompt, independent of its byte encoding.
    pub fn prompt_width() -> u16 {
        PROMPT.width() as u16
    }

    // Row positions for the bottom input area, 1-based.
    fn top_border_row(&self) -> u16 {
        self.rows.saturating_sub(3)
    }

    fn input_row(&self) -> u16 {
        self.rows.saturating_sub(2)
    }

    fn bottom_border_row(&self) -> u16 {
        self.rows.saturating_sub(1)
    }

    fn clear_line_at(&mut self, row: u16) -> io::Result<()> {
        self.console.move_to(row, 1)?;
        self.console.clear_line()
    }

    fn draw_border(&mut self, row: u16) -> io::Result<()> {
        self.clear_line_at(row)?;
        let line = "\u{2500}".repeat(self.cols as usize);
        self.console.print(&line.dim().to_string())
    }

    /// Restrict scrolling to the rows above the pinned bottom block,
    /// so command output scrolls independently of the input area and
    /// any reserved suggestion rows.
    pub fn setup_scroll_region(&mut self) -> io::Result<()> {
        let output_bottom = self
            .top_border_row()
            .saturating_sub(1)
            .saturating_sub(self.reserved)
            .max(1);
        self.console.set_scroll_region(1, output_bottom)
    }

    /// Redraw the bordered input area with the edit buffer, leaving
    /// the terminal cursor visible at the edit position.
    ///
    /// `cursor` is a char offset into `buffer`; the prompt's display
    /// width offsets the on-screen column.
    pub fn draw_input(&mut self, buffer: &str, cursor: usize) -> io::Result<()> {
        self.console.save_cursor()?;

        let top = self.top_border_row();
        let bottom = self.bottom_border_row();
        self.draw_border(top)?;

        let input_row = self.input_row();
        self.clear_line_at(input_row)?;
        let line = format!("{}{}", PROMPT.green(), buffer);
        self.console.print(&line)?;

        self.draw_border(bottom)?;

        self.console
            .move_to(input_row, Self::prompt_width() + cursor as u16 + 1)?;
        self.console.show_cursor()
    }

    /// Paint the suggestion overlay above the input area.
    ///
    /// Rows freed by a shrinking list are cleared before the new rows
    /// are drawn, and the scroll region is recomputed for the new
    /// reserved count. `selected` of `None` renders no highlight
    /// (hint-only lists).
    pub fn draw_suggestions(
        &mut self,
        items: &[SuggestionItem],
        selected: Option<usize>,
    ) -> io::Result<()> {
        self.console.hide_cursor()?;

        let items = &items[..items.len().min(MAX_SUGGESTIONS)];

        // Clear every previously reserved row first; a shrink would
        // otherwise leave the topmost old rows orphaned.
        let old = self.reserved;
        if old > 0 {
            let old_start = self.top_border_row().saturating_sub(old);
            for i in 0..old {
                self.clear_line_at(old_start + i)?;
            }
        }

        self.reserved = items.len() as u16;
        self.setup_scroll_region()?;
        if items.is_empty() {
            return Ok(());
        }

        let start_row = self.top_border_row().saturating_sub(self.reserved);
        for (i, item) in items.iter().enumerate() {
            let row = start_row + i as u16;
            self.clear_line_at(row)?;

            let label = if item.hint {
                format!("<{}>", item.label)
            } else {
                item.label.clone()
            };
            let padding = " ".repeat(LABEL_GUTTER.saturating_sub(label.width()).max(1));

            let rendered = if item.hint {
                format!(" {label}{padding}{}", item.description)
                    .dim()
                    .to_string()
            } else if selected == Some(i) {
                format!(
                    "{}{}",
                    format!(" {label}").black().on_green().bold(),
                    format!("{padding}{} ", item.description).black().on_green(),
                )
            } else {
                format!(
                    "{}{}",
                    format!(" {label}").green(),
                    format!("{padding}{}", item.description).dim(),
                )
            };
            self.console.print(&rendered)?;
        }
        Ok(())
    }

    /// Clear all reserved suggestion rows and restore the scroll
    /// region to the full output area.
    pub fn clear_suggestions(&mut self) -> io::Result<()> {
        if self.reserved == 0 {
            return Ok(());
        }
        let start_row = self.top_border_row().saturating_sub(self.reserved);
        for i in 0..self.reserved {
            self.clear_line_at(start_row + i)?;
        }
        self.reserved = 0;
        self.setup_scroll_region()
    }

    /// Tear down the pinned UI so a command handler can treat the
    /// terminal as a plain scrolling stream.
    pub fn prepare_for_command(&mut self) -> io::Result<()> {
        self.clear_suggestions()?;
        self.console.hide_cursor()?;
        // Clear the whole input area, margin row included
        self.clear_line_at(self.top_border_row())?;
        self.clear_line_at(self.input_row())?;
        self.clear_line_at(self.bottom_border_row())?;
        self.clear_line_at(self.rows)?;
        self.console.reset_scroll_region()?;
        // New output appears at the bottom
        self.console.move_to(self.rows, 1)
    }

    /// Re-establish the pinned UI after a command finishes.
    pub fn restore_after_command(&mut self) -> io::Result<()> {
        let (cols, rows) = self.console.size()?;
        self.rows = rows;
        self.cols = cols;
        self.setup_scroll_region()
    }

    /// Hand the whole screen to a full-screen caller.
    ///
    /// While exclusive, resize events are deliberately ignored so the
    /// caller's private rendering is not corrupted.
    pub fn enter_exclusive(&mut self) -> io::Result<()> {
        self.exclusive = true;
        self.console.reset_scroll_region()?;
        self.console.hide_cursor()?;
        self.console.clear_screen()
    }

    /// Reclaim the screen after a full-screen caller finishes.
    pub fn exit_exclusive(&mut self) -> io::Result<()> {
        self.exclusive = false;
        self.console.clear_screen()?;
        self.console.show_cursor()?;
        let (cols, rows) = self.console.size()?;
        self.rows = rows;
        self.cols = cols;
        self.setup_scroll_region()
    }

    /// React to a terminal resize.
    ///
    /// Ordering contract: the old input area and old suggestion rows
    /// are cleared at their old absolute positions, using the old
    /// geometry, before the stored geometry is updated and the scroll
    /// region reapplied. Returns true when the caller should redraw
    /// its state at the new geometry; false while exclusive, where
    /// resizes are suppressed by design.
    pub fn handle_resize(&mut self, cols: u16, rows: u16) -> io::Result<bool> {
        if self.exclusive {
            return Ok(false);
        }

        let old_rows = self.rows;
        let old_reserved = self.reserved;

        // Temporarily reset the scroll region so we can clear anywhere
        self.console.reset_scroll_region()?;

        for i in 0..INPUT_AREA_ROWS {
            self.clear_line_at(old_rows.saturating_sub(i))?;
        }

        if old_reserved > 0 {
            let old_start = old_rows
                .saturating_sub(INPUT_AREA_ROWS)
                .saturating_add(1)
                .saturating_sub(old_reserved);
            for i in 0..old_reserved {
                self.clear_line_at(old_start + i)?;
            }
        }

        self.rows = rows;
        self.cols = cols;
        self.setup_scroll_region()?;
        Ok(true)
    }

    /// Write a plain line through the console.
    ///
    /// Intended for dispatch-boundary messages while the pinned UI is
    /// torn down (the cursor sits in the scrolling output area).
    pub fn print_line(&mut self, text: &str) -> io::Result<()> {
        self.console.print(text)?;
        self.console.print("\r\n")
    }
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("reserved", &self.reserved)
            .field("exclusive", &self.exclusive)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::console::{CaptureConsole, Op};

    fn renderer(cols: u16, rows: u16) -> (Renderer, CaptureConsole) {
        let capture = CaptureConsole::new(cols, rows);
        let renderer = Renderer::new(Box::new(capture.clone())).unwrap();
        (renderer, capture)
    }

    fn item(name: &str) -> SuggestionItem {
        SuggestionItem {
            name: name.to_string(),
            description: format!("{name} desc"),
            label: format!("/{name}"),
            completion: format!("/{name} "),
            hint: false,
        }
    }

    fn cleared_rows(ops: &[Op]) -> Vec<u16> {
        // A clear is a MoveTo(row, 1) followed by ClearLine
        ops.windows(2)
            .filter_map(|w| match (&w[0], &w[1]) {
                (Op::MoveTo(row, 1), Op::ClearLine) => Some(*row),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_scroll_region_tracks_reserved_rows() {
        let (mut renderer, capture) = renderer(80, 24);
        renderer.setup_scroll_region().unwrap();
        // top border at 21, output bottom at 20
        assert_eq!(capture.ops(), vec![Op::SetScrollRegion(1, 20)]);

        capture.clear_ops();
        renderer
            .draw_suggestions(&[item("help"), item("harmonica")], Some(0))
            .unwrap();
        assert!(capture.ops().contains(&Op::SetScrollRegion(1, 18)));
        assert_eq!(renderer.reserved_rows(), 2);
    }

    #[test]
    fn test_draw_input_positions_cursor() {
        let (mut renderer, capture) = renderer(80, 24);
        renderer.draw_input("hello", 3).unwrap();

        let ops = capture.ops();
        // Final positioning: input row 22, col = prompt(2) + cursor(3) + 1
        let tail = &ops[ops.len() - 2..];
        assert_eq!(tail[0], Op::MoveTo(22, 6));
        assert_eq!(tail[1], Op::ShowCursor);
        // Input row was cleared and the buffer printed
        assert!(cleared_rows(&ops).contains(&22));
        assert!(ops
            .iter()
            .any(|op| matches!(op, Op::Print(s) if s.contains("hello"))));
    }

    #[test]
    fn test_shrinking_suggestions_clears_old_rows() {
        let (mut renderer, capture) = renderer(80, 24);
        let four: Vec<_> = ["a", "b", "c", "d"].iter().map(|n| item(n)).collect();
        renderer.draw_suggestions(&four, Some(0)).unwrap();
        assert_eq!(renderer.reserved_rows(), 4);

        capture.clear_ops();
        let two: Vec<_> = ["a", "b"].iter().map(|n| item(n)).collect();
        renderer.draw_suggestions(&two, Some(1)).unwrap();

        // Old block was rows 17..=20 (top border 21); all four must be
        // cleared before the two new rows (19, 20) are repainted.
        let cleared = cleared_rows(&capture.ops());
        assert_eq!(&cleared[..4], &[17, 18, 19, 20]);
        assert_eq!(&cleared[4..], &[19, 20]);
        assert_eq!(renderer.reserved_rows(), 2);
    }

    #[test]
    fn test_clear_suggestions_resets_reserved_and_region() {
        let (mut renderer, capture) = renderer(80, 24);
        renderer
            .draw_suggestions(&[item("a"), item("b"), item("c")], Some(0))
            .unwrap();

        capture.clear_ops();
        renderer.clear_suggestions().unwrap();
        assert_eq!(renderer.reserved_rows(), 0);
        assert_eq!(cleared_rows(&capture.ops()), vec![18, 19, 20]);
        // Scroll region restored to the full output area
        assert!(capture.ops().contains(&Op::SetScrollRegion(1, 20)));

        // Idempotent when nothing is reserved
        capture.clear_ops();
        renderer.clear_suggestions().unwrap();
        assert!(capture.ops().is_empty());
    }

    #[test]
    fn test_hint_item_renders_dimmed_placeholder() {
        let (mut renderer, capture) = renderer(80, 24);
        let hint = SuggestionItem {
            name: "file".to_string(),
            description: "input wav".to_string(),
            label: "file".to_string(),
            completion: String::new(),
            hint: true,
        };
        renderer.draw_suggestions(&[hint], None).unwrap();
        assert!(capture
            .ops()
            .iter()
            .any(|op| matches!(op, Op::Print(s) if s.contains("<file>"))));
    }

    #[test]
    fn test_prepare_for_command_tears_down_pinned_ui() {
        let (mut renderer, capture) = renderer(80, 24);
        renderer.draw_suggestions(&[item("a")], Some(0)).unwrap();

        capture.clear_ops();
        renderer.prepare_for_command().unwrap();
        let ops = capture.ops();

        // Suggestion row and all four input-area rows cleared
        assert_eq!(cleared_rows(&ops), vec![20, 21, 22, 23, 24]);
        assert!(ops.contains(&Op::ResetScrollRegion));
        // Cursor parked on the last row for streaming output
        assert_eq!(*ops.last().unwrap(), Op::MoveTo(24, 1));
        assert_eq!(renderer.reserved_rows(), 0);
    }

    #[test]
    fn test_restore_after_command_remeasures() {
        let (mut renderer, capture) = renderer(80, 24);
        renderer.prepare_for_command().unwrap();

        capture.set_size(100, 40);
        capture.clear_ops();
        renderer.restore_after_command().unwrap();
        assert_eq!(renderer.rows(), 40);
        assert_eq!(renderer.cols(), 100);
        // top border 37, output bottom 36
        assert_eq!(capture.ops(), vec![Op::SetScrollRegion(1, 36)]);
    }

    #[test]
    fn test_resize_clears_at_old_geometry_first() {
        let (mut renderer, capture) = renderer(80, 24);
        renderer
            .draw_suggestions(&[item("a"), item("b")], Some(0))
            .unwrap();

        capture.set_size(120, 50);
        capture.clear_ops();
        assert!(renderer.handle_resize(120, 50).unwrap());

        let ops = capture.ops();
        // Scroll region released before any clear
        assert_eq!(ops[0], Op::ResetScrollRegion);
        // Old input area (24..21) and old suggestion rows (19, 20),
        // all at the old 24-row geometry
        assert_eq!(cleared_rows(&ops), vec![24, 23, 22, 21, 19, 20]);
        assert_eq!(renderer.rows(), 50);
        // New region accounts for still-reserved suggestion rows
        assert!(ops.contains(&Op::SetScrollRegion(1, 44)));
    }

    #[test]
    fn test_exclusive_mode_suppresses_resize() {
        let (mut renderer, capture) = renderer(80, 24);
        renderer.enter_exclusive().unwrap();
        assert!(renderer.is_exclusive());

        capture.clear_ops();
        assert!(!renderer.handle_resize(120, 50).unwrap());
        assert!(capture.ops().is_empty());
        assert_eq!(renderer.rows(), 24);

        renderer.exit_exclusive().unwrap();
        assert!(!renderer.is_exclusive());
        capture.clear_ops();
        assert!(renderer.handle_resize(120, 50).unwrap());
        assert!(!capture.ops().is_empty());
    }

    #[test]
    fn test_enter_exit_exclusive_sequences() {
        let (mut renderer, capture) = renderer(80, 24);

        renderer.enter_exclusive().unwrap();
        assert_eq!(
            capture.ops(),
            vec![Op::ResetScrollRegion, Op::HideCursor, Op::ClearScreen]
        );

        capture.set_size(90, 30);
        capture.clear_ops();
        renderer.exit_exclusive().unwrap();
        assert_eq!(
            capture.ops(),
            vec![Op::ClearScreen, Op::ShowCursor, Op::SetScrollRegion(1, 26)]
        );
        assert_eq!(renderer.rows(), 30);
    }

    #[test]
    fn test_prompt_width_is_display_width() {
        assert_eq!(Renderer::prompt_width(), 2);
    }
}
