//! Terminal control primitives.
//!
//! The [`Console`] trait is the only path to the screen: every cursor
//! move, clear, and scroll-region change the engine performs goes
//! through it. The real backend is [`CrosstermConsole`]; tests swap in
//! [`CaptureConsole`] to record the exact sequence of operations.

use crossterm::{
    cursor,
    execute,
    terminal::{self, ClearType},
};
use std::cell::{Cell, RefCell};
use std::io::{self, Stdout, Write};
use std::rc::Rc;

/// Terminal control backend.
///
/// Rows and columns are 1-based, matching ANSI absolute positioning,
/// so the renderer's row arithmetic maps directly onto escape
/// sequences.
pub trait Console {
    /// Current terminal size as (cols, rows).
    fn size(&self) -> io::Result<(u16, u16)>;

    /// Enter raw mode.
    fn enter_raw_mode(&mut self) -> io::Result<()>;

    /// Leave raw mode.
    fn leave_raw_mode(&mut self) -> io::Result<()>;

    /// Move the cursor to an absolute (row, col), both 1-based.
    fn move_to(&mut self, row: u16, col: u16) -> io::Result<()>;

    /// Clear the entire line the cursor is on.
    fn clear_line(&mut self) -> io::Result<()>;

    /// Hide the cursor.
    fn hide_cursor(&mut self) -> io::Result<()>;

    /// Show the cursor.
    fn show_cursor(&mut self) -> io::Result<()>;

    /// Restrict the scrollable region to rows `top..=bottom` (1-based).
    fn set_scroll_region(&mut self, top: u16, bottom: u16) -> io::Result<()>;

    /// Restore the scroll region to the full screen.
    fn reset_scroll_region(&mut self) -> io::Result<()>;

    /// Save the cursor position.
    fn save_cursor(&mut self) -> io::Result<()>;

    /// Restore the most recently saved cursor position.
    fn restore_cursor(&mut self) -> io::Result<()>;

    /// Clear the whole screen and home the cursor.
    fn clear_screen(&mut self) -> io::Result<()>;

    /// Write text at the current cursor position.
    fn print(&mut self, text: &str) -> io::Result<()>;

    /// Flush buffered output.
    fn flush(&mut self) -> io::Result<()>;
}

/// Crossterm-backed console writing to stdout.
///
/// Tracks raw-mode and cursor-visibility state so operations are
/// idempotent, and restores the terminal on `Drop`.
pub struct CrosstermConsole {
    stdout: Stdout,
    raw_mode: bool,
    cursor_visible: bool,
}

impl CrosstermConsole {
    /// Create a new console over stdout.
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            raw_mode: false,
            cursor_visible: true,
        }
    }
}

impl Default for CrosstermConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for CrosstermConsole {
    fn size(&self) -> io::Result<(u16, u16)> {
        terminal::size()
    }

    fn enter_raw_mode(&mut self) -> io::Result<()> {
        if !self.raw_mode {
            terminal::enable_raw_mode()?;
            self.raw_mode = true;
        }
        Ok(())
    }

    fn leave_raw_mode(&mut self) -> io::Result<()> {
        if self.raw_mode {
            terminal::disable_raw_mode()?;
            self.raw_mode = false;
        }
        Ok(())
    }

    fn move_to(&mut self, row: u16, col: u16) -> io::Result<()> {
        execute!(
            self.stdout,
            cursor::MoveTo(col.saturating_sub(1), row.saturating_sub(1))
        )
    }

    fn clear_line(&mut self) -> io::Result<()> {
        execute!(self.stdout, terminal::Clear(ClearType::CurrentLine))
    }

    fn hide_cursor(&mut self) -> io::Result<()> {
        if self.cursor_visible {
            execute!(self.stdout, cursor::Hide)?;
            self.cursor_visible = false;
        }
        Ok(())
    }

    fn show_cursor(&mut self) -> io::Result<()> {
        if !self.cursor_visible {
            execute!(self.stdout, cursor::Show)?;
            self.cursor_visible = true;
        }
        Ok(())
    }

    fn set_scroll_region(&mut self, top: u16, bottom: u16) -> io::Result<()> {
        // DECSTBM is not exposed by crossterm; write the CSI directly.
        write!(self.stdout, "\x1b[{};{}r", top, bottom)?;
        self.stdout.flush()
    }

    fn reset_scroll_region(&mut self) -> io::Result<()> {
        self.stdout.write_all(b"\x1b[r")?;
        self.stdout.flush()
    }

    fn save_cursor(&mut self) -> io::Result<()> {
        execute!(self.stdout, cursor::SavePosition)
    }

    fn restore_cursor(&mut self) -> io::Result<()> {
        execute!(self.stdout, cursor::RestorePosition)
    }

    fn clear_screen(&mut self) -> io::Result<()> {
        execute!(
            self.stdout,
            terminal::Clear(ClearType::All),
            cursor::MoveTo(0, 0)
        )
    }

    fn print(&mut self, text: &str) -> io::Result<()> {
        self.stdout.write_all(text.as_bytes())?;
        self.stdout.flush()
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stdout.flush()
    }
}

impl Drop for CrosstermConsole {
    fn drop(&mut self) {
        // Restore terminal state
        let _ = self.reset_scroll_region();
        let _ = self.show_cursor();
        let _ = self.leave_raw_mode();
    }
}

/// Emergency terminal restore function.
/// Call this in panic hooks to ensure the terminal is usable after a crash.
pub fn emergency_restore() {
    // Best-effort terminal restoration - ignore errors
    let mut stdout = io::stdout();

    // Reset the scroll region
    let _ = stdout.write_all(b"\x1b[r");

    // Show cursor
    let _ = execute!(stdout, cursor::Show);

    // Reset colors and attributes
    let _ = stdout.write_all(b"\x1b[0m");

    // Disable raw mode
    let _ = terminal::disable_raw_mode();

    let _ = stdout.flush();
}

/// Install a panic hook that restores terminal state before printing panic info.
/// This should be called once at application startup.
pub fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        // Restore terminal BEFORE printing panic message
        emergency_restore();
        original_hook(info);
    }));
}

/// A single recorded console operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    /// Raw mode entered.
    EnterRawMode,
    /// Raw mode left.
    LeaveRawMode,
    /// Cursor moved to (row, col), 1-based.
    MoveTo(u16, u16),
    /// Current line cleared.
    ClearLine,
    /// Cursor hidden.
    HideCursor,
    /// Cursor shown.
    ShowCursor,
    /// Scroll region set to (top, bottom).
    SetScrollRegion(u16, u16),
    /// Scroll region reset to full screen.
    ResetScrollRegion,
    /// Cursor position saved.
    SaveCursor,
    /// Cursor position restored.
    RestoreCursor,
    /// Screen cleared and cursor homed.
    ClearScreen,
    /// Text written at the cursor.
    Print(String),
}

/// Recording console for tests.
///
/// Logs every primitive as an [`Op`] instead of touching a terminal.
/// Clones share the same log, so a test can keep one handle for
/// inspection and hand another to the renderer.
#[derive(Debug, Clone)]
pub struct CaptureConsole {
    ops: Rc<RefCell<Vec<Op>>>,
    size: Rc<Cell<(u16, u16)>>,
}

impl CaptureConsole {
    /// Create a capture console reporting the given (cols, rows).
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            ops: Rc::new(RefCell::new(Vec::new())),
            size: Rc::new(Cell::new((cols, rows))),
        }
    }

    /// Change the reported size (for resize tests).
    pub fn set_size(&self, cols: u16, rows: u16) {
        self.size.set((cols, rows));
    }

    /// Snapshot of the recorded operations.
    pub fn ops(&self) -> Vec<Op> {
        self.ops.borrow().clone()
    }

    /// Discard the recorded operations.
    pub fn clear_ops(&self) {
        self.ops.borrow_mut().clear();
    }

    fn record(&self, op: Op) -> io::Result<()> {
        self.ops.borrow_mut().push(op);
        Ok(())
    }
}

impl Console for CaptureConsole {
    fn size(&self) -> io::Result<(u16, u16)> {
        Ok(self.size.get())
    }

    fn enter_raw_mode(&mut self) -> io::Result<()> {
        self.record(Op::EnterRawMode)
    }

    fn leave_raw_mode(&mut self) -> io::Result<()> {
        self.record(Op::LeaveRawMode)
    }

    fn move_to(&mut self, row: u16, col: u16) -> io::Result<()> {
        self.record(Op::MoveTo(row, col))
    }

    fn clear_line(&mut self) -> io::Result<()> {
        self.record(Op::ClearLine)
    }

    fn hide_cursor(&mut self) -> io::Result<()> {
        self.record(Op::HideCursor)
    }

    fn show_cursor(&mut self) -> io::Result<()> {
        self.record(Op::ShowCursor)
    }

    fn set_scroll_region(&mut self, top: u16, bottom: u16) -> io::Result<()> {
        self.record(Op::SetScrollRegion(top, bottom))
    }

    fn reset_scroll_region(&mut self) -> io::Result<()> {
        self.record(Op::ResetScrollRegion)
    }

    fn save_cursor(&mut self) -> io::Result<()> {
        self.record(Op::SaveCursor)
    }

    fn restore_cursor(&mut self) -> io::Result<()> {
        self.record(Op::RestoreCursor)
    }

    fn clear_screen(&mut self) -> io::Result<()> {
        self.record(Op::ClearScreen)
    }

    fn print(&mut self, text: &str) -> io::Result<()> {
        self.record(Op::Print(text.to_string()))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
