//! Keystroke classification and event delivery.
//!
//! The editor pulls [`Event`]s from a single-consumer [`EventSource`]
//! inside its own loop, so keys are processed strictly in order and no
//! handler can be re-entered. [`CrosstermEvents`] adapts the real
//! terminal; [`ScriptedEvents`] replays a fixed sequence for tests.

use crossterm::event::{self, KeyCode, KeyEventKind, KeyModifiers};
use std::collections::VecDeque;
use std::io;

/// A classified keystroke.
///
/// Control-letter aliases are folded in during classification:
/// Ctrl-C is [`Key::Interrupt`], Ctrl-A/Ctrl-E are Home/End, Ctrl-U is
/// [`Key::KillLine`], Ctrl-W is [`Key::KillWord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Interrupt signal (Ctrl-C).
    Interrupt,
    /// Standalone escape.
    Escape,
    /// Carriage return / newline.
    Enter,
    /// Tab.
    Tab,
    /// Arrow up.
    Up,
    /// Arrow down.
    Down,
    /// Arrow left.
    Left,
    /// Arrow right.
    Right,
    /// Home or Ctrl-A.
    Home,
    /// End or Ctrl-E.
    End,
    /// Ctrl-U: clear the whole line.
    KillLine,
    /// Ctrl-W: delete the word before the cursor.
    KillWord,
    /// Backspace.
    Backspace,
    /// Forward delete.
    Delete,
    /// A literal printable character.
    Char(char),
}

/// An input event the editor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A classified keystroke.
    Key(Key),
    /// The terminal was resized to (cols, rows).
    Resize {
        /// New column count.
        cols: u16,
        /// New row count.
        rows: u16,
    },
}

/// Single-consumer source of input events.
///
/// Exactly one consumer pulls from a source at a time; `next` blocks
/// until an event arrives.
pub trait EventSource {
    /// Block until the next event.
    fn next(&mut self) -> io::Result<Event>;
}

/// Classify a crossterm key event, if it maps to an editing key.
fn classify(key: event::KeyEvent) -> Option<Key> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => Some(Key::Interrupt),
        KeyCode::Char('a') if ctrl => Some(Key::Home),
        KeyCode::Char('e') if ctrl => Some(Key::End),
        KeyCode::Char('u') if ctrl => Some(Key::KillLine),
        KeyCode::Char('w') if ctrl => Some(Key::KillWord),
        KeyCode::Char(_) if ctrl => None,
        KeyCode::Char(c) => Some(Key::Char(c)),
        KeyCode::Esc => Some(Key::Escape),
        KeyCode::Enter => Some(Key::Enter),
        KeyCode::Tab => Some(Key::Tab),
        KeyCode::Up => Some(Key::Up),
        KeyCode::Down => Some(Key::Down),
        KeyCode::Left => Some(Key::Left),
        KeyCode::Right => Some(Key::Right),
        KeyCode::Home => Some(Key::Home),
        KeyCode::End => Some(Key::End),
        KeyCode::Backspace => Some(Key::Backspace),
        KeyCode::Delete => Some(Key::Delete),
        _ => None,
    }
}

/// Event source backed by crossterm's blocking reader.
///
/// Unclassifiable events (mouse, focus, unknown keys) are skipped.
#[derive(Debug, Default)]
pub struct CrosstermEvents;

impl CrosstermEvents {
    /// Create a crossterm-backed event source.
    pub fn new() -> Self {
        Self
    }
}

impl EventSource for CrosstermEvents {
    fn next(&mut self) -> io::Result<Event> {
        loop {
            match event::read()? {
                event::Event::Key(key) => {
                    if let Some(key) = classify(key) {
                        return Ok(Event::Key(key));
                    }
                }
                event::Event::Resize(cols, rows) => {
                    return Ok(Event::Resize { cols, rows });
                }
                _ => {}
            }
        }
    }
}

/// Scripted event source for tests.
///
/// Replays a fixed sequence; pulling past the end is an error so a
/// test that under-scripts fails loudly instead of hanging.
#[derive(Debug, Default)]
pub struct ScriptedEvents {
    queue: VecDeque<Event>,
}

impl ScriptedEvents {
    /// Create a source that replays `events` in order.
    pub fn new<I: IntoIterator<Item = Event>>(events: I) -> Self {
        Self {
            queue: events.into_iter().collect(),
        }
    }

    /// Convenience: script a run of printable characters.
    pub fn typing(text: &str) -> Self {
        Self::new(text.chars().map(|c| Event::Key(Key::Char(c))))
    }

    /// Append an event to the script.
    pub fn push(&mut self, event: Event) {
        self.queue.push_back(event);
    }

    /// Append each character of `text` as a key event.
    pub fn push_typing(&mut self, text: &str) {
        for c in text.chars() {
            self.queue.push_back(Event::Key(Key::Char(c)));
        }
    }
}

impl EventSource for ScriptedEvents {
    fn next(&mut self) -> io::Result<Event> {
        self.queue.pop_front().ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "scripted events exhausted")
        })
    }
}
