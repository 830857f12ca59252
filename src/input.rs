//! Line editor state machine.
//!
//! Owns the edit buffer, cursor, history, and suggestion selection.
//! [`LineEditor::read_line`] pulls classified events from a single
//! consumer [`EventSource`] in order, mutates edit state, and delegates
//! every screen write to the [`Renderer`]. History persists across
//! calls; all other edit state is reset when a read begins.
//!
//! Cursor math is in chars (the prompt is the only multi-byte glyph on
//! the line and its display width is fixed), and the cursor invariant
//! `0 <= cursor <= buffer chars` holds after every key.

use crate::event::{Event, EventSource, Key};
use crate::registry::Registry;
use crate::render::Renderer;
use crate::suggest::{self, SuggestionItem};
use std::io;

/// How a `read_line` call resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The user submitted this (trimmed) line.
    Line(String),
    /// An interrupt keystroke ended the read.
    Interrupted,
}

/// Interactive line editor with history and inline autocomplete.
#[derive(Debug, Default)]
pub struct LineEditor {
    history: Vec<String>,
    buffer: String,
    cursor: usize,
    history_index: Option<usize>,
    draft: String,
    suggestions: Vec<SuggestionItem>,
    selected: usize,
    visible: bool,
}

impl LineEditor {
    /// Create an editor with empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Submitted lines, oldest first.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Read one line.
    ///
    /// Draws the empty prompt, then consumes events until the line is
    /// submitted or interrupted. Resolves exactly once, and clears any
    /// visible suggestions on the way out. Resizes repaint current
    /// state at the new geometry without touching buffer or cursor.
    pub fn read_line(
        &mut self,
        renderer: &mut Renderer,
        registry: &Registry,
        events: &mut dyn EventSource,
    ) -> io::Result<ReadOutcome> {
        self.reset();
        renderer.draw_input("", 0)?;

        loop {
            match events.next()? {
                Event::Resize { cols, rows } => {
                    if renderer.handle_resize(cols, rows)? {
                        self.redraw(renderer)?;
                    }
                }
                Event::Key(key) => {
                    if let Some(outcome) = self.handle_key(key, renderer, registry)? {
                        renderer.clear_suggestions()?;
                        return Ok(outcome);
                    }
                }
            }
        }
    }

    fn reset(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
        self.history_index = None;
        self.draft.clear();
        self.suggestions.clear();
        self.selected = 0;
        self.visible = false;
    }

    fn handle_key(
        &mut self,
        key: Key,
        renderer: &mut Renderer,
        registry: &Registry,
    ) -> io::Result<Option<ReadOutcome>> {
        match key {
            Key::Interrupt => return Ok(Some(ReadOutcome::Interrupted)),

            Key::Escape => {
                if self.visible {
                    self.close_suggestions(renderer)?;
                    self.redraw(renderer)?;
                }
            }

            Key::Enter => {
                if self.visible && !self.suggestions.is_empty() && !self.hint_only() {
                    self.accept_suggestion(renderer)?;
                    self.redraw(renderer)?;
                } else {
                    return Ok(Some(ReadOutcome::Line(self.submit())));
                }
            }

            Key::Tab => {
                if self.hint_only() {
                    self.redraw(renderer)?;
                } else {
                    if self.visible && !self.suggestions.is_empty() {
                        self.accept_suggestion(renderer)?;
                    } else {
                        self.update_suggestions(renderer, registry)?;
                    }
                    self.redraw(renderer)?;
                }
            }

            Key::Up => {
                if !self.hint_only() {
                    self.handle_up();
                }
                self.redraw(renderer)?;
            }

            Key::Down => {
                if !self.hint_only() {
                    self.handle_down();
                }
                self.redraw(renderer)?;
            }

            Key::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                self.redraw(renderer)?;
            }

            Key::Right => {
                if self.cursor < self.char_len() {
                    self.cursor += 1;
                }
                self.redraw(renderer)?;
            }

            Key::Home => {
                self.cursor = 0;
                self.redraw(renderer)?;
            }

            Key::End => {
                self.cursor = self.char_len();
                self.redraw(renderer)?;
            }

            Key::KillLine => {
                self.buffer.clear();
                self.cursor = 0;
                self.update_suggestions(renderer, registry)?;
                self.redraw(renderer)?;
            }

            Key::KillWord => {
                if self.cursor > 0 {
                    self.kill_word_before_cursor();
                    self.update_suggestions(renderer, registry)?;
                }
                self.redraw(renderer)?;
            }

            Key::Backspace => {
                if self.cursor > 0 {
                    self.remove_char(self.cursor - 1);
                    self.cursor -= 1;
                    self.update_suggestions(renderer, registry)?;
                }
                self.redraw(renderer)?;
            }

            Key::Delete => {
                if self.cursor < self.char_len() {
                    self.remove_char(self.cursor);
                    self.update_suggestions(renderer, registry)?;
                }
                self.redraw(renderer)?;
            }

            Key::Char(c) => {
                let at = self.byte_offset(self.cursor);
                self.buffer.insert(at, c);
                self.cursor += 1;
                self.update_suggestions(renderer, registry)?;
                self.redraw(renderer)?;
            }
        }
        Ok(None)
    }

    /// Trim the buffer and append it to history, skipping empty lines
    /// and immediate duplicates.
    fn submit(&mut self) -> String {
        let line = self.buffer.trim().to_string();
        if !line.is_empty() && self.history.last() != Some(&line) {
            self.history.push(line.clone());
        }
        line
    }

    fn handle_up(&mut self) {
        if self.visible && !self.suggestions.is_empty() {
            // Cycle the selection upward with wraparound
            self.selected = (self.selected + self.suggestions.len() - 1) % self.suggestions.len();
            return;
        }
        if self.history.is_empty() {
            return;
        }
        match self.history_index {
            None => {
                // Entering history: save the live edit as a draft
                self.draft = self.buffer.clone();
                self.history_index = Some(self.history.len() - 1);
            }
            Some(i) if i > 0 => self.history_index = Some(i - 1),
            Some(_) => {}
        }
        if let Some(i) = self.history_index {
            self.buffer = self.history[i].clone();
            self.cursor = self.char_len();
        }
    }

    fn handle_down(&mut self) {
        if self.visible && !self.suggestions.is_empty() {
            self.selected = (self.selected + 1) % self.suggestions.len();
            return;
        }
        let Some(i) = self.history_index else {
            return;
        };
        if i + 1 < self.history.len() {
            self.history_index = Some(i + 1);
            self.buffer = self.history[i + 1].clone();
        } else {
            // Past the newest entry: back to the saved draft
            self.history_index = None;
            self.buffer = self.draft.clone();
        }
        self.cursor = self.char_len();
    }

    /// Delete the trailing whitespace run plus the previous word
    /// before the cursor.
    fn kill_word_before_cursor(&mut self) {
        let mut chars: Vec<char> = self.buffer.chars().collect();
        let mut i = self.cursor;
        while i > 0 && chars[i - 1].is_whitespace() {
            i -= 1;
        }
        while i > 0 && !chars[i - 1].is_whitespace() {
            i -= 1;
        }
        chars.drain(i..self.cursor);
        self.buffer = chars.into_iter().collect();
        self.cursor = i;
    }

    fn accept_suggestion(&mut self, renderer: &mut Renderer) -> io::Result<()> {
        if let Some(item) = self.suggestions.get(self.selected) {
            self.buffer = item.completion.clone();
            self.cursor = self.char_len();
        }
        self.close_suggestions(renderer)
    }

    fn update_suggestions(
        &mut self,
        renderer: &mut Renderer,
        registry: &Registry,
    ) -> io::Result<()> {
        self.suggestions = suggest::complete(registry, &self.buffer);
        if self.suggestions.is_empty() {
            self.close_suggestions(renderer)
        } else {
            self.visible = true;
            self.selected = 0;
            Ok(())
        }
    }

    fn close_suggestions(&mut self, renderer: &mut Renderer) -> io::Result<()> {
        self.visible = false;
        self.suggestions.clear();
        self.selected = 0;
        renderer.clear_suggestions()
    }

    fn hint_only(&self) -> bool {
        !self.suggestions.is_empty() && self.suggestions.iter().all(|s| s.hint)
    }

    fn redraw(&mut self, renderer: &mut Renderer) -> io::Result<()> {
        if self.visible && !self.suggestions.is_empty() {
            let selected = if self.hint_only() {
                None
            } else {
                Some(self.selected)
            };
            renderer.draw_suggestions(&self.suggestions, selected)?;
        } else {
            renderer.clear_suggestions()?;
        }
        renderer.draw_input(&self.buffer, self.cursor)
    }

    fn char_len(&self) -> usize {
        self.buffer.chars().count()
    }

    fn byte_offset(&self, char_idx: usize) -> usize {
        self.buffer
            .char_indices()
            .nth(char_idx)
            .map_or(self.buffer.len(), |(at, _)| at)
    }

    fn remove_char(&mut self, char_idx: usize) {
        let at = self.byte_offset(char_idx);
        self.buffer.remove(at);
    }
}
