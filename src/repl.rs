//! Dispatch loop and command execution boundary.
//!
//! A thin driver over the engine: read a line, resolve it against the
//! registry, run the handler with the pinned UI torn down, restore,
//! repeat. Handler failures are caught here and reported; the loop
//! never terminates on a failed command.

use crate::console::{self, Console};
use crate::event::EventSource;
use crate::input::{LineEditor, ReadOutcome};
use crate::registry::Registry;
use crate::render::Renderer;
use crate::suggest::SIGIL;
use crossterm::style::Stylize;
use std::io;

/// Engine error type.
#[derive(Debug, thiserror::Error)]
pub enum ReplError {
    /// IO error during terminal operations.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Execution context passed to command handlers.
///
/// Grants controlled access to the canvas: full-screen callers (games)
/// take the screen with [`enter_exclusive_mode`] and hand it back with
/// [`exit_exclusive_mode`]; ordinary handlers just write lines.
///
/// [`enter_exclusive_mode`]: CommandContext::enter_exclusive_mode
/// [`exit_exclusive_mode`]: CommandContext::exit_exclusive_mode
pub struct CommandContext<'a> {
    renderer: &'a mut Renderer,
}

impl<'a> CommandContext<'a> {
    /// Wrap a renderer for a handler invocation.
    pub fn new(renderer: &'a mut Renderer) -> Self {
        Self { renderer }
    }

    /// Suspend the pinned-UI discipline and hand over the whole
    /// screen. Resizes are ignored until the matching exit.
    pub fn enter_exclusive_mode(&mut self) -> io::Result<()> {
        self.renderer.enter_exclusive()
    }

    /// Reclaim the screen after a full-screen takeover.
    pub fn exit_exclusive_mode(&mut self) -> io::Result<()> {
        self.renderer.exit_exclusive()
    }

    /// Write a line of command output.
    pub fn print_line(&mut self, text: &str) -> io::Result<()> {
        self.renderer.print_line(text)
    }

    /// Terminal size as (cols, rows).
    pub fn size(&self) -> (u16, u16) {
        (self.renderer.cols(), self.renderer.rows())
    }
}

/// How a dispatched line was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Blank line; nothing to do.
    Empty,
    /// Command resolved and its handler succeeded.
    Handled,
    /// No command registered under that name.
    Unknown,
    /// Handler returned an error (reported, loop continues).
    Failed,
}

/// The interactive loop: editor, renderer, and registry wired together.
pub struct Repl {
    registry: Registry,
    renderer: Renderer,
    editor: LineEditor,
    events: Box<dyn EventSource>,
}

impl Repl {
    /// Build a repl over a console and event source.
    ///
    /// Puts the console into raw mode; the pinned prompt is first
    /// drawn when [`run`](Repl::run) starts reading.
    pub fn new(
        registry: Registry,
        mut console: Box<dyn Console>,
        events: Box<dyn EventSource>,
    ) -> Result<Self, ReplError> {
        console.enter_raw_mode()?;
        let renderer = Renderer::new(console)?;
        Ok(Self {
            registry,
            renderer,
            editor: LineEditor::new(),
            events,
        })
    }

    /// Registered commands.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Register more commands after construction.
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Run until an interrupt keystroke resolves a read.
    ///
    /// Each submitted line goes through [`dispatch`](Repl::dispatch);
    /// what an interrupt means beyond ending this loop (confirmation
    /// prompts, process exit) is the caller's business.
    pub fn run(&mut self) -> Result<(), ReplError> {
        // Restore the terminal even if a handler panics
        console::install_panic_hook();
        self.renderer.setup_scroll_region()?;

        loop {
            let outcome =
                self.editor
                    .read_line(&mut self.renderer, &self.registry, self.events.as_mut())?;
            match outcome {
                ReadOutcome::Interrupted => return Ok(()),
                ReadOutcome::Line(line) => {
                    self.dispatch(&line)?;
                }
            }
        }
    }

    /// Resolve and execute one submitted line.
    ///
    /// The leading sigil is optional for dispatch (it only matters for
    /// completion). The handler runs with the pinned UI torn down so
    /// its output scrolls plainly; unknown names and handler errors
    /// are reported and the loop is unaffected.
    pub fn dispatch(&mut self, line: &str) -> Result<DispatchOutcome, ReplError> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(DispatchOutcome::Empty);
        }

        let mut parts = trimmed.split_whitespace();
        let first = parts.next().unwrap_or_default();
        let name = first.strip_prefix(SIGIL).unwrap_or(first);
        let args: Vec<String> = parts.map(str::to_string).collect();

        #[cfg(feature = "tracing")]
        tracing::debug!(command = name, argc = args.len(), "dispatching");

        self.renderer.prepare_for_command()?;

        let outcome = match self.registry.resolve(name) {
            None => {
                let msg = format!("Unknown command: {name}");
                self.renderer.print_line(&msg.red().to_string())?;
                DispatchOutcome::Unknown
            }
            Some(cmd) => {
                let result = {
                    let mut ctx = CommandContext::new(&mut self.renderer);
                    cmd.invoke(&args, &mut ctx)
                };
                match result {
                    Ok(()) => DispatchOutcome::Handled,
                    Err(err) => {
                        let msg = format!("Command failed: {err:#}");
                        self.renderer.print_line(&msg.red().to_string())?;
                        DispatchOutcome::Failed
                    }
                }
            }
        };

        self.renderer.restore_after_command()?;
        Ok(outcome)
    }
}
