//! quarterdeck - a bottom-pinned REPL prompt engine.
//!
//! The engine owns the terminal canvas: it partitions the screen into
//! a scrolling output region and a pinned bottom block (suggestion
//! overlay plus bordered input line), reacts to raw keystrokes to
//! maintain an edit buffer, history, and an inline autocomplete
//! overlay, and can hand the whole screen to a full-screen caller and
//! later reclaim it.
//!
//! # Architecture
//!
//! ```text
//! Registry    - command definitions; pure data, no I/O
//! suggest     - (registry, buffer) -> ranked completion candidates
//! Renderer    - canvas ownership: geometry, scroll region, overlays
//! LineEditor  - keystroke state machine over buffer/cursor/history
//! Repl        - read, resolve, execute, restore; never dies on a
//!               failed handler
//! ```
//!
//! All screen writes flow through the [`console::Console`] trait;
//! swapping in [`console::CaptureConsole`] makes every rendering
//! decision assertable in tests. Input arrives through the
//! single-consumer [`event::EventSource`] pull queue, so keys are
//! processed strictly in order with no re-entrant handlers.
//!
//! # Example
//!
//! ```no_run
//! use quarterdeck::{
//!     console::CrosstermConsole,
//!     event::CrosstermEvents,
//!     registry::{Category, CommandSpec, Registry},
//!     repl::Repl,
//! };
//!
//! fn main() -> Result<(), quarterdeck::repl::ReplError> {
//!     let mut registry = Registry::new();
//!     registry.register(CommandSpec::new(
//!         "hello",
//!         "say hello",
//!         Category::General,
//!         |_, ctx| Ok(ctx.print_line("hello!")?),
//!     ));
//!
//!     let mut repl = Repl::new(
//!         registry,
//!         Box::new(CrosstermConsole::new()),
//!         Box::new(CrosstermEvents::new()),
//!     )?;
//!     repl.run()
//! }
//! ```

pub mod console;
pub mod event;
pub mod input;
pub mod registry;
pub mod render;
pub mod repl;
pub mod suggest;

pub use console::{Console, CrosstermConsole};
pub use event::{CrosstermEvents, Event, EventSource, Key};
pub use input::{LineEditor, ReadOutcome};
pub use registry::{ArgOption, ArgSpec, Category, CommandSpec, Registry};
pub use render::Renderer;
pub use repl::{CommandContext, DispatchOutcome, Repl, ReplError};
pub use suggest::{complete, SuggestionItem, MAX_SUGGESTIONS, SIGIL};
