#![allow(clippy::unwrap_used)]
//! Integration tests for the quarterdeck prompt engine.
//!
//! These drive the real editor/renderer/dispatch stack with a scripted
//! event source and a capture console, asserting on the exact sequence
//! of terminal operations.

use quarterdeck::console::{CaptureConsole, Op};
use quarterdeck::event::{Event, Key, ScriptedEvents};
use quarterdeck::registry::{ArgSpec, Category, CommandSpec, Registry};
use quarterdeck::repl::Repl;
use quarterdeck::{LineEditor, ReadOutcome, Renderer};
use std::cell::RefCell;
use std::rc::Rc;

fn test_registry() -> Registry {
    let mut registry = Registry::new();
    registry.register(CommandSpec::new(
        "help",
        "show all commands",
        Category::General,
        |_, _| Ok(()),
    ));
    registry.register(
        CommandSpec::new("harmonica", "enhance audio", Category::Media, |_, _| Ok(()))
            .arg(ArgSpec::new("file").description("input wav"))
            .arg(
                ArgSpec::new("effect")
                    .option("echo", "add echo")
                    .option("reverb", "add reverb"),
            ),
    );
    registry
}

fn editor_run(events: ScriptedEvents) -> (ReadOutcome, Vec<Op>) {
    let capture = CaptureConsole::new(80, 24);
    let mut renderer = Renderer::new(Box::new(capture.clone())).unwrap();
    let mut editor = LineEditor::new();
    let mut events = events;
    let outcome = editor
        .read_line(&mut renderer, &test_registry(), &mut events)
        .unwrap();
    (outcome, capture.ops())
}

fn prints(ops: &[Op]) -> Vec<&str> {
    ops.iter()
        .filter_map(|op| match op {
            Op::Print(s) => Some(s.as_str()),
            _ => None,
        })
        .collect()
}

#[test]
fn narrowing_prefix_shrinks_overlay_without_leftovers() {
    // "/h" shows {harmonica, help}; "e" narrows to {help}
    let mut events = ScriptedEvents::typing("/he");
    events.push(Event::Key(Key::Interrupt));
    let (_, ops) = editor_run(events);

    // Two-candidate overlay reserved rows 19-20 (scroll bottom 18),
    // then the shrink reapplied the region for one row (bottom 19).
    let wide = ops.iter().position(|op| *op == Op::SetScrollRegion(1, 18));
    let narrow = ops.iter().rposition(|op| *op == Op::SetScrollRegion(1, 19));
    assert!(wide.unwrap() < narrow.unwrap());

    // After the final repaint, harmonica is gone from the overlay
    let texts = prints(&ops);
    let last_harmonica = texts
        .iter()
        .rposition(|s| s.contains("/harmonica"))
        .unwrap();
    let last_help = texts.iter().rposition(|s| s.contains("/help")).unwrap();
    assert!(last_harmonica < last_help);
}

#[test]
fn accepting_suggestion_replaces_buffer_and_submits_whole_line() {
    let mut events = ScriptedEvents::typing("/he");
    events.push(Event::Key(Key::Tab)); // accept "/help "
    events.push(Event::Key(Key::Enter));
    let (outcome, ops) = editor_run(events);

    assert_eq!(outcome, ReadOutcome::Line("/help".to_string()));
    // The accepted completion was drawn into the input line
    assert!(prints(&ops).iter().any(|s| s.contains("/help ")));
}

#[test]
fn hint_placeholder_appears_and_disappears() {
    let mut events = ScriptedEvents::typing("/harmonica s");
    events.push(Event::Key(Key::Interrupt));
    let (_, ops) = editor_run(events);

    let texts = prints(&ops);
    // Hint shown while the slot was empty
    let hint_at = texts.iter().position(|s| s.contains("<file>")).unwrap();
    // Once "s" was typed into the non-enumerable slot, no hint again
    assert!(texts[hint_at + 1..].iter().all(|s| !s.contains("<file>")));
}

#[test]
fn option_slot_completion_reconstructs_line() {
    let mut events = ScriptedEvents::typing("/harmonica song.wav re");
    events.push(Event::Key(Key::Tab)); // accept "reverb"
    events.push(Event::Key(Key::Enter));
    let (outcome, _) = editor_run(events);

    assert_eq!(
        outcome,
        ReadOutcome::Line("/harmonica song.wav reverb".to_string())
    );
}

#[test]
fn interrupt_resolves_and_clears_overlay() {
    let mut events = ScriptedEvents::typing("/h");
    events.push(Event::Key(Key::Interrupt));
    let (outcome, ops) = editor_run(events);

    assert_eq!(outcome, ReadOutcome::Interrupted);
    // The overlay rows were cleared and the region restored on exit
    assert_eq!(*ops.last().unwrap(), Op::SetScrollRegion(1, 20));
}

#[test]
fn resize_mid_edit_repaints_at_new_geometry() {
    let capture = CaptureConsole::new(80, 24);
    let mut renderer = Renderer::new(Box::new(capture.clone())).unwrap();
    let mut editor = LineEditor::new();

    let mut events = ScriptedEvents::typing("abc");
    events.push(Event::Resize { cols: 60, rows: 40 });
    events.push(Event::Key(Key::Enter));

    // The resize must not disturb the in-flight buffer
    let outcome = editor
        .read_line(&mut renderer, &test_registry(), &mut events)
        .unwrap();
    assert_eq!(outcome, ReadOutcome::Line("abc".to_string()));
    assert_eq!(renderer.rows(), 40);

    // After the geometry change, the buffer was redrawn on the new
    // input row (40 - 2 = 38) with the cursor past "abc"
    assert!(capture.ops().contains(&Op::MoveTo(38, 6)));
}

#[test]
fn history_survives_across_reads() {
    let capture = CaptureConsole::new(80, 24);
    let mut renderer = Renderer::new(Box::new(capture.clone())).unwrap();
    let mut editor = LineEditor::new();
    let registry = test_registry();

    for line in ["first", "second"] {
        let mut events = ScriptedEvents::typing(line);
        events.push(Event::Key(Key::Enter));
        editor
            .read_line(&mut renderer, &registry, &mut events)
            .unwrap();
    }

    // Fresh read: two Ups reach the older entry
    let mut events = ScriptedEvents::new(vec![
        Event::Key(Key::Up),
        Event::Key(Key::Up),
        Event::Key(Key::Enter),
    ]);
    let outcome = editor
        .read_line(&mut renderer, &registry, &mut events)
        .unwrap();
    assert_eq!(outcome, ReadOutcome::Line("first".to_string()));
}

#[test]
fn repl_loop_reads_dispatches_and_resumes() {
    let log: Rc<RefCell<Vec<String>>> = Rc::default();

    let mut registry = test_registry();
    let sink = log.clone();
    registry.register(CommandSpec::new(
        "echo",
        "record args",
        Category::Utility,
        move |args, _| {
            sink.borrow_mut().push(args.join(" "));
            Ok(())
        },
    ));

    let mut events = ScriptedEvents::typing("echo one two");
    events.push(Event::Key(Key::Enter));
    events.push_typing("/echo three");
    events.push(Event::Key(Key::Enter));
    events.push(Event::Key(Key::Interrupt));

    let capture = CaptureConsole::new(80, 24);
    let mut repl = Repl::new(registry, Box::new(capture.clone()), Box::new(events)).unwrap();
    repl.run().unwrap();

    assert_eq!(*log.borrow(), vec!["one two".to_string(), "three".to_string()]);
    // Raw mode entered once at construction
    assert_eq!(capture.ops().first(), Some(&Op::EnterRawMode));
}

#[test]
fn game_takeover_and_prompt_reclaim() {
    let mut registry = test_registry();
    registry.register(CommandSpec::new(
        "invaders",
        "full-screen game",
        Category::Games,
        |_, ctx| {
            ctx.enter_exclusive_mode()?;
            ctx.exit_exclusive_mode()?;
            Ok(())
        },
    ));

    let mut events = ScriptedEvents::typing("invaders");
    events.push(Event::Key(Key::Enter));
    events.push_typing("x"); // prompt is usable again afterward
    events.push(Event::Key(Key::Interrupt));

    let capture = CaptureConsole::new(80, 24);
    let mut repl = Repl::new(registry, Box::new(capture.clone()), Box::new(events)).unwrap();
    repl.run().unwrap();

    let ops = capture.ops();
    let exit_clear = ops
        .iter()
        .rposition(|op| *op == Op::ClearScreen)
        .unwrap();
    // After the game handed the screen back, the prompt was redrawn
    assert!(ops[exit_clear..]
        .iter()
        .any(|op| matches!(op, Op::Print(s) if s.contains('x'))));
}
