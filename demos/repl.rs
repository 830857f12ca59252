//! Minimal interactive demo: a few commands, completion, and a
//! full-screen takeover.
//!
//! Run with: cargo run --example repl

use quarterdeck::console::CrosstermConsole;
use quarterdeck::event::CrosstermEvents;
use quarterdeck::registry::{ArgSpec, Category, CommandSpec, Registry};
use quarterdeck::repl::{Repl, ReplError};

fn registry() -> Registry {
    let mut registry = Registry::new();

    registry.register(
        CommandSpec::new("help", "list all commands", Category::General, |_, ctx| {
            // A real help command would live outside the engine; this
            // demo just walks the grouped listing.
            Ok(ctx.print_line("(demo) commands: help, echo, clock, blackout")?)
        }),
    );

    registry.register(
        CommandSpec::new("echo", "print the arguments back", Category::Utility, |args, ctx| {
            Ok(ctx.print_line(&args.join(" "))?)
        })
        .usage("echo <words...>"),
    );

    registry.register(
        CommandSpec::new("clock", "show a time of day", Category::Utility, |args, ctx| {
            let place = args.first().map_or("here", String::as_str);
            Ok(ctx.print_line(&format!("{place}: it is now... some o'clock"))?)
        })
        .arg(
            ArgSpec::new("place")
                .description("city to show")
                .option("tokyo", "UTC+9")
                .option("hanoi", "UTC+7")
                .option("austin", "UTC-6"),
        ),
    );

    registry.register(CommandSpec::new(
        "blackout",
        "take the whole screen for a moment",
        Category::Games,
        |_, ctx| {
            ctx.enter_exclusive_mode()?;
            std::thread::sleep(std::time::Duration::from_millis(600));
            ctx.exit_exclusive_mode()?;
            Ok(())
        },
    ));

    registry
}

fn main() -> Result<(), ReplError> {
    let mut repl = Repl::new(
        registry(),
        Box::new(CrosstermConsole::new()),
        Box::new(CrosstermEvents::new()),
    )?;
    repl.run()
}
