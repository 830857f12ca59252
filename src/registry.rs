//! Command registry.
//!
//! A static lookup table of command definitions: pure data, no I/O.
//! Commands are declared with [`CommandSpec`]'s builder, registered by
//! name, and resolved by the dispatch loop. Category grouping drives
//! help-style listings, so [`Category`] iteration order is fixed.

use crate::repl::CommandContext;
use std::collections::HashMap;
use std::fmt;

/// Command handler: positional string arguments plus a context that
/// grants exclusive-mode control. May fail; failures are caught at the
/// dispatch boundary and never terminate the loop.
pub type Handler = Box<dyn Fn(&[String], &mut CommandContext<'_>) -> anyhow::Result<()>>;

/// Command category, in fixed display order.
///
/// The order is semantically significant: grouped listings iterate
/// [`Category::ALL`] and print groups in exactly this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Personal / about-the-author commands.
    About,
    /// System inspection.
    System,
    /// Application wrappers.
    Apps,
    /// Media tooling.
    Media,
    /// Full-screen games.
    Games,
    /// Small utilities.
    Utility,
    /// Everything else.
    General,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Category; 7] = [
        Category::About,
        Category::System,
        Category::Apps,
        Category::Media,
        Category::Games,
        Category::Utility,
        Category::General,
    ];

    /// Human-readable group label.
    pub const fn label(self) -> &'static str {
        match self {
            Category::About => "About",
            Category::System => "System",
            Category::Apps => "Apps",
            Category::Media => "Media",
            Category::Games => "Games",
            Category::Utility => "Utility",
            Category::General => "General",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One selectable value for an enumerable argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgOption {
    /// Option value as typed on the line.
    pub name: String,
    /// Short description shown in the suggestion row.
    pub description: String,
}

/// A positional argument declaration.
///
/// Declaring options marks the argument as enumerable: completion
/// offers the options. Without options, completion shows the argument
/// name as a non-selectable placeholder hint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgSpec {
    name: String,
    description: String,
    options: Vec<ArgOption>,
}

impl ArgSpec {
    /// Declare a positional argument.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            options: Vec::new(),
        }
    }

    /// Set the argument description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add a selectable option, in declaration order.
    pub fn option(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.options.push(ArgOption {
            name: name.into(),
            description: description.into(),
        });
        self
    }

    /// Argument name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Argument description.
    pub fn describe(&self) -> &str {
        &self.description
    }

    /// Declared options, in declaration order.
    pub fn options(&self) -> &[ArgOption] {
        &self.options
    }

    /// True if this argument has selectable options.
    pub fn is_enumerable(&self) -> bool {
        !self.options.is_empty()
    }
}

/// A command definition: metadata plus its handler.
pub struct CommandSpec {
    name: String,
    description: String,
    usage: Option<String>,
    category: Category,
    args: Vec<ArgSpec>,
    handler: Handler,
}

impl CommandSpec {
    /// Declare a command.
    pub fn new<F>(
        name: impl Into<String>,
        description: impl Into<String>,
        category: Category,
        handler: F,
    ) -> Self
    where
        F: Fn(&[String], &mut CommandContext<'_>) -> anyhow::Result<()> + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            usage: None,
            category,
            args: Vec::new(),
            handler: Box::new(handler),
        }
    }

    /// Set the usage string.
    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    /// Append a positional argument declaration.
    pub fn arg(mut self, arg: ArgSpec) -> Self {
        self.args.push(arg);
        self
    }

    /// Command name (the registry key).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// One-line description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Usage string, if declared.
    pub fn usage_line(&self) -> Option<&str> {
        self.usage.as_deref()
    }

    /// Category for grouped listings.
    pub fn category(&self) -> Category {
        self.category
    }

    /// Declared positional arguments.
    pub fn args(&self) -> &[ArgSpec] {
        &self.args
    }

    /// Run the handler.
    pub fn invoke(&self, args: &[String], ctx: &mut CommandContext<'_>) -> anyhow::Result<()> {
        (self.handler)(args, ctx)
    }
}

impl fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSpec")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("usage", &self.usage)
            .field("category", &self.category)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

/// Lookup table of command definitions.
#[derive(Debug, Default)]
pub struct Registry {
    commands: HashMap<String, CommandSpec>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a command, keyed by name.
    ///
    /// Re-registering an existing name replaces it silently; the
    /// displaced definition is returned so callers can detect the
    /// collision if they care.
    pub fn register(&mut self, spec: CommandSpec) -> Option<CommandSpec> {
        self.commands.insert(spec.name.clone(), spec)
    }

    /// Exact-match lookup.
    pub fn resolve(&self, name: &str) -> Option<&CommandSpec> {
        self.commands.get(name)
    }

    /// All commands whose name starts with `prefix`, sorted
    /// lexicographically. An empty prefix matches everything.
    pub fn search(&self, prefix: &str) -> Vec<&CommandSpec> {
        let mut matches: Vec<&CommandSpec> = self
            .commands
            .values()
            .filter(|cmd| cmd.name.starts_with(prefix))
            .collect();
        matches.sort_by(|a, b| a.name.cmp(&b.name));
        matches
    }

    /// Commands grouped by category in [`Category::ALL`] order, each
    /// group sorted lexicographically. Empty categories are omitted.
    pub fn by_category(&self) -> Vec<(Category, Vec<&CommandSpec>)> {
        let mut groups = Vec::new();
        for category in Category::ALL {
            let mut cmds: Vec<&CommandSpec> = self
                .commands
                .values()
                .filter(|cmd| cmd.category == category)
                .collect();
            if cmds.is_empty() {
                continue;
            }
            cmds.sort_by(|a, b| a.name.cmp(&b.name));
            groups.push((category, cmds));
        }
        groups
    }

    /// Number of registered commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// True if no commands are registered.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
