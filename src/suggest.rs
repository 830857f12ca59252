//! Suggestion engine.
//!
//! A pure function of (registry, current buffer) producing ranked,
//! capped completion candidates. Only lines starting with the
//! completion sigil activate it; everything else yields nothing.

use crate::registry::Registry;

/// Leading marker that opts a line into completion mode.
pub const SIGIL: char = '/';

/// Maximum number of candidates offered at once.
pub const MAX_SUGGESTIONS: usize = 8;

/// One completion candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionItem {
    /// Bare name of the command or option.
    pub name: String,
    /// Description shown next to the label.
    pub description: String,
    /// Text rendered in the suggestion row.
    pub label: String,
    /// Full line this candidate completes to.
    pub completion: String,
    /// Non-selectable placeholder (argument-name hint).
    pub hint: bool,
}

/// Compute completion candidates for the current buffer.
///
/// With no space after the sigil, the remainder is a command-name
/// prefix (empty prefix lists everything). After a space following a
/// resolved command name, the last space-delimited token selects the
/// positional argument being typed: enumerable arguments offer their
/// options filtered by prefix, non-enumerable arguments show a single
/// hint while the token is still empty.
pub fn complete(registry: &Registry, input: &str) -> Vec<SuggestionItem> {
    let Some(rest) = input.strip_prefix(SIGIL) else {
        return Vec::new();
    };

    // No space yet: command-name prefix mode.
    let Some(space) = rest.find(' ') else {
        return registry
            .search(rest)
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(|cmd| SuggestionItem {
                name: cmd.name().to_string(),
                description: cmd.description().to_string(),
                label: format!("{SIGIL}{}", cmd.name()),
                completion: format!("{SIGIL}{} ", cmd.name()),
                hint: false,
            })
            .collect();
    };

    // Positional-argument mode.
    let cmd_name = &rest[..space];
    let Some(cmd) = registry.resolve(cmd_name) else {
        return Vec::new();
    };

    // The index of the last token is the slot being typed:
    //   "/harmonica "            -> [""]            -> slot 0
    //   "/harmonica file.wav "   -> ["file.wav",""] -> slot 1
    //   "/harmonica file.wav e"  -> ["file.wav","e"] -> slot 1
    let after_cmd = &rest[space + 1..];
    let parts: Vec<&str> = after_cmd.split(' ').collect();
    let slot = parts.len() - 1;
    let partial = parts[slot];

    let Some(arg) = cmd.args().get(slot) else {
        return Vec::new();
    };

    if arg.is_enumerable() {
        // Rebuild the whole line: sigil + command + earlier args + option.
        let completed = parts[..slot].join(" ");
        let prefix = if completed.is_empty() {
            format!("{SIGIL}{cmd_name} ")
        } else {
            format!("{SIGIL}{cmd_name} {completed} ")
        };

        return arg
            .options()
            .iter()
            .filter(|opt| opt.name.starts_with(partial))
            .take(MAX_SUGGESTIONS)
            .map(|opt| SuggestionItem {
                name: opt.name.clone(),
                description: opt.description.clone(),
                label: opt.name.clone(),
                completion: format!("{prefix}{} ", opt.name),
                hint: false,
            })
            .collect();
    }

    // Placeholder hint, only before the user starts typing this slot.
    if partial.is_empty() {
        return vec![SuggestionItem {
            name: arg.name().to_string(),
            description: arg.describe().to_string(),
            label: arg.name().to_string(),
            completion: String::new(),
            hint: true,
        }];
    }

    Vec::new()
}
