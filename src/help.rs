//! Plain-text listings of groups and scripts

use std::fmt::Write;

use crate::group::Group;
use crate::name::to_name;
use crate::registry::Registry;

/// Default column width for script names in a group listing
pub const SCRIPT_NAME_WIDTH: usize = 20;

/// Column width for group names in the top-level command listing
pub const GROUP_NAME_WIDTH: usize = 10;

/// Left-align `s` in a column of `width` characters, truncating if longer.
#[must_use]
pub fn pad_truncate(s: &str, width: usize) -> String {
    let truncated: String = s.chars().take(width).collect();
    format!("{truncated:<width$}")
}

/// The group name followed by one line per script: resolved name, then path.
#[must_use]
pub fn group_help(group: &Group, width: usize) -> String {
    let mut help = format!("{}\n", group.name());
    for script in group.scripts() {
        let _ = writeln!(
            help,
            "\t{}{}",
            pad_truncate(&to_name(script), width),
            script.display()
        );
    }
    help
}

/// The "Commands:" section of the top-level usage, one group per line.
#[must_use]
pub fn commands_help(registry: &Registry) -> String {
    let mut help = String::from("Commands:\n");
    for group in registry.groups() {
        let _ = writeln!(
            help,
            "\t{}{}",
            pad_truncate(group.name(), GROUP_NAME_WIDTH),
            group.description()
        );
    }
    help
}
