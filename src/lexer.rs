//! Splitting of a raw input line into argument strings.
//!
//! There is no quoting and no substitution: a word is a maximal run of
//! characters other than space, tab and newline.

use crate::command::Command;

/// Default bound on the length of a single argument, in bytes.
pub const MAX_ARG_LEN: usize = 256;

const SEPARATORS: [char; 3] = [' ', '\t', '\n'];

/// Split `line` on runs of separators.
///
/// Leading, trailing and repeated separators never produce empty words.
pub fn split_into_tokens(line: &str) -> Vec<&str> {
    line.split(SEPARATORS).filter(|t| !t.is_empty()).collect()
}

/// Build a [`Command`] out of `line`, truncating every word to `max_arg_len`.
///
/// An empty or all-separator line yields a command with no arguments.
pub fn parse(line: &str, max_arg_len: usize) -> Command {
    Command::new(
        split_into_tokens(line)
            .into_iter()
            .map(|token| truncate_arg(token, max_arg_len))
            .collect(),
    )
}

/// Copy at most `cap` bytes of `arg`.
///
/// Longer arguments are cut silently. If byte `cap` falls inside a multi-byte
/// character the cut moves back to the previous character boundary, so the
/// result may be a few bytes shorter than `cap` for non-ASCII input.
pub fn truncate_arg(arg: &str, cap: usize) -> String {
    if arg.len() <= cap {
        return arg.to_owned();
    }
    let mut end = cap;
    while !arg.is_char_boundary(end) {
        end -= 1;
    }
    arg[..end].to_owned()
}
