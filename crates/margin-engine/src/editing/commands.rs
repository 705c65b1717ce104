use std::ops::Range;

use xi_rope::{Delta, Rope, RopeInfo, delta::Builder};

use crate::editing::Document;

/// Edit commands understood by [`Document::apply`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cmd {
    InsertText { at: usize, text: String },
    DeleteRange { range: Range<usize> },
    ReplaceRange { range: Range<usize>, text: String },
}

/// Compile a command into a delta over the current buffer.
///
/// Offsets are clamped to the buffer and snapped back to the nearest char
/// boundary so a stale or sloppy command can never split a code point.
pub(crate) fn compile_command(doc: &Document, cmd: &Cmd) -> Delta<RopeInfo> {
    let len = doc.len();
    let mut builder = Builder::new(len);

    match cmd {
        Cmd::InsertText { at, text } => {
            let at = doc.floor_char_boundary(*at);
            builder.replace(at..at, Rope::from(text.as_str()));
        }
        Cmd::DeleteRange { range } => {
            let range = clamp_range(doc, range);
            if !range.is_empty() {
                builder.delete(range);
            }
        }
        Cmd::ReplaceRange { range, text } => {
            let range = clamp_range(doc, range);
            builder.replace(range, Rope::from(text.as_str()));
        }
    }

    builder.build()
}

/// Where the caret lands after the command: after inserted text, at the start
/// of removed text.
pub(crate) fn transform_selection_for_command(doc: &Document, cmd: &Cmd) -> Range<usize> {
    let caret = match cmd {
        Cmd::InsertText { at, text } => doc.floor_char_boundary(*at) + text.len(),
        Cmd::DeleteRange { range } => clamp_range(doc, range).start,
        Cmd::ReplaceRange { range, text } => clamp_range(doc, range).start + text.len(),
    };
    caret..caret
}

fn clamp_range(doc: &Document, range: &Range<usize>) -> Range<usize> {
    let start = doc.floor_char_boundary(range.start);
    let end = doc.floor_char_boundary(range.end).max(start);
    start..end
}
