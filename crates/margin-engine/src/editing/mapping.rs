//! Offset algebra over xi-rope deltas.
//!
//! A delta is a run of `Copy(from, to)` elements (kept spans of the old
//! document) and `Insert(text)` elements. Gaps between consecutive copies are
//! deletions. Offsets are positions *between* bytes, so the two ends of a
//! deleted span survive the edit and only positions strictly inside it are
//! reported as deleted. Text inserted exactly at an offset pushes it right.

use xi_rope::{Delta, RopeInfo, delta::DeltaElement};

use crate::editing::MappedOffset;

/// Map an offset in the pre-edit document to the post-edit document
pub fn map_offset(delta: &Delta<RopeInfo>, offset: usize) -> MappedOffset {
    if offset > delta.base_len {
        return MappedOffset::Deleted;
    }

    let mut old_pos = 0;
    let mut new_pos = 0;

    for el in &delta.els {
        match el {
            DeltaElement::Copy(from, to) => {
                if let Some(mapped) = map_in_gap(offset, old_pos, *from, new_pos) {
                    return mapped;
                }
                if (*from..*to).contains(&offset) {
                    return MappedOffset::Mapped(new_pos + (offset - from));
                }
                new_pos += to - from;
                old_pos = *to;
            }
            DeltaElement::Insert(text) => {
                new_pos += text.len();
            }
        }
    }

    // Trailing deletion, or the very end of the document
    map_in_gap(offset, old_pos, delta.base_len, new_pos)
        .unwrap_or(MappedOffset::Mapped(new_pos))
}

/// Handle an offset that falls in the removed span `gap_start..gap_end`,
/// where `new_pos` is the post-edit position of that span.
fn map_in_gap(
    offset: usize,
    gap_start: usize,
    gap_end: usize,
    new_pos: usize,
) -> Option<MappedOffset> {
    if gap_start >= gap_end {
        return None;
    }
    if offset == gap_start {
        Some(MappedOffset::Mapped(new_pos))
    } else if offset > gap_start && offset < gap_end {
        Some(MappedOffset::Deleted)
    } else {
        None
    }
}
