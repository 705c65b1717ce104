use crate::editing::DocumentNode;
use crate::outline::{CollapseState, HeadingId, HeadingRecord, Numbering, Outline};

/// Deepest heading level; also the number of numbering counters
pub const MAX_HEADING_LEVEL: u8 = 6;

/// A heading as it appears in the document, before nesting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatHeading {
    pub level: u8,
    pub text: String,
    pub offset: usize,
}

impl FlatHeading {
    pub fn new(level: u8, text: impl Into<String>, offset: usize) -> Self {
        Self {
            level,
            text: text.into(),
            offset,
        }
    }

    pub fn from_node(node: DocumentNode) -> Option<Self> {
        let level = node.heading_level()?;
        Some(Self {
            level,
            text: node.text,
            offset: node.offset,
        })
    }
}

/// Bring a reported level into `1..=MAX_HEADING_LEVEL`
pub fn clamp_level(level: u8) -> u8 {
    level.clamp(1, MAX_HEADING_LEVEL)
}

/// Nest headings into a forest by level and number them.
///
/// Uses an explicit stack of open ancestors: each heading first pops every
/// entry at its own level or deeper, then hangs off whatever is left on top
/// (or becomes a root). Skipped levels nest directly under the nearest
/// shallower heading; nothing is fabricated in between. Ids are assigned in
/// input order, so preorder over the result reproduces the input.
pub fn build_outline(
    headings: impl IntoIterator<Item = FlatHeading>,
    previous: &CollapseState,
    numbering: Numbering,
) -> Outline {
    let mut records: Vec<HeadingRecord> = Vec::new();
    let mut roots = Vec::new();
    let mut stack: Vec<HeadingId> = Vec::new();
    let mut counters = [0u32; MAX_HEADING_LEVEL as usize];

    for heading in headings {
        let level = clamp_level(heading.level);
        if level != heading.level {
            log::debug!(
                "clamped heading level {} to {level} for {:?}",
                heading.level,
                heading.text
            );
        }

        while stack
            .last()
            .is_some_and(|top| records[top.0].level >= level)
        {
            stack.pop();
        }

        let depth = usize::from(level - 1);
        counters[depth] += 1;
        counters[depth + 1..].fill(0);

        let number = match numbering {
            Numbering::Shown => counters[..=depth]
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join("."),
            Numbering::Hidden => String::new(),
        };

        let id = HeadingId(records.len());
        let parent = stack.last().copied();
        match parent {
            Some(parent) => records[parent.0].children.push(id),
            None => roots.push(id),
        }

        records.push(HeadingRecord {
            id,
            level,
            text: heading.text,
            offset: heading.offset,
            number,
            parent,
            children: Vec::new(),
            collapsed: previous.is_collapsed(id),
        });
        stack.push(id);
    }

    Outline {
        records,
        roots,
        numbering,
        version: 0,
    }
}
