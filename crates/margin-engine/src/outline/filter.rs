use crate::outline::{HeadingId, HeadingRecord, Outline};

/// One heading in a presented (possibly filtered) forest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineNode<'a> {
    pub record: &'a HeadingRecord,
    /// Effective flag for this presentation; search forces `false`
    pub collapsed: bool,
    pub children: Vec<OutlineNode<'a>>,
}

/// A row a host can draw: a heading, its depth and whether it has children
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleRow<'a> {
    pub depth: usize,
    pub record: &'a HeadingRecord,
    pub collapsed: bool,
    pub has_children: bool,
}

impl VisibleRow<'_> {
    /// "1.2 Title", or just "Title" when numbering is hidden
    pub fn label(&self) -> String {
        if self.record.number.is_empty() {
            self.record.text.clone()
        } else {
            format!("{} {}", self.record.number, self.record.text)
        }
    }
}

impl Outline {
    /// Present the forest, pruned to `query` when it is not blank.
    ///
    /// A heading stays when its text contains the query (case-insensitive) or
    /// when any of its children stays. Everything kept by a search is shown
    /// expanded; the stored collapse flags are not touched.
    pub fn filter(&self, query: &str) -> Vec<OutlineNode<'_>> {
        if query.trim().is_empty() {
            return self.roots().iter().map(|&id| self.full_node(id)).collect();
        }

        let query = query.to_lowercase();
        self.roots()
            .iter()
            .filter_map(|&id| self.filtered_node(id, &query))
            .collect()
    }

    fn full_node(&self, id: HeadingId) -> OutlineNode<'_> {
        let record = &self.records[id.0];
        OutlineNode {
            record,
            collapsed: record.collapsed,
            children: record.children.iter().map(|&c| self.full_node(c)).collect(),
        }
    }

    fn filtered_node(&self, id: HeadingId, query: &str) -> Option<OutlineNode<'_>> {
        let record = &self.records[id.0];
        let children: Vec<_> = record
            .children
            .iter()
            .filter_map(|&c| self.filtered_node(c, query))
            .collect();

        let matches = record.text.to_lowercase().contains(query);
        (matches || !children.is_empty()).then(|| OutlineNode {
            record,
            collapsed: false,
            children,
        })
    }
}

/// Flatten a presented forest into rows, skipping children of collapsed nodes
pub fn flatten_visible<'a>(nodes: &[OutlineNode<'a>]) -> Vec<VisibleRow<'a>> {
    let mut rows = Vec::new();
    push_rows(nodes, 0, &mut rows);
    rows
}

fn push_rows<'a>(nodes: &[OutlineNode<'a>], depth: usize, rows: &mut Vec<VisibleRow<'a>>) {
    for node in nodes {
        rows.push(VisibleRow {
            depth,
            record: node.record,
            collapsed: node.collapsed,
            has_children: !node.children.is_empty(),
        });
        if !node.collapsed {
            push_rows(&node.children, depth + 1, rows);
        }
    }
}
