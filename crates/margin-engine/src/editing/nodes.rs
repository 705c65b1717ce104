use tree_sitter::Node;

use crate::editing::{Document, DocumentNode};

/// Container kinds whose children are themselves blocks
const CONTAINER_KINDS: &[&str] = &["document", "section", "block_quote", "list", "list_item"];

/// Leaf block kinds reported as [`NodeKind::Other`](crate::editing::NodeKind::Other)
const LEAF_BLOCK_KINDS: &[&str] = &[
    "paragraph",
    "fenced_code_block",
    "indented_code_block",
    "thematic_break",
    "html_block",
    "pipe_table",
    "link_reference_definition",
];

/// Walk the parse tree and flatten it into blocks in document order.
///
/// Headings nested inside quotes or list items are reported like any other
/// heading; the outline only cares about order and level.
pub(crate) fn collect_nodes(doc: &Document) -> Vec<DocumentNode> {
    let mut nodes = Vec::new();
    if let Some(tree) = doc.tree.as_ref() {
        collect_recursive(doc, tree.root_node(), &mut nodes);
    }
    nodes
}

fn collect_recursive(doc: &Document, node: Node, nodes: &mut Vec<DocumentNode>) {
    let kind = node.kind();
    if node.byte_range().is_empty() {
        return;
    }

    match kind {
        "atx_heading" | "setext_heading" => {
            let level = heading_level(doc, &node);
            let text = heading_text(doc, &node);
            nodes.push(DocumentNode::heading(level, text, node.start_byte()));
        }
        _ if CONTAINER_KINDS.contains(&kind) => {
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                collect_recursive(doc, child, nodes);
            }
        }
        _ if LEAF_BLOCK_KINDS.contains(&kind) => {
            let text = doc.slice_to_cow(node.byte_range()).trim().to_string();
            nodes.push(DocumentNode::other(text, node.start_byte()));
        }
        // Markers, continuations and anything the grammar adds later
        _ => {}
    }
}

fn heading_level(doc: &Document, node: &Node) -> u8 {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "setext_h1_underline" => return 1,
            "setext_h2_underline" => return 2,
            marker if marker.starts_with("atx_h") && marker.ends_with("_marker") => {
                if let Ok(level) = marker[5..6].parse::<u8>() {
                    return level;
                }
            }
            _ => {}
        }
    }

    // Grammar gave us no marker node; count the hashes ourselves
    leading_hashes(&doc.slice_to_cow(node.byte_range()))
}

/// Number of leading `#`, saturating so an absurd run still clamps as deep
fn leading_hashes(text: &str) -> u8 {
    u8::try_from(text.chars().take_while(|&c| c == '#').count()).unwrap_or(u8::MAX)
}

fn heading_text(doc: &Document, node: &Node) -> String {
    if let Some(content) = node.child_by_field_name("heading_content") {
        let raw = doc.slice_to_cow(content.byte_range());
        return clean_heading_text(&raw);
    }

    let raw = doc.slice_to_cow(node.byte_range());
    let first_line = raw.lines().next().unwrap_or_default();
    clean_heading_text(first_line.trim_start_matches('#'))
}

/// Collapse line breaks (setext headings can wrap) and drop an ATX closing
/// sequence such as the `##` in `## Title ##`.
fn clean_heading_text(raw: &str) -> String {
    let joined = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    match joined.rsplit_once(' ') {
        Some((head, tail)) if !tail.is_empty() && tail.chars().all(|c| c == '#') => {
            head.to_string()
        }
        _ if joined.chars().all(|c| c == '#') => String::new(),
        _ => joined,
    }
}
