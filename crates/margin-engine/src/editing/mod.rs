/*!
 * # Editing Core Module
 *
 * The document side of margin: the narrow capability interface the derived
 * views consume, and a reference Markdown engine that implements it.
 *
 * ## Architecture Overview
 *
 * ### 1. Capability Interface
 * - **`DocumentAdapter`** is everything the outline and the suggestion engine
 *   may ask of a document: blocks in order, plain text, caret, screen
 *   coordinates, one-shot insertion and offset mapping through the last edit
 * - Any rich-text engine satisfying it is interchangeable
 *
 * ### 2. Single Source of Truth: xi-rope Buffer
 * - The reference `Document` stores the entire source in one `xi_rope::Rope`
 * - Edits are **Commands** (`Cmd`) compiled to a single **Delta** each, so a
 *   command is exactly one committed mutation and one version bump
 *
 * ### 3. Incremental Parsing with Tree-sitter
 * - `tree-sitter-md` gives the block structure; headings become
 *   `DocumentNode`s with their level and display text
 *
 * ### 4. Offset Algebra
 * - The last Delta is retained; `mapping::map_offset` pushes a pre-edit offset
 *   through it or reports that the offset was deleted
 *
 * ## Module Structure
 *
 * - **`adapter`**: `DocumentAdapter`, `DocumentNode`, `ScreenPoint`, `MappedOffset`
 * - **`document`**: reference `Document`
 * - **`commands`**: `Cmd` enum and delta compilation
 * - **`mapping`**: offset remapping through a Delta
 * - **`nodes`**: parse tree to `DocumentNode` flattening
 * - **`patch`**: edit result metadata
 */

pub mod adapter;
pub mod commands;
pub mod document;
pub mod mapping;
mod nodes;
pub mod patch;

pub use adapter::{DocumentAdapter, DocumentNode, MappedOffset, NodeKind, ScreenPoint};
pub use commands::Cmd;
pub use document::Document;
pub use patch::Patch;
