pub mod editing;
pub mod outline;
pub mod overlay;
pub mod session;
pub mod suggest;

// Re-export key types for easier usage
pub use editing::{Cmd, Document, DocumentAdapter, DocumentNode, MappedOffset, NodeKind, Patch, ScreenPoint};
pub use outline::{CollapseState, HeadingId, HeadingRecord, Numbering, Outline, OutlineError};
pub use overlay::{OverlayAnnotation, OverlayStore};
pub use session::Session;
pub use suggest::{
    GhostText, SuggestionEngine, SuggestionEntry, SuggestionSource, SuggestionState, TriggerTable,
};
