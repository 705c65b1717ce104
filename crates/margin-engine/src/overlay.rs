//! Ephemeral annotations anchored to document offsets.
//!
//! An overlay set belongs to exactly one document version. After each
//! committed mutation it is either pushed through that mutation's
//! edit-transform or dropped; it is never rendered against a document it was
//! not computed for.

use crate::editing::{DocumentAdapter, MappedOffset};

/// A payload anchored at an offset; what the payload means is up to its producer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayAnnotation<P> {
    pub anchor: usize,
    pub payload: P,
}

impl<P> OverlayAnnotation<P> {
    pub fn new(anchor: usize, payload: P) -> Self {
        Self { anchor, payload }
    }
}

/// Current-version set of annotations.
///
/// [`replace_all`](OverlayStore::replace_all) is the only way the set
/// changes, so a reader never sees a half-updated set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayStore<P> {
    annotations: Vec<OverlayAnnotation<P>>,
    version: u64,
}

impl<P> Default for OverlayStore<P> {
    fn default() -> Self {
        Self {
            annotations: Vec::new(),
            version: 0,
        }
    }
}

impl<P> OverlayStore<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `annotations` as the whole set for document `version`
    pub fn replace_all(&mut self, version: u64, annotations: Vec<OverlayAnnotation<P>>) {
        self.annotations = annotations;
        self.version = version;
    }

    pub fn annotations(&self) -> &[OverlayAnnotation<P>] {
        &self.annotations
    }

    /// Document version the set was computed for
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Bring the set up to the document's current version.
    ///
    /// One version behind: every anchor goes through the last edit and those
    /// that land in deleted text are dropped. Further behind: the last edit no
    /// longer describes the gap, so the whole set is dropped. Returns how many
    /// annotations were dropped.
    pub fn remap<D: DocumentAdapter + ?Sized>(&mut self, doc: &D) -> usize {
        let current = doc.version();
        if current == self.version {
            return 0;
        }

        let previous = std::mem::take(&mut self.annotations);
        let before = previous.len();

        let kept = if current == self.version + 1 {
            previous
                .into_iter()
                .filter_map(|annotation| match doc.map_offset_through_last_edit(annotation.anchor) {
                    MappedOffset::Mapped(anchor) => Some(OverlayAnnotation {
                        anchor,
                        payload: annotation.payload,
                    }),
                    MappedOffset::Deleted => {
                        log::debug!("dropping overlay at {}: anchor deleted", annotation.anchor);
                        None
                    }
                })
                .collect()
        } else {
            if before > 0 {
                log::debug!(
                    "dropping {before} overlays: document moved from version {} to {current}",
                    self.version
                );
            }
            Vec::new()
        };

        let dropped = before - kept.len();
        self.replace_all(current, kept);
        dropped
    }
}
