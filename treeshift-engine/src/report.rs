//! Counters returned by engine operations.

/// Outcome of a copy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyReport {
    /// Documents written at the destination, subcollection documents included.
    pub documents_copied: u64,
    /// Source documents that had no data when read.
    pub documents_skipped: u64,
}

/// Outcome of a delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteReport {
    /// Documents of the target itself (the document, or the collection's documents).
    pub documents_deleted: u64,
    /// Documents removed from named subcollections.
    pub subcollection_documents_deleted: u64,
    /// Atomic delete batches committed.
    pub batches: u64,
}

impl DeleteReport {
    pub(crate) fn absorb(&mut self, other: DeleteReport) {
        self.documents_deleted += other.documents_deleted;
        self.subcollection_documents_deleted += other.subcollection_documents_deleted;
        self.batches += other.batches;
    }
}
