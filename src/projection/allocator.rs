//! Column Index Allocator
//!
//! Issues the global cell indexes that address values inside a record's
//! sparse rows. One allocator belongs to exactly one import job.

/// Monotonic source of cell indexes
#[derive(Debug, Default, Clone)]
pub struct ColumnIndexAllocator {
    next_index: usize,
}

impl ColumnIndexAllocator {
    /// Create an allocator starting at 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the next unused index and advance the counter
    #[inline]
    pub fn allocate(&mut self) -> usize {
        let index = self.next_index;
        self.next_index += 1;
        index
    }

    /// Index the next call to `allocate` will return
    ///
    /// Every index below the watermark has already been issued.
    #[inline]
    pub fn watermark(&self) -> usize {
        self.next_index
    }
}
