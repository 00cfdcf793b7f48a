use std::path::Path;

use crate::storage::error::StorageResult;

/// Watermark id allocator for one entity kind.
///
/// The next id is always (highest id ever observed) + 1. Freed ids are never
/// reclaimed: deleting the entity with the highest id does not lower the
/// watermark, so ids stay unique for the lifetime of the data directory as
/// long as the directory scan runs at open.
#[derive(Debug, Default)]
pub struct IdAllocator {
    high: i64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the watermark from a set of existing ids
    pub fn from_ids<I: IntoIterator<Item = i64>>(ids: I) -> Self {
        let mut allocator = Self::new();
        for id in ids {
            allocator.observe(id);
        }
        allocator
    }

    /// Seed the watermark by scanning a kind directory for `<id>.json` files.
    ///
    /// Files whose stem is not an integer are ignored; they are not entity
    /// snapshots.
    pub fn scan_directory(dir: &Path) -> StorageResult<Self> {
        let mut allocator = Self::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if let Some(id) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| stem.parse::<i64>().ok())
            {
                allocator.observe(id);
            }
        }
        Ok(allocator)
    }

    /// Raise the watermark to cover an id seen in storage
    pub fn observe(&mut self, id: i64) {
        if id > self.high {
            self.high = id;
        }
    }

    /// Hand out the next unique id
    pub fn allocate(&mut self) -> i64 {
        self.high += 1;
        self.high
    }

    /// Highest id observed or allocated so far
    pub fn watermark(&self) -> i64 {
        self.high
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_allocator_starts_at_one() {
        let mut allocator = IdAllocator::new();
        assert_eq!(allocator.allocate(), 1);
    }

    #[test]
    fn test_allocation_is_strictly_increasing() {
        let mut allocator = IdAllocator::from_ids([3, 7, 2]);
        assert_eq!(allocator.allocate(), 8);
        assert_eq!(allocator.allocate(), 9);
        assert_eq!(allocator.watermark(), 9);
    }

    #[test]
    fn test_observe_never_lowers_the_watermark() {
        let mut allocator = IdAllocator::from_ids([5]);
        allocator.observe(2);
        assert_eq!(allocator.allocate(), 6);
    }

    #[test]
    fn test_scan_directory_picks_up_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("4.json"), "{}").unwrap();
        std::fs::write(dir.path().join("11.json"), "{}").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut allocator = IdAllocator::scan_directory(dir.path()).unwrap();
        assert_eq!(allocator.allocate(), 12);
    }
}
