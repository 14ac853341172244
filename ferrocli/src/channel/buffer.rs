//! Pattern buffer with incremental tail search.
//!
//! Only the bytes appended since the last search, plus `search_depth` bytes
//! of overlap, are scanned for patterns. For large command outputs this
//! keeps each wait linear in the new data rather than the whole buffer.

use bytes::{Bytes, BytesMut};

use super::patterns::Pattern;

/// A match found in the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferMatch {
    /// Index of the pattern that matched.
    pub index: usize,
    /// Byte offset where the match starts.
    pub start: usize,
    /// Byte offset where the match ends.
    pub end: usize,
}

/// Buffer for accumulating output and searching it for patterns.
#[derive(Debug)]
pub struct PatternBuffer {
    /// The pending (not yet consumed) output.
    buffer: BytesMut,

    /// Where the next search begins.
    scan_from: usize,

    /// How many already-searched bytes to re-scan when new data arrives.
    search_depth: usize,
}

impl PatternBuffer {
    /// Create a new pattern buffer with the specified search depth.
    pub fn new(search_depth: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(4096),
            scan_from: 0,
            search_depth,
        }
    }

    /// Append newly received data.
    pub fn extend(&mut self, data: &[u8]) {
        let overlap_start = self.buffer.len().saturating_sub(self.search_depth);
        self.scan_from = self.scan_from.min(overlap_start);
        self.buffer.extend_from_slice(data);
    }

    /// Find the earliest match of any of `patterns` in the unsearched region.
    ///
    /// When two patterns match at the same offset the lower index wins.
    /// A miss advances the search window so the next call only looks at
    /// data appended after this one.
    pub fn search(&mut self, patterns: &[Pattern]) -> Option<BufferMatch> {
        let start = self.scan_from.min(self.buffer.len());
        let found = patterns
            .iter()
            .enumerate()
            .filter_map(|(index, pattern)| {
                pattern
                    .find_at(&self.buffer, start)
                    .map(|(start, end)| BufferMatch { index, start, end })
            })
            .min_by_key(|m| (m.start, m.index));

        if found.is_none() {
            self.scan_from = self.buffer.len();
        }
        found
    }

    /// Search the whole buffer again on the next call.
    ///
    /// Needed when the set of patterns changes, since data already scanned
    /// for the old patterns may match the new ones.
    pub fn rewind(&mut self) {
        self.scan_from = 0;
    }

    /// Remove and return the first `end` bytes.
    pub fn consume(&mut self, end: usize) -> Bytes {
        let end = end.min(self.buffer.len());
        self.scan_from = 0;
        self.buffer.split_to(end).freeze()
    }

    /// Remove and return everything.
    pub fn take(&mut self) -> Bytes {
        self.scan_from = 0;
        self.buffer.split().freeze()
    }

    /// Get a reference to the buffer contents.
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Get the buffer contents as a string (lossy UTF-8 conversion).
    pub fn as_str_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.buffer)
    }

    /// Get the current buffer length.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Get the search depth setting.
    pub fn search_depth(&self) -> usize {
        self.search_depth
    }
}

impl Default for PatternBuffer {
    fn default() -> Self {
        Self::new(1000)
    }
}
