//! Byte source abstractions for the hex view.
//!
//! This module provides the [`ByteSource`] trait, the contract between the view
//! logic and the externally owned data it addresses, together with
//! [`MemorySource`], a `Vec<u8>`-backed implementation suitable for files that
//! fit in memory.
//!
//! A source may legitimately answer "not yet available" for a read; the view
//! treats that as a transient state rather than an error and consults
//! [`ByteSource::keep_trying`] to decide whether a retry is worthwhile.

use std::rc::Rc;

/// Payload of a change notification fired after a successful write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataChanged {
    /// First byte offset affected by the change.
    pub offset: u64,
    /// Number of bytes affected.
    pub length: u64,
}

/// Callback invoked by a source whenever its data changes.
pub type DataListener = Rc<dyn Fn(&DataChanged)>;

/// Handle returned by [`ByteSource::subscribe`], used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(usize);

impl SubscriptionId {
    #[must_use]
    pub const fn new(id: usize) -> Self {
        Self(id)
    }
}

/// Random-access byte provider consumed by [`HexView`](crate::HexView).
///
/// Offsets are relative to the start of the source; the display base address
/// is layered on top by the view. Reads may return fewer bytes than requested
/// at the end of the source, and `None` when the segment is not yet available.
pub trait ByteSource {
    /// Data length in bytes.
    fn len(&self) -> u64;

    /// Whether the source holds no data.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads up to `length` bytes starting at `offset`.
    ///
    /// Returns `None` if the segment is not currently available. A shorter
    /// (possibly empty) buffer is returned when the request overlaps the end
    /// of the source.
    fn read(&self, offset: u64, length: usize) -> Option<Vec<u8>>;

    /// Reads a single byte at `offset`, or `None` if it is not available.
    fn read_byte(&self, offset: u64) -> Option<u8> {
        self.read(offset, 1).and_then(|bytes| bytes.first().copied())
    }

    /// Whether the segment `[offset, offset+length)` can be read right now.
    fn is_available(&self, offset: u64, length: usize) -> bool;

    /// Whether a caller should keep retrying after an unavailable read.
    fn keep_trying(&self) -> bool;

    /// Whether the data stream provided by this source is writable.
    fn is_writable(&self) -> bool;

    /// Writes `bytes` starting at `offset`. Only defined when
    /// [`is_writable`](Self::is_writable) returns `true`.
    ///
    /// Returns `true` if the write was performed.
    fn write(&mut self, offset: u64, bytes: &[u8]) -> bool;

    /// Registers a listener that receives a [`DataChanged`] event after every
    /// successful write.
    fn subscribe(&mut self, listener: DataListener) -> SubscriptionId;

    /// Removes a previously registered listener.
    fn unsubscribe(&mut self, id: SubscriptionId);
}

/// In-memory [`ByteSource`] backed by a `Vec<u8>`.
///
/// Every segment is always available; `keep_trying` is therefore always
/// `false`. Writability can be toggled to emulate read-only data.
///
/// # Example
/// ```
/// use hexviewlib::{ByteSource, MemorySource};
///
/// let mut source = MemorySource::new(vec![0x10, 0x20, 0x30]);
/// assert_eq!(source.len(), 3);
/// assert_eq!(source.read_byte(1), Some(0x20));
///
/// source.write(1, &[0xFF]);
/// assert_eq!(source.read_byte(1), Some(0xFF));
/// ```
pub struct MemorySource {
    bytes: Vec<u8>,
    writable: bool,
    listeners: Vec<(usize, DataListener)>,
    next_listener_id: usize,
}

impl MemorySource {
    /// Creates a writable source over the provided bytes.
    #[must_use]
    pub const fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            writable: true,
            listeners: Vec::new(),
            next_listener_id: 0,
        }
    }

    /// Creates a read-only source over the provided bytes.
    #[must_use]
    pub const fn read_only(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            writable: false,
            listeners: Vec::new(),
            next_listener_id: 0,
        }
    }

    /// Toggles writability of the source.
    pub const fn set_writable(&mut self, writable: bool) {
        self.writable = writable;
    }

    /// Shrinks the source to `len` bytes, notifying listeners.
    pub fn truncate(&mut self, len: usize) {
        if len < self.bytes.len() {
            self.bytes.truncate(len);
            self.notify(&DataChanged {
                offset: len as u64,
                length: 0,
            });
        }
    }

    /// Borrows the underlying bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the source and returns the underlying bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    fn notify(&self, change: &DataChanged) {
        for (_, listener) in &self.listeners {
            listener(change);
        }
    }
}

impl ByteSource for MemorySource {
    fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    #[allow(clippy::cast_possible_truncation)]
    fn read(&self, offset: u64, length: usize) -> Option<Vec<u8>> {
        if offset >= self.len() {
            return Some(Vec::new());
        }
        let start = offset as usize;
        let end = start.saturating_add(length).min(self.bytes.len());
        Some(self.bytes[start..end].to_vec())
    }

    fn is_available(&self, _offset: u64, _length: usize) -> bool {
        true
    }

    fn keep_trying(&self) -> bool {
        false
    }

    fn is_writable(&self) -> bool {
        self.writable
    }

    #[allow(clippy::cast_possible_truncation)]
    fn write(&mut self, offset: u64, bytes: &[u8]) -> bool {
        if !self.writable {
            return false;
        }
        let start = offset as usize;
        let Some(end) = start.checked_add(bytes.len()) else {
            return false;
        };
        if end > self.bytes.len() {
            return false;
        }
        self.bytes[start..end].copy_from_slice(bytes);
        self.notify(&DataChanged {
            offset,
            length: bytes.len() as u64,
        });
        true
    }

    fn subscribe(&mut self, listener: DataListener) -> SubscriptionId {
        let id = self.next_listener_id;
        self.next_listener_id += 1;
        self.listeners.push((id, listener));
        SubscriptionId::new(id)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.listeners.retain(|(listener_id, _)| SubscriptionId::new(*listener_id) != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_read_clamps_at_end() {
        // Arrange
        let source = MemorySource::new(vec![1, 2, 3]);

        // Act
        let bytes = source.read(2, 10);

        // Assert
        assert_eq!(bytes, Some(vec![3]));
    }

    #[test]
    fn test_read_past_end_is_empty() {
        // Arrange
        let source = MemorySource::new(vec![1, 2, 3]);

        // Act
        let bytes = source.read(3, 1);

        // Assert
        assert_eq!(bytes, Some(Vec::new()));
        assert_eq!(source.read_byte(3), None);
    }

    #[test]
    fn test_write_rejected_when_read_only() {
        // Arrange
        let mut source = MemorySource::read_only(vec![1, 2, 3]);

        // Act
        let written = source.write(0, &[0xFF]);

        // Assert
        assert!(!written);
        assert_eq!(source.read_byte(0), Some(1));
    }

    #[test]
    fn test_write_out_of_bounds_rejected() {
        // Arrange
        let mut source = MemorySource::new(vec![1, 2, 3]);

        // Act
        let written = source.write(2, &[0xFF, 0xFF]);

        // Assert
        assert!(!written);
        assert_eq!(source.as_bytes(), &[1, 2, 3]);
    }

    #[test]
    fn test_listener_fires_on_write() {
        // Arrange
        let mut source = MemorySource::new(vec![0; 8]);
        let seen = Rc::new(Cell::new(None));
        let seen_in_listener = Rc::clone(&seen);
        let id = source.subscribe(Rc::new(move |change: &DataChanged| {
            seen_in_listener.set(Some((change.offset, change.length)));
        }));

        // Act
        source.write(4, &[0xAA, 0xBB]);

        // Assert
        assert_eq!(seen.get(), Some((4, 2)));

        // Act - after unsubscribing, no further events arrive
        source.unsubscribe(id);
        seen.set(None);
        source.write(0, &[0x01]);

        // Assert
        assert_eq!(seen.get(), None);
    }
}
