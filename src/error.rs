/// Errors reported by the fallible capacity operations of [`RingBuffer`](crate::RingBuffer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
  /// The requested capacity does not fit in `usize` once rounded up to `2^k - 1`.
  #[error("capacity overflow")]
  CapacityOverflow,
  /// The allocator could not provide a block of `slots` slots.
  #[error("failed to allocate {slots} slots")]
  AllocFailed {
    /// Number of slots that were requested.
    slots: usize,
  },
}

/// A violated ring-buffer invariant found by
/// [`RingBuffer::health_check`](crate::RingBuffer::health_check).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HealthError {
  /// `size` exceeds `capacity + 1`, or disagrees with the distance from `begin` to `end`.
  #[error("size invariant violated: size {size}, capacity {capacity}, begin {begin}, end {end}")]
  Size {
    /// Tracked element count.
    size: usize,
    /// Capacity mask.
    capacity: usize,
    /// Physical slot of the first element.
    begin: usize,
    /// Physical slot of the last element.
    end: usize,
  },
  /// The buffer is empty but `slot` is still marked live.
  #[error("slot {slot} is live in an empty buffer")]
  LiveWhenEmpty {
    /// Offending physical slot.
    slot: usize,
  },
  /// `slot` lies inside the occupied range but holds no element.
  #[error("slot {slot} inside the occupied range is not live")]
  MissingLive {
    /// Offending physical slot.
    slot: usize,
  },
  /// `slot` lies outside the occupied range but still holds an element.
  #[error("slot {slot} outside the occupied range is live")]
  UnexpectedLive {
    /// Offending physical slot.
    slot: usize,
  },
}
