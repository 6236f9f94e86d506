use core::{
  cmp::Ordering,
  fmt,
  ops::{Add, AddAssign, Deref, Sub, SubAssign},
};

use super::RingBuffer;

/// A random-access position inside a [`RingBuffer`].
///
/// A cursor carries two coordinates that always move in lockstep: the physical
/// slot it points at, masked by the buffer's capacity after every step, and
/// its logical position counted from the front, which never wraps. Equality,
/// ordering and distance only look at the logical position, so the
/// [`end`](RingBuffer::end) cursor of a full buffer differs from its
/// [`begin`](RingBuffer::begin) cursor even though both point at the same slot.
///
/// Cursors may step outside `0..=len()`; only dereferencing requires the
/// position to be in bounds.
///
/// ## Examples
///
/// ```
/// use ringdeque::RingBuffer;
///
/// let mut deque = RingBuffer::with_capacity(3);
/// deque.extend([1, 2, 3]);
/// deque.push_front(0);
/// assert!(deque.is_full());
///
/// let (begin, end) = (deque.begin(), deque.end());
/// assert_eq!(begin.slot(), end.slot());
/// assert_ne!(begin, end);
/// assert_eq!(end - begin, 4);
///
/// let mut at = end - 1;
/// assert_eq!(*at, 3);
/// at -= 2;
/// assert_eq!(at.get(), Some(&1));
/// ```
pub struct Cursor<'a, T> {
  buf: &'a RingBuffer<T>,
  slot: usize,
  pos: usize,
}

impl<'a, T> Cursor<'a, T> {
  #[inline]
  pub(super) const fn new(buf: &'a RingBuffer<T>, slot: usize, pos: usize) -> Self {
    Self { buf, slot, pos }
  }

  /// Logical position of the cursor, `0` being the front element.
  #[inline]
  pub const fn pos(&self) -> usize {
    self.pos
  }

  /// Physical slot the cursor points at.
  #[inline]
  pub const fn slot(&self) -> usize {
    self.slot
  }

  /// Returns the element under the cursor, or `None` when the cursor is
  /// outside `0..len()`.
  #[inline]
  pub fn get(&self) -> Option<&'a T> {
    if self.pos < self.buf.len() {
      // SAFETY: `slot` tracks `(begin + pos) & capacity`, which is live for
      // every position below `len()`; the shared borrow keeps it that way.
      unsafe { Some(self.buf.slot_ref(self.slot)) }
    } else {
      None
    }
  }

  /// Steps one element towards the back.
  #[inline]
  pub fn move_next(&mut self) {
    *self += 1;
  }

  /// Steps one element towards the front.
  #[inline]
  pub fn move_prev(&mut self) {
    *self -= 1;
  }
}

impl<T> Clone for Cursor<'_, T> {
  #[inline]
  fn clone(&self) -> Self {
    *self
  }
}

impl<T> Copy for Cursor<'_, T> {}

impl<T: fmt::Debug> fmt::Debug for Cursor<'_, T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Cursor")
      .field("pos", &self.pos)
      .field("slot", &self.slot)
      .field("value", &self.get())
      .finish()
  }
}

impl<T> Deref for Cursor<'_, T> {
  type Target = T;

  #[inline]
  fn deref(&self) -> &T {
    self.get().expect("Out of bounds access")
  }
}

impl<T> AddAssign<isize> for Cursor<'_, T> {
  #[inline]
  fn add_assign(&mut self, n: isize) {
    self.pos = self.pos.wrapping_add_signed(n);
    self.slot = self.slot.wrapping_add_signed(n) & self.buf.capacity();
  }
}

impl<T> SubAssign<isize> for Cursor<'_, T> {
  #[inline]
  fn sub_assign(&mut self, n: isize) {
    *self += n.wrapping_neg();
  }
}

impl<T> Add<isize> for Cursor<'_, T> {
  type Output = Self;

  #[inline]
  fn add(mut self, n: isize) -> Self {
    self += n;
    self
  }
}

impl<T> Sub<isize> for Cursor<'_, T> {
  type Output = Self;

  #[inline]
  fn sub(mut self, n: isize) -> Self {
    self -= n;
    self
  }
}

impl<T> Sub for Cursor<'_, T> {
  type Output = isize;

  /// Signed logical distance from `other` to `self`.
  #[inline]
  fn sub(self, other: Self) -> isize {
    self.pos.wrapping_sub(other.pos) as isize
  }
}

impl<T> PartialEq for Cursor<'_, T> {
  #[inline]
  fn eq(&self, other: &Self) -> bool {
    self.pos == other.pos
  }
}

impl<T> Eq for Cursor<'_, T> {}

impl<T> PartialOrd for Cursor<'_, T> {
  #[inline]
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl<T> Ord for Cursor<'_, T> {
  #[inline]
  fn cmp(&self, other: &Self) -> Ordering {
    self.pos.cmp(&other.pos)
  }
}

#[cfg(test)]
mod tests {
  use crate::RingBuffer;

  fn wrapped() -> RingBuffer<u32> {
    // Capacity 7 with the front wrapped around the end of the block.
    let mut deque = RingBuffer::with_capacity(7);
    for value in 3..8 {
      deque.push_back(value);
    }
    for value in (0..3).rev() {
      deque.push_front(value);
    }
    deque
  }

  #[test]
  fn walks_forward_and_backward() {
    let deque = wrapped();
    let mut at = deque.begin();
    for expected in 0..8 {
      assert_eq!(*at, expected);
      at.move_next();
    }
    assert_eq!(at, deque.end());

    for expected in (0..8).rev() {
      at.move_prev();
      assert_eq!(*at, expected);
    }
    assert_eq!(at, deque.begin());
  }

  #[test]
  fn slot_wraps_under_mask() {
    let deque = wrapped();
    let begin = deque.begin();
    assert_eq!(begin.slot(), 5);
    assert_eq!((begin + 3).slot(), 0);
    assert_eq!((begin + 3).pos(), 3);
    assert_eq!((begin + 3 - 4).slot(), 4);
  }

  #[test]
  fn arithmetic_matches_indexing() {
    let deque = wrapped();
    for a in 4..7isize {
      for b in -3..0isize {
        let at = deque.begin() + a;
        assert_eq!(*(at + b), deque[(a + b) as usize]);
        // Stepping past the end is fine as long as nothing is read there.
        let mut back = deque.end();
        back -= b;
        assert_eq!(*(back - a), deque[(8 - a - b) as usize]);
      }
    }
  }

  #[test]
  fn comparison_uses_logical_position() {
    let mut deque = RingBuffer::with_capacity(3);
    deque.extend([1, 2, 3, 4]);
    assert!(deque.is_full());
    let (begin, end) = (deque.begin(), deque.end());
    assert_eq!(begin.slot(), end.slot());
    assert!(begin < end);
    assert_eq!(end - begin, 4);
    assert_eq!(begin - end, -4);

    let empty = RingBuffer::<u8>::new();
    assert_eq!(empty.begin(), empty.end());
    assert_eq!(empty.end() - empty.begin(), 0);
  }

  #[test]
  fn out_of_range_get_is_none() {
    let deque = wrapped();
    assert!(deque.end().get().is_none());
    assert!((deque.begin() - 1).get().is_none());
  }

  #[test]
  #[should_panic(expected = "Out of bounds access")]
  fn deref_past_end_panics() {
    let deque = wrapped();
    let _value: u32 = *deque.end();
  }
}
