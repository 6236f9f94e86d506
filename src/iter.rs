use core::fmt;
use core::iter::FusedIterator;

use super::Cursor;

/// An iterator over the elements of a [`RingBuffer`](crate::RingBuffer).
///
/// This `struct` is created by the [`iter`] method on [`RingBuffer`]. It walks a
/// pair of [`Cursor`]s towards each other, so skipping ahead with [`nth`] is
/// a constant-time cursor jump.
///
/// [`RingBuffer`]: crate::RingBuffer
/// [`iter`]: crate::RingBuffer::iter
/// [`nth`]: Iterator::nth
pub struct Iter<'a, T> {
  front: Cursor<'a, T>,
  back: Cursor<'a, T>,
}

impl<'a, T> Iter<'a, T> {
  pub(super) const fn new(front: Cursor<'a, T>, back: Cursor<'a, T>) -> Self {
    Self { front, back }
  }

  /// Cursors delimiting the elements not yet yielded, as a half-open
  /// `(front, back)` pair.
  ///
  /// ## Examples
  ///
  /// ```
  /// use ringdeque::RingBuffer;
  ///
  /// let deque = RingBuffer::from([1, 2, 3, 4]);
  /// let mut iter = deque.iter();
  /// iter.next();
  /// iter.next_back();
  ///
  /// let (front, back) = iter.cursors();
  /// assert_eq!(front.pos(), 1);
  /// assert_eq!(back.pos(), 3);
  /// ```
  pub fn cursors(&self) -> (Cursor<'a, T>, Cursor<'a, T>) {
    (self.front, self.back)
  }
}

impl<T> Clone for Iter<'_, T> {
  fn clone(&self) -> Self {
    Self {
      front: self.front,
      back: self.back,
    }
  }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_list().entries(self.clone()).finish()
  }
}

impl<'a, T> Iterator for Iter<'a, T> {
  type Item = &'a T;

  #[inline]
  fn next(&mut self) -> Option<&'a T> {
    if self.front < self.back {
      let item = self.front.get();
      self.front.move_next();
      item
    } else {
      None
    }
  }

  #[inline]
  fn size_hint(&self) -> (usize, Option<usize>) {
    let len = self.len();
    (len, Some(len))
  }

  #[inline]
  fn nth(&mut self, n: usize) -> Option<&'a T> {
    if n >= self.len() {
      self.front = self.back;
      None
    } else {
      self.front += n as isize;
      self.next()
    }
  }

  #[inline]
  fn last(mut self) -> Option<&'a T> {
    self.next_back()
  }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
  #[inline]
  fn next_back(&mut self) -> Option<&'a T> {
    if self.front < self.back {
      self.back.move_prev();
      self.back.get()
    } else {
      None
    }
  }
}

impl<T> ExactSizeIterator for Iter<'_, T> {
  fn len(&self) -> usize {
    (self.back - self.front) as usize
  }
}

impl<T> FusedIterator for Iter<'_, T> {}

#[cfg(test)]
mod tests {
  use crate::RingBuffer;
  use std::vec::Vec;

  fn wrapped() -> RingBuffer<i32> {
    let mut deque = RingBuffer::with_capacity(7);
    deque.extend([2, 3, 4, 5]);
    deque.push_front(1);
    deque.push_front(0);
    deque
  }

  #[test]
  fn forward_matches_indexing() {
    let deque = wrapped();
    for (idx, value) in deque.iter().enumerate() {
      assert_eq!(*value, deque[idx]);
    }
    assert_eq!(deque.iter().count(), deque.len());
  }

  #[test]
  fn backward_matches_indexing() {
    let deque = wrapped();
    let collected: Vec<_> = deque.iter().rev().copied().collect();
    assert_eq!(collected, [5, 4, 3, 2, 1, 0]);
  }

  #[test]
  fn meets_in_the_middle() {
    let deque = wrapped();
    let mut iter = deque.iter();
    assert_eq!(iter.next(), Some(&0));
    assert_eq!(iter.next_back(), Some(&5));
    assert_eq!(iter.len(), 4);
    assert_eq!(iter.next_back(), Some(&4));
    assert_eq!(iter.next(), Some(&1));
    assert_eq!(iter.next(), Some(&2));
    assert_eq!(iter.next_back(), Some(&3));
    assert_eq!(iter.next(), None);
    assert_eq!(iter.next_back(), None);
    assert_eq!(iter.size_hint(), (0, Some(0)));
  }

  #[test]
  fn nth_jumps_and_exhausts() {
    let deque = wrapped();
    let mut iter = deque.iter();
    assert_eq!(iter.nth(3), Some(&3));
    assert_eq!(iter.len(), 2);
    assert_eq!(iter.nth(2), None);
    assert_eq!(iter.next(), None);
    assert_eq!(deque.iter().last(), Some(&5));
  }

  #[test]
  fn empty_buffer_yields_nothing() {
    let deque = RingBuffer::<u8>::new();
    assert_eq!(deque.iter().next(), None);
    assert_eq!(deque.iter().len(), 0);
  }
}
