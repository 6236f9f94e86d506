use core::{fmt, iter::FusedIterator};

use super::RingBuffer;

/// An owning iterator over the elements of a [`RingBuffer`].
///
/// This `struct` is created by the [`into_iter`] method on [`RingBuffer`]
/// (provided by the [`IntoIterator`] trait). Elements not yet yielded are
/// dropped together with the iterator.
///
/// [`into_iter`]: RingBuffer::into_iter
#[derive(Clone)]
pub struct IntoIter<T> {
  inner: RingBuffer<T>,
}

impl<T> IntoIter<T> {
  pub(super) fn new(inner: RingBuffer<T>) -> Self {
    IntoIter { inner }
  }
}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("IntoIter").field(&self.inner).finish()
  }
}

impl<T> Iterator for IntoIter<T> {
  type Item = T;

  #[inline]
  fn next(&mut self) -> Option<T> {
    self.inner.pop_front()
  }

  #[inline]
  fn size_hint(&self) -> (usize, Option<usize>) {
    let len = self.inner.len();
    (len, Some(len))
  }

  #[inline]
  fn count(self) -> usize {
    self.inner.len()
  }

  #[inline]
  fn last(mut self) -> Option<Self::Item> {
    self.inner.pop_back()
  }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
  #[inline]
  fn next_back(&mut self) -> Option<T> {
    self.inner.pop_back()
  }
}

impl<T> ExactSizeIterator for IntoIter<T> {
  #[inline]
  fn len(&self) -> usize {
    self.inner.len()
  }
}

impl<T> FusedIterator for IntoIter<T> {}

#[cfg(test)]
mod tests {
  use super::IntoIter;
  use crate::RingBuffer;
  use std::{cell::Cell, rc::Rc};

  #[test]
  fn iterator_behaves_like_queue() {
    let mut deque = RingBuffer::new();
    for value in 0..5 {
      deque.push_back(value);
    }

    let mut iter = IntoIter::new(deque.clone());
    assert_eq!(iter.size_hint(), (5, Some(5)));
    assert_eq!(iter.next(), Some(0));
    assert_eq!(iter.next_back(), Some(4));
    assert_eq!(iter.len(), 3);
    assert_eq!(iter.last(), Some(3));

    let count = deque.into_iter().count();
    assert_eq!(count, 5);
  }

  #[test]
  fn yields_in_logical_order_across_the_wrap() {
    let mut deque = RingBuffer::with_capacity(7);
    deque.extend([3, 4, 5]);
    for value in (0..3).rev() {
      deque.push_front(value);
    }
    let sum = deque.clone().into_iter().fold(0, |acc, value| acc * 10 + value);
    assert_eq!(sum, 12345);
    assert_eq!(deque.into_iter().rev().next(), Some(5));
  }

  #[test]
  fn unconsumed_items_are_dropped() {
    let drops = Rc::new(Cell::new(0));
    struct Counted(Rc<Cell<usize>>);
    impl Drop for Counted {
      fn drop(&mut self) {
        self.0.set(self.0.get() + 1);
      }
    }

    let mut deque = RingBuffer::new();
    for _ in 0..6 {
      deque.push_back(Counted(Rc::clone(&drops)));
    }
    let mut iter = deque.into_iter();
    drop(iter.next());
    drop(iter.next_back());
    assert_eq!(drops.get(), 2);
    drop(iter);
    assert_eq!(drops.get(), 6);
  }
}
