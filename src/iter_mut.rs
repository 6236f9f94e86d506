use core::iter::FusedIterator;
use core::{fmt, mem, slice};

/// A mutable iterator over the elements of a [`RingBuffer`](crate::RingBuffer).
///
/// This `struct` is created by the [`iter_mut`] method on [`RingBuffer`]. It
/// walks the two physical runs of live slots, the front run from `begin` to
/// the end of the block and the back run wrapped around to slot `0`.
///
/// [`RingBuffer`]: crate::RingBuffer
/// [`iter_mut`]: crate::RingBuffer::iter_mut
pub struct IterMut<'a, T> {
  i1: slice::IterMut<'a, T>,
  i2: slice::IterMut<'a, T>,
}

impl<'a, T> IterMut<'a, T> {
  pub(super) fn new(i1: slice::IterMut<'a, T>, i2: slice::IterMut<'a, T>) -> Self {
    Self { i1, i2 }
  }

  /// Views the underlying data as a pair of subslices of the original data.
  ///
  /// The slices contain, in order, the contents of the deque not yet yielded
  /// by the iterator. To avoid creating `&mut` references that alias, this is
  /// forced to consume the iterator.
  ///
  /// ## Examples
  ///
  /// ```
  /// use ringdeque::RingBuffer;
  ///
  /// let mut deque = RingBuffer::with_capacity(7);
  /// deque.extend([0, 1, 2]);
  /// deque.push_front(10);
  /// deque.push_front(9);
  /// deque.push_front(8);
  ///
  /// let mut iter = deque.iter_mut();
  /// iter.next();
  /// iter.next_back();
  ///
  /// let slices = iter.into_slices();
  /// slices.0[0] = 42;
  /// slices.1[0] = 24;
  /// assert_eq!(deque.as_slices(), (&[8, 42, 10][..], &[24, 1, 2][..]));
  /// ```
  pub fn into_slices(self) -> (&'a mut [T], &'a mut [T]) {
    (self.i1.into_slice(), self.i2.into_slice())
  }

  /// Views the remaining elements as a pair of shared subslices.
  ///
  /// The returned slices borrow from the iterator, so it cannot advance while
  /// they are alive.
  pub fn as_slices(&self) -> (&[T], &[T]) {
    (self.i1.as_slice(), self.i2.as_slice())
  }
}

impl<T: fmt::Debug> fmt::Debug for IterMut<'_, T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("IterMut")
      .field(&self.i1.as_slice())
      .field(&self.i2.as_slice())
      .finish()
  }
}

impl<T> Default for IterMut<'_, T> {
  /// Creates an empty iterator.
  fn default() -> Self {
    IterMut {
      i1: Default::default(),
      i2: Default::default(),
    }
  }
}

impl<'a, T> Iterator for IterMut<'a, T> {
  type Item = &'a mut T;

  #[inline]
  fn next(&mut self) -> Option<&'a mut T> {
    match self.i1.next() {
      Some(val) => Some(val),
      None => {
        // i1 is drained; swap so the next call takes the first branch
        mem::swap(&mut self.i1, &mut self.i2);
        self.i1.next()
      }
    }
  }

  #[inline]
  fn size_hint(&self) -> (usize, Option<usize>) {
    let len = self.len();
    (len, Some(len))
  }

  fn fold<Acc, F>(self, accum: Acc, mut f: F) -> Acc
  where
    F: FnMut(Acc, Self::Item) -> Acc,
  {
    let accum = self.i1.fold(accum, &mut f);
    self.i2.fold(accum, &mut f)
  }

  #[inline]
  fn last(mut self) -> Option<&'a mut T> {
    self.next_back()
  }
}

impl<'a, T> DoubleEndedIterator for IterMut<'a, T> {
  #[inline]
  fn next_back(&mut self) -> Option<&'a mut T> {
    match self.i2.next_back() {
      Some(val) => Some(val),
      None => {
        // i2 is drained; swap so the next call takes the first branch
        mem::swap(&mut self.i1, &mut self.i2);
        self.i2.next_back()
      }
    }
  }

  fn rfold<Acc, F>(self, accum: Acc, mut f: F) -> Acc
  where
    F: FnMut(Acc, Self::Item) -> Acc,
  {
    let accum = self.i2.rfold(accum, &mut f);
    self.i1.rfold(accum, &mut f)
  }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {
  fn len(&self) -> usize {
    self.i1.len() + self.i2.len()
  }
}

impl<T> FusedIterator for IterMut<'_, T> {}

#[cfg(test)]
mod tests {
  use crate::RingBuffer;

  #[test]
  fn mutates_across_the_wrap() {
    let mut deque = RingBuffer::with_capacity(3);
    deque.extend([2, 3]);
    deque.push_front(1);
    deque.push_front(0);
    assert!(!deque.as_slices().1.is_empty());

    for (idx, value) in deque.iter_mut().enumerate() {
      *value *= 10;
      *value += idx as i32;
    }
    assert_eq!(deque, [0, 11, 22, 33]);
  }

  #[test]
  fn double_ended_and_sized() {
    let mut deque = RingBuffer::from([1, 2, 3, 4, 5]);
    let mut iter = deque.iter_mut();
    assert_eq!(iter.len(), 5);
    *iter.next_back().unwrap() = 50;
    *iter.next().unwrap() = 10;
    assert_eq!(iter.size_hint(), (3, Some(3)));
    assert_eq!(iter.fold(0, |acc, v| acc + *v), 9);
    assert_eq!(deque, [10, 2, 3, 4, 50]);
  }

  #[test]
  fn default_is_empty() {
    let mut iter = super::IterMut::<'_, u8>::default();
    assert_eq!(iter.next(), None);
  }
}
