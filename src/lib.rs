#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(docsrs, allow(unused_attributes))]
#![deny(missing_docs)]

extern crate alloc;

#[cfg(any(feature = "std", test))]
extern crate std;

use alloc::{boxed::Box, collections::VecDeque, vec::Vec};
use core::{
  cmp::Ordering,
  fmt,
  hash::{Hash, Hasher},
  mem::{self, MaybeUninit},
  ops::{Index, IndexMut, Range},
  ptr,
};
use macros::*;
use marks::SlotMarks;

pub use cursor::Cursor;
pub use error::{Error, HealthError};
pub use health::Dump;
pub use into_iter::IntoIter;
pub use iter::Iter;
pub use iter_mut::IterMut;

mod cursor;
mod error;
mod health;
mod into_iter;
mod iter;
mod iter_mut;
mod macros;
mod marks;

#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
mod serde;


/// A growable double-ended queue stored in a power-of-two ring buffer.
///
/// The buffer owns `capacity + 1` slots, where `capacity` is always `2^k - 1` (or `0`
/// before the first allocation). Because of that shape `capacity` doubles as the
/// wraparound mask: the logical element `i` lives in physical slot
/// `(begin + i) & capacity`.
///
/// Pushing onto a full buffer doubles the slot count. Explicit [`refit`](RingBuffer::refit)
/// calls, [`insert`](RingBuffer::insert) and [`erase`](RingBuffer::erase) reallocate and
/// leave the contents linearized, starting at slot `0`.
///
/// ## Examples
///
/// ```rust
/// use ringdeque::RingBuffer;
///
/// let mut deque = RingBuffer::new();
/// deque.push_back(1);
/// deque.push_back(2);
/// deque.push_front(0);
///
/// assert_eq!(deque, [0, 1, 2]);
/// assert_eq!(deque.len(), 3);
/// assert_eq!(deque.pop_front(), Some(0));
/// assert_eq!(deque, [1, 2]);
/// ```
///
/// Capacities are rounded up to one less than a power of two:
///
/// ```rust
/// use ringdeque::RingBuffer;
///
/// let deque = RingBuffer::<u8>::with_capacity(10);
/// assert_eq!(deque.capacity(), 15);
/// ```
pub struct RingBuffer<T> {
  buf: Box<[MaybeUninit<T>]>,
  capacity: usize,
  begin: usize,
  end: usize,
  size: usize,
  marks: SlotMarks,
}

impl<T> Clone for RingBuffer<T>
where
  T: Clone,
{
  fn clone(&self) -> Self {
    let mut deq = Self::allocated(self.capacity);
    deq.begin = self.begin;
    let mut at = self.begin();
    while let Some(value) = at.get() {
      let slot = at.slot();
      // SAFETY: `deq` has the same slot count and `slot` has not been written yet.
      // The bookkeeping is updated per element so a panicking `clone` leaves a
      // droppable buffer behind.
      unsafe {
        deq.buffer_write(slot, value.clone());
      }
      deq.marks.set_live(slot);
      deq.end = slot;
      deq.size += 1;
      at.move_next();
    }
    deq.end = self.end;
    deq
  }
}

impl<T> Default for RingBuffer<T> {
  #[cfg_attr(not(tarpaulin), inline(always))]
  fn default() -> Self {
    Self::new()
  }
}

impl<T: fmt::Debug> fmt::Debug for RingBuffer<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_list().entries(self.iter()).finish()
  }
}

impl<T: PartialEq<U>, U> PartialEq<RingBuffer<U>> for RingBuffer<T> {
  fn eq(&self, other: &RingBuffer<U>) -> bool {
    if self.size != other.len() {
      return false;
    }
    let (sa, sb) = self.as_slices();
    let (oa, ob) = other.as_slices();
    if sa.len() == oa.len() {
      sa == oa && sb == ob
    } else if sa.len() < oa.len() {
      // Always divisible in three sections, for example:
      // self:  [a b c|d e f]
      // other: [0 1 2 3|4 5]
      // front = 3, mid = 1,
      // [a b c] == [0 1 2] && [d] == [3] && [e f] == [4 5]
      let front = sa.len();
      let mid = oa.len() - front;

      let (oa_front, oa_mid) = oa.split_at(front);
      let (sb_mid, sb_back) = sb.split_at(mid);
      debug_assert_eq!(sa.len(), oa_front.len());
      debug_assert_eq!(sb_mid.len(), oa_mid.len());
      debug_assert_eq!(sb_back.len(), ob.len());
      sa == oa_front && sb_mid == oa_mid && sb_back == ob
    } else {
      let front = oa.len();
      let mid = sa.len() - front;

      let (sa_front, sa_mid) = sa.split_at(front);
      let (ob_mid, ob_back) = ob.split_at(mid);
      debug_assert_eq!(sa_front.len(), oa.len());
      debug_assert_eq!(sa_mid.len(), ob_mid.len());
      debug_assert_eq!(sb.len(), ob_back.len());
      sa_front == oa && sa_mid == ob_mid && sb == ob_back
    }
  }
}

impl<T: Eq> Eq for RingBuffer<T> {}

macro_rules! __impl_slice_eq1 {
    ([$($vars:tt)*] $lhs:ty, $rhs:ty, $($constraints:tt)*) => {
        impl<T, U, $($vars)*> PartialEq<$rhs> for $lhs
        where
            T: PartialEq<U>,
            $($constraints)*
        {
            fn eq(&self, other: &$rhs) -> bool {
                if self.len() != other.len() {
                    return false;
                }
                let (sa, sb) = self.as_slices();
                let (oa, ob) = other[..].split_at(sa.len());
                sa == oa && sb == ob
            }
        }
    }
}
__impl_slice_eq1! { [] RingBuffer<T>, Vec<U>, }
__impl_slice_eq1! { [] RingBuffer<T>, &[U], }
__impl_slice_eq1! { [] RingBuffer<T>, &mut [U], }
__impl_slice_eq1! { [const N: usize] RingBuffer<T>, [U; N], }
__impl_slice_eq1! { [const N: usize] RingBuffer<T>, &[U; N], }
__impl_slice_eq1! { [const N: usize] RingBuffer<T>, &mut [U; N], }

impl<T: PartialEq<U>, U> PartialEq<VecDeque<U>> for RingBuffer<T> {
  fn eq(&self, other: &VecDeque<U>) -> bool {
    self.size == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
  }
}

impl<T: PartialOrd> PartialOrd for RingBuffer<T> {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    self.iter().partial_cmp(other.iter())
  }
}

impl<T: Ord> Ord for RingBuffer<T> {
  #[inline]
  fn cmp(&self, other: &Self) -> Ordering {
    self.iter().cmp(other.iter())
  }
}

impl<T: Hash> Hash for RingBuffer<T> {
  fn hash<H: Hasher>(&self, state: &mut H) {
    state.write_usize(self.size);
    // The split between the two physical runs depends on where the buffer
    // wrapped, so hash element by element.
    self.iter().for_each(|elem| elem.hash(state));
  }
}

impl<T> Index<usize> for RingBuffer<T> {
  type Output = T;

  #[inline]
  fn index(&self, index: usize) -> &T {
    self.get(index).expect("Out of bounds access")
  }
}

impl<T> IndexMut<usize> for RingBuffer<T> {
  #[inline]
  fn index_mut(&mut self, index: usize) -> &mut T {
    self.get_mut(index).expect("Out of bounds access")
  }
}

impl<T> IntoIterator for RingBuffer<T> {
  type Item = T;
  type IntoIter = IntoIter<T>;

  /// Consumes the deque into a front-to-back iterator yielding elements by
  /// value.
  fn into_iter(self) -> IntoIter<T> {
    IntoIter::new(self)
  }
}

impl<'a, T> IntoIterator for &'a RingBuffer<T> {
  type Item = &'a T;
  type IntoIter = Iter<'a, T>;

  fn into_iter(self) -> Iter<'a, T> {
    self.iter()
  }
}

impl<'a, T> IntoIterator for &'a mut RingBuffer<T> {
  type Item = &'a mut T;
  type IntoIter = IterMut<'a, T>;

  fn into_iter(self) -> IterMut<'a, T> {
    self.iter_mut()
  }
}

impl<T> FromIterator<T> for RingBuffer<T> {
  fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
    let mut deq = Self::new();
    deq.extend(iter);
    deq
  }
}

impl<T> Extend<T> for RingBuffer<T> {
  fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
    let iter = iter.into_iter();
    self.reserve(iter.size_hint().0);
    iter.for_each(|value| self.push_back(value));
  }
}

impl<'a, T: Copy + 'a> Extend<&'a T> for RingBuffer<T> {
  fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
    self.extend(iter.into_iter().copied());
  }
}

impl<T, const N: usize> From<[T; N]> for RingBuffer<T> {
  fn from(arr: [T; N]) -> Self {
    Self::from_iter(arr)
  }
}

impl<T> From<Vec<T>> for RingBuffer<T> {
  fn from(vec: Vec<T>) -> Self {
    Self::from_iter(vec)
  }
}

impl<T> From<RingBuffer<T>> for Vec<T> {
  fn from(deq: RingBuffer<T>) -> Self {
    let mut vec = Vec::with_capacity(deq.len());
    vec.extend(deq);
    vec
  }
}

impl<T> RingBuffer<T> {
  /// Creates an empty deque without allocating.
  ///
  /// ## Examples
  ///
  /// ```
  /// use ringdeque::RingBuffer;
  ///
  /// let deque: RingBuffer<u32> = RingBuffer::new();
  /// assert_eq!(deque.capacity(), 0);
  /// ```
  #[cfg_attr(not(tarpaulin), inline(always))]
  pub fn new() -> Self {
    Self::allocated(0)
  }

  /// Creates an empty deque whose capacity is `requested` rounded up to the
  /// smallest `2^k - 1` that is not below it.
  ///
  /// A request of `0` does not allocate.
  ///
  /// ## Panics
  ///
  /// Panics if the rounded capacity overflows `usize`.
  ///
  /// ## Examples
  ///
  /// ```
  /// use ringdeque::RingBuffer;
  ///
  /// assert_eq!(RingBuffer::<u32>::with_capacity(0).capacity(), 0);
  /// assert_eq!(RingBuffer::<u32>::with_capacity(1).capacity(), 1);
  /// assert_eq!(RingBuffer::<u32>::with_capacity(10).capacity(), 15);
  /// assert_eq!(RingBuffer::<u32>::with_capacity(16).capacity(), 31);
  /// ```
  pub fn with_capacity(requested: usize) -> Self {
    let capacity = fit_capacity(requested).unwrap_or_else(|| capacity_overflow());
    Self::allocated(capacity)
  }

  fn allocated(capacity: usize) -> Self {
    let slots = slots_for(capacity);
    Self {
      buf: alloc_slots(slots),
      capacity,
      begin: 0,
      end: 0,
      size: 0,
      marks: SlotMarks::dead(slots),
    }
  }

  /// Returns the capacity mask of the deque.
  ///
  /// The deque holds at most `capacity() + 1` elements before it has to grow.
  /// The value is always `0` or one less than a power of two.
  ///
  /// ## Examples
  ///
  /// ```
  /// use ringdeque::RingBuffer;
  ///
  /// let mut deque = RingBuffer::new();
  /// deque.push_back(1);
  /// assert_eq!(deque.capacity(), 1);
  /// deque.push_back(2);
  /// deque.push_back(3);
  /// assert_eq!(deque.capacity(), 3);
  /// ```
  #[cfg_attr(not(tarpaulin), inline(always))]
  pub const fn capacity(&self) -> usize {
    self.capacity
  }

  /// Returns the number of elements in the deque.
  #[cfg_attr(not(tarpaulin), inline(always))]
  pub const fn len(&self) -> usize {
    self.size
  }

  /// Returns `true` if the deque is empty.
  #[cfg_attr(not(tarpaulin), inline(always))]
  pub const fn is_empty(&self) -> bool {
    self.size == 0
  }

  /// Returns `true` if every allocated slot holds an element.
  ///
  /// An unallocated deque is never full.
  ///
  /// ## Examples
  ///
  /// ```
  /// use ringdeque::RingBuffer;
  ///
  /// let mut deque = RingBuffer::with_capacity(1);
  /// assert!(!deque.is_full());
  /// deque.push_back(1);
  /// deque.push_back(2);
  /// assert!(deque.is_full());
  /// ```
  #[cfg_attr(not(tarpaulin), inline(always))]
  pub const fn is_full(&self) -> bool {
    self.capacity != 0 && self.size == self.capacity + 1
  }

  /// Returns a cursor at the first element, logical position `0`.
  ///
  /// ## Examples
  ///
  /// ```
  /// use ringdeque::RingBuffer;
  ///
  /// let deque = RingBuffer::from([10, 20, 30, 40]);
  /// let at = deque.begin() + 2;
  /// assert_eq!(*at, 30);
  /// assert_eq!(deque.end() - at, 2);
  /// ```
  #[inline]
  pub fn begin(&self) -> Cursor<'_, T> {
    Cursor::new(self, self.begin, 0)
  }

  /// Returns a cursor one past the last element, logical position `len()`.
  ///
  /// On a full deque its physical slot coincides with the one of
  /// [`begin`](RingBuffer::begin); the two cursors still differ because cursors
  /// compare by logical position.
  #[inline]
  pub fn end(&self) -> Cursor<'_, T> {
    Cursor::new(self, self.wrap_add(self.end, 1), self.size)
  }

  /// Returns a front-to-back iterator.
  ///
  /// ## Examples
  ///
  /// ```
  /// use ringdeque::RingBuffer;
  ///
  /// let mut deque = RingBuffer::new();
  /// deque.push_back(5);
  /// deque.push_back(3);
  /// deque.push_front(4);
  /// let b: &[_] = &[&4, &5, &3];
  /// let c: Vec<&i32> = deque.iter().collect();
  /// assert_eq!(&c[..], b);
  /// ```
  #[inline]
  pub fn iter(&self) -> Iter<'_, T> {
    Iter::new(self.begin(), self.end())
  }

  /// Returns a front-to-back iterator that returns mutable references.
  ///
  /// ## Examples
  ///
  /// ```
  /// use ringdeque::RingBuffer;
  ///
  /// let mut deque = RingBuffer::from([5, 3]);
  /// deque.push_front(4);
  /// for num in deque.iter_mut() {
  ///     *num = *num - 2;
  /// }
  /// assert_eq!(deque, [2, 3, 1]);
  /// ```
  #[inline]
  pub fn iter_mut(&mut self) -> IterMut<'_, T> {
    let (a, b) = self.as_mut_slices();
    IterMut::new(a.iter_mut(), b.iter_mut())
  }

  /// Returns a pair of slices which contain, in order, the contents of the
  /// deque.
  ///
  /// After any reallocation all elements are in the first slice and the
  /// second slice is empty.
  ///
  /// ## Examples
  ///
  /// ```
  /// use ringdeque::RingBuffer;
  ///
  /// let mut deque = RingBuffer::with_capacity(3);
  /// deque.push_back(0);
  /// deque.push_back(1);
  /// deque.push_front(10);
  /// deque.push_front(9);
  ///
  /// assert_eq!(deque.as_slices(), (&[9, 10][..], &[0, 1][..]));
  /// ```
  #[inline]
  pub fn as_slices(&self) -> (&[T], &[T]) {
    let (a, b) = self.slice_ranges();
    // SAFETY: `slice_ranges` covers exactly the live slots.
    unsafe {
      (
        slice_assume_init_ref(&self.buf[a]),
        slice_assume_init_ref(&self.buf[b]),
      )
    }
  }

  /// Returns a pair of mutable slices which contain, in order, the contents of
  /// the deque.
  #[inline]
  pub fn as_mut_slices(&mut self) -> (&mut [T], &mut [T]) {
    let (a, b) = self.slice_ranges();
    // When wrapped, the back run `0..=end` ends before the front run starts at
    // `begin`, so splitting at `begin` separates them.
    let (low, high) = self.buf.split_at_mut(a.start);
    let front = &mut high[..a.end - a.start];
    let back = &mut low[b];
    // SAFETY: `slice_ranges` covers exactly the live slots.
    unsafe { (slice_assume_init_mut(front), slice_assume_init_mut(back)) }
  }

  /// Provides a reference to the front element, or `None` if the deque is
  /// empty.
  #[inline]
  pub fn front(&self) -> Option<&T> {
    self.get(0)
  }

  /// Provides a mutable reference to the front element, or `None` if the
  /// deque is empty.
  #[inline]
  pub fn front_mut(&mut self) -> Option<&mut T> {
    self.get_mut(0)
  }

  /// Provides a reference to the back element, or `None` if the deque is
  /// empty.
  #[inline]
  pub fn back(&self) -> Option<&T> {
    self.size.checked_sub(1).and_then(|idx| self.get(idx))
  }

  /// Provides a mutable reference to the back element, or `None` if the
  /// deque is empty.
  #[inline]
  pub fn back_mut(&mut self) -> Option<&mut T> {
    self.size.checked_sub(1).and_then(|idx| self.get_mut(idx))
  }

  /// Provides a reference to the element at the given logical index.
  ///
  /// Element at index 0 is the front of the deque.
  ///
  /// ## Examples
  ///
  /// ```
  /// use ringdeque::RingBuffer;
  ///
  /// let mut deque = RingBuffer::new();
  /// deque.push_back(20);
  /// deque.push_front(10);
  /// assert_eq!(deque.get(0), Some(&10));
  /// assert_eq!(deque.get(1), Some(&20));
  /// assert_eq!(deque.get(2), None);
  /// ```
  #[inline]
  pub fn get(&self, index: usize) -> Option<&T> {
    if index < self.size {
      // SAFETY: index is checked to be in-bounds
      unsafe { Some(self.slot_ref(self.to_physical_idx(index))) }
    } else {
      None
    }
  }

  /// Provides a mutable reference to the element at the given logical index.
  #[inline]
  pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
    if index < self.size {
      let slot = self.to_physical_idx(index);
      // SAFETY: index is checked to be in-bounds
      unsafe { Some(self.buf[slot].assume_init_mut()) }
    } else {
      None
    }
  }

  /// Provides a reference to the element at the given logical index without
  /// checking it against the length.
  ///
  /// ## Safety
  ///
  /// `index` must be below [`len`](RingBuffer::len). Debug builds assert it.
  #[inline]
  pub unsafe fn get_unchecked(&self, index: usize) -> &T {
    debug_assert!(
      index < self.size,
      "index {index} out of bounds for length {}",
      self.size
    );
    unsafe { (*self.buf.as_ptr().add(self.to_physical_idx(index))).assume_init_ref() }
  }

  /// Appends an element to the back of the deque, growing it first when it is
  /// full.
  ///
  /// ## Panics
  ///
  /// Panics if the new capacity overflows `usize`.
  ///
  /// ## Examples
  ///
  /// ```
  /// use ringdeque::RingBuffer;
  ///
  /// let mut buf = RingBuffer::new();
  /// buf.push_back(1);
  /// buf.push_back(3);
  /// assert_eq!(3, *buf.back().unwrap());
  /// ```
  pub fn push_back(&mut self, value: T) {
    self.grow();
    let _ = unsafe { push_back_unchecked!(self(value)) };
  }

  /// Prepends an element to the front of the deque, growing it first when it
  /// is full.
  ///
  /// ## Panics
  ///
  /// Panics if the new capacity overflows `usize`.
  ///
  /// ## Examples
  ///
  /// ```
  /// use ringdeque::RingBuffer;
  ///
  /// let mut d = RingBuffer::new();
  /// d.push_front(1);
  /// d.push_front(2);
  /// assert_eq!(d.front(), Some(&2));
  /// ```
  pub fn push_front(&mut self, value: T) {
    self.grow();
    let _ = unsafe { push_front_unchecked!(self(value)) };
  }

  /// Removes the first element and returns it, or `None` if the deque is
  /// empty.
  ///
  /// ## Examples
  ///
  /// ```
  /// use ringdeque::RingBuffer;
  ///
  /// let mut d = RingBuffer::new();
  /// d.push_back(1);
  /// d.push_back(2);
  ///
  /// assert_eq!(d.pop_front(), Some(1));
  /// assert_eq!(d.pop_front(), Some(2));
  /// assert_eq!(d.pop_front(), None);
  /// ```
  pub fn pop_front(&mut self) -> Option<T> {
    if self.is_empty() {
      return None;
    }
    let slot = self.begin;
    self.begin = self.wrap_add(self.begin, 1);
    self.size -= 1;
    self.marks.set_dead(slot);
    // SAFETY: `slot` held the first element and is no longer tracked as live
    unsafe { Some(self.buffer_read(slot)) }
  }

  /// Removes the last element and returns it, or `None` if the deque is
  /// empty.
  ///
  /// ## Examples
  ///
  /// ```
  /// use ringdeque::RingBuffer;
  ///
  /// let mut buf = RingBuffer::new();
  /// assert_eq!(buf.pop_back(), None);
  /// buf.push_back(1);
  /// buf.push_back(3);
  /// assert_eq!(buf.pop_back(), Some(3));
  /// ```
  pub fn pop_back(&mut self) -> Option<T> {
    if self.is_empty() {
      return None;
    }
    let slot = self.end;
    self.end = self.wrap_sub(self.end, 1);
    self.size -= 1;
    self.marks.set_dead(slot);
    // SAFETY: `slot` held the last element and is no longer tracked as live
    unsafe { Some(self.buffer_read(slot)) }
  }

  /// Doubles the slot count when the deque is full or has never allocated,
  /// and does nothing otherwise.
  ///
  /// Every push calls this first. A growth relinearizes the contents.
  ///
  /// ## Panics
  ///
  /// Panics if the new capacity overflows `usize`.
  ///
  /// ## Examples
  ///
  /// ```
  /// use ringdeque::RingBuffer;
  ///
  /// let mut deque = RingBuffer::<u8>::new();
  /// deque.grow();
  /// assert_eq!(deque.capacity(), 1);
  /// deque.grow();
  /// assert_eq!(deque.capacity(), 1);
  /// deque.extend([1, 2]);
  /// deque.grow();
  /// assert_eq!(deque.capacity(), 3);
  /// ```
  pub fn grow(&mut self) {
    if self.capacity == 0 || self.is_full() {
      let capacity = grown_capacity(self.capacity).unwrap_or_else(|| capacity_overflow());
      self.relocate("grow", capacity, alloc_slots(slots_for(capacity)));
    }
  }

  /// Reallocates the deque to `target` rounded up to the smallest `2^k - 1`
  /// that is not below it.
  ///
  /// Nothing happens if that equals the current capacity. Otherwise the
  /// contents are moved into a fresh block starting at slot `0`; when the new
  /// block has fewer slots than the deque has elements, the elements past the
  /// new slot count are dropped from the back. A `target` of `0` releases the
  /// storage.
  ///
  /// ## Panics
  ///
  /// Panics if the rounded capacity overflows `usize`.
  ///
  /// ## Examples
  ///
  /// ```
  /// use ringdeque::RingBuffer;
  ///
  /// let mut deque: RingBuffer<_> = (0..10).collect();
  /// deque.refit(100);
  /// assert_eq!(deque.capacity(), 127);
  ///
  /// deque.refit(2);
  /// assert_eq!(deque.capacity(), 3);
  /// assert_eq!(deque, [0, 1, 2, 3]);
  /// ```
  pub fn refit(&mut self, target: usize) {
    let capacity = fit_capacity(target).unwrap_or_else(|| capacity_overflow());
    if capacity != self.capacity {
      self.relocate("refit", capacity, alloc_slots(slots_for(capacity)));
    }
  }

  /// Fallible version of [`refit`](RingBuffer::refit).
  ///
  /// Reports capacity overflow and allocator failure instead of panicking or
  /// aborting. The deque is untouched when an error is returned.
  ///
  /// ## Examples
  ///
  /// ```
  /// use ringdeque::{Error, RingBuffer};
  ///
  /// let mut deque = RingBuffer::from([1, 2, 3]);
  /// assert_eq!(deque.try_refit(usize::MAX), Err(Error::CapacityOverflow));
  /// assert_eq!(deque.try_refit(8), Ok(()));
  /// assert_eq!(deque.capacity(), 15);
  /// ```
  pub fn try_refit(&mut self, target: usize) -> Result<(), Error> {
    let capacity = fit_capacity(target).ok_or(Error::CapacityOverflow)?;
    if capacity != self.capacity {
      let fresh = try_alloc_slots(slots_for(capacity))?;
      self.relocate("try_refit", capacity, fresh);
    }
    Ok(())
  }

  /// Reserves room for at least `additional` more elements.
  ///
  /// Reallocates through [`refit`](RingBuffer::refit) only if the current slot
  /// count is too small.
  pub fn reserve(&mut self, additional: usize) {
    let needed = self.size.checked_add(additional).unwrap_or_else(|| capacity_overflow());
    if needed > slots_for(self.capacity) {
      self.refit((needed - 1).max(1));
    }
  }

  /// Shrinks the capacity to the smallest `2^k - 1` that is not below the
  /// length. An empty deque releases its storage.
  ///
  /// ## Examples
  ///
  /// ```
  /// use ringdeque::RingBuffer;
  ///
  /// let mut deque = RingBuffer::with_capacity(100);
  /// deque.extend([1, 2, 3]);
  /// deque.shrink_to_fit();
  /// assert_eq!(deque.capacity(), 3);
  /// ```
  pub fn shrink_to_fit(&mut self) {
    self.refit(self.size);
  }

  /// Inserts an element at logical position `pos`, shifting every element
  /// from `pos` on one place towards the back.
  ///
  /// The contents are always moved into a freshly allocated block, doubled
  /// first if the deque was full, and end up linearized from slot `0`.
  ///
  /// ## Panics
  ///
  /// Panics if `pos` is greater than the deque's length.
  ///
  /// ## Examples
  ///
  /// ```
  /// use ringdeque::RingBuffer;
  ///
  /// let mut deque = RingBuffer::from(['a', 'b', 'c']);
  /// deque.insert(1, 'd');
  /// deque.insert(4, 'e');
  /// assert_eq!(deque, ['a', 'd', 'b', 'c', 'e']);
  /// ```
  pub fn insert(&mut self, pos: usize, value: T) {
    assert!(
      pos <= self.size,
      "insertion index (is {pos}) should be <= len (is {})",
      self.size
    );
    let capacity = if self.capacity == 0 || self.is_full() {
      grown_capacity(self.capacity).unwrap_or_else(|| capacity_overflow())
    } else {
      self.capacity
    };
    let mut fresh = alloc_slots(slots_for(capacity));
    // SAFETY: both runs stay below `size`; the moved values are owned by
    // `fresh` from here on and the old block is released without dropping.
    unsafe {
      self.move_out(0, &mut fresh[..pos]);
      self.move_out(pos, &mut fresh[pos + 1..self.size + 1]);
    }
    fresh[pos].write(value);
    let old_capacity = self.capacity;
    let size = self.size + 1;
    self.install(capacity, fresh, size);
    trace_relocate!("insert", old_capacity, capacity, size);
  }

  /// Removes the element at logical position `pos` and returns it, shifting
  /// every element after it one place towards the front.
  ///
  /// Like [`insert`](RingBuffer::insert), this moves the remaining contents into
  /// a fresh block of the same capacity, linearized from slot `0`.
  ///
  /// ## Panics
  ///
  /// Panics if `pos` is not below the deque's length.
  ///
  /// ## Examples
  ///
  /// ```
  /// use ringdeque::RingBuffer;
  ///
  /// let mut buf = RingBuffer::from(['a', 'b', 'c']);
  /// assert_eq!(buf.erase(1), 'b');
  /// assert_eq!(buf, ['a', 'c']);
  /// ```
  pub fn erase(&mut self, pos: usize) -> T {
    assert!(
      pos < self.size,
      "removal index (is {pos}) should be < len (is {})",
      self.size
    );
    let mut fresh = alloc_slots(slots_for(self.capacity));
    // SAFETY: every live element is moved exactly once, either into `fresh`
    // or into `removed`; the old block is released without dropping.
    let removed = unsafe {
      self.move_out(0, &mut fresh[..pos]);
      self.move_out(pos + 1, &mut fresh[pos..self.size - 1]);
      self.buffer_read(self.to_physical_idx(pos))
    };
    let size = self.size - 1;
    self.install(self.capacity, fresh, size);
    trace_relocate!("erase", self.capacity, self.capacity, size);
    removed
  }

  /// Removes the element at logical position `pos`, or returns `None` if it is
  /// out of bounds.
  ///
  /// ## Examples
  ///
  /// ```
  /// use ringdeque::RingBuffer;
  ///
  /// let mut buf = RingBuffer::from([1, 2, 3]);
  /// assert_eq!(buf.remove(1), Some(2));
  /// assert_eq!(buf.remove(5), None);
  /// assert_eq!(buf, [1, 3]);
  /// ```
  pub fn remove(&mut self, pos: usize) -> Option<T> {
    (pos < self.size).then(|| self.erase(pos))
  }

  /// Shortens the deque, keeping the first `len` elements and dropping
  /// the rest.
  ///
  /// If `len` is greater or equal to the deque's current length, this has
  /// no effect.
  ///
  /// ## Examples
  ///
  /// ```
  /// use ringdeque::RingBuffer;
  ///
  /// let mut buf = RingBuffer::from([5, 10, 15]);
  /// buf.truncate(1);
  /// assert_eq!(buf, [5]);
  /// ```
  pub fn truncate(&mut self, len: usize) {
    /// Runs the destructor for all items in the slice when it gets dropped (normally or
    /// during unwinding).
    struct Dropper<'a, T>(&'a mut [T]);

    impl<T> Drop for Dropper<'_, T> {
      fn drop(&mut self) {
        unsafe {
          ptr::drop_in_place(self.0);
        }
      }
    }

    if len >= self.size {
      return;
    }

    for idx in len..self.size {
      let slot = self.to_physical_idx(idx);
      self.marks.set_dead(slot);
    }
    let old_len = self.size;
    let (front, back) = self.as_mut_slices();
    let (drop_front, drop_back) = if len > front.len() {
      let begin = len - front.len();
      (<&mut [T]>::default(), &mut back[begin..])
    } else {
      (&mut front[len..], back)
    };
    let drop_front = drop_front as *mut [T];
    let drop_back = drop_back as *mut [T];

    self.size = len;
    if len > 0 {
      self.end = self.wrap_add(self.begin, len - 1);
    }
    debug_assert!(old_len > len);

    // SAFETY: the bookkeeping no longer covers the dropped elements, so a
    // panicking destructor cannot lead to a double drop.
    unsafe {
      // Make sure the second half is dropped even when a destructor
      // in the first one panics.
      let _back_dropper = Dropper(&mut *drop_back);
      ptr::drop_in_place(drop_front);
    }
  }

  /// Clears the deque, removing all values. The allocation is kept.
  ///
  /// ## Examples
  ///
  /// ```
  /// use ringdeque::RingBuffer;
  ///
  /// let mut deque = RingBuffer::from([1, 2, 3]);
  /// deque.clear();
  /// assert!(deque.is_empty());
  /// assert_eq!(deque.capacity(), 3);
  /// ```
  #[cfg_attr(not(tarpaulin), inline(always))]
  pub fn clear(&mut self) {
    self.truncate(0);
    self.begin = 0;
    self.end = 0;
    self.marks.clear();
  }

  /// Returns `true` if the deque contains an element equal to the
  /// given value.
  #[inline]
  pub fn contains(&self, x: &T) -> bool
  where
    T: PartialEq<T>,
  {
    let (a, b) = self.as_slices();
    a.contains(x) || b.contains(x)
  }
}

impl<T> Drop for RingBuffer<T> {
  fn drop(&mut self) {
    self.clear();
  }
}

impl<T> RingBuffer<T> {
  /// Moves the first `min(size, slots)` elements into `fresh` and drops the
  /// rest, leaving the deque linearized over `fresh`.
  fn relocate(&mut self, op: &'static str, capacity: usize, mut fresh: Box<[MaybeUninit<T>]>) {
    debug_assert_eq!(fresh.len(), slots_for(capacity));
    let old_capacity = self.capacity;
    let old_size = self.size;
    let keep = old_size.min(fresh.len());
    // SAFETY: logical positions below `keep` are live; they are owned by
    // `fresh` from here on.
    unsafe { self.move_out(0, &mut fresh[..keep]) };

    let old_begin = self.begin;
    let mut old = self.install(capacity, fresh, keep);
    trace_relocate!(op, old_capacity, capacity, keep);

    for idx in keep..old_size {
      let slot = old_begin.wrapping_add(idx) & old_capacity;
      // SAFETY: the truncated tail was never moved out of the old block and
      // nothing tracks it anymore.
      unsafe { old[slot].assume_init_drop() };
    }
  }

  /// Swaps in a block whose slots `0..size` are initialized, in logical order,
  /// and returns the previous block.
  fn install(
    &mut self,
    capacity: usize,
    fresh: Box<[MaybeUninit<T>]>,
    size: usize,
  ) -> Box<[MaybeUninit<T>]> {
    debug_assert!(size <= fresh.len());
    let slots = fresh.len();
    let old = mem::replace(&mut self.buf, fresh);
    self.capacity = capacity;
    self.begin = 0;
    self.end = size.saturating_sub(1);
    self.size = size;
    self.marks = SlotMarks::dead(slots);
    self.marks.set_prefix_live(size);
    old
  }

  /// Moves `dst.len()` elements, starting at logical position `from`, into `dst`.
  ///
  /// ## Safety
  ///
  /// - `from + dst.len()` must not exceed `size`.
  /// - The moved values are owned by `dst` afterwards; the caller must make sure
  ///   they are never read or dropped through `self` again.
  unsafe fn move_out(&self, from: usize, dst: &mut [MaybeUninit<T>]) {
    debug_assert!(from + dst.len() <= self.size);
    let mut at = self.begin() + from as isize;
    for slot in dst {
      slot.write(unsafe { self.buffer_read(at.slot()) });
      at.move_next();
    }
  }

  /// Physical ranges of the front and back runs of live slots.
  const fn slice_ranges(&self) -> (Range<usize>, Range<usize>) {
    if self.size == 0 {
      (0..0, 0..0)
    } else if self.begin <= self.end {
      (self.begin..self.end + 1, 0..0)
    } else {
      (self.begin..self.capacity + 1, 0..self.end + 1)
    }
  }

  /// Returns `true` if the physical `slot` lies inside the occupied range.
  pub(crate) const fn is_occupied(&self, slot: usize) -> bool {
    if self.size == 0 {
      false
    } else if self.begin <= self.end {
      self.begin <= slot && slot <= self.end
    } else {
      slot <= self.end || slot >= self.begin
    }
  }

  /// Returns the index in the underlying buffer for a given physical index
  /// plus addend.
  #[inline]
  const fn wrap_add(&self, idx: usize, addend: usize) -> usize {
    idx.wrapping_add(addend) & self.capacity
  }

  /// Returns the index in the underlying buffer for a given physical index
  /// minus subtrahend.
  #[inline]
  const fn wrap_sub(&self, idx: usize, subtrahend: usize) -> usize {
    idx.wrapping_sub(subtrahend) & self.capacity
  }

  #[inline]
  const fn to_physical_idx(&self, idx: usize) -> usize {
    self.wrap_add(self.begin, idx)
  }

  /// Moves an element out of the buffer
  ///
  /// ## Safety
  /// - `off` must be a valid index into the buffer containing an initialized value
  #[inline]
  unsafe fn buffer_read(&self, off: usize) -> T {
    unsafe { self.buf[off].assume_init_read() }
  }

  /// ## Safety
  /// - `off` must be a valid index into the buffer containing an initialized value
  #[inline]
  pub(crate) unsafe fn slot_ref(&self, off: usize) -> &T {
    unsafe { self.buf[off].assume_init_ref() }
  }

  /// Writes an element into the buffer, moving it and returning a reference to it.
  ///
  /// ## Safety
  ///
  /// `off` must be in-bounds and must not hold a live element.
  #[inline]
  unsafe fn buffer_write(&mut self, off: usize, value: T) -> &mut T {
    self.buf[off].write(value)
  }
}

/// Number of physical slots behind a capacity mask.
#[inline]
const fn slots_for(capacity: usize) -> usize {
  if capacity == 0 {
    0
  } else {
    capacity + 1
  }
}

/// Rounds `requested` up to the smallest `2^k - 1 >= requested` with `k >= 1`.
/// `0` stays `0`; `None` means the result does not fit in `usize`.
const fn fit_capacity(requested: usize) -> Option<usize> {
  if requested == 0 {
    return Some(0);
  }
  match requested.checked_add(1) {
    Some(slots) => match slots.checked_next_power_of_two() {
      Some(slots) => Some(slots - 1),
      None => None,
    },
    None => None,
  }
}

/// `((capacity + 1) << 1) - 1`, the capacity after one doubling.
const fn grown_capacity(capacity: usize) -> Option<usize> {
  match capacity.checked_add(1) {
    Some(slots) => match slots.checked_mul(2) {
      Some(slots) => Some(slots - 1),
      None => None,
    },
    None => None,
  }
}

#[rustversion::since(1.82)]
fn alloc_slots<T>(slots: usize) -> Box<[MaybeUninit<T>]> {
  Box::new_uninit_slice(slots)
}

#[rustversion::before(1.82)]
fn alloc_slots<T>(slots: usize) -> Box<[MaybeUninit<T>]> {
  let mut block = Vec::with_capacity(slots);
  block.resize_with(slots, MaybeUninit::uninit);
  block.into_boxed_slice()
}

fn try_alloc_slots<T>(slots: usize) -> Result<Box<[MaybeUninit<T>]>, Error> {
  let mut block = Vec::new();
  block
    .try_reserve_exact(slots)
    .map_err(|_| Error::AllocFailed { slots })?;
  block.resize_with(slots, MaybeUninit::uninit);
  Ok(block.into_boxed_slice())
}

/// ## Safety
/// Every element of `slice` must be initialized.
#[inline]
unsafe fn slice_assume_init_ref<T>(slice: &[MaybeUninit<T>]) -> &[T] {
  unsafe { &*(slice as *const [MaybeUninit<T>] as *const [T]) }
}

/// ## Safety
/// Every element of `slice` must be initialized.
#[inline]
unsafe fn slice_assume_init_mut<T>(slice: &mut [MaybeUninit<T>]) -> &mut [T] {
  unsafe { &mut *(slice as *mut [MaybeUninit<T>] as *mut [T]) }
}

#[cold]
#[track_caller]
fn capacity_overflow() -> ! {
  panic!("capacity overflow")
}
