//! Slot liveness oracle used by [`RingBuffer::health_check`](crate::RingBuffer::health_check).
//!
//! Every physical slot of the ring buffer owns one bit: set while the slot holds an
//! initialized element, clear once the element has been moved or dropped out. The
//! bits are kept in `u64` words; padding bits past the slot count stay zero.
//!
//! In release builds without the `health-check` feature the oracle is a zero-sized
//! type whose operations compile to nothing.

#[cfg(any(debug_assertions, feature = "health-check"))]
pub(crate) use enabled::SlotMarks;

#[cfg(not(any(debug_assertions, feature = "health-check")))]
pub(crate) use disabled::SlotMarks;

#[cfg(any(debug_assertions, feature = "health-check"))]
mod enabled {
  use alloc::{boxed::Box, vec};

  const fn words_for_bits(n: usize) -> usize {
    n.div_ceil(64)
  }

  #[derive(Clone, Debug, Default, PartialEq, Eq)]
  pub(crate) struct SlotMarks {
    words: Box<[u64]>,
    slots: usize,
  }

  impl SlotMarks {
    pub(crate) const ENABLED: bool = true;

    /// Marks for `slots` dead slots.
    pub(crate) fn dead(slots: usize) -> Self {
      Self {
        words: vec![0u64; words_for_bits(slots)].into_boxed_slice(),
        slots,
      }
    }

    #[inline]
    pub(crate) fn set_live(&mut self, slot: usize) {
      debug_assert!(slot < self.slots, "slot {slot} out of {}", self.slots);
      self.words[slot / 64] |= 1u64 << (slot % 64);
    }

    #[inline]
    pub(crate) fn set_dead(&mut self, slot: usize) {
      debug_assert!(slot < self.slots, "slot {slot} out of {}", self.slots);
      self.words[slot / 64] &= !(1u64 << (slot % 64));
    }

    /// Marks slots `0..count` live, the layout every relocation leaves behind.
    pub(crate) fn set_prefix_live(&mut self, count: usize) {
      debug_assert!(count <= self.slots);
      let full = count / 64;
      self.words[..full].iter_mut().for_each(|w| *w = u64::MAX);
      let rem = count % 64;
      if rem != 0 {
        self.words[full] |= (1u64 << rem) - 1;
      }
    }

    pub(crate) fn clear(&mut self) {
      self.words.iter_mut().for_each(|w| *w = 0);
    }

    #[inline]
    pub(crate) fn is_live(&self, slot: usize) -> bool {
      slot < self.slots && self.words[slot / 64] & (1u64 << (slot % 64)) != 0
    }

    #[cfg(test)]
    pub(crate) fn live_count(&self) -> usize {
      self.words.iter().map(|w| w.count_ones() as usize).sum()
    }
  }
}

#[cfg(not(any(debug_assertions, feature = "health-check")))]
mod disabled {
  #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
  pub(crate) struct SlotMarks;

  impl SlotMarks {
    pub(crate) const ENABLED: bool = false;

    #[inline(always)]
    pub(crate) fn dead(_slots: usize) -> Self {
      Self
    }

    #[inline(always)]
    pub(crate) fn set_live(&mut self, _slot: usize) {}

    #[inline(always)]
    pub(crate) fn set_dead(&mut self, _slot: usize) {}

    #[inline(always)]
    pub(crate) fn set_prefix_live(&mut self, _count: usize) {}

    #[inline(always)]
    pub(crate) fn clear(&mut self) {}

    #[inline(always)]
    pub(crate) fn is_live(&self, _slot: usize) -> bool {
      false
    }
  }
}

#[cfg(all(test, any(debug_assertions, feature = "health-check")))]
mod tests {
  use super::SlotMarks;

  #[test]
  fn prefix_spans_word_boundary() {
    let mut marks = SlotMarks::dead(128);
    marks.set_prefix_live(70);
    assert_eq!(marks.live_count(), 70);
    assert!(marks.is_live(0));
    assert!(marks.is_live(63));
    assert!(marks.is_live(69));
    assert!(!marks.is_live(70));
    assert!(!marks.is_live(127));
  }

  #[test]
  fn set_and_clear_single_slots() {
    let mut marks = SlotMarks::dead(4);
    marks.set_live(3);
    marks.set_live(0);
    assert!(marks.is_live(3) && marks.is_live(0));
    marks.set_dead(3);
    assert!(!marks.is_live(3));
    assert_eq!(marks.live_count(), 1);
    marks.clear();
    assert_eq!(marks.live_count(), 0);
  }

  #[test]
  fn out_of_range_slot_is_dead() {
    let marks = SlotMarks::dead(0);
    assert!(!marks.is_live(0));
    assert!(!marks.is_live(64));
  }
}
