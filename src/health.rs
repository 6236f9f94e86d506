use core::fmt;

use super::{marks::SlotMarks, slots_for, HealthError, RingBuffer};

impl<T> RingBuffer<T> {
  /// Validates the structural invariants of the buffer.
  ///
  /// The size checks always run: `size` must fit in `capacity + 1` slots and
  /// agree with the distance from `begin` to `end`. In debug builds, or with the
  /// `health-check` feature, every physical slot is also compared against the
  /// occupied range: slots inside it must hold an element and slots outside it
  /// must not.
  ///
  /// ## Examples
  ///
  /// ```
  /// use ringdeque::RingBuffer;
  ///
  /// let mut deque = RingBuffer::with_capacity(3);
  /// deque.extend([1, 2, 3]);
  /// deque.pop_front();
  /// deque.push_back(4);
  /// deque.push_back(5);
  /// assert_eq!(deque.health_check(), Ok(()));
  /// ```
  pub fn health_check(&self) -> Result<(), HealthError> {
    let size_err = HealthError::Size {
      size: self.size,
      capacity: self.capacity,
      begin: self.begin,
      end: self.end,
    };

    let slots = slots_for(self.capacity);
    let shape_ok = self.capacity == 0 || (self.capacity + 1).is_power_of_two();
    if !shape_ok || self.buf.len() != slots || self.size > slots {
      return Err(size_err);
    }
    if self.size != 0 {
      let span = self.end.wrapping_sub(self.begin) & self.capacity;
      if self.begin >= slots || self.end >= slots || span + 1 != self.size {
        return Err(size_err);
      }
    }

    if !SlotMarks::ENABLED {
      return Ok(());
    }

    if self.size == 0 {
      return match (0..slots).find(|&slot| self.marks.is_live(slot)) {
        Some(slot) => Err(HealthError::LiveWhenEmpty { slot }),
        None => Ok(()),
      };
    }

    for slot in 0..slots {
      match (self.is_occupied(slot), self.marks.is_live(slot)) {
        (true, false) => return Err(HealthError::MissingLive { slot }),
        (false, true) => return Err(HealthError::UnexpectedLive { slot }),
        _ => {}
      }
    }
    Ok(())
  }

  /// Returns a [`Display`](fmt::Display) adapter printing the bookkeeping
  /// fields and every physical slot of the buffer.
  ///
  /// Slots holding an element print it with [`Debug`](fmt::Debug), empty slots
  /// print `-`, and the slots at `begin` and `end` are tagged `|beg|` and
  /// `|end|`. The output is meant for diagnostics and is not a stable format.
  ///
  /// ## Examples
  ///
  /// ```
  /// use ringdeque::RingBuffer;
  ///
  /// let mut deque = RingBuffer::with_capacity(3);
  /// deque.push_back(1);
  /// deque.push_front(0);
  ///
  /// let dump = deque.dump().to_string();
  /// assert!(dump.contains("{ |end| 1 } { - } { - } { |beg| 0 }"));
  ///
  /// let empty = RingBuffer::<u8>::new();
  /// assert!(empty.dump().to_string().ends_with("EMPTY!\n"));
  /// ```
  pub fn dump(&self) -> Dump<'_, T> {
    Dump { buf: self }
  }
}

/// Diagnostic view of a [`RingBuffer`], created by [`RingBuffer::dump`].
pub struct Dump<'a, T> {
  buf: &'a RingBuffer<T>,
}

impl<T: fmt::Debug> fmt::Display for Dump<'_, T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let buf = self.buf;
    writeln!(f, "capacity = {}", buf.capacity)?;
    writeln!(f, "size  = {}", buf.size)?;
    writeln!(f, "begin = {}", buf.begin)?;
    writeln!(f, "end   = {}", buf.end)?;

    if buf.buf.is_empty() {
      return writeln!(f, "EMPTY!");
    }

    for slot in 0..buf.buf.len() {
      if slot != 0 {
        f.write_str(" ")?;
      }
      f.write_str("{ ")?;
      if slot == buf.begin {
        f.write_str("|beg| ")?;
      }
      if slot == buf.end {
        f.write_str("|end| ")?;
      }
      // A slot is only read when both the range and the marks agree it is
      // initialized, so a corrupted buffer can still be dumped.
      let readable = buf.size <= buf.buf.len()
        && buf.is_occupied(slot)
        && (!SlotMarks::ENABLED || buf.marks.is_live(slot));
      if readable {
        // SAFETY: `slot` is inside the occupied range of a consistent buffer.
        write!(f, "{:?} }}", unsafe { buf.slot_ref(slot) })?;
      } else {
        f.write_str("- }")?;
      }
    }
    writeln!(f)
  }
}

impl<T: fmt::Debug> fmt::Debug for Dump<'_, T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Display::fmt(self, f)
  }
}
