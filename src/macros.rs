macro_rules! push_back_unchecked {
  ($this:ident($value:ident)) => {{
    if $this.size == 0 {
      $this.begin = 0;
      $this.end = 0;
    } else {
      $this.end = $this.wrap_add($this.end, 1);
    }
    $this.size += 1;
    let slot = $this.end;
    $this.marks.set_live(slot);
    // SAFETY: the caller grew the buffer, so `slot` is in-bounds and was dead
    $this.buffer_write(slot, $value)
  }};
}

macro_rules! push_front_unchecked {
  ($this:ident($value:ident)) => {{
    if $this.size == 0 {
      $this.begin = 0;
      $this.end = 0;
    } else {
      $this.begin = $this.wrap_sub($this.begin, 1);
    }
    $this.size += 1;
    let slot = $this.begin;
    $this.marks.set_live(slot);
    // SAFETY: the caller grew the buffer, so `slot` is in-bounds and was dead
    $this.buffer_write(slot, $value)
  }};
}

#[cfg(feature = "tracing")]
macro_rules! trace_relocate {
  ($op:expr, $from:expr, $to:expr, $size:expr) => {
    ::tracing::trace!(
      op = $op,
      from_capacity = $from,
      to_capacity = $to,
      size = $size,
      "ring buffer relocated"
    )
  };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_relocate {
  ($op:expr, $from:expr, $to:expr, $size:expr) => {{
    let _ = (&$op, &$from, &$to, &$size);
  }};
}

/// Panics with the full slot dump when the buffer fails its health check.
#[cfg(test)]
macro_rules! assert_healthy {
  ($buf:expr) => {{
    let buf = &$buf;
    if let Err(err) = buf.health_check() {
      panic!("{err}\n{}", buf.dump());
    }
  }};
}

#[cfg(test)]
pub(super) use assert_healthy;
pub(super) use push_back_unchecked;
pub(super) use push_front_unchecked;
pub(super) use trace_relocate;
