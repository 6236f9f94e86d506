use core::{fmt, marker::PhantomData};

use serde_core::{
  de::{Error, SeqAccess, Visitor},
  Deserialize, Deserializer, Serialize, Serializer,
};

use super::RingBuffer;

/// Upper bound on the pre-allocation driven by an untrusted length hint.
const MAX_PREALLOC: usize = 4096;

impl<T: Serialize> Serialize for RingBuffer<T> {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    serializer.collect_seq(self)
  }
}

fn fill<'de, T, A>(values: &mut RingBuffer<T>, mut seq: A) -> Result<(), A::Error>
where
  T: Deserialize<'de>,
  A: SeqAccess<'de>,
{
  let hint = seq.size_hint().unwrap_or(0).min(MAX_PREALLOC);
  if hint > values.capacity() {
    values.try_refit(hint).map_err(A::Error::custom)?;
  }

  while let Some(value) = seq.next_element()? {
    values.push_back(value);
  }
  Ok(())
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for RingBuffer<T> {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    struct SeqVisitor<T> {
      marker: PhantomData<T>,
    }

    impl<'de, T> Visitor<'de> for SeqVisitor<T>
    where
      T: Deserialize<'de>,
    {
      type Value = RingBuffer<T>;

      fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a sequence")
      }

      #[inline]
      fn visit_seq<A>(self, seq: A) -> Result<Self::Value, A::Error>
      where
        A: SeqAccess<'de>,
      {
        let mut values = RingBuffer::new();
        fill(&mut values, seq)?;
        Ok(values)
      }
    }

    let visitor = SeqVisitor {
      marker: PhantomData,
    };
    deserializer.deserialize_seq(visitor)
  }

  fn deserialize_in_place<D>(deserializer: D, place: &mut Self) -> Result<(), D::Error>
  where
    D: Deserializer<'de>,
  {
    struct SeqInPlaceVisitor<'a, T>(&'a mut RingBuffer<T>);

    impl<'de, T> Visitor<'de> for SeqInPlaceVisitor<'_, T>
    where
      T: Deserialize<'de>,
    {
      type Value = ();

      fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a sequence")
      }

      #[inline]
      fn visit_seq<A>(self, seq: A) -> Result<Self::Value, A::Error>
      where
        A: SeqAccess<'de>,
      {
        // Keeps the existing block when it is large enough.
        self.0.clear();
        fill(self.0, seq)
      }
    }

    deserializer.deserialize_seq(SeqInPlaceVisitor(place))
  }
}
